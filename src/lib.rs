//! Invitation personalization backend: renders guest names onto template
//! images and delivers single PNGs, inline previews, or zip batches.

pub mod api;
pub mod guests;
pub mod openapi;
pub mod render;
pub mod state;
pub mod templates;
pub mod util;

pub use state::AppState;
