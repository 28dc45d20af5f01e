use std::{
    path::PathBuf,
    sync::Arc,
};

use crate::render::fonts::FontRegistry;

const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Shared handler state, assembled once at startup.
#[derive(Clone)]
pub struct AppState {
    pub fonts: Arc<FontRegistry>,
    pub templates_dir: Arc<PathBuf>,
    pub batch_concurrency: usize,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        fonts_dir: PathBuf,
        templates_dir: PathBuf,
        batch_concurrency: usize,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            fonts: Arc::new(FontRegistry::new(fonts_dir)),
            templates_dir: Arc::new(templates_dir),
            batch_concurrency: batch_concurrency.max(1),
            max_body_bytes,
        }
    }

    pub fn from_env() -> Self {
        let fonts_dir = std::env::var("FONTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets/fonts"));
        let templates_dir = std::env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets/templates"));
        let batch_concurrency = std::env::var("BATCH_CONCURRENCY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(num_cpus::get);
        let max_body_bytes = std::env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        Self::new(fonts_dir, templates_dir, batch_concurrency, max_body_bytes)
    }
}
