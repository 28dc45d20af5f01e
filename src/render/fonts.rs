use std::{collections::HashMap, path::PathBuf, sync::Arc};

use parking_lot::Mutex;
use rusttype::Font;
use tracing::info;

use super::RenderError;

/// Binds logical family names to parsed fonts, at most once per family for
/// the registry's lifetime. The process owns one instance; tests build
/// their own to reset state.
pub struct FontRegistry {
    fonts_dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<Font<'static>>>>,
}

impl FontRegistry {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Return the font for `family`, loading `{fonts_dir}/{family}.ttf` on
    /// first use. The lock is held across check-load-insert so concurrent
    /// first registrations read the file once; later calls never touch the
    /// filesystem, even if the file has changed or vanished.
    pub fn ensure_registered(&self, family: &str) -> Result<Arc<Font<'static>>, RenderError> {
        let mut cache = self.cache.lock();
        if let Some(f) = cache.get(family) {
            return Ok(Arc::clone(f));
        }

        let path = self.fonts_dir.join(format!("{family}.ttf"));
        let bytes = std::fs::read(&path)
            .map_err(|e| RenderError::Resource(format!("failed to read font {family}: {e}")))?;
        let f = Font::try_from_vec(bytes)
            .ok_or_else(|| RenderError::Resource(format!("failed to parse font {family}")))?;

        let f = Arc::new(f);
        cache.insert(family.to_string(), Arc::clone(&f));
        info!("Font registered: {family}");
        Ok(f)
    }

    pub fn is_registered(&self, family: &str) -> bool {
        self.cache.lock().contains_key(family)
    }
}
