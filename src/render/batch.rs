use std::io::{Cursor, Write};

use rayon::prelude::*;
use tracing::warn;
use zip::{write::FileOptions, ZipWriter};

use super::{RenderError, RenderErrorKind};
use crate::util;

/// Ordered archive entries, serialized to one zip buffer on completion.
/// Duplicate filenames are written as-is.
#[derive(Default)]
pub struct ArchiveBundle {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filename: String, bytes: Vec<u8>) {
        self.entries.push((filename, bytes));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_zip(self) -> Result<Vec<u8>, RenderError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        for (name, bytes) in self.entries {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| RenderError::Internal(format!("failed to start zip entry {name}: {e}")))?;
            writer
                .write_all(&bytes)
                .map_err(|e| RenderError::Internal(format!("failed to write zip entry {name}: {e}")))?;
        }
        let cursor = writer
            .finish()
            .map_err(|e| RenderError::Internal(format!("failed to finalize zip: {e}")))?;
        Ok(cursor.into_inner())
    }
}

/// One guest that did not make it into the archive.
#[derive(Debug)]
pub struct RenderFailure {
    pub guest_name: String,
    pub kind: RenderErrorKind,
    pub message: String,
}

pub struct BatchOutput {
    pub zip_bytes: Vec<u8>,
    pub rendered: usize,
    pub failures: Vec<RenderFailure>,
}

/// Render every guest on a pool bounded to `concurrency` threads and pack
/// the successes into a zip, one `{guest}.png` per entry, in input order.
/// Entry names carry the sanitized guest text; failure records keep the
/// original. A failed guest is recorded and skipped; the rest of the batch
/// keeps going, and an all-failed batch still yields the (empty) archive.
pub fn render_batch<F>(
    guests: &[String],
    concurrency: usize,
    render_one: F,
) -> Result<BatchOutput, RenderError>
where
    F: Fn(&str) -> Result<Vec<u8>, RenderError> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .build()
        .map_err(|e| RenderError::Internal(format!("failed to build render pool: {e}")))?;

    // Indexed collect restores input order regardless of completion order.
    let results: Vec<(usize, Result<Vec<u8>, RenderError>)> = pool.install(|| {
        guests
            .par_iter()
            .enumerate()
            .map(|(index, guest)| (index, render_one(guest.as_str())))
            .collect()
    });

    let mut bundle = ArchiveBundle::new();
    let mut failures = Vec::new();
    for (index, result) in results {
        let guest = &guests[index];
        match result {
            Ok(png) => bundle.push(format!("{}.png", util::sanitize_filename(guest)), png),
            Err(e) => {
                warn!("batch render failed for {guest}: {e}");
                failures.push(RenderFailure {
                    guest_name: guest.clone(),
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
    }

    let rendered = bundle.len();
    let zip_bytes = bundle.into_zip()?;
    Ok(BatchOutput {
        zip_bytes,
        rendered,
        failures,
    })
}
