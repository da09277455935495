use std::path::Path;

use tempfile::TempPath;

/// A sliced audio clip on disk: mono, 16-bit PCM, 16 kHz WAV.
///
/// Owns the temp file; dropping the clip deletes it, so cleanup happens on
/// every exit path regardless of which pipeline stage failed.
#[derive(Debug)]
pub struct SlicedClip {
    path: TempPath,
}

impl SlicedClip {
    pub fn new(path: TempPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
