use std::io::Write;
use std::path::Path;

use tempfile::TempPath;

use crate::shared::constants::{DEFAULT_UPLOAD_SUFFIX, MEDIA_EXTENSIONS};

/// Persist uploaded bytes to a named temp file, keeping the original
/// extension so ffmpeg can guess the container. The returned `TempPath`
/// deletes the copy when dropped.
pub fn persist_upload(file_name: &str, bytes: &[u8]) -> std::io::Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("lahja-upload-")
        .suffix(&suffix_for(file_name))
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file.into_temp_path())
}

/// Temp-file suffix for an uploaded name; `.mp3` when there is no extension.
pub fn suffix_for(file_name: &str) -> String {
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!(".{ext}"),
        _ => DEFAULT_UPLOAD_SUFFIX.to_string(),
    }
}

/// Whether the file name carries one of the supported media extensions.
pub fn is_supported_media(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| MEDIA_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
