use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("transfer interrupted for {url}: {source}")]
    Transfer {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("model {name} is not cached and offline mode is enabled")]
    Offline { name: String },
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolve a model file by name, checking the cache before downloading.
///
/// Resolution order:
/// 1. `name` taken as a filesystem path, if such a file exists
/// 2. The model cache directory (`cache_dir` override, else platform cache)
/// 3. Download from `url` into the cache — refused in offline mode
pub fn resolve(
    name: &str,
    url: &str,
    cache_dir: Option<&Path>,
    offline: bool,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    // 1. Explicit path wins; lets users point at local model files directly.
    let as_path = Path::new(name);
    if as_path.is_file() {
        return Ok(as_path.to_path_buf());
    }

    // 2. Check the cache
    let cache_dir = match cache_dir {
        Some(dir) => dir.to_path_buf(),
        None => model_cache_dir()?,
    };
    let cached_path = cache_dir.join(cache_file_name(name));
    if cached_path.exists() {
        return Ok(cached_path);
    }

    // 3. Download into the cache
    if offline {
        return Err(ModelResolveError::Offline {
            name: name.to_string(),
        });
    }
    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/Lahja/models/`
/// - Linux: `$XDG_CACHE_HOME/Lahja/models/` or `~/.cache/Lahja/models/`
/// - Windows: `%LOCALAPPDATA%/Lahja/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("Lahja").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("Lahja").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

/// Flatten an identifier into a single cache file name
/// (`owner/name` → `owner--name`, Hugging Face cache convention).
pub fn cache_file_name(name: &str) -> String {
    name.replace(['/', '\\', ':'], "--")
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    // A 404 or 500 body must never end up cached as a model file.
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    // Write to a temp file first, then rename for atomicity
    let temp_path = dest.with_extension("part");
    if let Err(e) = stream_body(&mut response, url, &temp_path, &progress) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Stream the response body to disk in 1 MB chunks, reporting progress
/// after each chunk. Model files run into the gigabytes, so the body is
/// never buffered whole.
fn stream_body(
    response: &mut reqwest::blocking::Response,
    url: &str,
    temp_path: &Path,
    progress: &Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    use std::io::Read;

    let total = response.content_length().unwrap_or(0);
    let mut file = fs::File::create(temp_path).map_err(|e| ModelResolveError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    })?;

    let mut buffer = vec![0u8; 1024 * 1024];
    let mut downloaded: u64 = 0;
    loop {
        let read = response
            .read(&mut buffer)
            .map_err(|e| ModelResolveError::Transfer {
                url: url.to_string(),
                source: e,
            })?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read])
            .map_err(|e| ModelResolveError::Write {
                path: temp_path.to_path_buf(),
                source: e,
            })?;
        downloaded += read as u64;
        if let Some(cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(|e| ModelResolveError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_direct_path_wins() {
        let tmp = TempDir::new().unwrap();
        let model_path = tmp.path().join("model.onnx");
        fs::write(&model_path, b"fake model data").unwrap();

        let resolved = resolve(
            model_path.to_str().unwrap(),
            "http://invalid.example.com/model.onnx",
            Some(tmp.path()),
            true,
            None,
        )
        .unwrap();
        assert_eq!(resolved, model_path);
    }

    #[test]
    fn test_resolve_finds_cached_file() {
        let tmp = TempDir::new().unwrap();
        let cached = tmp.path().join(cache_file_name("owner/model.onnx"));
        fs::write(&cached, b"cached model").unwrap();

        let resolved = resolve(
            "owner/model.onnx",
            "http://invalid.example.com/model.onnx",
            Some(tmp.path()),
            true,
            None,
        )
        .unwrap();
        assert_eq!(resolved, cached);
    }

    #[test]
    fn test_resolve_offline_without_cache_fails() {
        let tmp = TempDir::new().unwrap();
        let result = resolve(
            "owner/model.onnx",
            "http://invalid.example.com/model.onnx",
            Some(tmp.path()),
            true,
            None,
        );
        assert!(matches!(result, Err(ModelResolveError::Offline { .. })));
    }

    #[test]
    fn test_cache_file_name_flattens_separators() {
        assert_eq!(cache_file_name("owner/model.onnx"), "owner--model.onnx");
        assert_eq!(cache_file_name("ggml-base.bin"), "ggml-base.bin");
    }

    #[test]
    fn test_model_cache_dir_returns_path() {
        let dir = model_cache_dir();
        assert!(dir.is_ok());
        let path = dir.unwrap();
        assert!(path.to_string_lossy().contains("Lahja"));
        assert!(path.to_string_lossy().contains("models"));
    }

    /// One-shot HTTP server returning a canned response on 127.0.0.1;
    /// yields the URL to request.
    fn serve_once(response: &'static str) -> String {
        use std::io::Read;

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}/model.onnx")
    }

    #[test]
    fn test_download_rejects_http_error_status() {
        let url = serve_once("HTTP/1.1 404 Not Found\r\ncontent-length: 9\r\n\r\nnot found");
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.onnx");

        let result = download(&url, &dest, None);
        assert!(matches!(result, Err(ModelResolveError::Download { .. })));
        // The error body must not be cached as the model
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }

    #[test]
    fn test_download_streams_body_with_progress() {
        let url = serve_once("HTTP/1.1 200 OK\r\ncontent-length: 11\r\n\r\nmodel bytes");
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.onnx");

        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        download(
            &url,
            &dest,
            Some(Box::new(move |done, total| {
                sink.lock().unwrap().push((done, total));
            })),
        )
        .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"model bytes");
        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert_eq!(*seen.last().unwrap(), (11, 11));
    }

    #[test]
    fn test_download_invalid_url_returns_error() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.onnx");
        let result = download("http://invalid.nonexistent.example.com/model", &dest, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_download_atomic_no_partial_on_failure() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.onnx");
        let _ = download("http://invalid.nonexistent.example.com/model", &dest, None);
        // Neither the dest nor the .part file should exist after failure
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }
}
