use std::env;
use std::path::PathBuf;

use crate::shared::constants::{DIALECT_MODEL_ID, WHISPER_MODEL_NAME};

/// Runtime configuration, read from the environment once at startup.
///
/// Every field has a documented default; nothing else in the crate touches
/// environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// Dialect model identifier: a filesystem path, an `https://` URL, or a
    /// Hugging Face style `owner/name` id. Env: `DIALECT_MODEL`.
    pub dialect_model: String,
    /// Whisper model name (`tiny`, `base`, `small`, ..., `turbo`) or a path
    /// to a ggml file. Env: `WHISPER_MODEL`.
    pub whisper_model: String,
    /// When set, model files must already be cached; downloads are refused.
    /// Env: `LAHJA_OFFLINE` (`1`/`true`/`yes`).
    pub offline: bool,
    /// Overrides the platform model cache directory. Env: `LAHJA_MODEL_DIR`.
    pub model_dir: Option<PathBuf>,
    /// ffmpeg binary to spawn for slicing. Env: `LAHJA_FFMPEG`.
    pub ffmpeg: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            dialect_model: env::var("DIALECT_MODEL")
                .unwrap_or_else(|_| DIALECT_MODEL_ID.to_string()),
            whisper_model: env::var("WHISPER_MODEL")
                .unwrap_or_else(|_| WHISPER_MODEL_NAME.to_string()),
            offline: env::var("LAHJA_OFFLINE")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
            model_dir: env::var_os("LAHJA_MODEL_DIR").map(PathBuf::from),
            ffmpeg: env::var_os("LAHJA_FFMPEG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("ffmpeg")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect_model: DIALECT_MODEL_ID.to_string(),
            whisper_model: WHISPER_MODEL_NAME.to_string(),
            offline: false,
            model_dir: None,
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dialect_model, DIALECT_MODEL_ID);
        assert_eq!(config.whisper_model, WHISPER_MODEL_NAME);
        assert!(!config.offline);
        assert!(config.model_dir.is_none());
        assert_eq!(config.ffmpeg, PathBuf::from("ffmpeg"));
    }

    #[rstest]
    #[case("1", true)]
    #[case("true", true)]
    #[case("YES", true)]
    #[case(" true ", true)]
    #[case("0", false)]
    #[case("false", false)]
    #[case("", false)]
    #[case("off", false)]
    fn test_is_truthy(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_truthy(value), expected);
    }
}
