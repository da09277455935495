/// Default dialect classification model (Hugging Face identifier).
pub const DIALECT_MODEL_ID: &str = "badrex/mms-300m-arabic-dialect-identifier";

/// Default Whisper model name for language identification.
pub const WHISPER_MODEL_NAME: &str = "base";

/// ggml Whisper model files are published under this repository.
pub const WHISPER_MODEL_BASE_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Language code that gates the dialect classification stage.
pub const TARGET_LANGUAGE: &str = "ar";

/// Sample rate forced onto every sliced clip; also what both models expect.
pub const SLICE_SAMPLE_RATE: u32 = 16000;

/// Shortest slice the pipeline will accept, in seconds.
pub const MIN_SLICE_SECONDS: f64 = 1.0;

/// Default slice length, in seconds.
pub const DEFAULT_SLICE_SECONDS: f64 = 30.0;

/// Upload allow-list; containers ffmpeg is known to open here.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mp3", "m4a", "wav", "ogg", "flac", "mp4", "mkv", "avi", "mov", "webm",
];

/// Suffix given to uploaded files whose name carries no extension.
pub const DEFAULT_UPLOAD_SUFFIX: &str = ".mp3";
