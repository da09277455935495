pub mod onnx_dialect_classifier;
pub mod whisper_language_detector;
