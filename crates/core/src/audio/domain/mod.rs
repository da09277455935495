pub mod dialect_classifier;
pub mod language;
pub mod language_detector;
pub mod prediction;
