use super::prediction::Prediction;
use crate::media::domain::audio_segment::AudioSegment;

/// Domain interface for dialect classification.
///
/// Returns predictions ordered descending by confidence. An empty sequence
/// is a valid outcome ("no predictions"), not an error.
pub trait DialectClassifier: Send + Sync {
    fn classify(
        &self,
        audio: &AudioSegment,
    ) -> Result<Vec<Prediction>, Box<dyn std::error::Error + Send + Sync>>;
}
