use super::language::LanguageCode;
use crate::media::domain::audio_segment::AudioSegment;

/// Domain interface for spoken-language identification.
///
/// Implementations return the single most probable language code for a
/// clip; failure to produce a probability distribution is a hard error,
/// never a default language.
pub trait LanguageDetector: Send + Sync {
    fn detect(
        &self,
        audio: &AudioSegment,
    ) -> Result<LanguageCode, Box<dyn std::error::Error + Send + Sync>>;
}
