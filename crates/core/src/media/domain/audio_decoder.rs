use std::path::Path;

use super::audio_segment::AudioSegment;

/// Domain interface for decoding an audio file into PCM samples.
pub trait AudioDecoder: Send + Sync {
    /// Decode the file into mono f32 samples at `target_sample_rate`.
    fn decode(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<AudioSegment, Box<dyn std::error::Error + Send + Sync>>;
}
