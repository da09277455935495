use std::path::Path;

use super::slice_request::SliceRequest;
use super::sliced_clip::SlicedClip;

/// Domain interface for cutting a time-bounded audio clip out of a media file.
///
/// Implementations produce a mono 16-bit 16 kHz PCM WAV temp file.
pub trait SegmentSlicer: Send + Sync {
    fn slice(
        &self,
        input: &Path,
        request: &SliceRequest,
    ) -> Result<SlicedClip, Box<dyn std::error::Error + Send + Sync>>;
}
