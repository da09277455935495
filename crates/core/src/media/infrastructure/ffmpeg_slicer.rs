use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::media::domain::segment_slicer::SegmentSlicer;
use crate::media::domain::slice_request::SliceRequest;
use crate::media::domain::sliced_clip::SlicedClip;
use crate::media::domain::start_time::format_seconds;
use crate::shared::constants::SLICE_SAMPLE_RATE;

#[derive(Error, Debug)]
pub enum SliceError {
    #[error("failed to create temp file for sliced clip: {0}")]
    TempFile(#[source] std::io::Error),
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ffmpeg exited with {code}: {stderr}")]
    Failed { code: String, stderr: String },
    #[error("sliced audio file is empty; check start time and duration")]
    EmptyOutput,
    #[error("failed to inspect sliced clip: {0}")]
    Inspect(#[source] std::io::Error),
}

/// Cuts a clip out of a media file by shelling out to the `ffmpeg` binary.
///
/// The flags force 16-bit PCM, 16 kHz, mono, and drop any video stream.
/// One attempt, no timeout; ffmpeg blocks until it finishes.
pub struct FfmpegSlicer {
    binary: PathBuf,
}

impl FfmpegSlicer {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
        }
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// The full invocation, tool name first. Split out so the exact argument
    /// order is visible and testable.
    pub fn command_line(&self, input: &Path, request: &SliceRequest, output: &Path) -> Vec<String> {
        vec![
            self.binary.to_string_lossy().into_owned(),
            "-y".into(),
            "-ss".into(),
            request.start().to_string(),
            "-t".into(),
            format_seconds(request.duration()),
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-vn".into(),
            "-acodec".into(),
            "pcm_s16le".into(),
            "-ar".into(),
            SLICE_SAMPLE_RATE.to_string(),
            "-ac".into(),
            "1".into(),
            output.to_string_lossy().into_owned(),
        ]
    }

    fn run(&self, input: &Path, request: &SliceRequest) -> Result<SlicedClip, SliceError> {
        let output_path = tempfile::Builder::new()
            .prefix("lahja-clip-")
            .suffix(".wav")
            .tempfile()
            .map_err(SliceError::TempFile)?
            .into_temp_path();

        let command_line = self.command_line(input, request, &output_path);
        log::debug!("slicing: {}", command_line.join(" "));

        let output = Command::new(&command_line[0])
            .args(&command_line[1..])
            .output()
            .map_err(|e| SliceError::Spawn {
                binary: self.binary.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(SliceError::Failed {
                code: output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // A start offset past the end of the file makes ffmpeg exit zero with
        // an empty output; never hand that to the inference stage.
        let size = std::fs::metadata(&output_path)
            .map_err(SliceError::Inspect)?
            .len();
        if size == 0 {
            return Err(SliceError::EmptyOutput);
        }

        Ok(SlicedClip::new(output_path))
    }
}

impl Default for FfmpegSlicer {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentSlicer for FfmpegSlicer {
    fn slice(
        &self,
        input: &Path,
        request: &SliceRequest,
    ) -> Result<SlicedClip, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.run(input, request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::domain::start_time::StartTime;

    fn request(start: f64, duration: f64) -> SliceRequest {
        SliceRequest::new(StartTime::Seconds(start), duration).unwrap()
    }

    #[test]
    fn test_command_line_begins_with_tool_name() {
        let slicer = FfmpegSlicer::new();
        let args = slicer.command_line(Path::new("in.mp3"), &request(10.0, 5.0), Path::new("out.wav"));
        assert_eq!(args[0], "ffmpeg");
    }

    #[test]
    fn test_command_line_window_flags_in_order() {
        let slicer = FfmpegSlicer::new();
        let args = slicer.command_line(Path::new("in.mp3"), &request(10.0, 5.0), Path::new("out.wav"));
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "10.0");
        assert_eq!(args[ss + 2], "-t");
        assert_eq!(args[ss + 3], "5.0");
    }

    #[test]
    fn test_command_line_forces_output_format() {
        let slicer = FfmpegSlicer::new();
        let args = slicer.command_line(Path::new("in.mp3"), &request(0.0, 5.0), Path::new("out.wav"));
        let tail: Vec<&str> = args.iter().map(String::as_str).collect();
        for window in [
            &["-vn"][..],
            &["-acodec", "pcm_s16le"][..],
            &["-ar", "16000"][..],
            &["-ac", "1"][..],
        ] {
            assert!(
                tail.windows(window.len()).any(|w| *w == *window),
                "missing {window:?} in {args:?}"
            );
        }
        assert_eq!(args.last().unwrap(), "out.wav");
    }

    #[test]
    fn test_timestamp_start_passed_through() {
        let slicer = FfmpegSlicer::new();
        let start: StartTime = "00:01:30".parse().unwrap();
        let req = SliceRequest::new(start, 5.0).unwrap();
        let args = slicer.command_line(Path::new("in.mp3"), &req, Path::new("out.wav"));
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "00:01:30");
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let slicer = FfmpegSlicer::with_binary("/nonexistent/ffmpeg");
        let result = slicer.run(Path::new("in.mp3"), &request(0.0, 5.0));
        assert!(matches!(result, Err(SliceError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_failure() {
        // `false` ignores its arguments and exits 1
        let slicer = FfmpegSlicer::with_binary("false");
        let result = slicer.run(Path::new("in.mp3"), &request(0.0, 5.0));
        assert!(matches!(result, Err(SliceError::Failed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_zero_byte_output_is_rejected() {
        // `true` exits zero without writing anything, leaving the temp
        // output at zero bytes; the empty-output guard must fire.
        let slicer = FfmpegSlicer::with_binary("true");
        let result = slicer.run(Path::new("in.mp3"), &request(0.0, 5.0));
        assert!(matches!(result, Err(SliceError::EmptyOutput)));
    }
}
