use std::path::{Path, PathBuf};

use whisper_rs::{WhisperContext, WhisperContextParameters};

use crate::audio::domain::language::LanguageCode;
use crate::audio::domain::language_detector::LanguageDetector;
use crate::media::domain::audio_segment::AudioSegment;
use crate::shared::device::Device;

/// Language identifier using whisper.cpp via whisper-rs.
///
/// The model is loaded once at construction and reused for every clip.
/// Per clip it computes the model's mel representation of the samples and
/// runs Whisper's language auto-detection for a probability distribution
/// over the language vocabulary; the argmax code is returned.
pub struct WhisperLanguageDetector {
    ctx: WhisperContext,
    model_path: PathBuf,
}

impl WhisperLanguageDetector {
    pub fn new(
        model_path: &Path,
        device: Device,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(device != Device::Cpu);

        let ctx = WhisperContext::new_with_params(
            model_path
                .to_str()
                .ok_or_else(|| format!("invalid model path: {}", model_path.display()))?,
            ctx_params,
        )
        .map_err(|e| format!("failed to load Whisper model: {e}"))?;

        Ok(Self {
            ctx,
            model_path: model_path.to_path_buf(),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl LanguageDetector for WhisperLanguageDetector {
    fn detect(
        &self,
        audio: &AudioSegment,
    ) -> Result<LanguageCode, Box<dyn std::error::Error + Send + Sync>> {
        if audio.is_empty() {
            return Err("cannot detect language of an empty clip".into());
        }

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| format!("failed to create Whisper state: {e}"))?;

        let threads = num_cpus().min(4);
        state
            .pcm_to_mel(audio.samples(), threads)
            .map_err(|e| format!("failed to compute mel spectrogram: {e}"))?;

        let (top_id, probs) = state
            .lang_detect(0, threads)
            .map_err(|e| format!("language detection failed: {e}"))?;

        if probs.is_empty() {
            return Err("language detection failed; no probabilities returned".into());
        }

        // Prefer the argmax over the returned distribution; fall back to the
        // id whisper itself reported if the vectors ever disagree in length.
        let best_id = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(id, _)| id as i32)
            .unwrap_or(top_id);

        let code = whisper_rs::get_lang_str(best_id)
            .ok_or_else(|| format!("whisper returned unknown language id {best_id}"))?;

        log::debug!("detected language {code} (id {best_id})");
        Ok(LanguageCode::from(code))
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_nonexistent_path_returns_error() {
        let result =
            WhisperLanguageDetector::new(Path::new("/nonexistent/model.bin"), Device::Cpu);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_nonexistent_path_error_message() {
        let result =
            WhisperLanguageDetector::new(Path::new("/nonexistent/model.bin"), Device::Cpu);
        let err = result.err().unwrap().to_string();
        assert!(
            err.contains("not found"),
            "Expected 'not found' in error, got: {err}"
        );
    }

    #[test]
    #[ignore] // Requires a whisper model file
    fn test_detect_does_not_crash_on_sine_wave() {
        let model_path = crate::shared::model_resolver::resolve(
            "ggml-tiny.bin",
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.bin",
            None,
            false,
            None,
        )
        .expect("failed to resolve whisper model");

        let detector = WhisperLanguageDetector::new(&model_path, Device::Cpu)
            .expect("failed to create detector");

        let sample_rate = 16000u32;
        let len = (3.0 * sample_rate as f64) as usize;
        let samples: Vec<f32> = (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * std::f64::consts::PI * 440.0 * t).sin() as f32
            })
            .collect();
        let audio = AudioSegment::new(samples, sample_rate, 1);

        let result = detector.detect(&audio);
        assert!(result.is_ok(), "detection should not error: {result:?}");
    }
}
