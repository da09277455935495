use std::path::Path;
use std::sync::Mutex;

use crate::audio::domain::dialect_classifier::DialectClassifier;
use crate::audio::domain::prediction::{Prediction, RawPredictions};
use crate::media::domain::audio_segment::AudioSegment;
use crate::shared::device::Device;

/// Variance floor for waveform normalization, matching the feature
/// extractor the dialect model was trained with.
const NORMALIZE_EPSILON: f32 = 1e-7;

/// Dialect classifier backed by an ONNX Runtime session.
///
/// The model takes a zero-mean/unit-variance waveform `[1, N]` and emits
/// one logit per dialect label; labels come from a `labels.json` sidecar
/// (a JSON array, index = class id).
pub struct OnnxDialectClassifier {
    session: Mutex<ort::session::Session>,
    labels: Vec<String>,
}

impl OnnxDialectClassifier {
    pub fn new(
        model_path: &Path,
        labels_path: &Path,
        device: Device,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let labels = load_labels(labels_path)?;

        let session = ort::session::Session::builder()?
            .with_execution_providers(device.execution_providers())?
            .commit_from_file(model_path)?;

        Ok(Self {
            session: Mutex::new(session),
            labels,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl DialectClassifier for OnnxDialectClassifier {
    fn classify(
        &self,
        audio: &AudioSegment,
    ) -> Result<Vec<Prediction>, Box<dyn std::error::Error + Send + Sync>> {
        if audio.is_empty() {
            return Ok(Vec::new());
        }

        let input = normalize_waveform(audio.samples());
        let tensor = ndarray::Array2::from_shape_vec((1, input.len()), input)?;
        let input_value = ort::value::Tensor::from_array(tensor)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| "classifier session lock poisoned")?;
        let outputs = session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("dialect model produced no outputs".into());
        }

        let logits = outputs[0].try_extract_array::<f32>()?;
        let shape = logits.shape();
        let scores: Vec<f32> = match *shape {
            // [num_labels] — single un-batched score set
            [n] => logits
                .as_slice()
                .ok_or("cannot view logits as slice")?[..n]
                .to_vec(),
            // [1, num_labels] — the usual batch-of-one
            [1, n] => logits
                .as_slice()
                .ok_or("cannot view logits as slice")?[..n]
                .to_vec(),
            _ => return Err(format!("unexpected logits shape: {shape:?}").into()),
        };

        if scores.len() != self.labels.len() {
            return Err(format!(
                "model emitted {} scores for {} labels",
                scores.len(),
                self.labels.len()
            )
            .into());
        }

        let probabilities = softmax(&scores);
        let mut predictions: Vec<Prediction> = self
            .labels
            .iter()
            .zip(probabilities)
            .map(|(label, score)| Prediction::new(label.clone(), score))
            .collect();

        let raw = if predictions.len() == 1 {
            RawPredictions::Single(predictions.remove(0))
        } else {
            RawPredictions::Batch(predictions)
        };
        Ok(raw.into_ordered())
    }
}

fn load_labels(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
    let file = std::fs::File::open(path)
        .map_err(|e| format!("failed to open labels file {}: {e}", path.display()))?;
    let labels: Vec<String> = serde_json::from_reader(file)
        .map_err(|e| format!("failed to parse labels file {}: {e}", path.display()))?;
    if labels.is_empty() {
        return Err(format!("labels file {} is empty", path.display()).into());
    }
    Ok(labels)
}

/// Zero-mean/unit-variance normalization over the whole clip.
fn normalize_waveform(samples: &[f32]) -> Vec<f32> {
    let n = samples.len() as f32;
    let mean = samples.iter().sum::<f32>() / n;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / n;
    let denom = (variance + NORMALIZE_EPSILON).sqrt();
    samples.iter().map(|s| (s - mean) / denom).collect()
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
