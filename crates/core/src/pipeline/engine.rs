use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::infrastructure::onnx_dialect_classifier::OnnxDialectClassifier;
use crate::audio::infrastructure::whisper_language_detector::WhisperLanguageDetector;
use crate::media::domain::audio_decoder::AudioDecoder;
use crate::media::domain::segment_slicer::SegmentSlicer;
use crate::media::domain::slice_request::SliceRequest;
use crate::media::infrastructure::ffmpeg_decoder::FfmpegAudioDecoder;
use crate::media::infrastructure::ffmpeg_slicer::FfmpegSlicer;
use crate::pipeline::analysis_logger::AnalysisLogger;
use crate::pipeline::analyze_segment_use_case::{AnalysisOutcome, AnalyzeSegmentUseCase};
use crate::pipeline::model_cache::{ModelCache, ModelKey};
use crate::shared::config::Config;
use crate::shared::constants::{TARGET_LANGUAGE, WHISPER_MODEL_BASE_URL};
use crate::shared::device::{select_device, Device};
use crate::shared::model_resolver;

type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Download progress callback: `(file_name, bytes_downloaded, total_bytes)`.
pub type DownloadProgress = Arc<dyn Fn(&str, u64, u64) + Send + Sync>;

/// A model artifact that may need fetching: its cache name and source URL.
/// An empty URL means the name is a local path that must already exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: String,
    pub url: String,
}

/// Long-lived pipeline front end.
///
/// Owns the configuration, the selected compute device, and the model
/// caches. Cheap to construct; models are resolved and loaded on first
/// use (or eagerly via [`warm_up`](Self::warm_up)) and then reused for
/// every subsequent request.
pub struct AnalysisEngine {
    config: Config,
    device: Device,
    slicer: Arc<dyn SegmentSlicer>,
    decoder: Arc<dyn AudioDecoder>,
    detectors: ModelCache<WhisperLanguageDetector>,
    classifiers: ModelCache<OnnxDialectClassifier>,
}

impl AnalysisEngine {
    pub fn new(config: Config) -> Self {
        let device = select_device();
        Self::with_device(config, device)
    }

    pub fn with_device(config: Config, device: Device) -> Self {
        let slicer = Arc::new(FfmpegSlicer::with_binary(&config.ffmpeg));
        Self {
            config,
            device,
            slicer,
            decoder: Arc::new(FfmpegAudioDecoder),
            detectors: ModelCache::new(),
            classifiers: ModelCache::new(),
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve and load both models ahead of the first request, reporting
    /// download progress per file. Subsequent [`analyze`](Self::analyze)
    /// calls hit the caches.
    pub fn warm_up(&self, progress: Option<DownloadProgress>) -> Result<(), EngineError> {
        self.detector(progress.clone())?;
        self.classifier(progress)?;
        Ok(())
    }

    /// Run the full pipeline on one slice of `input`.
    pub fn analyze(
        &self,
        input: &Path,
        request: &SliceRequest,
        logger: &mut dyn AnalysisLogger,
    ) -> Result<AnalysisOutcome, EngineError> {
        let detector = self.detector(None)?;
        let classifier = self.classifier(None)?;

        let use_case = AnalyzeSegmentUseCase::new(
            self.slicer.clone(),
            self.decoder.clone(),
            detector,
            classifier,
            TARGET_LANGUAGE.into(),
        );
        use_case.run(input, request, logger)
    }

    fn detector(
        &self,
        progress: Option<DownloadProgress>,
    ) -> Result<Arc<WhisperLanguageDetector>, EngineError> {
        let remote = whisper_remote(&self.config.whisper_model);
        let key = ModelKey::new(&remote.name, self.device);
        self.detectors.get_or_load(&key, || {
            let path = self.resolve(&remote, progress)?;
            log::info!("loading Whisper model from {} on {}", path.display(), self.device);
            WhisperLanguageDetector::new(&path, self.device)
        })
    }

    fn classifier(
        &self,
        progress: Option<DownloadProgress>,
    ) -> Result<Arc<OnnxDialectClassifier>, EngineError> {
        let files = dialect_remote(&self.config.dialect_model)?;
        let key = ModelKey::new(&files.model.name, self.device);
        self.classifiers.get_or_load(&key, || {
            let model_path = self.resolve(&files.model, progress.clone())?;
            let labels_path = self.resolve(&files.labels, progress)?;
            log::info!(
                "loading dialect model from {} on {}",
                model_path.display(),
                self.device
            );
            OnnxDialectClassifier::new(&model_path, &labels_path, self.device)
        })
    }

    fn resolve(
        &self,
        remote: &RemoteFile,
        progress: Option<DownloadProgress>,
    ) -> Result<PathBuf, EngineError> {
        let per_file = progress.map(|cb| {
            let file_name = remote.name.clone();
            Box::new(move |done, total| cb(&file_name, done, total))
                as Box<dyn Fn(u64, u64) + Send>
        });
        let path = model_resolver::resolve(
            &remote.name,
            &remote.url,
            self.config.model_dir.as_deref(),
            self.config.offline,
            per_file,
        )?;
        Ok(path)
    }
}

/// Map a Whisper model name to its ggml file in the whisper.cpp repository.
/// A name that is already a path to an existing file is passed through.
pub fn whisper_remote(model: &str) -> RemoteFile {
    if Path::new(model).is_file() {
        return RemoteFile {
            name: model.to_string(),
            url: String::new(),
        };
    }
    // The repository publishes "turbo" under its full version name.
    let name = match model {
        "turbo" => "large-v3-turbo",
        other => other,
    };
    let file = format!("ggml-{name}.bin");
    let url = format!("{WHISPER_MODEL_BASE_URL}/{file}");
    RemoteFile { name: file, url }
}

/// The dialect model artifact and its `labels.json` sidecar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialectFiles {
    pub model: RemoteFile,
    pub labels: RemoteFile,
}

/// Work out where the dialect model and its label list live.
///
/// Accepts three spellings: a local path to an `.onnx` file (labels must
/// sit next to it), a direct `https://` URL (labels fetched from the same
/// directory), or a Hugging Face `owner/name` id (artifacts under
/// `onnx/` in the model repository).
pub fn dialect_remote(model: &str) -> Result<DialectFiles, EngineError> {
    let as_path = Path::new(model);
    if as_path.is_file() {
        let labels = as_path.with_file_name("labels.json");
        if !labels.is_file() {
            return Err(format!(
                "no labels.json found next to dialect model {}",
                as_path.display()
            )
            .into());
        }
        return Ok(DialectFiles {
            model: RemoteFile {
                name: model.to_string(),
                url: String::new(),
            },
            labels: RemoteFile {
                name: labels.to_string_lossy().into_owned(),
                url: String::new(),
            },
        });
    }

    if model.starts_with("http://") || model.starts_with("https://") {
        let labels_url = match model.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/labels.json"),
            None => return Err(format!("unusable dialect model URL: {model}").into()),
        };
        return Ok(DialectFiles {
            model: RemoteFile {
                name: model.to_string(),
                url: model.to_string(),
            },
            labels: RemoteFile {
                name: labels_url.clone(),
                url: labels_url,
            },
        });
    }

    // Hugging Face id; ONNX export convention puts artifacts under onnx/.
    Ok(DialectFiles {
        model: RemoteFile {
            name: format!("{model}/model.onnx"),
            url: format!("https://huggingface.co/{model}/resolve/main/onnx/model.onnx"),
        },
        labels: RemoteFile {
            name: format!("{model}/labels.json"),
            url: format!("https://huggingface.co/{model}/resolve/main/onnx/labels.json"),
        },
    })
}
