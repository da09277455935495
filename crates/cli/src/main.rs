use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use lahja_core::audio::domain::language::LanguageCode;
use lahja_core::media::domain::slice_request::SliceRequest;
use lahja_core::media::domain::start_time::StartTime;
use lahja_core::media::infrastructure::uploaded_file::is_supported_media;
use lahja_core::pipeline::analysis_logger::{AnalysisLogger, StdoutAnalysisLogger};
use lahja_core::pipeline::analyze_segment_use_case::AnalysisOutcome;
use lahja_core::pipeline::engine::{AnalysisEngine, DownloadProgress};
use lahja_core::shared::config::Config;
use lahja_core::shared::constants::{DEFAULT_SLICE_SECONDS, TARGET_LANGUAGE};
use lahja_core::shared::device::Device;

/// Arabic dialect identification for audio and video files.
#[derive(Parser)]
#[command(name = "lahja", after_help = "\
Models are configured through the environment:
  DIALECT_MODEL    dialect model path, https:// URL, or Hugging Face id
                   (default: badrex/mms-300m-arabic-dialect-identifier)
  WHISPER_MODEL    Whisper model name or ggml file path (default: base;
                   'turbo' is an alias for large-v3-turbo, a ~1.6 GB
                   download)
  LAHJA_OFFLINE    set to 1 to forbid model downloads (cached files only)
  LAHJA_MODEL_DIR  override the model cache directory
  LAHJA_FFMPEG     ffmpeg binary used for slicing")]
struct Cli {
    /// Input audio or video file.
    input: PathBuf,

    /// Where the analyzed window starts: seconds or [hh:]mm:ss.
    #[arg(long, default_value = "0")]
    start: StartTime,

    /// Length of the analyzed window, in seconds.
    #[arg(long, default_value_t = DEFAULT_SLICE_SECONDS)]
    duration: f64,

    /// Compute backend: cuda, mps, or cpu (default: auto-detect).
    #[arg(long)]
    device: Option<String>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let request = SliceRequest::new(cli.start, cli.duration)?;
    let config = Config::from_env();
    let engine = match cli.device.as_deref().map(parse_device).transpose()? {
        Some(device) => AnalysisEngine::with_device(config, device),
        None => AnalysisEngine::new(config),
    };
    log::info!("using device: {}", engine.device());

    let progress: DownloadProgress = Arc::new(download_progress);
    engine.warm_up(Some(progress))?;
    eprintln!();

    let mut logger = StdoutAnalysisLogger::new();
    let outcome = engine.analyze(&cli.input, &request, &mut logger)?;
    report(&outcome);
    logger.summary();
    Ok(())
}

fn report(outcome: &AnalysisOutcome) {
    match outcome {
        AnalysisOutcome::NotTargetLanguage(code) => {
            println!(
                "Detected language: {} ({code}); not {}, skipping dialect classification",
                code.display_name(),
                LanguageCode::from(TARGET_LANGUAGE).display_name()
            );
        }
        AnalysisOutcome::NoPredictions => {
            println!("No dialect predictions returned for this clip");
        }
        AnalysisOutcome::DialectPredictions(predictions) => {
            println!("Dialect predictions:");
            for prediction in predictions {
                println!("  {:24} {:6.1}%", prediction.label, prediction.score * 100.0);
            }
        }
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !is_supported_media(&cli.input.to_string_lossy()) {
        return Err(format!(
            "Unsupported file type: {} (expected an audio or video container)",
            cli.input.display()
        )
        .into());
    }
    Ok(())
}

fn parse_device(token: &str) -> Result<Device, Box<dyn std::error::Error + Send + Sync>> {
    Device::parse(token)
        .ok_or_else(|| format!("Device must be 'cuda', 'mps', or 'cpu', got '{token}'").into())
}

fn download_progress(file: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let percent = downloaded * 100 / total;
        eprint!(
            "\rDownloading {file}: {percent}% ({:.1}/{:.1} MB)",
            downloaded as f64 / 1_048_576.0,
            total as f64 / 1_048_576.0
        );
    } else {
        eprint!(
            "\rDownloading {file}: {:.1} MB",
            downloaded as f64 / 1_048_576.0
        );
    }
}
