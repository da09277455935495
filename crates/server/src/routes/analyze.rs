use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use tracing::info;

use lahja_core::audio::domain::prediction::Prediction;
use lahja_core::media::domain::slice_request::SliceRequest;
use lahja_core::media::domain::start_time::StartTime;
use lahja_core::media::infrastructure::ffmpeg_slicer::SliceError;
use lahja_core::media::infrastructure::uploaded_file::{is_supported_media, persist_upload};
use lahja_core::pipeline::analysis_logger::NullAnalysisLogger;
use lahja_core::pipeline::analyze_segment_use_case::AnalysisOutcome;

use crate::{error::ApiError, state::AppState};

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalyzeResponse {
    Dialect {
        language: String,
        predictions: Vec<Prediction>,
    },
    OtherLanguage {
        language: String,
        language_name: String,
    },
    NoPredictions,
}

/// Analyze one window of an uploaded media file.
/// Multipart fields: `file` (binary), `start` (text, optional), `duration`
/// (text, optional).
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut file_data: Option<(String, Vec<u8>)> = None; // (filename, bytes)
    let mut start = StartTime::default();
    let mut duration: Option<f64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
                file_data = Some((filename, bytes.to_vec()));
            }
            "start" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {e}")))?;
                start = text
                    .parse()
                    .map_err(|e| ApiError::Validation(format!("Invalid start time: {e}")))?;
            }
            "duration" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {e}")))?;
                duration = Some(
                    text.parse()
                        .map_err(|_| ApiError::Validation(format!("Invalid duration: {text}")))?,
                );
            }
            _ => {}
        }
    }

    let (filename, bytes) = file_data
        .ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::Validation("Uploaded file is empty".to_string()));
    }
    if !is_supported_media(&filename) {
        return Err(ApiError::Validation(format!(
            "Unsupported file type: {filename}"
        )));
    }

    let request = match duration {
        Some(seconds) => SliceRequest::new(start, seconds)
            .map_err(|e| ApiError::Validation(e.to_string()))?,
        None => SliceRequest::new(start, SliceRequest::default().duration())
            .map_err(|e| ApiError::Validation(e.to_string()))?,
    };

    info!(file = %filename, size = bytes.len(), "analyze request");

    // Inference is synchronous and can take seconds; keep it off the
    // async executor.
    let engine = state.engine.clone();
    let outcome = tokio::task::spawn_blocking(
        move || -> Result<_, Box<dyn std::error::Error + Send + Sync>> {
            let upload = persist_upload(&filename, &bytes)?;
            engine.analyze(&upload, &request, &mut NullAnalysisLogger)
        },
    )
    .await
    .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))?
    .map_err(map_pipeline_error)?;

    Ok(Json(to_response(outcome)))
}

/// Sort pipeline errors into the client's fault or ours. A slice window
/// past end-of-file or a file ffmpeg cannot read are correctable inputs,
/// not server faults.
fn map_pipeline_error(err: Box<dyn std::error::Error + Send + Sync>) -> ApiError {
    match err.downcast::<SliceError>() {
        Ok(slice) => match slice.as_ref() {
            SliceError::EmptyOutput => ApiError::Validation(slice.to_string()),
            SliceError::Failed { .. } => ApiError::BadRequest(slice.to_string()),
            _ => ApiError::Internal(slice.to_string()),
        },
        Err(other) => ApiError::Internal(other.to_string()),
    }
}

fn to_response(outcome: AnalysisOutcome) -> AnalyzeResponse {
    match outcome {
        AnalysisOutcome::DialectPredictions(predictions) => AnalyzeResponse::Dialect {
            language: lahja_core::shared::constants::TARGET_LANGUAGE.to_string(),
            predictions,
        },
        AnalysisOutcome::NotTargetLanguage(code) => AnalyzeResponse::OtherLanguage {
            language_name: code.display_name().to_string(),
            language: code.as_str().to_string(),
        },
        AnalysisOutcome::NoPredictions => AnalyzeResponse::NoPredictions,
    }
}
