use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::audio::domain::dialect_classifier::DialectClassifier;
use crate::audio::domain::language::LanguageCode;
use crate::audio::domain::language_detector::LanguageDetector;
use crate::audio::domain::prediction::Prediction;
use crate::media::domain::audio_decoder::AudioDecoder;
use crate::media::domain::segment_slicer::SegmentSlicer;
use crate::media::domain::slice_request::SliceRequest;
use crate::pipeline::analysis_logger::AnalysisLogger;
use crate::shared::constants::SLICE_SAMPLE_RATE;

/// Terminal result of one analysis request.
///
/// Wrong language and an empty prediction list are normal outcomes the
/// caller presents to the user, not errors.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisOutcome {
    /// Target-language clip with dialect scores, descending by confidence.
    DialectPredictions(Vec<Prediction>),
    /// Clip is in some other language; classification was skipped.
    NotTargetLanguage(LanguageCode),
    /// Classifier came back empty.
    NoPredictions,
}

/// The linear pipeline: slice → decode → identify language → gate on the
/// target → classify dialect.
pub struct AnalyzeSegmentUseCase {
    slicer: Arc<dyn SegmentSlicer>,
    decoder: Arc<dyn AudioDecoder>,
    detector: Arc<dyn LanguageDetector>,
    classifier: Arc<dyn DialectClassifier>,
    target: LanguageCode,
}

impl AnalyzeSegmentUseCase {
    pub fn new(
        slicer: Arc<dyn SegmentSlicer>,
        decoder: Arc<dyn AudioDecoder>,
        detector: Arc<dyn LanguageDetector>,
        classifier: Arc<dyn DialectClassifier>,
        target: LanguageCode,
    ) -> Self {
        Self {
            slicer,
            decoder,
            detector,
            classifier,
            target,
        }
    }

    pub fn run(
        &self,
        input: &Path,
        request: &SliceRequest,
        logger: &mut dyn AnalysisLogger,
    ) -> Result<AnalysisOutcome, Box<dyn std::error::Error + Send + Sync>> {
        // 1. Slice the requested window out of the input. The clip owns its
        //    temp file; dropping it at any exit below deletes the file.
        logger.stage("Slicing audio");
        let started = Instant::now();
        let clip = self.slicer.slice(input, request)?;
        logger.timing("slice", started.elapsed().as_secs_f64() * 1000.0);

        // 2. Decode once; both models consume the same samples.
        let started = Instant::now();
        let audio = self.decoder.decode(clip.path(), SLICE_SAMPLE_RATE)?;
        logger.timing("decode", started.elapsed().as_secs_f64() * 1000.0);

        // 3. Identify the spoken language.
        logger.stage("Detecting language");
        let started = Instant::now();
        let language = self.detector.detect(&audio)?;
        logger.timing("detect", started.elapsed().as_secs_f64() * 1000.0);
        logger.info(&format!(
            "Detected language: {} ({})",
            language.display_name(),
            language
        ));

        // 4. Gate: only the target language goes on to classification.
        if language != self.target {
            return Ok(AnalysisOutcome::NotTargetLanguage(language));
        }

        // 5. Score the clip against the dialect label set.
        logger.stage("Classifying dialect");
        let started = Instant::now();
        let predictions = self.classifier.classify(&audio)?;
        logger.timing("classify", started.elapsed().as_secs_f64() * 1000.0);

        if predictions.is_empty() {
            return Ok(AnalysisOutcome::NoPredictions);
        }
        logger.info(&format!("Top prediction: {}", predictions[0].label));
        Ok(AnalysisOutcome::DialectPredictions(predictions))
    }
}
