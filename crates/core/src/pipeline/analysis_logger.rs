use std::time::Instant;

/// Cross-cutting observer for analysis pipeline events.
///
/// Decouples the use case from specific output mechanisms (stdout, HTTP
/// request span, nothing at all) so each caller can watch the pipeline
/// without changing the orchestration code.
pub trait AnalysisLogger: Send {
    /// A named pipeline stage is starting.
    fn stage(&mut self, name: &str);

    /// Record how long a named stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-analysis summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events. Used by the HTTP surface
/// (which has its own request tracing) and by tests.
pub struct NullAnalysisLogger;

impl AnalysisLogger for NullAnalysisLogger {
    fn stage(&mut self, _name: &str) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger: forwards events to the `log` facade and keeps
/// per-stage timings for a completion summary.
pub struct StdoutAnalysisLogger {
    timings: Vec<(String, f64)>,
    start_time: Instant,
}

impl StdoutAnalysisLogger {
    pub fn new() -> Self {
        Self {
            timings: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!("Analysis summary ({elapsed:.1}s total):")];
        for (stage, ms) in &self.timings {
            lines.push(format!("  {stage:10}: {ms:7.0}ms"));
        }
        Some(lines.join("\n"))
    }
}

impl Default for StdoutAnalysisLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisLogger for StdoutAnalysisLogger {
    fn stage(&mut self, name: &str) {
        log::info!("{name}...");
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings.push((stage.to_string(), duration_ms));
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
