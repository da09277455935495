use thiserror::Error;

use super::start_time::StartTime;
use crate::shared::constants::{DEFAULT_SLICE_SECONDS, MIN_SLICE_SECONDS};

#[derive(Error, Debug, PartialEq)]
pub enum SliceRequestError {
    #[error("duration must be at least {MIN_SLICE_SECONDS} seconds, got {0}")]
    DurationTooShort(f64),
    #[error("duration must be a finite number, got {0}")]
    DurationNotFinite(f64),
}

/// A validated slicing window: start offset plus duration in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct SliceRequest {
    start: StartTime,
    duration: f64,
}

impl SliceRequest {
    pub fn new(start: StartTime, duration: f64) -> Result<Self, SliceRequestError> {
        if !duration.is_finite() {
            return Err(SliceRequestError::DurationNotFinite(duration));
        }
        if duration < MIN_SLICE_SECONDS {
            return Err(SliceRequestError::DurationTooShort(duration));
        }
        Ok(Self { start, duration })
    }

    pub fn start(&self) -> &StartTime {
        &self.start
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

impl Default for SliceRequest {
    fn default() -> Self {
        Self {
            start: StartTime::default(),
            duration: DEFAULT_SLICE_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_minimum_duration() {
        let request = SliceRequest::new(StartTime::Seconds(0.0), 1.0).unwrap();
        assert_eq!(request.duration(), 1.0);
    }

    #[test]
    fn test_rejects_short_duration() {
        let result = SliceRequest::new(StartTime::Seconds(0.0), 0.5);
        assert_eq!(result, Err(SliceRequestError::DurationTooShort(0.5)));
    }

    #[test]
    fn test_rejects_nan_duration() {
        let result = SliceRequest::new(StartTime::Seconds(0.0), f64::NAN);
        assert!(matches!(
            result,
            Err(SliceRequestError::DurationNotFinite(_))
        ));
    }

    #[test]
    fn test_default_window() {
        let request = SliceRequest::default();
        assert_eq!(request.start(), &StartTime::Seconds(0.0));
        assert_eq!(request.duration(), DEFAULT_SLICE_SECONDS);
    }
}
