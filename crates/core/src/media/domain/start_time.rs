use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum StartTimeError {
    #[error("start time must be non-negative, got {0}")]
    Negative(f64),
    #[error("invalid start time '{0}': expected seconds or [hh:]mm:ss")]
    Invalid(String),
}

/// Start offset for a slice: plain seconds or a clock-style timestamp.
///
/// Both forms render exactly as ffmpeg's `-ss` expects.
#[derive(Clone, Debug, PartialEq)]
pub enum StartTime {
    Seconds(f64),
    Timestamp {
        hours: u32,
        minutes: u8,
        seconds: f64,
    },
}

impl StartTime {
    /// Total offset in seconds.
    pub fn as_seconds(&self) -> f64 {
        match *self {
            StartTime::Seconds(s) => s,
            StartTime::Timestamp {
                hours,
                minutes,
                seconds,
            } => hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
        }
    }
}

impl Default for StartTime {
    fn default() -> Self {
        StartTime::Seconds(0.0)
    }
}

impl FromStr for StartTime {
    type Err = StartTimeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();

        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() {
                return Err(StartTimeError::Invalid(input.to_string()));
            }
            if seconds < 0.0 {
                return Err(StartTimeError::Negative(seconds));
            }
            return Ok(StartTime::Seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [m, s] => (0u32, *m, *s),
            [h, m, s] => (
                h.parse::<u32>()
                    .map_err(|_| StartTimeError::Invalid(input.to_string()))?,
                *m,
                *s,
            ),
            _ => return Err(StartTimeError::Invalid(input.to_string())),
        };
        let minutes: u8 = minutes
            .parse()
            .map_err(|_| StartTimeError::Invalid(input.to_string()))?;
        let seconds: f64 = seconds
            .parse()
            .map_err(|_| StartTimeError::Invalid(input.to_string()))?;
        if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
            return Err(StartTimeError::Invalid(input.to_string()));
        }

        Ok(StartTime::Timestamp {
            hours,
            minutes,
            seconds,
        })
    }
}

impl fmt::Display for StartTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StartTime::Seconds(s) => f.write_str(&format_seconds(s)),
            StartTime::Timestamp {
                hours,
                minutes,
                seconds,
            } => {
                if seconds.fract() == 0.0 {
                    write!(f, "{hours:02}:{minutes:02}:{:02}", seconds as u32)
                } else {
                    write!(f, "{hours:02}:{minutes:02}:{seconds:06.3}")
                }
            }
        }
    }
}

/// Render a seconds value the way ffmpeg expects (`10.0`, not `10`).
pub fn format_seconds(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
