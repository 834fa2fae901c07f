//! Time primitives
//!
//! Instants are UTC `chrono` timestamps. Upload payloads carry ISO-8601
//! strings; both offset-qualified (RFC 3339) and naive forms are accepted,
//! naive ones being read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

pub type Instant = DateTime<Utc>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParseError {
    pub input: String,
}

impl std::fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not an ISO-8601 timestamp: {:?}", self.input)
    }
}

impl std::error::Error for TimeParseError {}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse_instant(input: &str) -> Result<Instant, TimeParseError> {
    let trimmed = input.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(t.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(t.and_utc());
        }
    }
    Err(TimeParseError {
        input: input.to_string(),
    })
}

/// Closed interval `[start, end]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: Instant,
    pub end: Instant,
}

impl TimeSpan {
    pub fn new(start: Instant, end: Instant) -> Self {
        Self { start, end }
    }

    /// Seconds; zero for inverted spans.
    pub fn duration_s(&self) -> f64 {
        let ms = (self.end - self.start).num_milliseconds().max(0);
        ms as f64 / 1000.0
    }
}
