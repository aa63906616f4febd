//! Error types for timetable construction, decoding and enumeration.

use chrono::{DateTime, Utc};

/// Errors produced by this crate.
///
/// All variants are terminal: they describe invalid input or a broken
/// invariant, never a transient condition worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimetableError {
    /// The normalized duration is wider than the normalized rate.
    #[error("duration ({duration}s) exceeds rate ({rate}s)")]
    DurationExceedsRate { rate: i64, duration: i64 },

    /// Calendar components could not be resolved to an instant from the reference date.
    #[error("calendar components cannot be resolved from the reference instant")]
    InvalidComponents,

    /// The start of a range could not be aligned onto the grid.
    #[error("failed to calculate schedule dates for the requested range")]
    DateCalculation,

    /// A seconds value is NaN, infinite, or too large to place elements
    /// around the reference instant.
    #[error("interval value is not representable: {0}")]
    UnrepresentableInterval(String),

    /// An interval was built with its end before its start.
    #[error("interval end {end} precedes start {start}")]
    InvertedInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A wire payload or schema name could not be decoded.
    #[error("malformed timetable payload: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for TimetableError {
    fn from(err: serde_json::Error) -> Self {
        TimetableError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = TimetableError::DurationExceedsRate {
            rate: 60,
            duration: 120,
        };
        assert_eq!(err.to_string(), "duration (120s) exceeds rate (60s)");
        assert_eq!(
            TimetableError::Decode("missing field `rate`".to_string()).to_string(),
            "malformed timetable payload: missing field `rate`"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            TimetableError::from(err),
            TimetableError::Decode(_)
        ));
    }
}
