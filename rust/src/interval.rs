//! Closed date interval used for schedule elements and query ranges.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::error::TimetableError;

/// A closed interval `[start, end]` on the UTC timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// An element of a timetable: an interval whose start lies on the grid.
pub type Element = DateInterval;

impl DateInterval {
    /// Create an interval, rejecting an end that precedes the start.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimetableError> {
        if end < start {
            return Err(TimetableError::InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create `[start, start + duration]`.
    ///
    /// Returns `None` when `duration` is negative or the end overflows the
    /// representable date range.
    pub fn with_duration(start: DateTime<Utc>, duration: Duration) -> Option<Self> {
        if duration < Duration::zero() {
            return None;
        }
        let end = start.checked_add_signed(duration)?;
        Some(Self { start, end })
    }

    #[inline]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Elapsed time between start and end.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Closed containment: `start <= instant <= end`.
    #[inline]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// True when `other` lies entirely within this interval.
    #[inline]
    pub fn encloses(&self, other: &DateInterval) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_bounds() {
        let err = DateInterval::new(at(10), at(5)).unwrap_err();
        assert_eq!(
            err,
            TimetableError::InvertedInterval {
                start: at(10),
                end: at(5)
            }
        );
        assert!(DateInterval::new(at(5), at(5)).is_ok());
    }

    #[test]
    fn test_contains_is_closed() {
        let interval = DateInterval::new(at(0), at(60)).unwrap();
        assert!(interval.contains(at(0)));
        assert!(interval.contains(at(30)));
        assert!(interval.contains(at(60)));
        assert!(!interval.contains(at(61)));
        assert!(!interval.contains(at(-1)));
    }

    #[test]
    fn test_with_duration() {
        let interval = DateInterval::with_duration(at(100), Duration::seconds(50)).unwrap();
        assert_eq!(interval.start(), at(100));
        assert_eq!(interval.end(), at(150));
        assert_eq!(interval.duration(), Duration::seconds(50));
        assert!(DateInterval::with_duration(at(100), Duration::seconds(-1)).is_none());
        assert!(DateInterval::with_duration(DateTime::<Utc>::MAX_UTC, Duration::seconds(1)).is_none());
    }

    #[test]
    fn test_encloses() {
        let outer = DateInterval::new(at(0), at(100)).unwrap();
        assert!(outer.encloses(&DateInterval::new(at(0), at(100)).unwrap()));
        assert!(outer.encloses(&DateInterval::new(at(10), at(20)).unwrap()));
        assert!(!outer.encloses(&DateInterval::new(at(90), at(101)).unwrap()));
    }
}
