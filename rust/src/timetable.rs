//! The timetable value type and its validated constructors.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::{reference_instant, CalendarComponents};
use crate::error::TimetableError;

/// A schedule whose elements last `duration` and start every `rate`,
/// aligned on the reference instant.
///
/// Both values are whole seconds and `duration <= rate` always holds. Given a
/// rate of one hour and a duration of fifteen minutes, there is a fifteen
/// minute element starting at every hour before and after the reference
/// instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    try_from = "crate::wire::PlainTimetable",
    into = "crate::wire::PlainTimetable"
)]
pub struct Timetable {
    rate: Duration,
    duration: Duration,
}

impl Timetable {
    /// Build a timetable from seconds.
    ///
    /// Both values are made absolute and truncated toward zero, so precision is
    /// one second.
    ///
    /// # Errors
    /// * `DurationExceedsRate` if the truncated duration is wider than the truncated rate
    /// * `UnrepresentableInterval` for NaN or infinite values, and for rates
    ///   whose neighbouring elements fall outside the representable dates
    pub fn new(rate_secs: f64, duration_secs: f64) -> Result<Self, TimetableError> {
        let rate = whole_seconds(rate_secs)?;
        let duration = whole_seconds(duration_secs)?;
        Self::validated(rate, duration)
    }

    /// Build a timetable from `chrono` durations, discarding sub-second parts.
    pub fn from_durations(rate: Duration, duration: Duration) -> Result<Self, TimetableError> {
        Self::validated(truncate(rate), truncate(duration))
    }

    /// The empty timetable: no elements anywhere.
    pub fn empty() -> Self {
        Self {
            rate: Duration::zero(),
            duration: Duration::zero(),
        }
    }

    /// Build a timetable from two calendar offsets measured from the
    /// reference instant.
    ///
    /// # Errors
    /// * `InvalidComponents` if either offset cannot be resolved
    /// * `DurationExceedsRate` if the resolved duration is wider than the resolved rate
    pub fn from_calendar_components(
        rate: &CalendarComponents,
        duration: &CalendarComponents,
    ) -> Result<Self, TimetableError> {
        let (rate, duration) = Self::valid_rate_and_duration(rate, duration)?;
        Ok(Self { rate, duration })
    }

    /// Resolve two calendar offsets into a validated `(rate, duration)` pair.
    pub fn valid_rate_and_duration(
        rate: &CalendarComponents,
        duration: &CalendarComponents,
    ) -> Result<(Duration, Duration), TimetableError> {
        let rate = rate
            .resolve_from_reference()
            .ok_or(TimetableError::InvalidComponents)?;
        let duration = duration
            .resolve_from_reference()
            .ok_or(TimetableError::InvalidComponents)?;
        let checked = Self::validated(truncate(rate), truncate(duration))?;
        Ok((checked.rate, checked.duration))
    }

    fn validated(rate: Duration, duration: Duration) -> Result<Self, TimetableError> {
        if duration > rate {
            return Err(TimetableError::DurationExceedsRate {
                rate: rate.num_seconds(),
                duration: duration.num_seconds(),
            });
        }
        // The elements either side of the reference instant must be dates.
        let reference = reference_instant();
        let reachable = reference.checked_sub_signed(rate).is_some()
            && reference
                .checked_add_signed(rate)
                .and_then(|next| next.checked_add_signed(duration))
                .is_some();
        if !reachable {
            return Err(TimetableError::UnrepresentableInterval(format!(
                "{}s",
                rate.num_seconds()
            )));
        }
        Ok(Self { rate, duration })
    }

    /// Period between successive element starts.
    #[inline]
    pub fn rate(&self) -> Duration {
        self.rate
    }

    /// Length of every element.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    pub fn rate_seconds(&self) -> i64 {
        self.rate.num_seconds()
    }

    #[inline]
    pub fn duration_seconds(&self) -> i64 {
        self.duration.num_seconds()
    }

    /// True when the timetable has no elements.
    ///
    /// Zero-length elements are never produced, so a zero duration counts as
    /// empty even when the rate is positive.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.duration.is_zero()
    }

    /// True when elements tile the whole timeline (`rate == duration > 0`).
    #[inline]
    pub fn is_saturated(&self) -> bool {
        !self.is_empty() && self.rate == self.duration
    }
}

impl Default for Timetable {
    fn default() -> Self {
        Self::empty()
    }
}

fn whole_seconds(value: f64) -> Result<Duration, TimetableError> {
    if !value.is_finite() {
        return Err(TimetableError::UnrepresentableInterval(value.to_string()));
    }
    // Saturating cast; anything that large is rejected by try_seconds.
    let truncated = value.trunc().abs() as i64;
    Duration::try_seconds(truncated)
        .ok_or_else(|| TimetableError::UnrepresentableInterval(value.to_string()))
}

fn truncate(value: Duration) -> Duration {
    Duration::seconds(value.num_seconds().abs())
}

fn write_phrase(f: &mut fmt::Formatter<'_>, value: Duration) -> fmt::Result {
    match CalendarComponents::from_elapsed(value) {
        Some(components) => write!(f, "{}", components),
        None => write!(f, "{} seconds", value.num_seconds()),
    }
}

/// `Rate: 1 hour - Duration: 15 minutes`
impl fmt::Display for Timetable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rate: ")?;
        write_phrase(f, self.rate)?;
        f.write_str(" - Duration: ")?;
        write_phrase(f, self.duration)
    }
}
