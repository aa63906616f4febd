//! Grid alignment and directional lookups.
//!
//! Every element starts at `reference + k * rate` for some integer `k`. The
//! lookups find the closest such start with a closed-form division instead of
//! walking the grid, then step one rate back or forward as needed.

use chrono::{DateTime, Duration, Utc};

use crate::calendar::reference_instant;
use crate::error::TimetableError;
use crate::interval::DateInterval;
use crate::timetable::Timetable;

pub(crate) const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Which element to match relative to an instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The element containing the instant.
    On,
    /// The closest element ending at or before the instant.
    FirstBefore,
    /// The closest element starting at or after the instant.
    FirstAfter,
}

/// A recurring schedule of date intervals.
pub trait Schedule {
    type Element;

    /// True when the schedule has no elements anywhere.
    fn is_empty(&self) -> bool;

    /// True when some element contains `instant`.
    fn contains(&self, instant: DateTime<Utc>) -> bool;

    /// The element matching `instant` in the given direction, if any.
    fn schedule_matching(
        &self,
        instant: DateTime<Utc>,
        direction: Direction,
    ) -> Option<Self::Element>;

    /// All elements lying entirely inside `range`, in ascending order.
    fn elements_in(&self, range: &DateInterval) -> Result<Vec<Self::Element>, TimetableError>;
}

pub(crate) fn total_nanos(delta: Duration) -> i128 {
    i128::from(delta.num_seconds()) * NANOS_PER_SECOND + i128::from(delta.subsec_nanos())
}

/// Integer division rounding to the nearest quotient, ties away from zero.
/// `divisor` must be positive.
fn div_round_half_away(dividend: i128, divisor: i128) -> i128 {
    let quotient = dividend / divisor;
    let remainder = dividend % divisor;
    if 2 * remainder.abs() >= divisor {
        quotient + dividend.signum()
    } else {
        quotient
    }
}

impl Timetable {
    /// Index `k` of the grid start closest to `instant`.
    ///
    /// Saturated timetables floor the quotient so an instant always maps to the
    /// element starting at or before it. Otherwise the nearest start wins,
    /// which can lie after the instant when it sits in the later half of a gap.
    pub(crate) fn grid_index(&self, instant: DateTime<Utc>) -> Option<i128> {
        if self.is_empty() {
            return None;
        }
        let distance = total_nanos(instant - reference_instant());
        let rate = i128::from(self.rate_seconds()) * NANOS_PER_SECOND;

        Some(if self.is_saturated() {
            distance.div_euclid(rate)
        } else {
            div_round_half_away(distance, rate)
        })
    }

    /// Offset from the reference instant of grid start `index`.
    fn grid_offset(&self, index: i128) -> Option<Duration> {
        let seconds = index.checked_mul(i128::from(self.rate_seconds()))?;
        Duration::try_seconds(i64::try_from(seconds).ok()?)
    }

    /// The element starting at grid index `index`.
    pub(crate) fn element_at_index(&self, index: i128) -> Option<DateInterval> {
        let start = reference_instant().checked_add_signed(self.grid_offset(index)?)?;
        DateInterval::with_duration(start, self.duration())
    }

    /// The element starting at the grid start closest to `instant`, with its
    /// grid index.
    fn lookup_candidate(&self, instant: DateTime<Utc>) -> Option<(i128, DateInterval)> {
        let index = self.grid_index(instant)?;
        Some((index, self.element_at_index(index)?))
    }

    /// Signed offset from the reference instant of the grid start closest to
    /// `instant`, or `None` for an empty timetable.
    pub fn closest_grid_offset(&self, instant: DateTime<Utc>) -> Option<Duration> {
        self.grid_offset(self.grid_index(instant)?)
    }

    /// The element containing `instant`.
    ///
    /// On a saturated timetable the end of one element is the start of the
    /// next, and the later element is returned.
    pub fn element_on(&self, instant: DateTime<Utc>) -> Option<DateInterval> {
        let (_, candidate) = self.lookup_candidate(instant)?;
        candidate.contains(instant).then_some(candidate)
    }

    /// The closest element that ends at or before `instant` and does not
    /// contain it.
    pub fn element_first_before(&self, instant: DateTime<Utc>) -> Option<DateInterval> {
        let (index, candidate) = self.lookup_candidate(instant)?;
        if candidate.contains(instant) || instant < candidate.start() {
            self.element_at_index(index - 1)
        } else {
            Some(candidate)
        }
    }

    /// The closest element that starts at or after `instant` and does not
    /// contain it.
    pub fn element_first_after(&self, instant: DateTime<Utc>) -> Option<DateInterval> {
        let (index, candidate) = self.lookup_candidate(instant)?;
        if candidate.contains(instant) || instant > candidate.end() {
            self.element_at_index(index + 1)
        } else {
            Some(candidate)
        }
    }
}

impl Schedule for Timetable {
    type Element = DateInterval;

    fn is_empty(&self) -> bool {
        Timetable::is_empty(self)
    }

    fn contains(&self, instant: DateTime<Utc>) -> bool {
        if Timetable::is_empty(self) {
            return false;
        }
        if self.is_saturated() {
            return true;
        }
        self.element_on(instant).is_some()
    }

    fn schedule_matching(&self, instant: DateTime<Utc>, direction: Direction) -> Option<DateInterval> {
        match direction {
            Direction::On => self.element_on(instant),
            Direction::FirstBefore => self.element_first_before(instant),
            Direction::FirstAfter => self.element_first_after(instant),
        }
    }

    fn elements_in(&self, range: &DateInterval) -> Result<Vec<DateInterval>, TimetableError> {
        Timetable::elements_in(self, range)
    }
}
