//! Calendar components measured from the reference instant.
//!
//! Timetables are pure elapsed-time quantities. Calendar components only
//! appear at the edges: the alternate constructor, the `v1` wire schema and
//! the human-readable description. Every conversion anchors the components at
//! [`reference_instant`] on the UTC calendar, so encoding and decoding are
//! exact inverses of each other.

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use std::fmt;

/// Unix timestamp of 2001-01-01T00:00:00Z.
pub const REFERENCE_UNIX_SECONDS: i64 = 978_307_200;

/// The fixed zero point all grids are aligned to.
pub fn reference_instant() -> DateTime<Utc> {
    DateTime::from_timestamp(REFERENCE_UNIX_SECONDS, 0)
        .expect("BUG: reference timestamp is within chrono's range")
}

/// Calendar units understood by the `v1` wire schema and the description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CalendarUnit {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl CalendarUnit {
    /// All units, largest first.
    pub const ALL: [CalendarUnit; 6] = [
        CalendarUnit::Years,
        CalendarUnit::Months,
        CalendarUnit::Days,
        CalendarUnit::Hours,
        CalendarUnit::Minutes,
        CalendarUnit::Seconds,
    ];

    /// Wire key of the unit.
    pub fn key(self) -> &'static str {
        match self {
            CalendarUnit::Years => "years",
            CalendarUnit::Months => "months",
            CalendarUnit::Days => "days",
            CalendarUnit::Hours => "hours",
            CalendarUnit::Minutes => "minutes",
            CalendarUnit::Seconds => "seconds",
        }
    }

    /// Parse a wire key; unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.key() == key)
    }

    fn singular(self) -> &'static str {
        match self {
            CalendarUnit::Years => "year",
            CalendarUnit::Months => "month",
            CalendarUnit::Days => "day",
            CalendarUnit::Hours => "hour",
            CalendarUnit::Minutes => "minute",
            CalendarUnit::Seconds => "second",
        }
    }
}

/// A year/month/day/hour/minute/second offset from the reference instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CalendarComponents {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl CalendarComponents {
    pub fn get(&self, unit: CalendarUnit) -> i64 {
        match unit {
            CalendarUnit::Years => self.years,
            CalendarUnit::Months => self.months,
            CalendarUnit::Days => self.days,
            CalendarUnit::Hours => self.hours,
            CalendarUnit::Minutes => self.minutes,
            CalendarUnit::Seconds => self.seconds,
        }
    }

    pub fn set(&mut self, unit: CalendarUnit, value: i64) {
        match unit {
            CalendarUnit::Years => self.years = value,
            CalendarUnit::Months => self.months = value,
            CalendarUnit::Days => self.days = value,
            CalendarUnit::Hours => self.hours = value,
            CalendarUnit::Minutes => self.minutes = value,
            CalendarUnit::Seconds => self.seconds = value,
        }
    }

    /// Apply the components to the reference instant and return the signed
    /// distance travelled.
    ///
    /// Years and months are added first (calendar-aware), then days, hours,
    /// minutes and seconds as fixed spans. Returns `None` when any step
    /// overflows the representable date range.
    pub fn resolve_from_reference(&self) -> Option<Duration> {
        let reference = reference_instant();
        let target = self.apply_to(reference)?;
        Some(target - reference)
    }

    fn apply_to(&self, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let total_months = self.years.checked_mul(12)?.checked_add(self.months)?;

        shift_months(anchor, total_months)?
            .checked_add_signed(Duration::try_days(self.days)?)?
            .checked_add_signed(Duration::try_hours(self.hours)?)?
            .checked_add_signed(Duration::try_minutes(self.minutes)?)?
            .checked_add_signed(Duration::try_seconds(self.seconds)?)
    }

    /// Decompose a non-negative elapsed time into calendar components, taking
    /// as many whole years and months as fit after the reference instant and
    /// splitting the remainder into days, hours, minutes and seconds.
    ///
    /// Sub-second parts are dropped. Returns `None` for negative spans or when
    /// the target instant is not representable.
    pub fn from_elapsed(elapsed: Duration) -> Option<Self> {
        if elapsed < Duration::zero() {
            return None;
        }
        let reference = reference_instant();
        let target = reference.checked_add_signed(elapsed)?;

        let mut total_months = i64::from(target.year() - reference.year()) * 12
            + i64::from(target.month()) - i64::from(reference.month());
        let mut anchor = shift_months(reference, total_months)?;
        while total_months > 0 && anchor > target {
            total_months -= 1;
            anchor = shift_months(reference, total_months)?;
        }

        let mut rest = (target - anchor).num_seconds();
        let days = rest / 86_400;
        rest %= 86_400;
        let hours = rest / 3_600;
        rest %= 3_600;
        let minutes = rest / 60;
        let seconds = rest % 60;

        Some(Self {
            years: total_months / 12,
            months: total_months % 12,
            days,
            hours,
            minutes,
            seconds,
        })
    }

    /// True when every component is zero.
    pub fn is_zero(&self) -> bool {
        CalendarUnit::ALL.iter().all(|&unit| self.get(unit) == 0)
    }
}

fn shift_months(anchor: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let span = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        anchor.checked_add_months(span)
    } else {
        anchor.checked_sub_months(span)
    }
}

/// Spelled-out phrase such as `1 hour, 15 minutes`; zero components are
/// dropped and an all-zero value reads `0 seconds`.
impl fmt::Display for CalendarComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        for unit in CalendarUnit::ALL {
            let value = self.get(unit);
            if value == 0 {
                continue;
            }
            if wrote {
                f.write_str(", ")?;
            }
            let suffix = if value.abs() == 1 { "" } else { "s" };
            write!(f, "{} {}{}", value, unit.singular(), suffix)?;
            wrote = true;
        }
        if !wrote {
            f.write_str("0 seconds")?;
        }
        Ok(())
    }
}
