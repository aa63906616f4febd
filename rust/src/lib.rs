//! Fixed-rate interval timetables.
//!
//! A [`Timetable`] describes elements of equal `duration` starting every
//! `rate`, aligned on a shared reference instant (2001-01-01T00:00:00Z). This
//! crate answers which element covers an instant, which elements come right
//! before or after it, and which elements fall inside a date range, and it
//! encodes timetables to JSON.
//!
//! ```
//! use chrono::Duration;
//! use interval_timetable::{reference_instant, DateInterval, Timetable};
//!
//! let hourly = Timetable::new(3600.0, 900.0).unwrap();
//! let start = reference_instant();
//! let range = DateInterval::new(start, start + Duration::hours(2)).unwrap();
//!
//! let elements = hourly.elements_in(&range).unwrap();
//! assert_eq!(elements.len(), 2);
//! assert_eq!(hourly.to_string(), "Rate: 1 hour - Duration: 15 minutes");
//! ```

pub mod calendar;
mod config;
pub mod dispatch;
mod enumeration;
mod error;
mod interval;
pub mod logging;
mod schedule;
mod timetable;
pub mod wire;

#[cfg(feature = "python")]
mod python;

pub use calendar::{reference_instant, CalendarComponents, CalendarUnit};
pub use config::EnumerationConfig;
pub use dispatch::{Dispatch, Job, JobQueue, JobRunner};
pub use enumeration::EnumerationResult;
pub use error::TimetableError;
pub use interval::{DateInterval, Element};
pub use schedule::{Direction, Schedule};
pub use timetable::Timetable;
pub use wire::WireSchema;
