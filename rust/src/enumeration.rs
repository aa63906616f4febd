//! Range enumeration.
//!
//! Ranges that can hold at most one element are answered with two lookups.
//! Wider ranges align their start once, compute how many grid starts can fall
//! before the range end, and generate every candidate independently from its
//! index, which lets rayon split the index range across workers. Candidates
//! are collected back in index order, so the result is always ascending.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::sync::Arc;

use crate::config::EnumerationConfig;
use crate::dispatch::Dispatch;
use crate::error::TimetableError;
use crate::interval::DateInterval;
use crate::schedule::{total_nanos, NANOS_PER_SECOND};
use crate::timetable::Timetable;
use crate::{log_changes, log_checks, log_debug};

/// Result delivered by range enumeration.
pub type EnumerationResult = Result<Vec<DateInterval>, TimetableError>;

impl Timetable {
    /// All elements lying entirely inside `range`, in ascending order.
    ///
    /// # Errors
    /// * `DateCalculation` if the range start cannot be aligned onto the grid
    pub fn elements_in(&self, range: &DateInterval) -> EnumerationResult {
        self.elements_in_with(range, &EnumerationConfig::default())
    }

    /// Same as [`Timetable::elements_in`] with explicit tuning.
    pub fn elements_in_with(
        &self,
        range: &DateInterval,
        config: &EnumerationConfig,
    ) -> EnumerationResult {
        let verbosity = config.verbosity;
        if self.is_empty() {
            return Ok(Vec::new());
        }

        if range.duration() == self.duration() || range.duration() <= self.rate() {
            log_checks!(verbosity, "elements_in: single-candidate path for {}", range);
            return Ok(self.single_element_in(range).into_iter().collect());
        }

        let first_start = self.first_start_in(range)?;
        let count = self.candidate_count(first_start, range.end())?;
        log_checks!(
            verbosity,
            "elements_in: {} candidates from {} for {}",
            count,
            first_start.to_rfc3339(),
            range
        );

        let rate = self.rate_seconds();
        let duration = self.duration();
        let range_end = range.end();
        let candidate = |index: usize| -> Option<DateInterval> {
            let offset = i64::try_from(index).ok()?.checked_mul(rate)?;
            let start = first_start.checked_add_signed(chrono::Duration::try_seconds(offset)?)?;
            // An overflowing candidate lies past any representable range end.
            let element = DateInterval::with_duration(start, duration)?;
            (element.start() < range_end && element.end() <= range_end).then_some(element)
        };

        let elements: Vec<DateInterval> = if config.runs_parallel(count) {
            log_debug!(
                verbosity,
                "elements_in: fanning out with min chunk {}",
                config.min_chunk_len
            );
            (0..count)
                .into_par_iter()
                .with_min_len(config.min_chunk_len.max(1))
                .filter_map(candidate)
                .collect()
        } else {
            (0..count).filter_map(candidate).collect()
        };

        log_changes!(verbosity, "elements_in: {} elements in {}", elements.len(), range);
        Ok(elements)
    }

    /// The only element that can fit a range no wider than the rate.
    fn single_element_in(&self, range: &DateInterval) -> Option<DateInterval> {
        self.element_on(range.start())
            .filter(|element| range.encloses(element))
            .or_else(|| {
                self.element_first_after(range.start())
                    .filter(|element| range.encloses(element))
            })
    }

    /// The first grid start at or after the range start.
    fn first_start_in(&self, range: &DateInterval) -> Result<DateTime<Utc>, TimetableError> {
        self.element_on(range.start())
            .map(|element| element.start())
            .filter(|start| *start >= range.start())
            .or_else(|| {
                self.element_first_after(range.start())
                    .map(|element| element.start())
            })
            .ok_or(TimetableError::DateCalculation)
    }

    /// Number of grid starts from `first_start` up to `end`, plus one.
    ///
    /// The extra candidate absorbs any phase offset between the last grid start
    /// and `end`; it is dropped by the containment filter when it does not fit.
    fn candidate_count(
        &self,
        first_start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<usize, TimetableError> {
        let distance = total_nanos(end - first_start);
        let rate = i128::from(self.rate_seconds()) * NANOS_PER_SECOND;
        let count = distance.div_euclid(rate) + 1;
        if count <= 0 {
            return Ok(0);
        }
        usize::try_from(count).map_err(|_| TimetableError::DateCalculation)
    }

    /// Enumerate `range` on a rayon worker and hand the result to `completion`.
    ///
    /// `completion` runs exactly once: through `queue` when one is given,
    /// otherwise directly on the worker that computed the result.
    pub fn schedule_in<F>(&self, range: DateInterval, queue: Option<Arc<dyn Dispatch>>, completion: F)
    where
        F: FnOnce(EnumerationResult) + Send + 'static,
    {
        self.schedule_in_with(range, EnumerationConfig::default(), queue, completion);
    }

    /// Same as [`Timetable::schedule_in`] with explicit tuning.
    pub fn schedule_in_with<F>(
        &self,
        range: DateInterval,
        config: EnumerationConfig,
        queue: Option<Arc<dyn Dispatch>>,
        completion: F,
    ) where
        F: FnOnce(EnumerationResult) + Send + 'static,
    {
        let timetable = *self;
        rayon::spawn(move || {
            let result = timetable.elements_in_with(&range, &config);
            if let Err(err) = &result {
                log_changes!(config.verbosity, "schedule_in: {} failed: {}", range, err);
            }
            match queue {
                Some(queue) => queue.dispatch(Box::new(move || completion(result))),
                None => completion(result),
            }
        });
    }
}
