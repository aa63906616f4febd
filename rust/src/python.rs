//! Python bindings, built with the `python` feature.

use chrono::{DateTime, Utc};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::EnumerationConfig;
use crate::error::TimetableError;
use crate::interval::DateInterval;
use crate::schedule::Schedule;
use crate::timetable::Timetable;
use crate::wire::{self, WireSchema};

impl From<TimetableError> for PyErr {
    fn from(err: TimetableError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// `(start, end)` pair of aware UTC datetimes.
type PyInterval = (DateTime<Utc>, DateTime<Utc>);

fn as_tuple(interval: DateInterval) -> PyInterval {
    (interval.start(), interval.end())
}

/// Timetable wrapper exposed to Python as `Timetable`.
#[pyclass(name = "Timetable", frozen)]
#[derive(Clone, Debug)]
pub struct PyTimetable {
    inner: Timetable,
}

#[pymethods]
impl PyTimetable {
    #[new]
    #[pyo3(signature = (rate=0.0, duration=0.0))]
    fn new(rate: f64, duration: f64) -> PyResult<Self> {
        Ok(Self {
            inner: Timetable::new(rate, duration)?,
        })
    }

    /// Rate in whole seconds.
    #[getter]
    fn rate(&self) -> f64 {
        self.inner.rate_seconds() as f64
    }

    /// Duration in whole seconds.
    #[getter]
    fn duration(&self) -> f64 {
        self.inner.duration_seconds() as f64
    }

    #[getter]
    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn contains(&self, instant: DateTime<Utc>) -> bool {
        Schedule::contains(&self.inner, instant)
    }

    fn element_on(&self, instant: DateTime<Utc>) -> Option<PyInterval> {
        self.inner.element_on(instant).map(as_tuple)
    }

    fn element_first_before(&self, instant: DateTime<Utc>) -> Option<PyInterval> {
        self.inner.element_first_before(instant).map(as_tuple)
    }

    fn element_first_after(&self, instant: DateTime<Utc>) -> Option<PyInterval> {
        self.inner.element_first_after(instant).map(as_tuple)
    }

    /// Elements fully inside `[start, end]`. Runs without holding the GIL.
    #[pyo3(signature = (start, end, parallel_threshold=None))]
    fn elements_in(
        &self,
        py: Python<'_>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        parallel_threshold: Option<usize>,
    ) -> PyResult<Vec<PyInterval>> {
        let range = DateInterval::new(start, end)?;
        let mut config = EnumerationConfig::default();
        if let Some(threshold) = parallel_threshold {
            config.parallel_threshold = threshold;
        }
        let inner = self.inner;
        let elements = py.allow_threads(move || inner.elements_in_with(&range, &config))?;
        Ok(elements.into_iter().map(as_tuple).collect())
    }

    /// Encode as JSON under the `plain` or `v1` schema.
    #[pyo3(signature = (schema="plain"))]
    fn to_json(&self, schema: &str) -> PyResult<String> {
        let schema: WireSchema = schema.parse()?;
        Ok(wire::to_json_string(&self.inner, schema)?)
    }

    #[staticmethod]
    #[pyo3(signature = (payload, schema="plain"))]
    fn from_json(payload: &str, schema: &str) -> PyResult<Self> {
        let schema: WireSchema = schema.parse()?;
        Ok(Self {
            inner: wire::from_json_str(payload, schema)?,
        })
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "Timetable(rate={}, duration={})",
            self.inner.rate_seconds(),
            self.inner.duration_seconds()
        )
    }
}

/// The `interval_timetable` Python module.
#[pymodule]
fn interval_timetable(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTimetable>()?;
    Ok(())
}
