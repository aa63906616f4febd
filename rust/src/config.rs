//! Configuration types for range enumeration.

use crate::logging::VERBOSITY_SILENT;

/// Tuning for how range enumeration generates its candidates.
///
/// None of the knobs change the result, only how the work is split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumerationConfig {
    /// Candidate counts below this are generated sequentially on the current worker
    pub parallel_threshold: usize,
    /// Minimum number of candidates handed to a single rayon job
    pub min_chunk_len: usize,
    /// Logging verbosity (see `logging::VERBOSITY_*`)
    pub verbosity: u8,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 4_096,
            min_chunk_len: 1_024,
            verbosity: VERBOSITY_SILENT,
        }
    }
}

impl EnumerationConfig {
    /// A config that always fans out, regardless of candidate count.
    pub fn always_parallel() -> Self {
        Self {
            parallel_threshold: 0,
            min_chunk_len: 1,
            ..Self::default()
        }
    }

    /// A config that never fans out.
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
            ..Self::default()
        }
    }

    /// Whether `count` candidates should be generated in parallel.
    pub fn runs_parallel(&self, count: usize) -> bool {
        count >= self.parallel_threshold
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }
}
