// src/aggregate/mod.rs

//! Streaming folds over the chronological commit sequence
//!
//! Each aggregator owns its own state and sees every commit exactly once, in
//! order. None of them reads another's state, so a batch of commits can be
//! folded into all of them at the same time.

pub mod contributors;
pub mod files;
pub mod linear;
pub mod time_series;
pub mod words;

pub use contributors::ContributorAggregator;
pub use files::{ComplexityProvider, FileMetricsAggregator};
pub use linear::LinearSeriesAggregator;
pub use time_series::TimeSeriesAggregator;
pub use words::WordFrequencyAggregator;

use crate::model::CommitRecord;

pub trait Aggregator: Send {
    type Output;

    fn observe(&mut self, commit: &CommitRecord);

    fn finish(self) -> Self::Output
    where
        Self: Sized;

    fn observe_all(&mut self, commits: &[CommitRecord]) {
        for commit in commits {
            self.observe(commit);
        }
    }
}

/// Byte estimate for a line count; numstat carries no byte sizes
pub(crate) fn estimate_bytes(lines: i64, bytes_per_line: u64) -> i64 {
    lines.saturating_mul(bytes_per_line as i64)
}
