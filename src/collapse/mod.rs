//! Interval collapsing pipeline
//!
//! Records flow through four stages, one after the other:
//!
//! 1. [`partition`] buckets records by group key
//! 2. [`sort`] orders each bucket by start (stable)
//! 3. [`merge`] assigns segment ids with a prefix-maximum pass
//! 4. [`aggregate`] reduces each segment to `(min start, max end)`
//!
//! Stages 2-4 run per group and may fan out across the rayon pool
//! (see [`parallel`]).
//!
//! # Example
//!
//! ```rust
//! use interval_collapse::collapse::Collapser;
//! use interval_collapse::config::{CollapseConfig, ParallelConfig};
//! use interval_collapse::types::{Interval, MergedInterval};
//!
//! let collapser = Collapser::new(&CollapseConfig::default(), ParallelConfig::default()).unwrap();
//! let merged = collapser.collapse(vec![
//!     Interval::new("A", 1, 5),
//!     Interval::new("A", 5, 10),
//!     Interval::new("A", 20, 25),
//! ]);
//!
//! assert_eq!(
//!     merged,
//!     vec![MergedInterval::new("A", 1, 10), MergedInterval::new("A", 20, 25)]
//! );
//! ```

pub mod aggregate;
pub mod merge;
pub mod parallel;
pub mod partition;
pub mod sort;

use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{CollapseConfig, Config, ParallelConfig};
use crate::error::Result;
use crate::types::{Dimension, Interval, MergedInterval, TimeSpan};

use aggregate::aggregate_segments;
use merge::segment_ids;
use parallel::{run_groups, ExecutionMode};
use partition::partition;
use sort::sort_group;

/// Summary of one collapse run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseStats {
    /// Records handed to the run
    pub input_records: usize,
    /// Distinct group keys
    pub groups: usize,
    /// Merged intervals produced
    pub segments: usize,
    /// Records with `start > end` (merged anyway)
    pub malformed: usize,
}

/// Pipeline entry point holding the immutable settings of a run
#[derive(Debug, Clone)]
pub struct Collapser {
    max_gap: i64,
    dimension: Dimension,
    parallel: ParallelConfig,
}

impl Collapser {
    /// Build a collapser, validating the configuration first
    ///
    /// Any configuration problem is reported here, before a single record
    /// is looked at.
    pub fn new(config: &CollapseConfig, parallel: ParallelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            max_gap: config.max_gap,
            dimension: config.dimension,
            parallel,
        })
    }

    /// Build a collapser from a full configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(&config.collapse, config.parallel.clone())
    }

    /// Gap tolerance, in units of [`Collapser::dimension`]
    pub fn max_gap(&self) -> i64 {
        self.max_gap
    }

    /// Time granularity of this run
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Collapse keyed intervals
    pub fn collapse<K>(&self, intervals: impl IntoIterator<Item = Interval<K>>) -> Vec<MergedInterval<K>>
    where
        K: Eq + Hash + Clone + Send + Sync,
    {
        self.collapse_with_stats(intervals).0
    }

    /// Collapse keyed intervals and report run statistics
    pub fn collapse_with_stats<K>(
        &self,
        intervals: impl IntoIterator<Item = Interval<K>>,
    ) -> (Vec<MergedInterval<K>>, CollapseStats)
    where
        K: Eq + Hash + Clone + Send + Sync,
    {
        self.collapse_by(intervals, |interval| interval.key.clone())
    }

    /// Collapse arbitrary records, grouping by the key `key_fn` extracts
    ///
    /// Output lists groups in order of first appearance; within a group,
    /// merged intervals are in ascending time order.
    pub fn collapse_by<T, K, I, F>(&self, records: I, key_fn: F) -> (Vec<MergedInterval<K>>, CollapseStats)
    where
        I: IntoIterator<Item = T>,
        T: TimeSpan + Send,
        K: Eq + Hash + Clone + Send + Sync,
        F: Fn(&T) -> K,
    {
        let mut input_records = 0usize;
        let mut malformed = 0usize;
        let counted = records.into_iter().inspect(|record| {
            input_records += 1;
            if record.is_malformed() {
                malformed += 1;
            }
        });

        let groups = partition(counted, key_fn);
        let group_count = groups.len();
        let mode = ExecutionMode::choose(&self.parallel, input_records, group_count);

        if malformed > 0 {
            warn!(
                malformed,
                input_records, "Intervals with start after end merged as-is"
            );
        }

        let max_gap = self.max_gap;
        let merged: Vec<MergedInterval<K>> = run_groups(groups, mode, |key, group| {
            collapse_group(&key, group, max_gap)
        })
        .into_iter()
        .flatten()
        .collect();

        let stats = CollapseStats {
            input_records,
            groups: group_count,
            segments: merged.len(),
            malformed,
        };

        debug!(
            input_records = stats.input_records,
            groups = stats.groups,
            segments = stats.segments,
            max_gap,
            unit = self.dimension.unit(),
            ?mode,
            "Collapsed intervals"
        );

        (merged, stats)
    }
}

/// Sort, merge and aggregate one group
fn collapse_group<K: Clone, T: TimeSpan>(key: &K, mut group: Vec<T>, max_gap: i64) -> Vec<MergedInterval<K>> {
    sort_group(&mut group);
    let ids = segment_ids(&group, max_gap);
    aggregate_segments(key, &group, &ids)
}

/// Collapse keyed intervals sequentially with the given gap tolerance
///
/// Shorthand for callers that need neither field validation nor parallelism.
pub fn collapse_intervals<K>(
    intervals: impl IntoIterator<Item = Interval<K>>,
    max_gap: i64,
) -> Vec<MergedInterval<K>>
where
    K: Eq + Hash + Clone + Send + Sync,
{
    let collapser = Collapser {
        max_gap,
        dimension: Dimension::default(),
        parallel: ParallelConfig::sequential(),
    };
    collapser.collapse(intervals)
}
