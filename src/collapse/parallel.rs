//! Group-parallel execution using rayon
//!
//! Groups share nothing, so per-group work is a plain fork-join: each group
//! is handed to the rayon pool, results are collected in input order. No
//! locks are needed because every group is owned by exactly one task.

use rayon::prelude::*;

use crate::config::ParallelConfig;

/// How a run maps its per-group work onto threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Every group on the calling thread
    Sequential,
    /// Groups fanned out to the rayon pool
    Parallel,
}

impl ExecutionMode {
    /// Pick a mode for a run with `records` inputs spread over `groups` groups
    pub fn choose(config: &ParallelConfig, records: usize, groups: usize) -> Self {
        if config.should_parallelize(records, groups) {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Sequential
        }
    }
}

/// Apply `work` to every `(key, group)` pair, keeping group order in the result
pub fn run_groups<K, T, R, F>(groups: Vec<(K, Vec<T>)>, mode: ExecutionMode, work: F) -> Vec<R>
where
    K: Send,
    T: Send,
    R: Send,
    F: Fn(K, Vec<T>) -> R + Send + Sync,
{
    match mode {
        ExecutionMode::Sequential => groups
            .into_iter()
            .map(|(key, group)| work(key, group))
            .collect(),
        // Vec's parallel iterator is indexed, so collect keeps input order
        ExecutionMode::Parallel => groups
            .into_par_iter()
            .map(|(key, group)| work(key, group))
            .collect(),
    }
}
