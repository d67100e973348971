//! Interval collapse - merge grouped time intervals with a gap tolerance
//!
//! This library collapses intervals that share a group key into the minimal
//! set of merged intervals per group:
//! - Stable start-ascending order within each group
//! - A single prefix-maximum pass to detect gaps
//! - One output record per merged segment: `(min start, max end)`
//! - Optional group-parallel execution on rayon
//! - Date and timestamp normalization for JSON rows
//!
//! # Units
//!
//! Times are canonical `i64` values whose unit depends on the run's
//! [`Dimension`]: days for `date`, seconds for `timestamp`. The gap tolerance
//! uses the same unit, so `max_gap = 1` means one day or one second.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

/// Configuration management with TOML support
pub mod config;

/// Partition, sort, merge and aggregate stages
pub mod collapse;

/// Date and timestamp normalization
pub mod normalize;

/// JSON row surface
pub mod table;

// Re-export main types
pub use collapse::{collapse_intervals, CollapseStats, Collapser};
pub use config::{CollapseConfig, Config, ParallelConfig};
pub use error::{Error, Result};
pub use types::{Dimension, Interval, MergedInterval, TimeSpan};
