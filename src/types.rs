//! Core data types used throughout the collapse pipeline
//!
//! # Key Types
//!
//! - **`Interval`**: one input record (group key + start + end)
//! - **`MergedInterval`**: one output record per merged segment
//! - **`TimeSpan`**: read access to `start`/`end`, implemented by anything the
//!   sorter and merger should handle
//! - **`Dimension`**: the time granularity of a run (`date` or `timestamp`)
//!
//! # Example
//!
//! ```rust
//! use interval_collapse::types::{Dimension, Interval};
//!
//! let visit = Interval::new("ward-a", 19_000, 19_004);
//! assert_eq!(visit.duration(), Some(4));
//!
//! let dim: Dimension = "timestamp".parse().unwrap();
//! assert_eq!(dim, Dimension::Timestamp);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Anything with a canonical start and end on the time axis
pub trait TimeSpan {
    /// Canonical start (days or seconds since epoch)
    fn start(&self) -> i64;

    /// Canonical end (days or seconds since epoch)
    fn end(&self) -> i64;

    /// True when `start > end`. Such spans are still merged, never rejected.
    fn is_malformed(&self) -> bool {
        self.start() > self.end()
    }
}

/// A single input interval tagged with its group key
///
/// `start <= end` is assumed but not enforced. Both bounds are inclusive and
/// expressed in the unit of the run's [`Dimension`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval<K> {
    /// Group key; `()` means the whole input is one group
    pub key: K,

    /// Start, inclusive
    pub start: i64,

    /// End, inclusive
    pub end: i64,
}

impl<K> Interval<K> {
    /// Create a new interval
    pub fn new(key: K, start: i64, end: i64) -> Self {
        Self { key, start, end }
    }

    /// Distance from start to end, `None` on overflow
    pub fn duration(&self) -> Option<i64> {
        self.end.checked_sub(self.start)
    }
}

impl<K> TimeSpan for Interval<K> {
    fn start(&self) -> i64 {
        self.start
    }

    fn end(&self) -> i64 {
        self.end
    }
}

/// One output record: the union of a merged segment
///
/// Built fresh by the aggregator, never shares storage with the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergedInterval<K> {
    /// Group key shared by every constituent interval
    pub key: K,

    /// Minimum start over the segment
    pub start: i64,

    /// Maximum end over the segment
    pub end: i64,
}

impl<K> MergedInterval<K> {
    /// Create a new merged interval
    pub fn new(key: K, start: i64, end: i64) -> Self {
        Self { key, start, end }
    }

    /// Whether `other` lies entirely within this merged interval
    pub fn covers(&self, start: i64, end: i64) -> bool {
        start >= self.start && end <= self.end
    }
}

impl<K> TimeSpan for MergedInterval<K> {
    fn start(&self) -> i64 {
        self.start
    }

    fn end(&self) -> i64 {
        self.end
    }
}

impl<K> From<MergedInterval<K>> for Interval<K> {
    fn from(merged: MergedInterval<K>) -> Self {
        Interval::new(merged.key, merged.start, merged.end)
    }
}

/// Time granularity of a run
///
/// The dimension fixes the canonical unit of every start, end and of
/// `max_gap`:
///
/// | dimension   | unit                     | `max_gap = 1` means |
/// |-------------|--------------------------|---------------------|
/// | `date`      | days since 1970-01-01    | one day             |
/// | `timestamp` | seconds since Unix epoch | one second          |
///
/// Callers switching a job from `date` to `timestamp` must rescale their gap
/// tolerance by hand. The unit is not converted for them; doing so would
/// change merge results for existing configurations.
///
/// Deserialization goes through [`FromStr`], so TOML, environment variables
/// and CLI flags accept the same spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Dimension {
    /// Whole days
    #[default]
    Date,
    /// Seconds
    Timestamp,
}

impl Dimension {
    /// Name of the canonical unit, used in logs and `check-config` output
    pub fn unit(&self) -> &'static str {
        match self {
            Dimension::Date => "days",
            Dimension::Timestamp => "seconds",
        }
    }

    /// Lowercase name as accepted by `FromStr`
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Date => "date",
            Dimension::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Dimension::Date),
            "timestamp" => Ok(Dimension::Timestamp),
            other => Err(Error::configuration(format!(
                "unsupported dimension '{}' (expected 'date' or 'timestamp')",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Dimension {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
