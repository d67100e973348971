//! GapMerger: assign every span of a sorted group to a merged segment
//!
//! One forward pass over a start-sorted group. For each position `i` the
//! merger keeps the prefix maximum of all ends strictly before `i` (the
//! "high-water mark"). A span opens a new segment only when it starts beyond
//! that mark plus the gap tolerance:
//!
//! ```text
//! is_gap[0]   = false
//! is_gap[i]   = prior_max[i] + max_gap < start[i]
//! segment[i]  = segment[i - 1] + is_gap[i]
//! ```
//!
//! The first span has no predecessor, so its prior maximum is defined as its
//! own end. A short span nested inside an earlier long one never lowers the
//! mark, so it cannot split the run it sits in.
//!
//! # Example
//!
//! ```rust
//! use interval_collapse::collapse::merge::segment_ids;
//! use interval_collapse::types::Interval;
//!
//! let sorted = vec![
//!     Interval::new((), 1, 5),
//!     Interval::new((), 5, 10),
//!     Interval::new((), 20, 25),
//! ];
//! assert_eq!(segment_ids(&sorted, 0), vec![0, 0, 1]);
//! assert_eq!(segment_ids(&sorted, 10), vec![0, 0, 0]);
//! ```

use super::sort::is_start_sorted;
use crate::types::TimeSpan;

/// Whether a span starting at `start` opens a new segment after `prior_max`
///
/// A distance of exactly `max_gap` still merges. The addition saturates so
/// extreme gaps or ends cannot wrap around.
#[inline]
pub fn is_gap(prior_max: i64, start: i64, max_gap: i64) -> bool {
    prior_max.saturating_add(max_gap) < start
}

/// Prefix maximum of ends strictly before each position
///
/// Position 0 takes its own end as the base case. Empty input yields an
/// empty vector.
pub fn prior_max_ends<T: TimeSpan>(sorted: &[T]) -> Vec<i64> {
    let Some(first) = sorted.first() else {
        return Vec::new();
    };

    let mut prior = Vec::with_capacity(sorted.len());
    let mut high_water = first.end();
    prior.push(high_water);

    for span in &sorted[..sorted.len() - 1] {
        high_water = high_water.max(span.end());
        prior.push(high_water);
    }

    prior
}

/// Segment id of every span in a start-sorted group
///
/// Ids start at 0 and grow by one at each gap, so spans sharing an id form
/// one merged run. The caller must pass spans sorted by start.
pub fn segment_ids<T: TimeSpan>(sorted: &[T], max_gap: i64) -> Vec<usize> {
    debug_assert!(is_start_sorted(sorted), "segment_ids needs start-sorted spans");

    let prior = prior_max_ends(sorted);
    let mut segment = 0usize;

    sorted
        .iter()
        .zip(prior)
        .enumerate()
        .map(|(i, (span, prior_max))| {
            if i > 0 && is_gap(prior_max, span.start(), max_gap) {
                segment += 1;
            }
            segment
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Interval;

    fn spans(bounds: &[(i64, i64)]) -> Vec<Interval<()>> {
        bounds.iter().map(|&(s, e)| Interval::new((), s, e)).collect()
    }

    #[test]
    fn test_gap_boundary_is_inclusive() {
        // distance of exactly max_gap merges
        assert!(!is_gap(10, 12, 2));
        assert!(is_gap(10, 13, 2));
        // touching intervals merge at gap 0
        assert!(!is_gap(5, 5, 0));
        assert!(is_gap(5, 6, 0));
    }

    #[test]
    fn test_negative_gap_requires_overlap() {
        assert!(is_gap(10, 10, -1));
        assert!(!is_gap(10, 9, -1));
    }

    #[test]
    fn test_saturating_gap() {
        assert!(!is_gap(i64::MAX - 1, i64::MAX, i64::MAX));
        assert!(is_gap(i64::MIN, 0, i64::MIN));
    }

    #[test]
    fn test_basic_split() {
        let sorted = spans(&[(1, 5), (5, 10), (20, 25)]);
        assert_eq!(segment_ids(&sorted, 0), vec![0, 0, 1]);
    }

    #[test]
    fn test_large_gap_merges_all() {
        let sorted = spans(&[(1, 5), (5, 10), (20, 25)]);
        assert_eq!(segment_ids(&sorted, 10), vec![0, 0, 0]);
        assert_eq!(segment_ids(&sorted, 9), vec![0, 0, 1]);
    }

    #[test]
    fn test_adjacent_days_need_gap_of_one() {
        let sorted = spans(&[(1, 5), (6, 10)]);
        assert_eq!(segment_ids(&sorted, 0), vec![0, 1]);
        assert_eq!(segment_ids(&sorted, 1), vec![0, 0]);
    }

    #[test]
    fn test_nested_interval_does_not_lower_high_water() {
        // [12,13] sits inside [10,30]; [25,26] must still join the first run
        let sorted = spans(&[(10, 30), (12, 13), (25, 26), (40, 41)]);
        assert_eq!(prior_max_ends(&sorted), vec![30, 30, 30, 30]);
        assert_eq!(segment_ids(&sorted, 0), vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_prior_max_is_strict_prefix() {
        let sorted = spans(&[(1, 4), (2, 9), (3, 5), (20, 21)]);
        assert_eq!(prior_max_ends(&sorted), vec![4, 4, 9, 9]);
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(segment_ids(&spans(&[(3, 3)]), 0), vec![0]);
        assert_eq!(prior_max_ends(&spans(&[(3, 3)])), vec![3]);
        assert!(segment_ids(&spans(&[]), 0).is_empty());
        assert!(prior_max_ends(&spans(&[])).is_empty());
    }

    #[test]
    fn test_every_gap_increments() {
        let sorted = spans(&[(0, 0), (2, 2), (4, 4), (6, 6)]);
        assert_eq!(segment_ids(&sorted, 0), vec![0, 1, 2, 3]);
        assert_eq!(segment_ids(&sorted, 2), vec![0, 0, 0, 0]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "start-sorted")]
    fn test_unsorted_input_is_caught_in_debug() {
        segment_ids(&spans(&[(20, 25), (1, 5)]), 0);
    }

    #[test]
    fn test_malformed_span_uses_its_end() {
        // start > end is not rejected; its end still feeds the high-water mark
        let sorted = spans(&[(1, 10), (5, 2), (11, 12)]);
        assert_eq!(segment_ids(&sorted, 0), vec![0, 0, 1]);
    }
}
