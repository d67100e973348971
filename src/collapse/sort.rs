//! GroupSorter: stable start-ascending order within one group

use crate::types::TimeSpan;

/// Sort one group's spans by start, ascending
///
/// The sort is stable: spans with equal starts keep their arrival order, so
/// merging the same input always walks the same sequence.
pub fn sort_group<T: TimeSpan>(group: &mut [T]) {
    group.sort_by_key(|span| span.start());
}

/// Whether `group` is already in start-ascending order
pub fn is_start_sorted<T: TimeSpan>(group: &[T]) -> bool {
    group.windows(2).all(|w| w[0].start() <= w[1].start())
}
