//! Partitioner: bucket records by group key
//!
//! Buckets come back in order of first appearance of their key, and records
//! inside a bucket keep their arrival order. Nothing is reordered here; the
//! sorter relies on arrival order to break ties on equal starts.

use std::collections::HashMap;
use std::hash::Hash;

/// Bucket `records` by the key `key_fn` extracts from each one
///
/// Returns `(key, records)` pairs in order of first appearance. Empty input
/// yields an empty vector.
pub fn partition<T, K, I, F>(records: I, key_fn: F) -> Vec<(K, Vec<T>)>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();

    for record in records {
        let key = key_fn(&record);
        match slots.get(&key) {
            Some(&slot) => groups[slot].1.push(record),
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push((key, vec![record]));
            },
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Interval;

    #[test]
    fn test_empty_input() {
        let groups = partition(Vec::<Interval<&str>>::new(), |iv| iv.key);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_first_appearance_order() {
        let input = vec![
            Interval::new("b", 5, 6),
            Interval::new("a", 1, 2),
            Interval::new("b", 1, 2),
            Interval::new("c", 0, 0),
            Interval::new("a", 9, 9),
        ];

        let groups = partition(input, |iv| iv.key);
        let keys: Vec<&str> = groups.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_arrival_order_within_group() {
        let input = vec![
            Interval::new("a", 30, 31),
            Interval::new("b", 0, 1),
            Interval::new("a", 10, 11),
            Interval::new("a", 20, 21),
        ];

        let groups = partition(input, |iv| iv.key);
        let starts: Vec<i64> = groups[0].1.iter().map(|iv| iv.start).collect();
        assert_eq!(starts, vec![30, 10, 20]);
        assert_eq!(groups[1].1.len(), 1);
    }

    #[test]
    fn test_unit_key_is_single_group() {
        let input = vec![Interval::new((), 3, 4), Interval::new((), 1, 2)];
        let groups = partition(input, |iv| iv.key);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_composite_keys() {
        let input = vec![
            Interval::new(("p1", 1), 0, 1),
            Interval::new(("p1", 2), 0, 1),
            Interval::new(("p1", 1), 5, 6),
        ];
        let groups = partition(input, |iv| iv.key);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, ("p1", 1));
        assert_eq!(groups[0].1.len(), 2);
    }
}
