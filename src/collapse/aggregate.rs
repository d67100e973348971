//! Aggregator: reduce each `(key, segment)` partition to one merged interval

use crate::types::{MergedInterval, TimeSpan};

/// Running bounds of one segment
#[derive(Debug, Clone, Copy)]
struct SegmentBounds {
    start: i64,
    end: i64,
}

impl SegmentBounds {
    fn new<T: TimeSpan>(span: &T) -> Self {
        Self {
            start: span.start(),
            end: span.end(),
        }
    }

    fn update<T: TimeSpan>(&mut self, span: &T) {
        self.start = self.start.min(span.start());
        self.end = self.end.max(span.end());
    }
}

/// Collapse one group's spans into one merged interval per segment id
///
/// `spans` and `segment_ids` are parallel slices. Output is in ascending
/// segment id order, which for merger output is ascending time. Ids that
/// never occur produce no record.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn aggregate_segments<K, T>(key: &K, spans: &[T], segment_ids: &[usize]) -> Vec<MergedInterval<K>>
where
    K: Clone,
    T: TimeSpan,
{
    assert_eq!(
        spans.len(),
        segment_ids.len(),
        "every span needs exactly one segment id"
    );

    let segment_count = segment_ids.iter().max().map_or(0, |&last| last + 1);
    let mut bounds: Vec<Option<SegmentBounds>> = vec![None; segment_count];

    for (span, &segment) in spans.iter().zip(segment_ids) {
        if let Some(b) = bounds[segment].as_mut() {
            b.update(span);
        } else {
            bounds[segment] = Some(SegmentBounds::new(span));
        }
    }

    bounds
        .into_iter()
        .flatten()
        .map(|b| MergedInterval::new(key.clone(), b.start, b.end))
        .collect()
}
