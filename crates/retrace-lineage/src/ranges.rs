//! Interval algebra over closed byte ranges, and the disjoint-range set
//! that tracks which parts of a read are already explained.

use std::fmt;

use serde::{Deserialize, Serialize};

use retrace_core::errors::{LineageError, RetraceResult};

/// Closed integer interval `[start, end]` over a file's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: i64,
    pub end: i64,
}

impl ByteRange {
    pub fn new(start: i64, end: i64) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// True unless the two ranges are strictly disjoint.
    pub fn overlaps(&self, other: &ByteRange) -> bool {
        !(other.end < self.start || other.start > self.end)
    }

    /// True when `self` fully contains `other`.
    pub fn subsumes(&self, other: &ByteRange) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// True when the ranges touch without overlapping.
    pub fn adjacent(&self, other: &ByteRange) -> bool {
        self.end + 1 == other.start || other.end + 1 == self.start
    }

    /// Covering union. Defined only for overlapping or adjacent ranges;
    /// anything else is caller misuse.
    pub fn union(&self, other: &ByteRange) -> RetraceResult<ByteRange> {
        if !self.overlaps(other) && !self.adjacent(other) {
            return Err(undefined("union", self, other));
        }
        Ok(ByteRange::new(
            self.start.min(other.start),
            self.end.max(other.end),
        ))
    }

    /// Common sub-range. Defined only for overlapping ranges.
    pub fn intersect(&self, other: &ByteRange) -> RetraceResult<ByteRange> {
        if !self.overlaps(other) {
            return Err(undefined("intersect", self, other));
        }
        Ok(ByteRange::new(
            self.start.max(other.start),
            self.end.min(other.end),
        ))
    }

    /// Number of addresses covered. A closed range always covers at least
    /// one.
    pub fn len(&self) -> i64 {
        self.end - self.start + 1
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

fn undefined(op: &'static str, left: &ByteRange, right: &ByteRange) -> retrace_core::RetraceError {
    LineageError::UndefinedIntervalOperation {
        op,
        left: left.to_string(),
        right: right.to_string(),
    }
    .into()
}

/// Incrementally maintained set of covered ranges.
///
/// Invariant: sorted ascending by start; no two stored ranges overlap or
/// touch. Adjacent ranges are merged on every insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisjointRanges {
    ranges: Vec<ByteRange>,
}

impl DisjointRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `new_range` into the set.
    ///
    /// Returns `true` when `new_range` was already fully covered by a
    /// single stored range: it added nothing, and the set is unchanged.
    pub fn union(&mut self, new_range: ByteRange) -> RetraceResult<bool> {
        let overlapping: Vec<usize> = self
            .ranges
            .iter()
            .enumerate()
            .filter(|(_, r)| r.overlaps(&new_range))
            .map(|(i, _)| i)
            .collect();

        let subsumed = match overlapping.as_slice() {
            [] => {
                self.ranges.push(new_range);
                self.ranges.sort_by_key(|r| r.start);
                false
            }
            [only] if self.ranges[*only].subsumes(&new_range) => true,
            _ => {
                let mut merged = new_range;
                for &i in &overlapping {
                    merged = merged.union(&self.ranges[i])?;
                }
                let low = overlapping[0];
                let high = overlapping[overlapping.len() - 1];
                self.ranges.splice(low..=high, [merged]);
                false
            }
        };

        self.condense();
        Ok(subsumed)
    }

    /// Merge stored ranges separated by no gap.
    fn condense(&mut self) {
        let mut condensed: Vec<ByteRange> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match condensed.last_mut() {
                Some(last) if last.end + 1 == range.start => last.end = range.end,
                _ => condensed.push(range),
            }
        }
        self.ranges = condensed;
    }

    pub fn ranges(&self) -> &[ByteRange] {
        &self.ranges
    }

    /// Total number of covered addresses.
    pub fn covered_len(&self) -> i64 {
        self.ranges.iter().map(ByteRange::len).sum()
    }

    /// True when the set is exactly the single range `r`.
    pub fn covers_exactly(&self, r: &ByteRange) -> bool {
        self.ranges.len() == 1 && self.ranges[0] == *r
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_of_disjoint_ranges_is_undefined() {
        let a = ByteRange::new(0, 4);
        let b = ByteRange::new(10, 14);
        assert!(a.union(&b).is_err());
        assert!(a.intersect(&b).is_err());
    }

    #[test]
    fn union_of_adjacent_ranges_is_defined() {
        let a = ByteRange::new(0, 4);
        let b = ByteRange::new(5, 9);
        assert_eq!(a.union(&b).unwrap(), ByteRange::new(0, 9));
        assert!(a.intersect(&b).is_err());
    }

    #[test]
    fn first_insertion_into_empty_set() {
        let mut set = DisjointRanges::new();
        assert!(!set.union(ByteRange::new(3, 7)).unwrap());
        assert_eq!(set.ranges(), &[ByteRange::new(3, 7)]);
    }

    #[test]
    fn subsumed_range_reports_and_leaves_set_unchanged() {
        let mut set = DisjointRanges::new();
        set.union(ByteRange::new(0, 9)).unwrap();
        let before = set.clone();
        assert!(set.union(ByteRange::new(2, 5)).unwrap());
        assert_eq!(set, before);
    }

    #[test]
    fn merge_across_multiple_overlaps() {
        let mut set = DisjointRanges::new();
        set.union(ByteRange::new(0, 2)).unwrap();
        set.union(ByteRange::new(4, 6)).unwrap();
        set.union(ByteRange::new(8, 10)).unwrap();
        // Bridges all three stored ranges at once.
        assert!(!set.union(ByteRange::new(1, 9)).unwrap());
        assert_eq!(set.ranges(), &[ByteRange::new(0, 10)]);
    }

    #[test]
    fn adjacent_insertions_condense() {
        let mut set = DisjointRanges::new();
        set.union(ByteRange::new(0, 4)).unwrap();
        set.union(ByteRange::new(5, 9)).unwrap();
        assert_eq!(set.ranges(), &[ByteRange::new(0, 9)]);
    }
}
