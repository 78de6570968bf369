//! Property tests for the disjoint-range set.

use proptest::prelude::*;

use retrace_lineage::{ByteRange, DisjointRanges};

fn range_strategy() -> impl Strategy<Value = ByteRange> {
    (0_i64..200, 1_i64..40).prop_map(|(start, len)| ByteRange::new(start, start + len - 1))
}

/// The set invariant: sorted ascending, no overlap, no adjacency.
fn assert_invariant(set: &DisjointRanges) {
    for window in set.ranges().windows(2) {
        let (a, b) = (&window[0], &window[1]);
        assert!(a.start <= b.start, "not sorted: {a} before {b}");
        assert!(!a.overlaps(b), "overlap survived: {a} and {b}");
        assert!(!a.adjacent(b), "adjacency survived: {a} and {b}");
    }
}

proptest! {
    #[test]
    fn unions_preserve_the_disjoint_invariant(
        ranges in prop::collection::vec(range_strategy(), 0..40)
    ) {
        let mut set = DisjointRanges::new();
        for range in ranges {
            set.union(range).unwrap();
            assert_invariant(&set);
        }
    }

    #[test]
    fn coverage_never_decreases(
        ranges in prop::collection::vec(range_strategy(), 0..40)
    ) {
        let mut set = DisjointRanges::new();
        let mut covered = 0;
        for range in ranges {
            set.union(range).unwrap();
            let now = set.covered_len();
            prop_assert!(now >= covered, "coverage shrank from {covered} to {now}");
            covered = now;
        }
    }

    #[test]
    fn subsumed_union_is_idempotent(
        ranges in prop::collection::vec(range_strategy(), 1..40)
    ) {
        let mut set = DisjointRanges::new();
        for range in &ranges {
            set.union(*range).unwrap();
        }
        // Re-union a sub-range of an already-stored range: reported as
        // subsumed, set unchanged.
        let stored = set.ranges()[0];
        let before = set.clone();
        let subsumed = set.union(stored).unwrap();
        prop_assert!(subsumed);
        prop_assert_eq!(set, before);
    }
}
