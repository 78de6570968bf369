//! Byte-range lineage tests: minimality under shadowing, completeness with
//! short-circuit, and partial coverage.

use retrace_lineage::{read_lineage, window_lineage, ByteRange, FileServerLog};
use test_fixtures::{log_file_read, log_file_write, open_file_server};

const NODE: &str = "file_server";

fn data(len: usize) -> String {
    "x".repeat(len)
}

#[test]
fn full_overwrite_shadows_earlier_writes() {
    let store = open_file_server(NODE).unwrap();
    let log = FileServerLog::new(NODE);

    log_file_write(&store, NODE, 1, 101, 0, &data(50)).unwrap();
    log_file_write(&store, NODE, 2, 102, 50, &data(50)).unwrap();
    let w3 = log_file_write(&store, NODE, 3, 103, 0, &data(100)).unwrap();
    log_file_read(&store, NODE, 4, 200, 0, 100).unwrap();

    let lineage = read_lineage(&store, &log, 200).unwrap();
    assert!(lineage.complete);
    assert_eq!(lineage.sources, vec![w3]);
}

#[test]
fn disjoint_writes_compose_newest_first() {
    let store = open_file_server(NODE).unwrap();
    let log = FileServerLog::new(NODE);

    let w1 = log_file_write(&store, NODE, 1, 101, 0, &data(50)).unwrap();
    let w2 = log_file_write(&store, NODE, 2, 102, 50, &data(50)).unwrap();
    log_file_read(&store, NODE, 4, 200, 0, 100).unwrap();

    let lineage = read_lineage(&store, &log, 200).unwrap();
    assert!(lineage.complete);
    assert_eq!(lineage.sources, vec![w2, w1]);
}

#[test]
fn partial_coverage_is_flagged_not_failed() {
    let store = open_file_server(NODE).unwrap();
    let log = FileServerLog::new(NODE);

    let w1 = log_file_write(&store, NODE, 1, 101, 0, &data(50)).unwrap();
    log_file_read(&store, NODE, 4, 200, 0, 100).unwrap();

    let lineage = read_lineage(&store, &log, 200).unwrap();
    assert!(!lineage.complete);
    assert_eq!(lineage.sources, vec![w1]);
    assert_eq!(lineage.window, Some(ByteRange::new(0, 99)));
}

#[test]
fn writes_at_or_after_the_read_are_invisible() {
    let store = open_file_server(NODE).unwrap();
    let log = FileServerLog::new(NODE);

    let w1 = log_file_write(&store, NODE, 1, 101, 0, &data(100)).unwrap();
    log_file_write(&store, NODE, 4, 102, 0, &data(100)).unwrap();
    log_file_write(&store, NODE, 9, 103, 0, &data(100)).unwrap();
    log_file_read(&store, NODE, 4, 200, 0, 100).unwrap();

    // Only strictly earlier writes explain the read; the t=4 write races
    // it and the t=9 write is in its future.
    let lineage = read_lineage(&store, &log, 200).unwrap();
    assert_eq!(lineage.sources, vec![w1]);
}

#[test]
fn overlapping_write_is_clipped_to_the_window() {
    let store = open_file_server(NODE).unwrap();
    let log = FileServerLog::new(NODE);

    // Covers [40, 139]; only [40, 99] lies inside the read window.
    let w1 = log_file_write(&store, NODE, 1, 101, 40, &data(100)).unwrap();
    log_file_read(&store, NODE, 2, 200, 0, 100).unwrap();

    let lineage = read_lineage(&store, &log, 200).unwrap();
    assert!(!lineage.complete);
    assert_eq!(lineage.sources, vec![w1]);
}

#[test]
fn shadowed_interior_write_is_excluded() {
    let store = open_file_server(NODE).unwrap();
    let log = FileServerLog::new(NODE);

    log_file_write(&store, NODE, 1, 101, 20, &data(10)).unwrap();
    let w2 = log_file_write(&store, NODE, 2, 102, 0, &data(100)).unwrap();
    log_file_read(&store, NODE, 3, 200, 0, 100).unwrap();

    // The newest write covers the whole window; the older interior write
    // is shadowed and the scan stops before reaching it.
    let lineage = read_lineage(&store, &log, 200).unwrap();
    assert!(lineage.complete);
    assert_eq!(lineage.sources, vec![w2]);
}

#[test]
fn zero_length_read_has_nothing_to_explain() {
    let store = open_file_server(NODE).unwrap();
    let log = FileServerLog::new(NODE);

    log_file_write(&store, NODE, 1, 101, 0, &data(10)).unwrap();
    log_file_read(&store, NODE, 2, 200, 5, 5).unwrap();

    let lineage = read_lineage(&store, &log, 200).unwrap();
    assert!(lineage.complete);
    assert!(lineage.sources.is_empty());
    assert_eq!(lineage.window, None);
}

#[test]
fn window_lineage_resolves_without_a_logged_read() {
    let store = open_file_server(NODE).unwrap();
    let log = FileServerLog::new(NODE);

    let w1 = log_file_write(&store, NODE, 1, 101, 0, &data(10)).unwrap();
    let lineage = window_lineage(&store, &log, ByteRange::new(0, 9), 5).unwrap();
    assert!(lineage.complete);
    assert_eq!(lineage.sources, vec![w1]);
}
