//! Evaluator tests: rank reporting against recorded ground truth, the
//! sentinel skip, and the fail-fast miss.

use retrace_core::config::EvalConfig;
use retrace_core::errors::{EvalError, RetraceError};
use retrace_eval::evaluate;
use retrace_lineage::LineageResolver;
use test_fixtures::{log_kv_get, log_kv_response, log_kv_set, open_kv_server};

const NODE: &str = "kv_server";

#[test]
fn true_cause_is_ranked_from_most_recent() {
    let store = open_kv_server(NODE).unwrap();
    log_kv_set(&store, NODE, 1, 1, "k", "v1").unwrap();
    log_kv_set(&store, NODE, 2, 2, "k", "v2").unwrap();
    log_kv_set(&store, NODE, 3, 3, "other", "x").unwrap();

    // The fresh read is caused by the newest write (rank 1); the stale
    // read observed the older write (rank 2).
    log_kv_get(&store, NODE, 4, 10, "k").unwrap();
    log_kv_response(&store, NODE, 5, 10, "v2", 2).unwrap();
    log_kv_get(&store, NODE, 6, 11, "k").unwrap();
    log_kv_response(&store, NODE, 7, 11, "v1", 1).unwrap();

    let mut debug_out = Vec::new();
    let mut data_out = Vec::new();
    let summary = evaluate(
        &store,
        &LineageResolver::new(),
        NODE,
        &EvalConfig::default(),
        &mut debug_out,
        &mut data_out,
    )
    .unwrap();

    assert_eq!(summary.evaluated, 2);
    assert_eq!(summary.ranks, vec![1, 2]);
    assert_eq!(String::from_utf8(data_out).unwrap(), "1\n2\n");

    let trace = String::from_utf8(debug_out).unwrap();
    assert!(trace.contains("get_request(10 k) = v2 [truth 2]"));
    assert!(trace.contains("set_request(2 k v2) [2]"));
    assert!(trace.contains("set_request(1 k v1) [1]"));
}

#[test]
fn responses_without_ground_truth_are_skipped() {
    let store = open_kv_server(NODE).unwrap();
    log_kv_set(&store, NODE, 1, 1, "k", "v1").unwrap();
    log_kv_get(&store, NODE, 2, 10, "missing").unwrap();
    log_kv_response(&store, NODE, 3, 10, "", -1).unwrap();

    let mut debug_out = Vec::new();
    let mut data_out = Vec::new();
    let summary = evaluate(
        &store,
        &LineageResolver::new(),
        NODE,
        &EvalConfig::default(),
        &mut debug_out,
        &mut data_out,
    )
    .unwrap();

    assert_eq!(summary.evaluated, 0);
    assert!(data_out.is_empty());
    assert!(debug_out.is_empty());
}

#[test]
fn absent_true_cause_fails_fast() {
    let store = open_kv_server(NODE).unwrap();
    log_kv_set(&store, NODE, 1, 1, "k", "v1").unwrap();
    log_kv_get(&store, NODE, 2, 10, "k").unwrap();
    // Claims a causing write the predicted set cannot contain.
    log_kv_response(&store, NODE, 3, 10, "v1", 99).unwrap();

    let mut debug_out = Vec::new();
    let mut data_out = Vec::new();
    let err = evaluate(
        &store,
        &LineageResolver::new(),
        NODE,
        &EvalConfig::default(),
        &mut debug_out,
        &mut data_out,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        RetraceError::Eval(EvalError::GroundTruthMiss { expected: 99, .. })
    ));
    // No rank was emitted for the failing response.
    assert!(data_out.is_empty());
}

#[test]
fn mean_rank_summarizes_the_run() {
    let store = open_kv_server(NODE).unwrap();
    log_kv_set(&store, NODE, 1, 1, "k", "v1").unwrap();
    log_kv_set(&store, NODE, 2, 2, "k", "v2").unwrap();
    log_kv_get(&store, NODE, 3, 10, "k").unwrap();
    log_kv_response(&store, NODE, 4, 10, "v1", 1).unwrap();

    let mut debug_out = Vec::new();
    let mut data_out = Vec::new();
    let summary = evaluate(
        &store,
        &LineageResolver::new(),
        NODE,
        &EvalConfig::default(),
        &mut debug_out,
        &mut data_out,
    )
    .unwrap();
    assert_eq!(summary.mean_rank(), Some(2.0));
}
