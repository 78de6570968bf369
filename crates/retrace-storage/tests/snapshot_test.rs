//! Tests for retrace-storage: validity windows, exactly-one lookups,
//! time-bounded scans, catalog, edges, and registered queries.

use retrace_core::models::{
    CollectionKind, CollectionSpec, ColumnSpec, LineageSpec, SqlType, Value,
};
use retrace_core::traits::{ITupleStore, ScanQuery};
use retrace_storage::LogStore;

fn spec(node: &str, name: &str) -> CollectionSpec {
    CollectionSpec::new(
        node,
        name,
        CollectionKind::Table,
        vec![
            ColumnSpec::new("id", SqlType::Integer),
            ColumnSpec::new("payload", SqlType::Text),
        ],
    )
}

fn open_store(node: &str) -> LogStore {
    let store = LogStore::open_in_memory().unwrap();
    store.recorder().register_node(node, "127.0.0.1:9000").unwrap();
    store
        .recorder()
        .register_collection(&spec(node, "events"))
        .unwrap();
    store
}

#[test]
fn append_then_point_lookup() {
    let store = open_store("n");
    let id = store
        .recorder()
        .append("n", "events", 5, &[1.into(), "hello".into()])
        .unwrap();

    let row = store.tuple_at("n", "events", id.hash, 5).unwrap();
    assert_eq!(row.id, id);
    assert_eq!(row.integer("id").unwrap(), 1);
    assert_eq!(row.text("payload").unwrap(), "hello");
    assert_eq!(row.time_deleted, None);
}

#[test]
fn missing_identity_is_typed_not_found() {
    let store = open_store("n");
    let err = store.tuple_at("n", "events", 42, 5).unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_consistency_violation());
}

#[test]
fn non_unique_point_lookup_is_ambiguous() {
    let store = open_store("n");
    store
        .recorder()
        .append("n", "events", 1, &[7.into(), "a".into()])
        .unwrap();
    store
        .recorder()
        .append("n", "events", 2, &[7.into(), "b".into()])
        .unwrap();

    let err = store
        .tuple_where("n", "events", &[("id".to_string(), Value::Integer(7))])
        .unwrap_err();
    assert!(err.is_consistency_violation());
}

#[test]
fn tombstone_closes_the_window() {
    let store = open_store("n");
    let id = store
        .recorder()
        .append("n", "events", 5, &[1.into(), "x".into()])
        .unwrap();
    store.recorder().retract("n", "events", id.hash, 9).unwrap();

    let live_at = |t: i64| {
        store
            .scan("n", "events", &ScanQuery::new().live_at(t))
            .unwrap()
            .len()
    };
    assert_eq!(live_at(4), 0);
    assert_eq!(live_at(5), 1);
    assert_eq!(live_at(8), 1);
    assert_eq!(live_at(9), 0);

    let row = store.tuple_at("n", "events", id.hash, 5).unwrap();
    assert_eq!(row.time_deleted, Some(9));
    assert!(row.physical_time_deleted.is_some());
}

#[test]
fn instantaneous_event_visible_only_at_its_tick() {
    let store = open_store("n");
    store
        .recorder()
        .append_event("n", "events", 7, &[1.into(), "ping".into()])
        .unwrap();

    let live_at = |t: i64| {
        store
            .scan("n", "events", &ScanQuery::new().live_at(t))
            .unwrap()
            .len()
    };
    assert_eq!(live_at(6), 0);
    assert_eq!(live_at(7), 1);
    assert_eq!(live_at(8), 0);
}

#[test]
fn scan_bounds_order_and_limit() {
    let store = open_store("n");
    for t in 1..=5 {
        store
            .recorder()
            .append("n", "events", t, &[t.into(), format!("p{t}").into()])
            .unwrap();
    }

    let before = store
        .scan("n", "events", &ScanQuery::new().before(4))
        .unwrap();
    let times: Vec<i64> = before.iter().map(|r| r.id.time_inserted).collect();
    assert_eq!(times, vec![3, 2, 1]);

    let at_or_before = store
        .scan("n", "events", &ScanQuery::new().at_or_before(4).oldest_first())
        .unwrap();
    let times: Vec<i64> = at_or_before.iter().map(|r| r.id.time_inserted).collect();
    assert_eq!(times, vec![1, 2, 3, 4]);

    let top = store
        .scan("n", "events", &ScanQuery::new().limit(2))
        .unwrap();
    let times: Vec<i64> = top.iter().map(|r| r.id.time_inserted).collect();
    assert_eq!(times, vec![5, 4]);
}

#[test]
fn scan_filters_on_declared_columns_only() {
    let store = open_store("n");
    store
        .recorder()
        .append("n", "events", 1, &[1.into(), "keep".into()])
        .unwrap();
    store
        .recorder()
        .append("n", "events", 2, &[2.into(), "drop".into()])
        .unwrap();

    let matching = store
        .scan("n", "events", &ScanQuery::new().filter("payload", "keep"))
        .unwrap();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].integer("id").unwrap(), 1);

    let err = store
        .scan("n", "events", &ScanQuery::new().filter("nope", 1))
        .unwrap_err();
    assert!(!err.is_not_found());
}

#[test]
fn catalog_roundtrip_and_unknown_collection() {
    let store = open_store("n");
    let fetched = store.collection("n", "events").unwrap();
    assert_eq!(fetched, spec("n", "events"));
    assert_eq!(fetched.lineage, LineageSpec::Regular);

    let err = store.collection("n", "ghost").unwrap_err();
    assert!(matches!(
        err,
        retrace_core::RetraceError::Storage(
            retrace_core::errors::StorageError::UnknownCollection { .. }
        )
    ));
}

#[test]
fn reserved_collection_name_rejected() {
    let store = open_store("n");
    let err = store
        .recorder()
        .register_collection(&spec("n", "lineage"))
        .unwrap_err();
    assert!(err.to_string().contains("reserved"));
}

#[test]
fn arity_mismatch_rejected() {
    let store = open_store("n");
    let err = store
        .recorder()
        .append("n", "events", 1, &[1.into()])
        .unwrap_err();
    assert!(err.to_string().contains("arity"));
}

#[test]
fn edges_roundtrip() {
    let store = open_store("n");
    let dep = store
        .recorder()
        .append("n", "events", 1, &[1.into(), "src".into()])
        .unwrap();

    store
        .recorder()
        .add_networked_edge("n", &dep, "events", 99, 5)
        .unwrap();
    store
        .recorder()
        .add_derived_edge("n", "events", dep.hash, 0, true, "events", 99, 5)
        .unwrap();

    let edges = store.edges_for("n", "events", 99, 5).unwrap();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0].dep_time, Some(1));
    assert_eq!(edges[1].dep_time, None);
    assert_eq!(edges[1].rule_number, Some(0));
    assert!(edges.iter().all(|e| e.inserted));
}

#[test]
fn registered_query_returns_identities() {
    let store = open_store("n");
    let dep = store
        .recorder()
        .append("n", "events", 3, &[8.into(), "cause".into()])
        .unwrap();
    store
        .recorder()
        .register_lineage_query(
            "n",
            "events",
            "events_lineage",
            "SELECT 'n', 'events', hash, time_inserted FROM n_events WHERE id = ?1",
        )
        .unwrap();

    let spec = store.collection("n", "events").unwrap();
    assert_eq!(
        spec.lineage,
        LineageSpec::Query {
            name: "events_lineage".to_string()
        }
    );

    let ids = store.run_lineage_query("n", "events", 8).unwrap();
    assert_eq!(ids, vec![dep]);
}

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.db");

    {
        let store = LogStore::open(&path).unwrap();
        store.recorder().register_node("n", "127.0.0.1:9000").unwrap();
        store
            .recorder()
            .register_collection(&spec("n", "events"))
            .unwrap();
        store
            .recorder()
            .append("n", "events", 1, &[1.into(), "durable".into()])
            .unwrap();
    }

    let reopened = LogStore::open(&path).unwrap();
    let rows = reopened.scan("n", "events", &ScanQuery::new()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text("payload").unwrap(), "durable");
}
