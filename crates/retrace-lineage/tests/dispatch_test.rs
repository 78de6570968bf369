//! Dispatcher tests: one strategy per collection configuration, plus the
//! fatal materialization and unbound-extension paths.

use retrace_core::models::{CollectionKind, CollectionSpec, ColumnSpec, SqlType, TupleId};
use retrace_core::traits::ITupleStore;
use retrace_lineage::dispatch::strategies::ExtensionRegistry;
use retrace_lineage::LineageResolver;
use retrace_storage::LogStore;
use test_fixtures::{log_kv_get, log_kv_response, log_kv_set, open_kv_server};

const NODE: &str = "sensor";

fn reading_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("id", SqlType::Integer),
        ColumnSpec::new("reading", SqlType::Integer),
    ]
}

/// A node with a raw collection and a derived collection resolved through
/// the edge table.
fn open_sensor_store() -> LogStore {
    let store = LogStore::open_in_memory().unwrap();
    let recorder = store.recorder();
    recorder.register_node(NODE, "127.0.0.1:9003").unwrap();
    recorder
        .register_collection(&CollectionSpec::new(
            NODE,
            "raw",
            CollectionKind::Channel,
            reading_columns(),
        ))
        .unwrap();
    recorder
        .register_collection(&CollectionSpec::new(
            NODE,
            "derived",
            CollectionKind::Table,
            reading_columns(),
        ))
        .unwrap();
    store
}

#[test]
fn edge_table_strategy_resolves_explicit_and_derived_edges() {
    let store = open_sensor_store();
    let recorder = store.recorder();
    let r1 = recorder
        .append(NODE, "raw", 1, &[1.into(), 10.into()])
        .unwrap();
    let r2 = recorder
        .append(NODE, "raw", 2, &[2.into(), 20.into()])
        .unwrap();
    let d = recorder
        .append(NODE, "derived", 5, &[3.into(), 30.into()])
        .unwrap();

    // One edge with an explicit dependency time, one without.
    recorder
        .add_networked_edge(NODE, &r2, "derived", d.hash, d.time_inserted)
        .unwrap();
    recorder
        .add_derived_edge(
            NODE,
            "raw",
            r1.hash,
            0,
            true,
            "derived",
            d.hash,
            d.time_inserted,
        )
        .unwrap();

    let resolver = LineageResolver::new();
    let lineage = resolver
        .resolve(&store, NODE, "derived", d.hash, d.time_inserted)
        .unwrap();

    assert_eq!(lineage.target.id, d);
    let ids: Vec<TupleId> = lineage.predecessors.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![r2, r1]);
    assert_eq!(lineage.predecessors[1].integer("reading").unwrap(), 10);
}

#[test]
fn retraction_edges_do_not_explain_existence() {
    let store = open_sensor_store();
    let recorder = store.recorder();
    let r1 = recorder
        .append(NODE, "raw", 1, &[1.into(), 10.into()])
        .unwrap();
    let d = recorder
        .append(NODE, "derived", 5, &[3.into(), 30.into()])
        .unwrap();
    recorder
        .add_derived_edge(
            NODE,
            "raw",
            r1.hash,
            0,
            false,
            "derived",
            d.hash,
            d.time_inserted,
        )
        .unwrap();

    let resolver = LineageResolver::new();
    let lineage = resolver
        .resolve(&store, NODE, "derived", d.hash, d.time_inserted)
        .unwrap();
    assert!(lineage.predecessors.is_empty());
}

#[test]
fn query_strategy_resolves_through_the_registered_lookup() {
    let store = open_kv_server("kv_server").unwrap();
    log_kv_set(&store, "kv_server", 1, 1, "k", "v1").unwrap();
    let s2 = log_kv_set(&store, "kv_server", 2, 2, "k", "v2").unwrap();
    log_kv_get(&store, "kv_server", 4, 10, "k").unwrap();
    let resp = log_kv_response(&store, "kv_server", 5, 10, "v2", 2).unwrap();

    let resolver = LineageResolver::new();
    let lineage = resolver
        .resolve(
            &store,
            "kv_server",
            "get_response",
            resp.hash,
            resp.time_inserted,
        )
        .unwrap();

    // Newest write first; both writes to the key are candidates.
    assert_eq!(lineage.predecessors.len(), 2);
    assert_eq!(lineage.predecessors[0].id, s2);
    assert_eq!(lineage.predecessors[0].text("value").unwrap(), "v2");
}

#[test]
fn extension_strategy_invokes_the_bound_function() {
    let store = open_sensor_store();
    let recorder = store.recorder();
    let r1 = recorder
        .append(NODE, "raw", 1, &[1.into(), 10.into()])
        .unwrap();
    let d = recorder
        .append(NODE, "derived", 5, &[3.into(), 30.into()])
        .unwrap();
    recorder
        .register_extension(NODE, "derived", "raw_by_convention")
        .unwrap();

    let mut registry = ExtensionRegistry::new();
    let expected = r1.clone();
    registry.register("raw_by_convention", move |_store, id| {
        assert_eq!(id, 3);
        Ok(vec![expected.clone()])
    });
    let resolver = LineageResolver::with_extensions(registry);

    let lineage = resolver
        .resolve(&store, NODE, "derived", d.hash, d.time_inserted)
        .unwrap();
    let ids: Vec<TupleId> = lineage.predecessors.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![r1]);
}

#[test]
fn unbound_extension_is_fatal() {
    let store = open_sensor_store();
    let recorder = store.recorder();
    let d = recorder
        .append(NODE, "derived", 5, &[3.into(), 30.into()])
        .unwrap();
    recorder
        .register_extension(NODE, "derived", "missing")
        .unwrap();

    let resolver = LineageResolver::new();
    let err = resolver
        .resolve(&store, NODE, "derived", d.hash, d.time_inserted)
        .unwrap_err();
    assert!(err.is_consistency_violation());
}

#[test]
fn predecessor_that_fails_to_materialize_is_fatal() {
    let store = open_sensor_store();
    let recorder = store.recorder();
    let d = recorder
        .append(NODE, "derived", 5, &[3.into(), 30.into()])
        .unwrap();
    recorder
        .register_extension(NODE, "derived", "phantom")
        .unwrap();

    let mut registry = ExtensionRegistry::new();
    registry.register("phantom", |_store, _id| {
        Ok(vec![TupleId::new(NODE, "raw", 999, 1)])
    });
    let resolver = LineageResolver::with_extensions(registry);

    let err = resolver
        .resolve(&store, NODE, "derived", d.hash, d.time_inserted)
        .unwrap_err();
    assert!(err.is_consistency_violation());
}

#[test]
fn missing_target_is_typed_not_found() {
    let store = open_sensor_store();
    let resolver = LineageResolver::new();
    let err = resolver.resolve(&store, NODE, "derived", 42, 5).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn target_falls_back_to_most_recent_live_insertion() {
    let store = open_sensor_store();
    let recorder = store.recorder();
    let r1 = recorder
        .append(NODE, "raw", 1, &[1.into(), 10.into()])
        .unwrap();
    let d = recorder
        .append(NODE, "derived", 5, &[3.into(), 30.into()])
        .unwrap();
    recorder
        .add_derived_edge(NODE, "raw", r1.hash, 0, true, "derived", d.hash, 5)
        .unwrap();

    // Asking as of a later time lands on the insertion at t=5.
    let resolver = LineageResolver::new();
    let lineage = resolver.resolve(&store, NODE, "derived", d.hash, 9).unwrap();
    assert_eq!(lineage.target.id, d);
    assert_eq!(lineage.predecessors.len(), 1);
}

// The store handle is shared, read-only, across independent resolutions.
#[test]
fn independent_resolutions_share_one_store() {
    let store = open_kv_server("kv_server").unwrap();
    log_kv_set(&store, "kv_server", 1, 1, "k", "v1").unwrap();
    log_kv_get(&store, "kv_server", 2, 10, "k").unwrap();
    let resp = log_kv_response(&store, "kv_server", 3, 10, "v1", 1).unwrap();

    let resolver = LineageResolver::new();
    let shared: &dyn ITupleStore = &store;
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let lineage = resolver
                    .resolve(
                        shared,
                        "kv_server",
                        "get_response",
                        resp.hash,
                        resp.time_inserted,
                    )
                    .unwrap();
                assert_eq!(lineage.predecessors.len(), 1);
            });
        }
    });
}
