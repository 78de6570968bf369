//! Seeded store scenarios shared by tests across the workspace.
//!
//! Three logged systems: a byte-addressed file server, a bucket/key object
//! store, and a key-value server with ground-truth reply links. Builders
//! register the collections; `log_*` helpers append the traffic a test
//! needs, returning the appended identity.

use retrace_core::errors::RetraceResult;
use retrace_core::models::{CollectionKind, CollectionSpec, ColumnSpec, SqlType, TupleId};
use retrace_storage::LogStore;

fn channel(node: &str, name: &str, columns: Vec<ColumnSpec>) -> CollectionSpec {
    CollectionSpec::new(node, name, CollectionKind::Channel, columns)
}

fn int(name: &str) -> ColumnSpec {
    ColumnSpec::new(name, SqlType::Integer)
}

fn text(name: &str) -> ColumnSpec {
    ColumnSpec::new(name, SqlType::Text)
}

// ---------------------------------------------------------------------------
// File server: byte-range reads and writes over one file's address space.
// ---------------------------------------------------------------------------

pub fn open_file_server(node: &str) -> RetraceResult<LogStore> {
    let store = LogStore::open_in_memory()?;
    let recorder = store.recorder();
    recorder.register_node(node, "127.0.0.1:9000")?;
    recorder.register_collection(&channel(
        node,
        "read_request",
        vec![int("id"), int("start"), int("stop")],
    ))?;
    recorder.register_collection(&channel(
        node,
        "write_request",
        vec![int("id"), int("start"), text("data")],
    ))?;
    Ok(store)
}

pub fn log_file_write(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    start: i64,
    data: &str,
) -> RetraceResult<TupleId> {
    store.recorder().append_event(
        node,
        "write_request",
        time,
        &[id.into(), start.into(), data.into()],
    )
}

pub fn log_file_read(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    start: i64,
    stop: i64,
) -> RetraceResult<TupleId> {
    store.recorder().append_event(
        node,
        "read_request",
        time,
        &[id.into(), start.into(), stop.into()],
    )
}

// ---------------------------------------------------------------------------
// Object store: buckets, keys, copies.
// ---------------------------------------------------------------------------

pub fn open_object_store(node: &str) -> RetraceResult<LogStore> {
    let store = LogStore::open_in_memory()?;
    let recorder = store.recorder();
    recorder.register_node(node, "127.0.0.1:9001")?;
    recorder.register_collection(&channel(
        node,
        "create_bucket_request",
        vec![int("id"), text("bucket")],
    ))?;
    recorder.register_collection(&channel(
        node,
        "delete_bucket_request",
        vec![int("id"), text("bucket")],
    ))?;
    recorder.register_collection(&channel(
        node,
        "write_request",
        vec![int("id"), text("bucket"), text("key"), text("data")],
    ))?;
    recorder.register_collection(&channel(
        node,
        "remove_request",
        vec![int("id"), text("bucket"), text("key")],
    ))?;
    recorder.register_collection(&channel(
        node,
        "list_request",
        vec![int("id"), text("bucket")],
    ))?;
    recorder.register_collection(&channel(
        node,
        "list_response",
        vec![int("id"), text("keys")],
    ))?;
    recorder.register_collection(&channel(
        node,
        "read_request",
        vec![int("id"), text("bucket"), text("key")],
    ))?;
    recorder.register_collection(&channel(
        node,
        "copy_request",
        vec![
            int("id"),
            text("src_bucket"),
            text("src_key"),
            text("dst_bucket"),
            text("dst_key"),
        ],
    ))?;
    Ok(store)
}

pub fn log_bucket_create(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    bucket: &str,
) -> RetraceResult<TupleId> {
    store
        .recorder()
        .append_event(node, "create_bucket_request", time, &[id.into(), bucket.into()])
}

pub fn log_bucket_delete(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    bucket: &str,
) -> RetraceResult<TupleId> {
    store
        .recorder()
        .append_event(node, "delete_bucket_request", time, &[id.into(), bucket.into()])
}

pub fn log_object_write(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    bucket: &str,
    key: &str,
    data: &str,
) -> RetraceResult<TupleId> {
    store.recorder().append_event(
        node,
        "write_request",
        time,
        &[id.into(), bucket.into(), key.into(), data.into()],
    )
}

pub fn log_object_remove(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    bucket: &str,
    key: &str,
) -> RetraceResult<TupleId> {
    store.recorder().append_event(
        node,
        "remove_request",
        time,
        &[id.into(), bucket.into(), key.into()],
    )
}

pub fn log_object_list(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    bucket: &str,
    keys: &[&str],
) -> RetraceResult<(TupleId, TupleId)> {
    let request = store
        .recorder()
        .append_event(node, "list_request", time, &[id.into(), bucket.into()])?;
    let payload = serde_json::to_string(keys).expect("string array encodes");
    let response = store
        .recorder()
        .append_event(node, "list_response", time, &[id.into(), payload.into()])?;
    Ok((request, response))
}

pub fn log_object_read(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    bucket: &str,
    key: &str,
) -> RetraceResult<TupleId> {
    store.recorder().append_event(
        node,
        "read_request",
        time,
        &[id.into(), bucket.into(), key.into()],
    )
}

#[allow(clippy::too_many_arguments)]
pub fn log_object_copy(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    src_bucket: &str,
    src_key: &str,
    dst_bucket: &str,
    dst_key: &str,
) -> RetraceResult<TupleId> {
    store.recorder().append_event(
        node,
        "copy_request",
        time,
        &[
            id.into(),
            src_bucket.into(),
            src_key.into(),
            dst_bucket.into(),
            dst_key.into(),
        ],
    )
}

// ---------------------------------------------------------------------------
// Key-value server with ground-truth reply links, resolved through a
// registered lineage query.
// ---------------------------------------------------------------------------

pub fn open_kv_server(node: &str) -> RetraceResult<LogStore> {
    let store = LogStore::open_in_memory()?;
    let recorder = store.recorder();
    recorder.register_node(node, "127.0.0.1:9002")?;
    recorder.register_collection(&channel(
        node,
        "set_request",
        vec![int("id"), text("key"), text("value")],
    ))?;
    recorder.register_collection(&channel(
        node,
        "get_request",
        vec![int("id"), text("key")],
    ))?;
    recorder.register_collection(&channel(
        node,
        "get_response",
        vec![int("id"), text("value"), int("reply_id")],
    ))?;
    // Predecessors of a response: every earlier write to the key the
    // paired request asked for, newest first.
    let sql = format!(
        "SELECT '{node}', 'set_request', s.hash, s.time_inserted
         FROM {node}_set_request s
         JOIN {node}_get_response r ON r.id = ?1
         JOIN {node}_get_request q ON q.id = r.id
         WHERE s.key = q.key AND s.time_inserted < r.time_inserted
         ORDER BY s.time_inserted DESC"
    );
    recorder.register_lineage_query(node, "get_response", "get_response_lineage", &sql)?;
    Ok(store)
}

pub fn log_kv_set(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    key: &str,
    value: &str,
) -> RetraceResult<TupleId> {
    store.recorder().append_event(
        node,
        "set_request",
        time,
        &[id.into(), key.into(), value.into()],
    )
}

pub fn log_kv_get(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    key: &str,
) -> RetraceResult<TupleId> {
    store
        .recorder()
        .append_event(node, "get_request", time, &[id.into(), key.into()])
}

pub fn log_kv_response(
    store: &LogStore,
    node: &str,
    time: i64,
    id: i64,
    value: &str,
    reply_id: i64,
) -> RetraceResult<TupleId> {
    store.recorder().append_event(
        node,
        "get_response",
        time,
        &[id.into(), value.into(), reply_id.into()],
    )
}
