//! Lineage of each logged object-store operation, built on
//! [`file_lineage`](super::file_lineage).
//!
//! Result shape follows the operation: the operation's own event first,
//! then its causal sources as a deduplicated, order-independent set.

use std::collections::BTreeSet;

use rayon::prelude::*;

use retrace_core::config::ResolverConfig;
use retrace_core::errors::RetraceResult;
use retrace_core::models::{TupleId, TupleRow, Value};
use retrace_core::traits::ITupleStore;

use super::{bucket_filters, creation_time, file_lineage_with, latest, ObjectStoreLog};
use crate::consistency;

fn op_row(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    collection: &str,
    request_id: i64,
) -> RetraceResult<TupleRow> {
    store.tuple_where(
        &log.node,
        collection,
        &[("id".to_string(), Value::Integer(request_id))],
    )
}

/// The bucket-creation event at or before `t`, fatal if absent.
fn bucket_creation(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    bucket: &str,
    t: i64,
) -> RetraceResult<TupleRow> {
    latest(
        store,
        &log.node,
        &log.bucket_create,
        &bucket_filters(bucket),
        t,
    )?
    .ok_or_else(|| consistency(format!("no bucket creation for {bucket} at or before {t}")))
}

/// Creating a bucket depends on nothing earlier.
pub fn bucket_create_lineage(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    request_id: i64,
) -> RetraceResult<Vec<TupleId>> {
    let op = op_row(store, log, &log.bucket_create, request_id)?;
    Ok(vec![op.id])
}

/// Deleting a bucket depends on the bucket having been created.
pub fn bucket_delete_lineage(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    request_id: i64,
) -> RetraceResult<Vec<TupleId>> {
    let op = op_row(store, log, &log.bucket_delete, request_id)?;
    let bucket = op.text("bucket")?.to_string();
    let created = bucket_creation(store, log, &bucket, op.id.time_inserted)?;
    Ok(vec![op.id, created.id])
}

/// A direct write lands in an existing bucket.
pub fn direct_write_lineage(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    request_id: i64,
) -> RetraceResult<Vec<TupleId>> {
    let op = op_row(store, log, &log.direct_write, request_id)?;
    let bucket = op.text("bucket")?.to_string();
    let created = bucket_creation(store, log, &bucket, op.id.time_inserted)?;
    Ok(vec![op.id, created.id])
}

/// Removing a key depends on everything that explains the bytes being
/// removed, at the key's pre-removal state.
pub fn remove_lineage(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    request_id: i64,
    config: &ResolverConfig,
) -> RetraceResult<Vec<TupleId>> {
    op_with_file_lineage(store, log, &log.remove, request_id, config)
}

/// Reading a key back depends on everything that explains its bytes.
pub fn concat_read_lineage(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    request_id: i64,
    config: &ResolverConfig,
) -> RetraceResult<Vec<TupleId>> {
    op_with_file_lineage(store, log, &log.concat_read, request_id, config)
}

fn op_with_file_lineage(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    collection: &str,
    request_id: i64,
    config: &ResolverConfig,
) -> RetraceResult<Vec<TupleId>> {
    let op = op_row(store, log, collection, request_id)?;
    let bucket = op.text("bucket")?.to_string();
    let key = op.text("key")?.to_string();
    let bound = creation_time(store, log, &bucket, &key, op.id.time_inserted)?;
    let sources = file_lineage_with(store, log, &bucket, &key, bound, config)?;

    let mut out = vec![op.id];
    out.extend(sources);
    Ok(out)
}

/// A copy's destination is explained by its source's full history.
pub fn copy_lineage(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    request_id: i64,
    config: &ResolverConfig,
) -> RetraceResult<Vec<TupleId>> {
    let op = op_row(store, log, &log.copy, request_id)?;
    let src_bucket = op.text("src_bucket")?.to_string();
    let src_key = op.text("src_key")?.to_string();
    let bound = creation_time(store, log, &src_bucket, &src_key, op.id.time_inserted)?;
    let sources = file_lineage_with(store, log, &src_bucket, &src_key, bound, config)?;

    let mut out = vec![op.id];
    out.extend(sources);
    Ok(out)
}

/// A listing depends on the lineage of every key it returned.
///
/// Per-key sub-resolutions are independent and read-only, so they run on
/// the rayon pool when configured.
pub fn list_lineage(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    request_id: i64,
    config: &ResolverConfig,
) -> RetraceResult<Vec<TupleId>> {
    let op = op_row(store, log, &log.list, request_id)?;
    let bucket = op.text("bucket")?.to_string();
    let response = op_row(store, log, &log.list_response, request_id)?;
    let keys: Vec<String> = serde_json::from_str(response.text("keys")?)
        .map_err(|e| consistency(format!("unparseable listing payload: {e}")))?;

    let resolve_key = |key: &String| -> RetraceResult<BTreeSet<TupleId>> {
        let bound = creation_time(store, log, &bucket, key, op.id.time_inserted)?;
        file_lineage_with(store, log, &bucket, key, bound, config)
    };

    let per_key: Vec<BTreeSet<TupleId>> = if config.parallel_listing {
        keys.par_iter().map(resolve_key).collect::<RetraceResult<_>>()?
    } else {
        keys.iter().map(resolve_key).collect::<RetraceResult<_>>()?
    };

    let mut sources = BTreeSet::new();
    for set in per_key {
        sources.extend(set);
    }
    let mut out = vec![op.id];
    out.extend(sources);
    Ok(out)
}
