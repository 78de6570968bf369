//! Copy-chain lineage for an object store.
//!
//! A key's bytes come from a direct write or from a transitive chain of
//! copies; its lineage is everything on that chain plus the creation of
//! every container the chain crossed.

pub mod operations;

use std::cmp::Ordering;
use std::collections::BTreeSet;

use retrace_core::config::ResolverConfig;
use retrace_core::errors::{LineageError, RetraceResult};
use retrace_core::models::{TupleId, TupleRow, Value};
use retrace_core::traits::{ITupleStore, ScanQuery};

use crate::consistency;

/// Where one object-store server logs its traffic.
#[derive(Debug, Clone)]
pub struct ObjectStoreLog {
    pub node: String,
    /// Bucket creations: bucket.
    pub bucket_create: String,
    /// Bucket deletions: bucket.
    pub bucket_delete: String,
    /// Direct writes: bucket, key, data.
    pub direct_write: String,
    /// Key removals: bucket, key.
    pub remove: String,
    /// Listings: bucket.
    pub list: String,
    /// Listing results: the keys returned, as a JSON array.
    pub list_response: String,
    /// Whole-key reads: bucket, key.
    pub concat_read: String,
    /// Copies: src_bucket, src_key, dst_bucket, dst_key.
    pub copy: String,
}

impl ObjectStoreLog {
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            bucket_create: "create_bucket_request".to_string(),
            bucket_delete: "delete_bucket_request".to_string(),
            direct_write: "write_request".to_string(),
            remove: "remove_request".to_string(),
            list: "list_request".to_string(),
            list_response: "list_response".to_string(),
            concat_read: "read_request".to_string(),
            copy: "copy_request".to_string(),
        }
    }
}

/// Most recent matching event at or before `bound`.
///
/// A tie at the winning timestamp means a lookup expected to be unique is
/// not; that is a broken log, never an arbitrary pick.
fn latest(
    store: &dyn ITupleStore,
    node: &str,
    collection: &str,
    filters: &[(String, Value)],
    bound: i64,
) -> RetraceResult<Option<TupleRow>> {
    let mut query = ScanQuery::new().at_or_before(bound).limit(2);
    for (column, value) in filters {
        query = query.filter(column.clone(), value.clone());
    }
    let rows = store.scan(node, collection, &query)?;
    if rows.len() == 2 && rows[0].id.time_inserted == rows[1].id.time_inserted {
        return Err(consistency(format!(
            "multiple {collection} events at {} match one point lookup",
            rows[0].id.time_inserted,
        )));
    }
    Ok(rows.into_iter().next())
}

fn bucket_filters(bucket: &str) -> Vec<(String, Value)> {
    vec![("bucket".to_string(), Value::from(bucket))]
}

fn key_filters(bucket: &str, key: &str) -> Vec<(String, Value)> {
    vec![
        ("bucket".to_string(), Value::from(bucket)),
        ("key".to_string(), Value::from(key)),
    ]
}

fn copy_dst_filters(bucket: &str, key: &str) -> Vec<(String, Value)> {
    vec![
        ("dst_bucket".to_string(), Value::from(bucket)),
        ("dst_key".to_string(), Value::from(key)),
    ]
}

/// How a key's content came to be at some point in time.
enum Mechanism {
    DirectWrite(TupleRow),
    Copy(TupleRow),
}

/// The single live creation mechanism for (bucket, key) at `t`.
///
/// Exactly one of {direct write, copy} may be live at a given time. When
/// both have history, the strictly more recent one wins; an exact tie has
/// no causal answer and aborts the resolution.
fn live_mechanism(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    bucket: &str,
    key: &str,
    t: i64,
) -> RetraceResult<Mechanism> {
    let write = latest(
        store,
        &log.node,
        &log.direct_write,
        &key_filters(bucket, key),
        t,
    )?;
    let copy = latest(store, &log.node, &log.copy, &copy_dst_filters(bucket, key), t)?;

    match (write, copy) {
        (None, None) => Err(consistency(format!(
            "no creation event for {bucket}/{key} at or before {t}"
        ))),
        (Some(write), None) => Ok(Mechanism::DirectWrite(write)),
        (None, Some(copy)) => Ok(Mechanism::Copy(copy)),
        (Some(write), Some(copy)) => {
            match write.id.time_inserted.cmp(&copy.id.time_inserted) {
                Ordering::Greater => Ok(Mechanism::DirectWrite(write)),
                Ordering::Less => Ok(Mechanism::Copy(copy)),
                Ordering::Equal => Err(consistency(format!(
                    "direct write and copy for {bucket}/{key} both live at {}",
                    write.id.time_inserted,
                ))),
            }
        }
    }
}

/// Most recent creation (direct write or copy) time for (bucket, key) at
/// or before `bound`.
///
/// This bounds the next chain hop independently of the hop itself, so the
/// walk never looks past the copy that consumed the source. It is a bound,
/// not a causal pick: on a tie the time is the same either way.
pub(crate) fn creation_time(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    bucket: &str,
    key: &str,
    bound: i64,
) -> RetraceResult<i64> {
    let write = latest(
        store,
        &log.node,
        &log.direct_write,
        &key_filters(bucket, key),
        bound,
    )?;
    let copy = latest(
        store,
        &log.node,
        &log.copy,
        &copy_dst_filters(bucket, key),
        bound,
    )?;
    match (write, copy) {
        (None, None) => Err(consistency(format!(
            "no creation event for {bucket}/{key} at or before {bound}"
        ))),
        (Some(row), None) | (None, Some(row)) => Ok(row.id.time_inserted),
        (Some(write), Some(copy)) => Ok(write.id.time_inserted.max(copy.id.time_inserted)),
    }
}

/// Full causal explanation of (bucket, key)'s content as of `time`.
pub fn file_lineage(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    bucket: &str,
    key: &str,
    time: i64,
) -> RetraceResult<BTreeSet<TupleId>> {
    file_lineage_with(store, log, bucket, key, time, &ResolverConfig::default())
}

/// [`file_lineage`] with an explicit resolver configuration.
///
/// The chain is walked with an explicit worklist rather than call
/// recursion. Bound times strictly decrease hop over hop in a well-formed
/// log, which structurally prevents cycles; the depth cap turns a broken
/// log into an error instead of a hang.
pub fn file_lineage_with(
    store: &dyn ITupleStore,
    log: &ObjectStoreLog,
    bucket: &str,
    key: &str,
    time: i64,
    config: &ResolverConfig,
) -> RetraceResult<BTreeSet<TupleId>> {
    let mut lineage = BTreeSet::new();
    let mut pending: Vec<(String, String, i64)> =
        vec![(bucket.to_string(), key.to_string(), time)];
    let mut steps = 0usize;

    while let Some((bucket, key, t)) = pending.pop() {
        steps += 1;
        if steps > config.max_chain_depth {
            return Err(LineageError::ChainDepthExceeded {
                max_depth: config.max_chain_depth,
            }
            .into());
        }

        let created = latest(
            store,
            &log.node,
            &log.bucket_create,
            &bucket_filters(&bucket),
            t,
        )?
        .ok_or_else(|| consistency(format!("no bucket creation for {bucket} at or before {t}")))?;
        lineage.insert(created.id);

        match live_mechanism(store, log, &bucket, &key, t)? {
            Mechanism::DirectWrite(write) => {
                lineage.insert(write.id);
            }
            Mechanism::Copy(copy) => {
                let src_bucket = copy.text("src_bucket")?.to_string();
                let src_key = copy.text("src_key")?.to_string();
                let copy_time = copy.id.time_inserted;
                lineage.insert(copy.id);

                let src_time = creation_time(store, log, &src_bucket, &src_key, copy_time)?;
                tracing::debug!(
                    src_bucket = %src_bucket,
                    src_key = %src_key,
                    src_time,
                    "following copy chain"
                );
                pending.push((src_bucket, src_key, src_time));
            }
        }
    }

    Ok(lineage)
}
