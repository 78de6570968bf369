//! # retrace-eval
//!
//! Offline accuracy evaluation: for every response whose true cause was
//! recorded, predict its predecessor set with the resolver and check the
//! truth is in it. Writes two plain-text reports: a human-readable trace
//! per response, and one 1-indexed rank per line (counting from the most
//! recent candidate).

use std::io::Write;

use retrace_core::config::EvalConfig;
use retrace_core::errors::{EvalError, RetraceResult};
use retrace_core::models::{TupleRow, Value};
use retrace_core::traits::{ITupleStore, ScanQuery};
use retrace_core::RetraceError;
use retrace_lineage::LineageResolver;

/// Outcome of one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalSummary {
    /// Responses with recorded ground truth that were evaluated.
    pub evaluated: usize,
    /// 1-indexed rank of each true cause, in evaluation order.
    pub ranks: Vec<usize>,
}

impl EvalSummary {
    pub fn mean_rank(&self) -> Option<f64> {
        if self.ranks.is_empty() {
            return None;
        }
        Some(self.ranks.iter().sum::<usize>() as f64 / self.ranks.len() as f64)
    }
}

fn report_err(e: std::io::Error) -> RetraceError {
    EvalError::ReportIo {
        message: e.to_string(),
    }
    .into()
}

fn render_values(row: &TupleRow) -> String {
    let rendered: Vec<String> = row.values.iter().map(Value::to_string).collect();
    rendered.join(" ")
}

/// Evaluate every ground-truth pair under `node`.
///
/// A response whose true cause is missing from the predicted set is a hard
/// failure: the run stops there rather than skipping and continuing.
pub fn evaluate(
    store: &dyn ITupleStore,
    resolver: &LineageResolver,
    node: &str,
    config: &EvalConfig,
    debug_out: &mut dyn Write,
    data_out: &mut dyn Write,
) -> RetraceResult<EvalSummary> {
    // Oldest first so report order follows the log.
    let responses = store.scan(
        node,
        &config.response_collection,
        &ScanQuery::new().oldest_first(),
    )?;

    let mut ranks = Vec::new();
    for response in responses {
        let reply_id = response.integer(&config.reply_id_column)?;
        if reply_id == config.missing_reply_sentinel {
            continue;
        }
        let id = response.integer(&config.id_column)?;
        let value = response.require(&config.value_column)?;

        // The paired request must exist; ground truth says it does.
        let request = store.tuple_where(
            node,
            &config.request_collection,
            &[(config.id_column.clone(), Value::Integer(id))],
        )?;

        writeln!(
            debug_out,
            "{}({}) = {} [truth {}]",
            config.request_collection,
            render_values(&request),
            value,
            reply_id,
        )
        .map_err(report_err)?;

        let lineage = resolver.resolve(
            store,
            node,
            &config.response_collection,
            response.id.hash,
            response.id.time_inserted,
        )?;

        let mut candidate_ids = Vec::new();
        for candidate in lineage
            .predecessors
            .iter()
            .filter(|p| p.id.collection == config.truth_collection)
        {
            let candidate_id = candidate.integer(&config.id_column)?;
            writeln!(
                debug_out,
                "  [{}] {}({}) [{}]",
                candidate.id.time_inserted,
                candidate.id.collection,
                render_values(candidate),
                candidate_id,
            )
            .map_err(report_err)?;
            candidate_ids.push(candidate_id);
        }

        let rank = candidate_ids
            .iter()
            .position(|&c| c == reply_id)
            .ok_or_else(|| EvalError::GroundTruthMiss {
                expected: reply_id,
                response: response.id.to_string(),
            })?
            + 1;
        writeln!(data_out, "{rank}").map_err(report_err)?;
        ranks.push(rank);
    }

    tracing::info!(evaluated = ranks.len(), "lineage accuracy evaluation done");
    Ok(EvalSummary {
        evaluated: ranks.len(),
        ranks,
    })
}
