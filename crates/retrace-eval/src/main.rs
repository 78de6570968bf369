//! Offline lineage accuracy evaluation over a recorded log.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use retrace_core::config::EvalConfig;
use retrace_eval::evaluate;
use retrace_lineage::LineageResolver;
use retrace_storage::LogStore;

#[derive(Parser)]
#[command(name = "retrace-eval", version, about = "Cross-check resolver output against recorded ground truth")]
struct Args {
    /// Path to the recorded log database.
    #[arg(long)]
    db: PathBuf,

    /// Node whose responses are evaluated.
    #[arg(long)]
    node: String,

    #[arg(long, default_value = "get_request")]
    request_collection: String,

    #[arg(long, default_value = "get_response")]
    response_collection: String,

    /// Collection holding the writes responses are caused by.
    #[arg(long, default_value = "set_request")]
    truth_collection: String,

    /// File receiving the human-readable lineage traces.
    debug_file: PathBuf,

    /// File receiving one 1-indexed rank per evaluated response.
    data_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let store = LogStore::open(&args.db)
        .with_context(|| format!("opening log at {}", args.db.display()))?;
    let resolver = LineageResolver::new();
    let config = EvalConfig {
        request_collection: args.request_collection,
        response_collection: args.response_collection,
        truth_collection: args.truth_collection,
        ..EvalConfig::default()
    };

    let mut debug_out = BufWriter::new(
        File::create(&args.debug_file)
            .with_context(|| format!("creating {}", args.debug_file.display()))?,
    );
    let mut data_out = BufWriter::new(
        File::create(&args.data_file)
            .with_context(|| format!("creating {}", args.data_file.display()))?,
    );

    let summary = evaluate(
        &store,
        &resolver,
        &args.node,
        &config,
        &mut debug_out,
        &mut data_out,
    )?;

    println!(
        "evaluated {} responses, mean rank {}",
        summary.evaluated,
        summary
            .mean_rank()
            .map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}")),
    );
    Ok(())
}
