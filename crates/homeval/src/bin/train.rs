//! Training entry point: one incremental pass over the data directory.
//!
//! Exits nonzero when the pass fails (fit or persistence errors); a failed
//! run leaves the previous artifacts untouched.

use std::path::PathBuf;

use clap::Parser;

use homeval::training::{IncrementalTrainer, RunOutcome, TrainConfig};

#[derive(Debug, Parser)]
#[command(name = "homeval-train", about = "Run one incremental training pass")]
struct Args {
    /// Directory holding incoming CSV data files.
    #[arg(long)]
    data_dir: PathBuf,

    /// Directory holding the ledger and model artifacts.
    #[arg(long)]
    state_dir: PathBuf,

    /// Holdout fraction for evaluation; 0 disables the split.
    #[arg(long, default_value_t = 0.2)]
    valid_fraction: f64,

    /// Seed for the deterministic holdout shuffle.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let mut config = TrainConfig::new(&args.data_dir, &args.state_dir);
    config.valid_fraction = args.valid_fraction;
    config.seed = args.seed;

    match IncrementalTrainer::new(config).run()? {
        RunOutcome::NoNewData { skipped_files: 0 } => {
            println!("No new data files; artifacts unchanged.");
        }
        RunOutcome::NoNewData { skipped_files } => {
            println!("No usable rows in the delta ({skipped_files} files skipped).");
        }
        RunOutcome::Trained(report) => {
            println!(
                "Ingested {} files ({} rows, {} rows skipped, {} files skipped).",
                report.ingested_files.len(),
                report.n_rows_delta,
                report.skipped_rows,
                report.skipped_files,
            );
            println!(
                "Model update #{} on {} cumulative rows.",
                report.n_updates, report.n_rows_total,
            );
            let scope = if report.holdout { "holdout" } else { "in-sample" };
            println!("Evaluation ({scope}): {}", report.metrics);
        }
    }

    Ok(())
}
