//! Prediction server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use homeval::persist::ArtifactStore;
use homeval::serve::{router, AppState};

#[derive(Debug, Parser)]
#[command(name = "homeval-serve", about = "Serve price predictions over HTTP")]
struct Args {
    /// Directory holding the ledger and model artifacts.
    #[arg(long)]
    state_dir: PathBuf,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:5002")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let store = ArtifactStore::open(&args.state_dir)?;
    let state = Arc::new(AppState::new(store));

    if state.reload()?.is_none() {
        warn!("no trained model found; /predict returns 503 until one is trained");
    }

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(addr = %args.bind, "listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
