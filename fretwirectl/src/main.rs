//! Operations CLI for the Fretwire transcription pipeline.

mod cli;
mod commands;
mod render;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; explicit flags and env win anyway.
    let _ = dotenvy::dotenv();
    let args = cli::Cli::parse();

    init_tracing();

    commands::run(args).await
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Quiet default; override via RUST_LOG.
                    "info,reqwest=warn,hyper=warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
