use anyhow::Result;
use clap::Parser;
use hostfit::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing based on RUST_LOG env var; stdout is reserved for prompts
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    Cli::parse().execute().await
}
