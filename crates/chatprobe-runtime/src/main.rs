//! chatprobe: demo runner for the streaming-response test probe.
//! Streams a simulated chat response through the quiescence detector and
//! latency scope, then optionally asserts semantic equivalence against an
//! expected answer with the ONNX backend.

use clap::Parser;

mod cli;
mod demo;
mod sim;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("CHATPROBE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let code = demo::run(args).await?;
    std::process::exit(code);
}
