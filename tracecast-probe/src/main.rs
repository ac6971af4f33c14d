//! A producer that posts a fixed burst of trace events, for exercising a
//! running relay end to end.

use clap::Parser;
use tracecast::{trace_event, Emitter, TraceLevel};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tracecast-probe")]
#[command(about = "Posts a burst of test trace events to a relay")]
struct Cli {
    /// Relay host.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Relay ingestion port.
    #[arg(long, default_value_t = tracecast::DEFAULT_INGEST_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let emitter = Emitter::connect("tracecast-probe", (cli.host.as_str(), cli.port)).await;

    trace_event!(
        emitter,
        TraceLevel::Trace,
        "tag0",
        "probe",
        "main",
        "A string ({}) and a number ({})",
        "else",
        42
    )
    .await;
    emitter
        .trace(TraceLevel::Warn, "tag1", "probe", "main", "A warning")
        .await;
    emitter
        .trace(TraceLevel::Error, "tag1", "probe", "main", "An error")
        .await;
    emitter
        .trace(TraceLevel::Debug, "tag0", "probe", "main", "Debug level logging")
        .await;
    emitter
        .trace(TraceLevel::Debug, "tag0", "probe", "main", "More debug logging")
        .await;
    emitter
        .trace(TraceLevel::Trace, "tag1", "probe", "main", "Another trace log")
        .await;

    emitter.close().await;
    Ok(())
}
