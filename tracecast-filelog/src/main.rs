//! A subscriber that renders every trace event as one line, to stdout or
//! appended to a file.

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracecast::{default_time_format, SubscriberClient, TraceEvent, TraceSink};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tracecast-filelog")]
#[command(about = "Writes relayed trace events to stdout or a file")]
struct Cli {
    /// Relay host.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Relay subscription port.
    #[arg(long, default_value_t = tracecast::DEFAULT_SUBSCRIBE_PORT)]
    port: u16,

    /// Output file to append to; stdout when absent.
    output: Option<PathBuf>,
}

enum Output {
    Stdout(tokio::io::Stdout),
    File(tokio::fs::File),
}

impl Output {
    async fn open(path: Option<&PathBuf>) -> anyhow::Result<Self> {
        match path {
            None => Ok(Output::Stdout(tokio::io::stdout())),
            Some(path) => {
                let file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await
                    .with_context(|| format!("unable to open {}", path.display()))?;
                Ok(Output::File(file))
            }
        }
    }

    async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        let data = format!("{line}\n");
        match self {
            Output::Stdout(out) => {
                out.write_all(data.as_bytes()).await?;
                out.flush().await
            }
            Output::File(file) => {
                file.write_all(data.as_bytes()).await?;
                file.flush().await
            }
        }
    }
}

struct LineSink {
    output: Mutex<Output>,
}

/// `[tag] [level] [program, pid, tid] [local time] [module/function]: message`
fn render(event: &TraceEvent) -> String {
    format!(
        "[{}] [{}] [{}, {}, {}] [{}] [{}/{}]: {}",
        event.tag,
        event.level,
        event.program,
        event.pid,
        event.tid,
        default_time_format(event),
        event.module,
        event.function,
        event.message,
    )
}

#[async_trait]
impl TraceSink for LineSink {
    async fn on_event(&self, event: TraceEvent) {
        let line = render(&event);
        if let Err(err) = self.output.lock().await.write_line(&line).await {
            warn!(err = %err, "unable to write event line");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let sink = LineSink {
        output: Mutex::new(Output::open(cli.output.as_ref()).await?),
    };

    let mut client = SubscriberClient::connect(
        (cli.host.as_str(), cli.port),
        std::sync::Arc::new(sink),
    )
    .await
    .context("unable to subscribe to relay")?;

    tokio::signal::ctrl_c()
        .await
        .context("unable to wait for interrupt")?;
    info!("interrupt received, disconnecting");
    client.disconnect();
    Ok(())
}
