//! The tracecast relay daemon: accepts emitter traffic on the ingestion
//! endpoint and fans every line out to the subscription endpoint.

use anyhow::Context;
use clap::Parser;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracecast::{Relay, RelayConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tracecastd")]
#[command(about = "Broadcast relay for tracecast trace events")]
struct Cli {
    /// Optional JSON5 config file; CLI flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address both endpoints bind on.
    #[arg(long)]
    bind: Option<IpAddr>,

    /// Port accepting emitter (producer) connections.
    #[arg(long)]
    ingest_port: Option<u16>,

    /// Port accepting subscriber connections.
    #[arg(long)]
    subscribe_port: Option<u16>,

    /// Per-subscriber forwarding-queue depth.
    #[arg(long)]
    queue_depth: Option<usize>,
}

fn load_config(cli: &Cli) -> anyhow::Result<RelayConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config_file(path)?,
        None => RelayConfig::default(),
    };

    if let Some(bind) = cli.bind {
        config.ingest_addr.set_ip(bind);
        config.subscribe_addr.set_ip(bind);
    }
    if let Some(port) = cli.ingest_port {
        config.ingest_addr.set_port(port);
    }
    if let Some(port) = cli.subscribe_port {
        config.subscribe_addr.set_port(port);
    }
    if let Some(depth) = cli.queue_depth {
        config.subscriber_queue_depth = depth;
    }

    Ok(config)
}

fn read_config_file(path: &Path) -> anyhow::Result<RelayConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("unable to read config file {}", path.display()))?;
    json5::from_str(&contents)
        .with_context(|| format!("unable to parse config file {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let relay = Relay::bind(config).await.context("relay startup failed")?;
    info!(
        ingest_addr = %relay.ingest_addr(),
        subscribe_addr = %relay.subscribe_addr(),
        "tracecastd up"
    );

    let handle = relay.spawn();
    tokio::signal::ctrl_c()
        .await
        .context("unable to wait for interrupt")?;

    info!("interrupt received, shutting down");
    handle.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config, Cli};
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn cli_flags_override_config_file_values() {
        let mut file = tempfile::NamedTempFile::new().expect("create config file");
        write!(
            file,
            "{{ ingest_addr: \"127.0.0.1:5000\", subscribe_addr: \"127.0.0.1:5001\", subscriber_queue_depth: 4 }}"
        )
        .expect("write config file");

        let cli = Cli::parse_from([
            "tracecastd",
            "--config",
            file.path().to_str().expect("config path"),
            "--subscribe-port",
            "6001",
        ]);

        let config = load_config(&cli).expect("load config");
        assert_eq!(config.ingest_addr.port(), 5000);
        assert_eq!(config.subscribe_addr.port(), 6001);
        assert_eq!(config.subscriber_queue_depth, 4);
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let cli = Cli::parse_from(["tracecastd"]);
        let config = load_config(&cli).expect("load config");
        assert_eq!(config.ingest_addr.port(), tracecast::DEFAULT_INGEST_PORT);
        assert_eq!(
            config.subscribe_addr.port(),
            tracecast::DEFAULT_SUBSCRIBE_PORT
        );
    }
}
