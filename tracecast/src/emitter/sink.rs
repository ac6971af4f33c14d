//! Packet-send seam and the TCP sink posting lines to the relay.

use crate::observability::events;
use async_trait::async_trait;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tracing::debug;

const COMPONENT: &str = "relay_sink";

/// Send strategy injected into [`crate::Emitter`].
///
/// Implementations deliver one encoded wire line. The emitter swallows any
/// returned error; a sink that cannot deliver may also choose to report
/// success, as the disconnected [`RelaySink`] does.
#[async_trait]
pub trait PacketSink: Send + Sync {
    async fn send(&self, line: &str) -> io::Result<()>;

    /// Releases any held connection. Idempotent; the default does nothing.
    async fn close(&self) {}
}

/// Production sink holding one outbound connection to the relay's
/// ingestion endpoint.
///
/// A sink that failed to connect, or whose connection has died, stays
/// usable: sends become no-ops until the emitter is rebuilt.
pub struct RelaySink {
    stream: Mutex<Option<TcpStream>>,
}

impl RelaySink {
    /// Opens the outbound connection.
    pub async fn connect<A: ToSocketAddrs>(relay_addr: A) -> io::Result<Self> {
        let stream = TcpStream::connect(relay_addr).await?;
        Ok(Self {
            stream: Mutex::new(Some(stream)),
        })
    }

    /// A sink with no connection; every send is a silent no-op.
    pub fn disconnected() -> Self {
        Self {
            stream: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PacketSink for RelaySink {
    async fn send(&self, line: &str) -> io::Result<()> {
        let mut guard = self.stream.lock().await;
        let Some(stream) = guard.as_mut() else {
            return Ok(());
        };

        let mut data = String::with_capacity(line.len() + 1);
        data.push_str(line);
        data.push('\n');

        if let Err(err) = stream.write_all(data.as_bytes()).await {
            // The connection is gone; drop it so later sends become no-ops.
            debug!(
                event = events::EMIT_SEND_FAILED,
                component = COMPONENT,
                err = %err,
                "write to relay failed, dropping connection"
            );
            *guard = None;
            return Err(err);
        }
        Ok(())
    }

    async fn close(&self) {
        let mut guard = self.stream.lock().await;
        if let Some(mut stream) = guard.take() {
            let _ = stream.shutdown().await;
        }
    }
}
