//! Subscription-endpoint client and the sink integration point.

use crate::observability::events;
use crate::wire::{self, TraceEvent};
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const COMPONENT: &str = "subscriber_client";

/// Connect-phase timeout; once connected the wait for data is unbounded.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Receives every decoded event. Implementations own all formatting and
/// persistence policy.
#[async_trait]
pub trait TraceSink: Send + Sync {
    async fn on_event(&self, event: TraceEvent);
}

/// Failure to reach the relay's subscription endpoint.
#[derive(Debug)]
pub enum SubscriberError {
    Connect(io::Error),
    ConnectTimeout(Duration),
}

impl Display for SubscriberError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SubscriberError::Connect(err) => write!(f, "unable to connect to relay: {err}"),
            SubscriberError::ConnectTimeout(timeout) => {
                write!(f, "connect to relay timed out after {timeout:?}")
            }
        }
    }
}

impl Error for SubscriberError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SubscriberError::Connect(err) => Some(err),
            SubscriberError::ConnectTimeout(_) => None,
        }
    }
}

/// Consumer-side client for a relay's subscription endpoint.
///
/// Each received line is decoded and handed to the sink; malformed or
/// partial lines arrive as events with default-filled fields rather than
/// being dropped.
pub struct SubscriberClient {
    reader_task: Option<JoinHandle<()>>,
}

impl SubscriberClient {
    /// Connects under [`DEFAULT_CONNECT_TIMEOUT`] and starts dispatching
    /// received events to `sink`.
    pub async fn connect<A: ToSocketAddrs>(
        relay_addr: A,
        sink: Arc<dyn TraceSink>,
    ) -> Result<Self, SubscriberError> {
        Self::connect_with_timeout(relay_addr, DEFAULT_CONNECT_TIMEOUT, sink).await
    }

    /// Connects under an explicit connect-phase timeout. Established
    /// connections have no idle timeout and are expected to be long-lived.
    pub async fn connect_with_timeout<A: ToSocketAddrs>(
        relay_addr: A,
        connect_timeout: Duration,
        sink: Arc<dyn TraceSink>,
    ) -> Result<Self, SubscriberError> {
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(relay_addr))
            .await
            .map_err(|_| SubscriberError::ConnectTimeout(connect_timeout))?
            .map_err(SubscriberError::Connect)?;

        info!(
            event = events::SUBSCRIBE_CONNECTED,
            component = COMPONENT,
            "subscribed to relay"
        );

        Ok(Self {
            reader_task: Some(tokio::spawn(dispatch_loop(stream, sink))),
        })
    }

    /// Closes the connection. Safe to call repeatedly or when already
    /// disconnected.
    pub fn disconnect(&mut self) {
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
    }
}

impl Drop for SubscriberClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn dispatch_loop(stream: TcpStream, sink: Arc<dyn TraceSink>) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => sink.on_event(wire::decode(&line)).await,
            Ok(None) => break,
            Err(err) => {
                debug!(
                    event = events::SUBSCRIBE_READ_ENDED,
                    component = COMPONENT,
                    err = %err,
                    "read failed, ending subscription"
                );
                break;
            }
        }
    }

    info!(
        event = events::SUBSCRIBE_READ_ENDED,
        component = COMPONENT,
        "subscription stream ended"
    );
}
