//! Relay endpoints, accept loops and lifecycle.

use crate::config::RelayConfig;
use crate::observability::{events, fields};
use crate::relay::connection::{self, ConnectionRole};
use crate::relay::registry::SubscriberRegistry;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

const COMPONENT: &str = "relay";

/// Startup failure of the relay. Binding is the only fallible resource
/// acquisition; anything after it is handled per connection.
#[derive(Debug)]
pub enum RelayError {
    Bind {
        endpoint: &'static str,
        addr: SocketAddr,
        source: io::Error,
    },
}

impl Display for RelayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Bind {
                endpoint,
                addr,
                source,
            } => {
                write!(f, "unable to bind {endpoint} endpoint on {addr}: {source}")
            }
        }
    }
}

impl Error for RelayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RelayError::Bind { source, .. } => Some(source),
        }
    }
}

/// The broadcast daemon core: both listening endpoints plus the subscriber
/// registry, bound but not yet accepting.
#[derive(Debug)]
pub struct Relay {
    ingest_listener: TcpListener,
    subscribe_listener: TcpListener,
    ingest_addr: SocketAddr,
    subscribe_addr: SocketAddr,
    registry: Arc<SubscriberRegistry>,
}

impl Relay {
    /// Binds both listening endpoints. A bind failure is fatal and is
    /// reported before any connection is accepted.
    pub async fn bind(config: RelayConfig) -> Result<Self, RelayError> {
        let ingest_listener = bind_endpoint("ingestion", config.ingest_addr).await?;
        let subscribe_listener = bind_endpoint("subscription", config.subscribe_addr).await?;

        // The bound addresses matter to callers when the config asked for
        // OS-assigned ports.
        let ingest_addr = local_addr("ingestion", &ingest_listener)?;
        let subscribe_addr = local_addr("subscription", &subscribe_listener)?;

        info!(
            event = events::RELAY_BIND,
            component = COMPONENT,
            ingest_addr = %ingest_addr,
            subscribe_addr = %subscribe_addr,
            "relay endpoints bound"
        );

        Ok(Self {
            ingest_listener,
            subscribe_listener,
            ingest_addr,
            subscribe_addr,
            registry: Arc::new(SubscriberRegistry::new(config.subscriber_queue_depth)),
        })
    }

    pub fn ingest_addr(&self) -> SocketAddr {
        self.ingest_addr
    }

    pub fn subscribe_addr(&self) -> SocketAddr {
        self.subscribe_addr
    }

    /// Starts the accept loops and returns the running relay's handle.
    pub fn spawn(self) -> RelayHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let ingest_addr = self.ingest_addr;
        let subscribe_addr = self.subscribe_addr;
        let registry = self.registry.clone();
        let task = tokio::spawn(run_accept_loops(self, shutdown_rx));

        RelayHandle {
            ingest_addr,
            subscribe_addr,
            registry,
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running relay: bound addresses plus the shutdown path.
pub struct RelayHandle {
    ingest_addr: SocketAddr,
    subscribe_addr: SocketAddr,
    registry: Arc<SubscriberRegistry>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RelayHandle {
    pub fn ingest_addr(&self) -> SocketAddr {
        self.ingest_addr
    }

    pub fn subscribe_addr(&self) -> SocketAddr {
        self.subscribe_addr
    }

    /// Number of currently registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.registry.len().await
    }

    /// Closes both listening endpoints and every live connection, then
    /// releases the subscriber registry.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

async fn bind_endpoint(endpoint: &'static str, addr: SocketAddr) -> Result<TcpListener, RelayError> {
    TcpListener::bind(addr).await.map_err(|source| {
        error!(
            event = events::RELAY_BIND_FAILED,
            component = COMPONENT,
            endpoint,
            addr = %addr,
            err = %source,
            "endpoint bind failed"
        );
        RelayError::Bind {
            endpoint,
            addr,
            source,
        }
    })
}

fn local_addr(endpoint: &'static str, listener: &TcpListener) -> Result<SocketAddr, RelayError> {
    // An unnameable bound socket counts as a failed acquisition.
    listener.local_addr().map_err(|source| RelayError::Bind {
        endpoint,
        addr: (std::net::Ipv4Addr::UNSPECIFIED, 0).into(),
        source,
    })
}

async fn run_accept_loops(relay: Relay, mut shutdown: watch::Receiver<bool>) {
    let mut connections: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            accepted = relay.ingest_listener.accept() => {
                admit(accepted, ConnectionRole::Producer, &relay, &mut connections);
            }
            accepted = relay.subscribe_listener.accept() => {
                admit(accepted, ConnectionRole::Subscriber, &relay, &mut connections);
            }
            _ = shutdown.changed() => break,
        }

        // Reap finished connection tasks as we go.
        while connections.try_join_next().is_some() {}
    }

    let live_subscribers = relay.registry.len().await;
    info!(
        event = events::RELAY_SHUTDOWN,
        component = COMPONENT,
        live_subscribers,
        "closing endpoints and live connections"
    );

    // Listeners close when the relay drops below; connections are torn down
    // here and the registry released so writer tasks drain out.
    connections.shutdown().await;
    relay.registry.clear().await;
}

fn admit(
    accepted: io::Result<(TcpStream, SocketAddr)>,
    role: ConnectionRole,
    relay: &Relay,
    connections: &mut JoinSet<()>,
) {
    match accepted {
        Ok((stream, peer)) => {
            info!(
                event = events::CONN_ACCEPTED,
                component = COMPONENT,
                connection = %fields::connection_label(role.label(), &peer),
                "connection accepted"
            );
            connections.spawn(connection::drive(
                role,
                stream,
                peer,
                relay.registry.clone(),
            ));
        }
        Err(err) => {
            warn!(
                event = events::CONN_ACCEPT_FAILED,
                component = COMPONENT,
                role = role.label(),
                err = %err,
                "accept failed"
            );
        }
    }
}
