//! Connection-role dispatch for accepted relay sockets.

use crate::observability::{events, fields};
use crate::relay::registry::{SubscriberId, SubscriberRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info};

const COMPONENT: &str = "connection";

/// Role fixed at accept time by which listening endpoint produced the
/// connection. The closed set of roles replaces per-connection callback
/// tables: one driver loop dispatches connect/line/close through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConnectionRole {
    Producer,
    Subscriber,
}

struct ConnectionContext {
    registry: Arc<SubscriberRegistry>,
    peer: SocketAddr,
    subscriber_id: Option<SubscriberId>,
}

impl ConnectionRole {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            ConnectionRole::Producer => "producer",
            ConnectionRole::Subscriber => "subscriber",
        }
    }

    /// Activates the connection. Subscribers register a forwarding queue
    /// and hand the write half to their writer task; producers return the
    /// write half to the driver, which parks it so the peer never observes
    /// an early write-side shutdown.
    async fn on_connect(
        &self,
        cx: &mut ConnectionContext,
        writer: OwnedWriteHalf,
    ) -> Option<OwnedWriteHalf> {
        match self {
            ConnectionRole::Producer => Some(writer),
            ConnectionRole::Subscriber => {
                let (id, queue) = cx.registry.insert().await;
                cx.subscriber_id = Some(id);
                tokio::spawn(subscriber_writer_loop(id, queue, writer));
                None
            }
        }
    }

    async fn on_line(&self, cx: &ConnectionContext, line: &str) {
        match self {
            ConnectionRole::Producer => {
                debug!(
                    event = events::INGEST_LINE,
                    component = COMPONENT,
                    peer = %cx.peer,
                    "broadcasting ingested line"
                );
                cx.registry.broadcast(line).await;
            }
            // Subscription connections never initiate reads; stray input
            // is discarded.
            ConnectionRole::Subscriber => {}
        }
    }

    async fn on_close(&self, cx: &mut ConnectionContext) {
        if let Some(id) = cx.subscriber_id.take() {
            cx.registry.remove(id).await;
        }
    }
}

/// Drives one accepted connection from Active to Closed under its role's
/// policy.
pub(crate) async fn drive(
    role: ConnectionRole,
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<SubscriberRegistry>,
) {
    let (read_half, write_half) = stream.into_split();
    let mut cx = ConnectionContext {
        registry,
        peer,
        subscriber_id: None,
    };

    let _parked_writer = role.on_connect(&mut cx, write_half).await;
    read_lines(role, &cx, read_half).await;
    role.on_close(&mut cx).await;

    info!(
        event = events::CONN_CLOSED,
        component = COMPONENT,
        connection = %fields::connection_label(role.label(), &peer),
        "connection closed"
    );
}

async fn read_lines(role: ConnectionRole, cx: &ConnectionContext, read_half: OwnedReadHalf) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => role.on_line(cx, &line).await,
            Ok(None) => break,
            Err(err) => {
                debug!(
                    event = events::CONN_READ_FAILED,
                    component = COMPONENT,
                    connection = %fields::connection_label(role.label(), &cx.peer),
                    err = %err,
                    "read failed, closing connection"
                );
                break;
            }
        }
    }
}

/// Per-subscriber egress worker: drains the forwarding queue onto the
/// socket until the queue closes or a write fails.
async fn subscriber_writer_loop(
    id: SubscriberId,
    mut queue: mpsc::Receiver<Arc<str>>,
    mut writer: OwnedWriteHalf,
) {
    while let Some(line) = queue.recv().await {
        let mut data = String::with_capacity(line.len() + 1);
        data.push_str(&line);
        data.push('\n');

        if let Err(err) = writer.write_all(data.as_bytes()).await {
            debug!(
                event = events::SUBSCRIBER_WRITE_FAILED,
                component = COMPONENT,
                subscriber_id = id,
                err = %err,
                "delivery failed, stopping writer"
            );
            break;
        }
    }
}
