//! The emitter client and its trace entry point.

use crate::emitter::clock::{Clock, SystemClock};
use crate::emitter::identity;
use crate::emitter::sink::{PacketSink, RelaySink};
use crate::observability::events;
use crate::wire::{self, TraceEvent, TraceLevel};
use std::sync::Arc;
use tokio::net::ToSocketAddrs;
use tracing::debug;

const COMPONENT: &str = "emitter";

/// Producer-side client posting trace events to a relay.
///
/// Tracing must never crash the instrumented program: construction and
/// [`Emitter::trace`] surface no errors, and a dead or absent connection
/// turns every trace call into a no-op.
pub struct Emitter {
    program: String,
    pid: u32,
    sink: Arc<dyn PacketSink>,
    clock: Arc<dyn Clock>,
}

impl Emitter {
    /// Connects to a relay ingestion endpoint and records the program name
    /// for all subsequent traces.
    ///
    /// A refused or unreachable relay does not fail the caller; the emitter
    /// comes up disconnected and traces are dropped.
    pub async fn connect<A: ToSocketAddrs>(program: &str, relay_addr: A) -> Self {
        let sink = match RelaySink::connect(relay_addr).await {
            Ok(sink) => sink,
            Err(err) => {
                debug!(
                    event = events::EMITTER_CONNECT_FAILED,
                    component = COMPONENT,
                    program,
                    err = %err,
                    "relay unreachable, tracing disabled for this emitter"
                );
                RelaySink::disconnected()
            }
        };

        Self::with_parts(program, Arc::new(sink), Arc::new(SystemClock))
    }

    /// Builds an emitter from explicit send and timestamp strategies.
    pub fn with_parts(program: &str, sink: Arc<dyn PacketSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            program: program.to_string(),
            pid: identity::process_id(),
            sink,
            clock,
        }
    }

    /// Builds, encodes and posts one trace event.
    ///
    /// Gathers pid, OS thread id and the current wall-clock time, then
    /// writes the encoded line on the established connection. Failures are
    /// swallowed; the caller observes no change in control flow. Callers
    /// with printf-style arguments use [`crate::trace_event!`].
    pub async fn trace(
        &self,
        level: TraceLevel,
        tag: &str,
        module: &str,
        function: &str,
        message: &str,
    ) {
        let stamp = self.clock.now();
        let event = TraceEvent {
            program: self.program.clone(),
            pid: self.pid,
            tid: identity::thread_id(),
            level,
            timestamp_secs: stamp.secs,
            timestamp_millis: stamp.millis,
            tag: tag.to_string(),
            module: module.to_string(),
            function: function.to_string(),
            message: message.to_string(),
        };

        if let Err(err) = self.sink.send(&wire::encode(&event)).await {
            debug!(
                event = events::EMIT_SEND_FAILED,
                component = COMPONENT,
                program = %self.program,
                err = %err,
                "trace line dropped"
            );
        }
    }

    /// Closes the relay connection. Safe to call repeatedly.
    pub async fn close(&self) {
        self.sink.close().await;
    }
}

/// Printf-style trace emission.
///
/// ```
/// # use std::sync::Arc;
/// # use tracecast::{Emitter, PacketSink, SystemClock, TraceLevel};
/// # use async_trait::async_trait;
/// # struct Discard;
/// # #[async_trait]
/// # impl PacketSink for Discard {
/// #     async fn send(&self, _line: &str) -> std::io::Result<()> { Ok(()) }
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let emitter = Emitter::with_parts("svcA", Arc::new(Discard), Arc::new(SystemClock));
/// tracecast::trace_event!(emitter, TraceLevel::Warn, "db", "pool", "acquire",
///     "timeout after {}ms", 30).await;
/// # });
/// ```
#[macro_export]
macro_rules! trace_event {
    ($emitter:expr, $level:expr, $tag:expr, $module:expr, $function:expr, $($arg:tt)+) => {
        $emitter.trace($level, $tag, $module, $function, &format!($($arg)+))
    };
}
