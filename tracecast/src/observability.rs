//! Event and field naming shared by tracing emission across the crate.
//!
//! Library code emits structured `tracing` events and never installs a
//! global subscriber; binaries own one-time `tracing_subscriber`
//! initialization at process boundaries.

/// Stable event names carried as the `event` field on tracing emissions.
pub mod events {
    pub const RELAY_BIND: &str = "relay_bind";
    pub const RELAY_BIND_FAILED: &str = "relay_bind_failed";
    pub const RELAY_SHUTDOWN: &str = "relay_shutdown";

    pub const CONN_ACCEPTED: &str = "conn_accepted";
    pub const CONN_ACCEPT_FAILED: &str = "conn_accept_failed";
    pub const CONN_CLOSED: &str = "conn_closed";
    pub const CONN_READ_FAILED: &str = "conn_read_failed";

    pub const INGEST_LINE: &str = "ingest_line";
    pub const SUBSCRIBER_ADDED: &str = "subscriber_added";
    pub const SUBSCRIBER_REMOVED: &str = "subscriber_removed";
    pub const FANOUT_DROP_SLOW: &str = "fanout_drop_slow";
    pub const FANOUT_DROP_CLOSED: &str = "fanout_drop_closed";
    pub const SUBSCRIBER_WRITE_FAILED: &str = "subscriber_write_failed";

    pub const EMITTER_CONNECT_FAILED: &str = "emitter_connect_failed";
    pub const EMIT_SEND_FAILED: &str = "emit_send_failed";

    pub const SUBSCRIBE_CONNECTED: &str = "subscribe_connected";
    pub const SUBSCRIBE_READ_ENDED: &str = "subscribe_read_ended";
}

/// Formatting helpers for recurring structured fields.
pub mod fields {
    use std::net::SocketAddr;

    /// Uniform connection label used on accept/close emissions.
    pub fn connection_label(role: &str, peer: &SocketAddr) -> String {
        format!("{role}@{peer}")
    }
}
