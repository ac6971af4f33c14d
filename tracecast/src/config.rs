//! Relay endpoint configuration and the well-known port assignments.

use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};

/// Well-known port emitters post trace lines to.
pub const DEFAULT_INGEST_PORT: u16 = 4242;
/// Well-known port subscribers receive broadcasts from.
pub const DEFAULT_SUBSCRIBE_PORT: u16 = 4243;
/// Per-subscriber forwarding-queue depth before lines are dropped.
pub const DEFAULT_SUBSCRIBER_QUEUE_DEPTH: usize = 16;

/// Listening endpoints and fan-out sizing for one relay process.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelayConfig {
    /// Endpoint accepting producer (emitter) connections.
    pub ingest_addr: SocketAddr,
    /// Endpoint accepting subscriber connections.
    pub subscribe_addr: SocketAddr,
    /// Bounded queue depth per subscriber; a full queue drops lines for
    /// that subscriber only.
    pub subscriber_queue_depth: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ingest_addr: (Ipv4Addr::UNSPECIFIED, DEFAULT_INGEST_PORT).into(),
            subscribe_addr: (Ipv4Addr::UNSPECIFIED, DEFAULT_SUBSCRIBE_PORT).into(),
            subscriber_queue_depth: DEFAULT_SUBSCRIBER_QUEUE_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RelayConfig, DEFAULT_INGEST_PORT, DEFAULT_SUBSCRIBE_PORT};

    #[test]
    fn default_config_uses_the_well_known_ports() {
        let config = RelayConfig::default();
        assert_eq!(config.ingest_addr.port(), DEFAULT_INGEST_PORT);
        assert_eq!(config.subscribe_addr.port(), DEFAULT_SUBSCRIBE_PORT);
    }
}
