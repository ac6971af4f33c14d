//! Live-subscriber registry and fan-out dispatch.

use crate::observability::events;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Mutex;
use tracing::{debug, info};

const COMPONENT: &str = "subscriber_registry";

pub(crate) type SubscriberId = u64;

type SubscriberQueues = Mutex<BTreeMap<SubscriberId, mpsc::Sender<Arc<str>>>>;

/// The one shared mutable resource of the relay: the set of live
/// subscriber forwarding queues.
///
/// Created at startup, owned by the relay context, cleared at shutdown.
/// Ids are handed out monotonically, so iterating the map visits
/// subscribers in arrival order.
#[derive(Debug)]
pub(crate) struct SubscriberRegistry {
    queue_depth: usize,
    next_id: AtomicU64,
    queues: SubscriberQueues,
}

impl SubscriberRegistry {
    pub(crate) fn new(queue_depth: usize) -> Self {
        Self {
            queue_depth: queue_depth.max(1),
            next_id: AtomicU64::new(0),
            queues: Mutex::new(BTreeMap::new()),
        }
    }

    /// Registers a new subscriber and returns its id plus the queue end its
    /// writer task drains.
    pub(crate) async fn insert(&self) -> (SubscriberId, mpsc::Receiver<Arc<str>>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.queue_depth);
        self.queues.lock().await.insert(id, sender);
        info!(
            event = events::SUBSCRIBER_ADDED,
            component = COMPONENT,
            subscriber_id = id,
            "subscriber registered"
        );
        (id, receiver)
    }

    /// Drops a subscriber. Absence is not an error: the broadcast path may
    /// already have discarded a subscriber whose writer died first.
    pub(crate) async fn remove(&self, id: SubscriberId) {
        if self.queues.lock().await.remove(&id).is_some() {
            info!(
                event = events::SUBSCRIBER_REMOVED,
                component = COMPONENT,
                subscriber_id = id,
                "subscriber removed"
            );
        } else {
            debug!(
                component = COMPONENT,
                subscriber_id = id,
                "subscriber already removed"
            );
        }
    }

    /// Enqueues one ingested line for every live subscriber, in arrival
    /// order, without waiting on any of them.
    ///
    /// A full queue drops the line for that subscriber only; a closed queue
    /// means its writer task is gone and the subscriber is discarded.
    pub(crate) async fn broadcast(&self, line: &str) {
        let shared: Arc<str> = Arc::from(line);
        let mut queues = self.queues.lock().await;

        let mut closed = Vec::new();
        for (id, queue) in queues.iter() {
            match queue.try_send(shared.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    debug!(
                        event = events::FANOUT_DROP_SLOW,
                        component = COMPONENT,
                        subscriber_id = id,
                        "queue full, dropping line for slow subscriber"
                    );
                }
                Err(TrySendError::Closed(_)) => closed.push(*id),
            }
        }

        for id in closed {
            queues.remove(&id);
            info!(
                event = events::FANOUT_DROP_CLOSED,
                component = COMPONENT,
                subscriber_id = id,
                "writer gone, discarding subscriber"
            );
        }
    }

    /// Number of live subscribers.
    pub(crate) async fn len(&self) -> usize {
        self.queues.lock().await.len()
    }

    /// Releases every forwarding queue; writer tasks drain and exit.
    pub(crate) async fn clear(&self) {
        self.queues.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriberRegistry;

    #[tokio::test]
    async fn broadcast_reaches_every_registered_subscriber_in_order() {
        let registry = SubscriberRegistry::new(8);
        let (_, mut first) = registry.insert().await;
        let (_, mut second) = registry.insert().await;

        registry.broadcast("one").await;
        registry.broadcast("two").await;

        for receiver in [&mut first, &mut second] {
            assert_eq!(receiver.recv().await.as_deref(), Some("one"));
            assert_eq!(receiver.recv().await.as_deref(), Some("two"));
        }
    }

    #[tokio::test]
    async fn a_full_queue_drops_lines_without_unregistering() {
        let registry = SubscriberRegistry::new(1);
        let (_, mut receiver) = registry.insert().await;

        registry.broadcast("kept").await;
        registry.broadcast("dropped").await;

        assert_eq!(registry.len().await, 1);
        assert_eq!(receiver.recv().await.as_deref(), Some("kept"));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn a_closed_queue_discards_the_subscriber_on_next_broadcast() {
        let registry = SubscriberRegistry::new(4);
        let (_, receiver) = registry.insert().await;
        drop(receiver);

        registry.broadcast("line").await;
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = SubscriberRegistry::new(4);
        let (id, _receiver) = registry.insert().await;

        registry.remove(id).await;
        registry.remove(id).await;
        assert_eq!(registry.len().await, 0);
    }
}
