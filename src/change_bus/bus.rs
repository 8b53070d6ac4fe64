use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio_stream::Stream;
use tracing::{debug, info, warn};

use super::{ChangeEvent, Notification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub_{}", self.0)
    }
}

/// Delivery failures. Never returned to publishers; only logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("Delivery of event {sequence} to {subscriber} dropped: queue full")]
    PublishDropped {
        subscriber: SubscriberId,
        sequence: u64,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    pub published: u64,
    pub dropped: u64,
    pub subscribers: usize,
}

struct Subscriber {
    id: SubscriberId,
    sender: mpsc::Sender<Arc<Notification>>,
}

#[derive(Default)]
struct BusState {
    subscribers: Vec<Subscriber>,
    next_subscriber: u64,
    last_sequence: u64,
    dropped: u64,
    closed: bool,
}

struct BusInner {
    capacity: usize,
    state: Mutex<BusState>,
}

impl BusInner {
    // Publish only does non-blocking sends under the lock, so a poisoned
    // state is still consistent.
    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: SubscriberId) -> bool {
        let mut state = self.lock();
        let before = state.subscribers.len();
        state.subscribers.retain(|sub| sub.id != id);
        before != state.subscribers.len()
    }
}

/// Handle to the process-wide change bus. Clones share the same subscribers.
///
/// - `publish` never blocks and never fails: each subscriber has a bounded
///   queue and a full queue loses the event for that subscriber only.
/// - Publishes are totally ordered by one lock; every subscriber sees the
///   events it receives in publish order.
#[derive(Clone)]
pub struct ChangeBus {
    inner: Arc<BusInner>,
}

impl ChangeBus {
    pub fn new(subscriber_buffer: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                capacity: subscriber_buffer.max(1),
                state: Mutex::new(BusState::default()),
            }),
        }
    }

    /// Register a subscriber. It sees every event published after this call.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.inner.capacity);
        let mut state = self.inner.lock();
        state.next_subscriber += 1;
        let id = SubscriberId(state.next_subscriber);

        if state.closed {
            debug!(subscriber = %id, "Bus closed, subscription ends immediately");
        } else {
            state.subscribers.push(Subscriber { id, sender });
            debug!(subscriber = %id, subscribers = state.subscribers.len(), "Subscribed");
        }

        Subscription {
            id,
            receiver,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a subscriber. Events already queued for it stay readable.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.inner.remove(id);
        if removed {
            debug!(subscriber = %id, "Unsubscribed");
        }
        removed
    }

    /// Deliver `event` to every current subscriber.
    ///
    /// Returns the sequence number assigned to the event, or `None` once the
    /// bus has been closed.
    pub fn publish(&self, event: ChangeEvent) -> Option<u64> {
        let mut state = self.inner.lock();
        if state.closed {
            debug!(kind = %event.kind, product_name = %event.name, "Bus closed, event discarded");
            return None;
        }

        state.last_sequence += 1;
        let sequence = state.last_sequence;
        let notification = Arc::new(Notification { sequence, event });

        let mut lagging = Vec::new();
        let mut gone = Vec::new();
        state.subscribers.retain(|sub| match sub.sender.try_send(notification.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                lagging.push(sub.id);
                true
            }
            Err(TrySendError::Closed(_)) => {
                gone.push(sub.id);
                false
            }
        });
        state.dropped += lagging.len() as u64;
        let subscribers = state.subscribers.len();
        drop(state);

        // Log outside the lock.
        for subscriber in lagging {
            let error = BusError::PublishDropped { subscriber, sequence };
            warn!(error = %error, "Subscriber lagging");
        }
        for subscriber in gone {
            debug!(subscriber = %subscriber, "Subscriber gone, removed");
        }
        debug!(
            sequence,
            kind = %notification.event.kind,
            product_name = %notification.event.name,
            subscribers,
            "Published"
        );
        Some(sequence)
    }

    /// Teardown: drop every subscriber (ending their streams) and ignore later publishes.
    pub fn close(&self) {
        let mut state = self.inner.lock();
        state.closed = true;
        let count = state.subscribers.len();
        state.subscribers.clear();
        info!(subscribers = count, "Change bus closed");
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    pub fn stats(&self) -> BusStats {
        let state = self.inner.lock();
        BusStats {
            published: state.last_sequence,
            dropped: state.dropped,
            subscribers: state.subscribers.len(),
        }
    }
}

/// Receiving end of one subscriber. Dropping it unsubscribes.
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<Arc<Notification>>,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next event, or `None` once the subscriber was removed and its queue drained.
    pub async fn recv(&mut self) -> Option<Arc<Notification>> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Arc<Notification>, TryRecvError> {
        self.receiver.try_recv()
    }
}

impl Stream for Subscription {
    type Item = Arc<Notification>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.id);
        }
    }
}
