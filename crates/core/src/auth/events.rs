//! In-process fan-out of session-change notifications
//!
//! The backend adapter publishes every session transition here; each
//! subscriber owns an unbounded FIFO so events are never reordered or
//! dropped. Subscriptions are explicit handles: call
//! [`SessionSubscription::unsubscribe`] on teardown (dropping the handle does
//! the same).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use studyhub_domain::SessionEvent;
use tokio::sync::mpsc;
use tracing::{debug, trace};

type Subscribers = Vec<(u64, mpsc::UnboundedSender<SessionEvent>)>;

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    subscribers: Mutex<Subscribers>,
}

/// Publisher side of the session event stream
#[derive(Clone, Default)]
pub struct SessionEventHub {
    inner: Arc<HubInner>,
}

impl SessionEventHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. Only events published after this call are
    /// delivered to it.
    #[must_use]
    pub fn subscribe(&self) -> SessionSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().push((id, sender));
        debug!(subscription_id = id, "session subscriber registered");

        SessionSubscription { id, receiver, hub: Arc::downgrade(&self.inner) }
    }

    /// Deliver `event` to every live subscriber and return how many got it.
    ///
    /// Subscribers whose receiving side is gone are pruned.
    pub fn publish(&self, event: &SessionEvent) -> usize {
        let mut subscribers = self.inner.subscribers.lock();
        subscribers.retain(|(_, sender)| sender.send(event.clone()).is_ok());
        trace!(event = %event.kind, delivered = subscribers.len(), "session event published");
        subscribers.len()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

/// Receiving side of a session event subscription
pub struct SessionSubscription {
    id: u64,
    receiver: mpsc::UnboundedReceiver<SessionEvent>,
    hub: Weak<HubInner>,
}

impl SessionSubscription {
    /// Next event in delivery order; `None` once unsubscribed or the hub is
    /// gone and the backlog is drained.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.receiver.recv().await
    }

    /// Next already-delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        self.receiver.try_recv().ok()
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Stop receiving events and deregister from the hub.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.subscribers.lock().retain(|(id, _)| *id != self.id);
            debug!(subscription_id = self.id, "session subscriber removed");
        }
        self.hub = Weak::new();
        self.receiver.close();
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use studyhub_domain::{Identity, Session, SessionEventKind};

    use super::*;

    fn session(id: &str) -> Session {
        Session::new(format!("jwt-{id}"), None, 3600, Identity::new(id, None))
    }

    #[tokio::test]
    async fn delivers_events_in_publish_order() {
        let hub = SessionEventHub::new();
        let mut subscription = hub.subscribe();

        hub.publish(&SessionEvent::signed_in(session("u1")));
        hub.publish(&SessionEvent::token_refreshed(session("u1")));
        hub.publish(&SessionEvent::signed_out());

        let kinds = [
            subscription.recv().await.unwrap().kind,
            subscription.recv().await.unwrap().kind,
            subscription.recv().await.unwrap().kind,
        ];
        assert_eq!(
            kinds,
            [
                SessionEventKind::SignedIn,
                SessionEventKind::TokenRefreshed,
                SessionEventKind::SignedOut
            ]
        );
    }

    #[tokio::test]
    async fn fans_out_to_every_subscriber() {
        let hub = SessionEventHub::new();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        assert_eq!(hub.publish(&SessionEvent::signed_out()), 2);
        assert_eq!(first.recv().await.unwrap().kind, SessionEventKind::SignedOut);
        assert_eq!(second.recv().await.unwrap().kind, SessionEventKind::SignedOut);
    }

    #[test]
    fn unsubscribe_deregisters_handle() {
        let hub = SessionEventHub::new();
        let subscription = hub.subscribe();
        let _other = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        subscription.unsubscribe();
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(hub.publish(&SessionEvent::signed_out()), 1);
    }

    #[test]
    fn dropping_handle_deregisters_it() {
        let hub = SessionEventHub::new();
        {
            let _subscription = hub.subscribe();
            assert_eq!(hub.subscriber_count(), 1);
        }
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let hub = SessionEventHub::new();
        assert_eq!(hub.publish(&SessionEvent::signed_out()), 0);
    }

    #[test]
    fn try_recv_returns_backlog_without_waiting() {
        let hub = SessionEventHub::new();
        let mut subscription = hub.subscribe();
        assert!(subscription.try_recv().is_none());

        hub.publish(&SessionEvent::signed_out());
        assert_eq!(subscription.try_recv().map(|e| e.kind), Some(SessionEventKind::SignedOut));
    }
}
