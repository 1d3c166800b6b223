//! Process-local publish/subscribe channel
//!
//! Topics carry no payload. The lock screen publishes [`LOCK_CANCELLED`] when
//! the user backs out of the PIN flow and every attached guard ends its
//! screen's session.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info};

/// Topic published when the lock flow is cancelled
pub const LOCK_CANCELLED: &str = "lock-cancelled";

/// Unique identifier of one registered handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Handle for one registered handler
///
/// Not `Clone`: whoever holds it is the only one able to unsubscribe, and
/// [`SignalBus::unsubscribe`] consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
    topic: String,
}

impl Subscription {
    /// Subscription id
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Topic this subscription listens on
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

type Handler = Rc<dyn Fn()>;

struct Entry {
    id: SubscriptionId,
    topic: String,
    handler: Handler,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Signal bus with an explicit subscriber list
///
/// Cloning yields another handle onto the same bus.
#[derive(Clone, Default)]
pub struct SignalBus {
    state: Rc<RefCell<BusState>>,
}

impl SignalBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `topic`
    pub fn subscribe<F>(&self, topic: &str, handler: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        let mut state = self.state.borrow_mut();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.entries.push(Entry {
            id,
            topic: topic.to_string(),
            handler: Rc::new(handler),
        });

        debug!("Subscribed {} to '{}'", id, topic);
        Subscription {
            id,
            topic: topic.to_string(),
        }
    }

    /// Remove exactly the handler behind `subscription`
    ///
    /// Returns `false` if it was no longer registered.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.entries.len();
        state.entries.retain(|e| e.id != subscription.id);
        let removed = state.entries.len() != before;

        debug!(
            "Unsubscribed {} from '{}' (removed: {})",
            subscription.id, subscription.topic, removed
        );
        removed
    }

    /// Deliver `topic` to every current subscriber, returning how many were notified
    ///
    /// The subscriber list is snapshotted first, so handlers may subscribe or
    /// unsubscribe while the signal is being delivered.
    pub fn publish(&self, topic: &str) -> usize {
        let handlers: Vec<Handler> = self
            .state
            .borrow()
            .entries
            .iter()
            .filter(|e| e.topic == topic)
            .map(|e| Rc::clone(&e.handler))
            .collect();

        for handler in &handlers {
            handler();
        }

        info!("Published '{}' to {} subscriber(s)", topic, handlers.len());
        handlers.len()
    }

    /// Number of handlers registered under `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.state
            .borrow()
            .entries
            .iter()
            .filter(|e| e.topic == topic)
            .count()
    }

    /// Whether `subscription` is still registered
    pub fn is_subscribed(&self, subscription: &Subscription) -> bool {
        self.state
            .borrow()
            .entries
            .iter()
            .any(|e| e.id == subscription.id)
    }
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBus")
            .field("subscribers", &self.state.borrow().entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_publish_reaches_topic_subscribers_only() {
        let bus = SignalBus::new();
        let hits = Rc::new(Cell::new(0));
        let other = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        let _a = bus.subscribe(LOCK_CANCELLED, move || h.set(h.get() + 1));
        let h = Rc::clone(&hits);
        let _b = bus.subscribe(LOCK_CANCELLED, move || h.set(h.get() + 1));
        let o = Rc::clone(&other);
        let _c = bus.subscribe("something-else", move || o.set(o.get() + 1));

        assert_eq!(bus.publish(LOCK_CANCELLED), 2);
        assert_eq!(hits.get(), 2);
        assert_eq!(other.get(), 0);
    }

    #[test]
    fn test_unsubscribe_removes_exactly_one() {
        let bus = SignalBus::new();
        let a = bus.subscribe(LOCK_CANCELLED, || {});
        let b = bus.subscribe(LOCK_CANCELLED, || {});
        assert_ne!(a.id(), b.id());

        assert!(bus.unsubscribe(a));
        assert_eq!(bus.subscriber_count(LOCK_CANCELLED), 1);
        assert!(bus.is_subscribed(&b));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = SignalBus::new();
        assert_eq!(bus.publish(LOCK_CANCELLED), 0);
    }

    #[test]
    fn test_handler_may_unsubscribe_during_delivery() {
        let bus = SignalBus::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let inner_bus = bus.clone();
        let inner_slot = Rc::clone(&slot);
        let sub = bus.subscribe(LOCK_CANCELLED, move || {
            if let Some(sub) = inner_slot.borrow_mut().take() {
                inner_bus.unsubscribe(sub);
            }
        });
        *slot.borrow_mut() = Some(sub);

        assert_eq!(bus.publish(LOCK_CANCELLED), 1);
        assert_eq!(bus.subscriber_count(LOCK_CANCELLED), 0);
        assert_eq!(bus.publish(LOCK_CANCELLED), 0);
    }
}
