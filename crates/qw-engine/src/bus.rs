//! World-event fan-out.
//!
//! The host adapter translates its native game events into [`WorldEvent`]
//! values and hands them to the [`EventBus`]. Active objectives subscribe as
//! [`EventListener`]s; dispatch calls each one synchronously on the
//! delivering thread. Listeners must therefore be cheap and must not block.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use qw_core::block::Block;
use qw_core::location::WorldLocation;
use qw_core::profile::ProfileId;

/// A game-world event, as reported by the host adapter.
#[derive(Debug, Clone)]
pub enum WorldEvent {
    /// A player placed a block.
    BlockPlace {
        /// The player who placed it.
        profile: ProfileId,
        /// The placed block.
        block: Block,
        /// Where it was placed.
        location: WorldLocation,
        /// Whether another plugin already cancelled the action.
        cancelled: bool,
    },
    /// A player broke a block.
    BlockBreak {
        /// The player who broke it.
        profile: ProfileId,
        /// The broken block.
        block: Block,
        /// Where it was broken.
        location: WorldLocation,
        /// Whether another plugin already cancelled the action.
        cancelled: bool,
    },
    /// A player sent a chat message.
    Chat {
        /// The sender.
        profile: ProfileId,
        /// The raw message text.
        message: String,
    },
    /// A player disconnected.
    PlayerQuit {
        /// The player who left.
        profile: ProfileId,
    },
}

/// A subscriber to world events.
pub trait EventListener: Send + Sync {
    /// Handle one event. Called synchronously during dispatch.
    fn on_event(&self, event: &WorldEvent);
}

/// Proof of a subscription, consumed to unsubscribe.
#[derive(Debug, PartialEq, Eq)]
pub struct SubscriptionHandle(u64);

/// Fans world events out to subscribed listeners.
///
/// Subscription order is delivery order. The listener list is snapshotted
/// before delivery, so a listener may subscribe or unsubscribe from within
/// its own callback without deadlocking; the change takes effect on the
/// next dispatch.
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<(u64, Arc<dyn EventListener>)>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// A bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener. It receives every event until unsubscribed.
    pub fn subscribe(&self, listener: Arc<dyn EventListener>) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, listener));
        SubscriptionHandle(id)
    }

    /// Remove a subscription.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.listeners.lock().retain(|(id, _)| *id != handle.0);
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Deliver one event to every listener, in subscription order.
    pub fn dispatch(&self, event: &WorldEvent) {
        let snapshot: Vec<Arc<dyn EventListener>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener.on_event(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl EventListener for Recorder {
        fn on_event(&self, event: &WorldEvent) {
            if let WorldEvent::Chat { message, .. } = event {
                self.seen.lock().push(message.clone());
            }
        }
    }

    struct TaggedListener {
        tag: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl EventListener for TaggedListener {
        fn on_event(&self, _event: &WorldEvent) {
            self.log.lock().push(self.tag.clone());
        }
    }

    fn tagged(tag: &str, log: &Arc<Mutex<Vec<String>>>) -> Arc<TaggedListener> {
        Arc::new(TaggedListener {
            tag: tag.to_string(),
            log: Arc::clone(log),
        })
    }

    fn chat(message: &str) -> WorldEvent {
        WorldEvent::Chat {
            profile: ProfileId::new(),
            message: message.to_string(),
        }
    }

    #[test]
    fn dispatch_reaches_every_listener_in_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(tagged("first", &log));
        bus.subscribe(tagged("second", &log));

        bus.dispatch(&chat("hello"));
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        let handle = bus.subscribe(Arc::clone(&recorder) as Arc<dyn EventListener>);

        bus.dispatch(&chat("one"));
        bus.unsubscribe(handle);
        bus.dispatch(&chat("two"));

        assert_eq!(*recorder.seen.lock(), vec!["one"]);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
