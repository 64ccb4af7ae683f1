//! In-process observer list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, mpsc};

use thiserror::Error;

use crate::bus::{EventBus, Subscription, SubscriptionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    #[error("subscriber list lock poisoned")]
    Poisoned,
}

/// In-memory broadcast bus.
///
/// - No IO / no async
/// - Fan-out to the subscribers present at publish time
/// - Dead receivers are dropped while publishing
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Vec<(SubscriptionId, mpsc::Sender<M>)>>,
    next_id: AtomicU64,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<usize, Self::Error> {
        let mut subs = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;

        subs.retain(|(id, tx)| {
            let alive = tx.send(message.clone()).is_ok();
            if !alive {
                tracing::debug!(subscription = %id, "pruning dropped subscriber");
            }
            alive
        });

        Ok(subs.len())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));

        // A poisoned list still hands out a subscription; it just never fires.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push((id, tx));
        }

        Subscription::new(id, rx)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut subs) = self.subscribers.lock() else {
            return false;
        };
        let before = subs.len();
        subs.retain(|(sub_id, _)| *sub_id != id);
        subs.len() != before
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|subs| subs.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_receives_each_message() {
        let bus = InMemoryEventBus::<u32>::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        assert_eq!(bus.publish(7).unwrap(), 2);

        assert_eq!(a.try_recv().unwrap(), 7);
        assert_eq!(b.try_recv().unwrap(), 7);
    }

    #[test]
    fn late_subscriber_misses_earlier_messages() {
        let bus = InMemoryEventBus::<&'static str>::new();
        let early = bus.subscribe();
        bus.publish("first").unwrap();

        let late = bus.subscribe();
        bus.publish("second").unwrap();

        assert_eq!(early.drain(), vec!["first", "second"]);
        assert_eq!(late.drain(), vec!["second"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = InMemoryEventBus::<u8>::new();
        let sub = bus.subscribe();

        assert!(bus.unsubscribe(sub.id()));
        assert!(!bus.unsubscribe(sub.id()));
        assert_eq!(bus.publish(1).unwrap(), 0);
        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn dropped_subscription_is_pruned_on_publish() {
        let bus = InMemoryEventBus::<u8>::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.publish(9).unwrap(), 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.try_recv().unwrap(), 9);
    }

    #[test]
    fn recv_waits_for_a_publish_from_another_thread() {
        let bus = std::sync::Arc::new(InMemoryEventBus::<u16>::new());
        let sub = bus.subscribe();

        let publisher = std::thread::spawn({
            let bus = std::sync::Arc::clone(&bus);
            move || bus.publish(42).unwrap()
        });

        assert_eq!(sub.recv().unwrap(), 42);
        assert_eq!(publisher.join().unwrap(), 1);
    }

    #[test]
    fn subscription_ids_are_unique() {
        let bus = InMemoryEventBus::<()>::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        assert_ne!(a.id(), b.id());
    }
}
