//! Observer abstraction (mechanics only).
//!
//! A bus fans each published message out to every subscriber registered at the
//! moment of publication. There is no history: a late subscriber sees nothing
//! that was published before it subscribed and must query current state itself.
//!
//! Delivery is best-effort and in publication order per subscriber. A
//! subscriber whose receiving half has been dropped is pruned on the next
//! publish.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvError, TryRecvError};

/// Handle used to unregister a subscriber.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Receiving side of a subscription.
///
/// ```ignore
/// let sub = manager.subscribe();
/// let current = manager.current_identity();   // state at subscribe time
/// while let Ok(change) = sub.recv() {
///     render(change.identity);
/// }
/// ```
///
/// Meant for a single consumer. Dropping it is equivalent to unsubscribing.
#[derive(Debug)]
pub struct Subscription<M> {
    id: SubscriptionId,
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(id: SubscriptionId, receiver: Receiver<M>) -> Self {
        Self { id, receiver }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Everything already delivered, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Broadcast channel with explicit registration.
///
/// `publish` returns the number of subscribers the message was handed to.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<usize, Self::Error>;

    fn subscribe(&self) -> Subscription<M>;

    /// Remove a subscriber. Returns `false` if it was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    fn subscriber_count(&self) -> usize;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<usize, Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        (**self).unsubscribe(id)
    }

    fn subscriber_count(&self) -> usize {
        (**self).subscriber_count()
    }
}
