//! Publish/subscribe plumbing for session notifications.
//!
//! The session manager owns one bus and broadcasts identity changes on it.
//! Subscribers register explicitly and receive only what is published after
//! they subscribed.

pub mod bus;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription, SubscriptionId};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
