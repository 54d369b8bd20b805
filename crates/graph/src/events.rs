//! Structural-change notifications.
//!
//! The graph store notifies registered observers after every successful
//! mutation. Notifications are fire-and-forget: observers cannot veto a
//! mutation and are not part of the execution contract. The intended consumer
//! is a rendering or monitoring layer that mirrors the graph.
//!
//! Observation is an explicit registration mechanism rather than inheritance
//! from a generic emitter type; implement [`GraphObserver`] and hand it to
//! the store.

use crate::types::{Connection, Node};

/// A structural-change notification.
///
/// Events carry a clone of the affected entity as it was at emission time.
#[derive(Debug, Clone)]
pub enum GraphEvent {
    /// A node was inserted (or replaced an existing node with the same id).
    NodeAdded(Node),
    /// A node was removed. Cascade-removed connections emit their own
    /// [`GraphEvent::ConnectionRemoved`] events first.
    NodeRemoved(Node),
    /// A node's restricted mutable state changed (currently: position).
    NodeUpdated(Node),
    /// A connection was inserted (or replaced one with the same id).
    ConnectionAdded(Connection),
    /// A connection was removed, directly or by node-removal cascade.
    ConnectionRemoved(Connection),
}

/// Receiver for [`GraphEvent`] notifications.
pub trait GraphObserver: Send + Sync {
    /// Called synchronously after the mutation that produced `event` has
    /// completed. Keep implementations cheap; the store blocks on them.
    fn on_event(&self, event: &GraphEvent);
}
