//! Node event dispatch.
//!
//! Every [`Node`](super::Node) embeds a [`Dispatcher`]. Structural changes
//! notify the affected parent first and then bubble a
//! [`NodeEvent::DescendantChanged`] up the ancestor chain. Any callback can
//! stop the bubbling by returning `true`.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::scene::NodeHandle;

/// Unique identifier for a registered callback.
pub type SubscriptionId = u32;

/// Callbacks return `true` to stop further propagation of the event.
type EventCallback = Box<dyn FnMut(&NodeEvent) -> bool>;

/// Closed set of node event kinds, used as subscription keys.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeEventKind {
    ChildAdded,
    ChildRemoved,
    DescendantChanged,
    Disposed,
}

/// Node events with their payload.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NodeEvent {
    /// `child` was appended to `parent`.
    ChildAdded { parent: NodeHandle, child: NodeHandle },
    /// `child` was detached from `parent`.
    ChildRemoved { parent: NodeHandle, child: NodeHandle },
    /// Something below `node` changed structurally; `origin` is the node
    /// whose child list was modified.
    DescendantChanged { node: NodeHandle, origin: NodeHandle },
    /// `node` is about to be freed.
    Disposed { node: NodeHandle },
}

impl NodeEvent {
    #[must_use]
    pub fn kind(&self) -> NodeEventKind {
        match self {
            Self::ChildAdded { .. } => NodeEventKind::ChildAdded,
            Self::ChildRemoved { .. } => NodeEventKind::ChildRemoved,
            Self::DescendantChanged { .. } => NodeEventKind::DescendantChanged,
            Self::Disposed { .. } => NodeEventKind::Disposed,
        }
    }
}

/// Per-node subscription table.
#[derive(Default)]
pub struct Dispatcher {
    subscriptions: FxHashMap<NodeEventKind, Vec<(SubscriptionId, EventCallback)>>,
    next_id: SubscriptionId,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for events of `kind`.
    pub fn subscribe<F>(&mut self, kind: NodeEventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&NodeEvent) -> bool + 'static,
    {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.subscriptions
            .entry(kind)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for callbacks in self.subscriptions.values_mut() {
            if let Some(pos) = callbacks.iter().position(|(sub, _)| *sub == id) {
                drop(callbacks.remove(pos));
                return true;
            }
        }
        false
    }

    /// Invokes the callbacks for the event's kind in subscription order.
    ///
    /// Returns `true` if one of them asked to stop propagation; the
    /// remaining callbacks on this node are skipped too.
    pub fn dispatch(&mut self, event: &NodeEvent) -> bool {
        let Some(callbacks) = self.subscriptions.get_mut(&event.kind()) else {
            return false;
        };
        for (_, callback) in callbacks.iter_mut() {
            if callback(event) {
                return true;
            }
        }
        false
    }

    #[must_use]
    pub fn subscriber_count(&self, kind: NodeEventKind) -> usize {
        self.subscriptions.get(&kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<_> = self
            .subscriptions
            .iter()
            .map(|(kind, callbacks)| (*kind, callbacks.len()))
            .collect();
        f.debug_struct("Dispatcher")
            .field("subscriptions", &counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn handles() -> (NodeHandle, NodeHandle) {
        let mut map: SlotMap<NodeHandle, ()> = SlotMap::with_key();
        (map.insert(()), map.insert(()))
    }

    #[test]
    fn dispatch_only_matching_kind() {
        let (parent, child) = handles();
        let hits = Rc::new(RefCell::new(0));
        let mut dispatcher = Dispatcher::new();

        let counter = hits.clone();
        dispatcher.subscribe(NodeEventKind::ChildAdded, move |_| {
            *counter.borrow_mut() += 1;
            false
        });

        dispatcher.dispatch(&NodeEvent::ChildRemoved { parent, child });
        assert_eq!(*hits.borrow(), 0);

        dispatcher.dispatch(&NodeEvent::ChildAdded { parent, child });
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn stop_skips_later_callbacks() {
        let (parent, child) = handles();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();

        let first = hits.clone();
        dispatcher.subscribe(NodeEventKind::ChildAdded, move |_| {
            first.borrow_mut().push(1);
            true
        });
        let second = hits.clone();
        dispatcher.subscribe(NodeEventKind::ChildAdded, move |_| {
            second.borrow_mut().push(2);
            false
        });

        assert!(dispatcher.dispatch(&NodeEvent::ChildAdded { parent, child }));
        assert_eq!(*hits.borrow(), vec![1]);
    }

    #[test]
    fn unsubscribe_removes_callback() {
        let mut dispatcher = Dispatcher::new();
        let id = dispatcher.subscribe(NodeEventKind::Disposed, |_| false);
        assert_eq!(dispatcher.subscriber_count(NodeEventKind::Disposed), 1);
        assert!(dispatcher.unsubscribe(id));
        assert!(!dispatcher.unsubscribe(id));
        assert_eq!(dispatcher.subscriber_count(NodeEventKind::Disposed), 0);
    }
}
