//! Change notification: plain callbacks plus channel subscribers.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::models::{NodeId, NodeKind};

/// Published after a mutation has been fully applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Created { id: NodeId, kind: NodeKind },
    ContentChanged { id: NodeId },
    Renamed { id: NodeId },
    Moved {
        id: NodeId,
        from: Option<NodeId>,
        to: Option<NodeId>,
    },
    Deleted { id: NodeId, removed: usize },
    CurrentChanged { current: Option<NodeId> },
    OpenToggled { id: NodeId, is_open: bool },
    Imported { roots: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut()>;

#[derive(Default)]
pub struct ChangeNotifier {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    channels: Vec<Sender<StoreEvent>>,
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn channel(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.channels.push(tx);
        rx
    }

    /// Runs callbacks in registration order, then feeds channels. Channels
    /// whose receiver is gone are dropped.
    pub fn emit(&mut self, event: &StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener();
        }
        self.channels.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/events.rs"]
mod tests;
