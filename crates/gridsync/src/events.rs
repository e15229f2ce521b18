//! Outbound events and the persistence boundary.

use std::fmt;

use tracing::{debug, warn};

use crate::error::PersistenceError;
use crate::interaction::GestureKind;
use crate::model::GridItem;

/// Events emitted by [`GridEngine`](crate::GridEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// Authoritative layout after a settled gesture or a batch to persist.
    LayoutChanged(Vec<GridItem>),
    ItemInteractionStarted { id: String, kind: GestureKind },
    ItemInteractionEnded {
        id: String,
        kind: GestureKind,
        committed: bool,
    },
    /// The surface registered an item. Informational.
    SurfaceItemAdded(String),
    /// The surface deregistered an item. Informational.
    SurfaceItemRemoved(String),
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&GridEvent)>;

/// Synchronous fan-out of [`GridEvent`]s to registered listeners.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GridEvent) + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Detach every listener. Returns how many were attached.
    pub fn clear(&mut self) -> usize {
        let detached = self.listeners.len();
        self.listeners.clear();
        detached
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn emit(&mut self, event: &GridEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

/// External adapter that stores layouts.
///
/// Implementations must not block: queue the payload and return.
pub trait LayoutPersistence {
    fn save_layout(&mut self, items: &[GridItem]) -> Result<(), PersistenceError>;
}

/// Forwards `LayoutChanged` payloads to a [`LayoutPersistence`] adapter.
///
/// Failures are logged and counted. Visual state is never rolled back; retry
/// policy belongs to the adapter.
#[derive(Debug)]
pub struct PersistenceBridge<P> {
    adapter: P,
    saved: u64,
    failed: u64,
}

impl<P: LayoutPersistence> PersistenceBridge<P> {
    pub fn new(adapter: P) -> Self {
        Self {
            adapter,
            saved: 0,
            failed: 0,
        }
    }

    pub fn handle(&mut self, event: &GridEvent) {
        let GridEvent::LayoutChanged(items) = event else {
            return;
        };
        match self.adapter.save_layout(items) {
            Ok(()) => {
                self.saved += 1;
                debug!(items = items.len(), "layout handed to persistence");
            }
            Err(err) => {
                self.failed += 1;
                warn!(error = %err, items = items.len(), "layout persistence failed");
            }
        }
    }

    pub fn saved(&self) -> u64 {
        self.saved
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn adapter(&self) -> &P {
        &self.adapter
    }

    /// Turn the bridge into a listener for [`EventBus::subscribe`].
    pub fn into_listener(mut self) -> impl FnMut(&GridEvent) + 'static
    where
        P: 'static,
    {
        move |event| self.handle(event)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        saves: Vec<usize>,
        fail: bool,
    }

    impl LayoutPersistence for Rc<RefCell<Recorder>> {
        fn save_layout(&mut self, items: &[GridItem]) -> Result<(), PersistenceError> {
            let mut recorder = self.borrow_mut();
            if recorder.fail {
                return Err(PersistenceError::new("offline"));
            }
            recorder.saves.push(items.len());
            Ok(())
        }
    }

    #[test]
    fn subscribe_and_unsubscribe() {
        let seen = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&seen);
        let id = bus.subscribe(move |_| *counter.borrow_mut() += 1);
        bus.emit(&GridEvent::SurfaceItemAdded("a".into()));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&GridEvent::SurfaceItemAdded("b".into()));
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn clear_detaches_all() {
        let mut bus = EventBus::new();
        bus.subscribe(|_| {});
        bus.subscribe(|_| {});
        assert_eq!(bus.clear(), 2);
        assert!(bus.is_empty());
    }

    #[test]
    fn bridge_saves_layout_changes_only() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut bridge = PersistenceBridge::new(Rc::clone(&recorder));
        bridge.handle(&GridEvent::SurfaceItemAdded("a".into()));
        bridge.handle(&GridEvent::LayoutChanged(vec![GridItem::new("a", 0, 0, 1, 1)]));
        assert_eq!(bridge.saved(), 1);
        assert_eq!(recorder.borrow().saves, vec![1]);
    }

    #[test]
    fn bridge_counts_failures() {
        let recorder = Rc::new(RefCell::new(Recorder {
            fail: true,
            ..Recorder::default()
        }));
        let mut bridge = PersistenceBridge::new(Rc::clone(&recorder));
        bridge.handle(&GridEvent::LayoutChanged(Vec::new()));
        assert_eq!(bridge.failed(), 1);
        assert_eq!(bridge.saved(), 0);
    }
}
