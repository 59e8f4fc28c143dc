//! Observable dashboard state.
//!
//! [`SharedState`] is the one copy of the manager's state. The manager and
//! its reconciliation listener hold clones of it; observers subscribe to a
//! broadcast channel of [`StateUpdate`] messages.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tokio::sync::broadcast;

use crate::widgets::WidgetInstance;
use crate::WidgetConfig;

/// Default capacity for the observer notification channel.
const DEFAULT_SUBSCRIBER_CHANNEL_CAPACITY: usize = 256;

/// Snapshot of the manager's state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    /// `true` between a successful `initialize` and `destroy`.
    pub initialized: bool,
    /// The canonical widget list, in grid order.
    pub widgets: Vec<WidgetInstance>,
    /// `true` when the grid differs from the last saved snapshot.
    pub has_unsaved_changes: bool,
}

/// A change broadcast to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    /// `initialized` flipped.
    Initialized(bool),
    /// The canonical list was replaced; carries the new configs in order.
    Widgets(Vec<WidgetConfig>),
    /// `has_unsaved_changes` flipped.
    UnsavedChanges(bool),
}

/// Shared, observable dashboard state.
///
/// Clones share the same state and channel. Borrows are held only for the
/// duration of each method.
#[derive(Clone)]
pub struct SharedState {
    inner: Rc<RefCell<DashboardState>>,
    update_tx: broadcast::Sender<StateUpdate>,
}

impl fmt::Debug for SharedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedState")
            .field("state", &self.inner.borrow())
            .field("subscriber_count", &self.update_tx.receiver_count())
            .finish()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedState {
    /// Empty, uninitialized state with no subscribers.
    pub fn new() -> Self {
        let (update_tx, _rx) = broadcast::channel(DEFAULT_SUBSCRIBER_CHANNEL_CAPACITY);
        Self {
            inner: Rc::new(RefCell::new(DashboardState::default())),
            update_tx,
        }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> DashboardState {
        self.inner.borrow().clone()
    }

    /// Current `initialized` flag.
    pub fn is_initialized(&self) -> bool {
        self.inner.borrow().initialized
    }

    /// Current `has_unsaved_changes` flag.
    pub fn has_unsaved_changes(&self) -> bool {
        self.inner.borrow().has_unsaved_changes
    }

    /// The canonical list.
    pub fn widgets(&self) -> Vec<WidgetInstance> {
        self.inner.borrow().widgets.clone()
    }

    /// The instance with `id`, if any.
    pub fn widget(&self, id: &str) -> Option<WidgetInstance> {
        self.inner
            .borrow()
            .widgets
            .iter()
            .find(|w| w.id() == id)
            .cloned()
    }

    /// Index of the instance with `id`, if any.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.inner.borrow().widgets.iter().position(|w| w.id() == id)
    }

    /// Number of widgets in the canonical list.
    pub fn len(&self) -> usize {
        self.inner.borrow().widgets.len()
    }

    /// Returns `true` when the canonical list is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set `initialized`, publishing only when it changes.
    pub fn set_initialized(&self, value: bool) {
        let changed = {
            let mut state = self.inner.borrow_mut();
            std::mem::replace(&mut state.initialized, value) != value
        };
        if changed {
            self.publish(StateUpdate::Initialized(value));
        }
    }

    /// Set `has_unsaved_changes`, publishing only when it changes.
    pub fn set_unsaved(&self, value: bool) {
        let changed = {
            let mut state = self.inner.borrow_mut();
            std::mem::replace(&mut state.has_unsaved_changes, value) != value
        };
        if changed {
            self.publish(StateUpdate::UnsavedChanges(value));
        }
    }

    /// Replace the canonical list wholesale.
    pub fn replace_widgets(&self, widgets: Vec<WidgetInstance>) {
        self.inner.borrow_mut().widgets = widgets;
        self.publish_widgets();
    }

    /// Append one instance.
    pub fn push_widget(&self, widget: WidgetInstance) {
        self.inner.borrow_mut().widgets.push(widget);
        self.publish_widgets();
    }

    /// Replace the instance at `index`. Returns `false` if out of range.
    pub fn replace_at(&self, index: usize, widget: WidgetInstance) -> bool {
        let replaced = {
            let mut state = self.inner.borrow_mut();
            match state.widgets.get_mut(index) {
                Some(slot) => {
                    *slot = widget;
                    true
                }
                None => false,
            }
        };
        if replaced {
            self.publish_widgets();
        }
        replaced
    }

    /// Remove the instance with `id`. Returns `false` if absent.
    pub fn remove_widget(&self, id: &str) -> bool {
        let removed = {
            let mut state = self.inner.borrow_mut();
            let before = state.widgets.len();
            state.widgets.retain(|w| w.id() != id);
            state.widgets.len() != before
        };
        if removed {
            self.publish_widgets();
        }
        removed
    }

    /// Subscribes to state updates.
    ///
    /// Updates sent before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.update_tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.update_tx.receiver_count()
    }

    fn publish_widgets(&self) {
        let configs = self
            .inner
            .borrow()
            .widgets
            .iter()
            .map(|w| w.config().clone())
            .collect();
        self.publish(StateUpdate::Widgets(configs));
    }

    fn publish(&self, update: StateUpdate) {
        match self.update_tx.send(update) {
            Ok(count) => {
                tracing::trace!("State update sent to {} subscribers", count);
            }
            Err(_) => {
                tracing::trace!("No subscribers for state update");
            }
        }
    }
}
