//! Widget lifecycle manager.
//!
//! [`WidgetManager`] owns the canonical widget list and keeps it consistent
//! with the layout surface and the persistent store.
//!
//! Once the surface is bound it is the single source of truth for placement.
//! The manager never diffs against the engine: every change notification is
//! answered by rebuilding every instance from the surface's full placement
//! list and replacing the canonical list wholesale.
//!
//! State is shared with the surface listener through [`SharedState`]. No
//! `RefCell` borrow is held across a call into the surface, so the listener
//! can run while a manager method is on the stack.

mod state;

pub use state::{DashboardState, SharedState, StateUpdate};

use std::cell::{RefCell, RefMut};
use std::collections::HashSet;
use std::rc::Rc;
use tokio::sync::broadcast;

use crate::error::DashboardError;
use crate::store::{FileBackend, PersistentStore, StorageBackend, StoreError};
use crate::surface::{Container, GridEngine, GridSurface, LayoutEngine, PaletteItem, PlacementHint};
use crate::widgets::{WidgetError, WidgetInstance, WidgetMetadata, WidgetRegistry};
use crate::{generate_id, PartialWidgetConfig, WidgetConfig, WidgetConfigPatch, SNAPSHOT_KEY};

#[cfg(test)]
mod tests;

/// Coordinates the widget registry, layout surface and persistent store.
///
/// # Example
///
/// ```
/// use gridboard::manager::WidgetManager;
/// use gridboard::store::{MemoryBackend, PersistentStore};
/// use gridboard::surface::{Container, GridEngine, GridOptions, GridSurface};
/// use gridboard::widgets::WidgetRegistry;
///
/// let backend = MemoryBackend::new();
/// let mut manager = WidgetManager::new(
///     WidgetRegistry::new(),
///     GridSurface::<GridEngine>::new(GridOptions::default()),
///     PersistentStore::new(backend.clone()),
/// );
/// manager.initialize(&Container::new("dashboard")).expect("bind");
/// manager
///     .add_widget_from_selection("chart", "Sales", "📊", "Monthly sales")
///     .expect("chart is built in");
/// manager.save().expect("memory accepts writes");
///
/// // A second manager over the same medium sees the saved layout.
/// let mut reopened = WidgetManager::new(
///     WidgetRegistry::new(),
///     GridSurface::<GridEngine>::new(GridOptions::default()),
///     PersistentStore::new(backend),
/// );
/// reopened.initialize(&Container::new("dashboard")).expect("bind");
/// assert_eq!(reopened.widgets().len(), 1);
/// assert_eq!(reopened.widgets()[0].config().title, "Sales");
/// ```
pub struct WidgetManager<E: LayoutEngine = GridEngine, B: StorageBackend = FileBackend> {
    registry: Rc<RefCell<WidgetRegistry>>,
    surface: GridSurface<E>,
    store: PersistentStore<B>,
    state: SharedState,
}

impl<E: LayoutEngine, B: StorageBackend> std::fmt::Debug for WidgetManager<E, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetManager")
            .field("registry", &self.registry.borrow())
            .field("surface", &self.surface)
            .field("state", &self.state)
            .finish()
    }
}

impl<E: LayoutEngine, B: StorageBackend> WidgetManager<E, B> {
    /// Creates an uninitialized manager.
    pub fn new(registry: WidgetRegistry, surface: GridSurface<E>, store: PersistentStore<B>) -> Self {
        Self {
            registry: Rc::new(RefCell::new(registry)),
            surface,
            store,
            state: SharedState::new(),
        }
    }

    /// Bind the surface, restore the saved layout and start reconciling.
    ///
    /// A missing or unreadable snapshot restores an empty layout. Snapshot
    /// entries with an empty or repeated id are given a fresh one; entries of
    /// a type the registry does not know are drawn by a placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Surface`] when the surface cannot be bound.
    pub fn initialize(&mut self, container: &Container) -> Result<(), DashboardError> {
        self.surface.initialize(container)?;

        let state = self.state.clone();
        let registry = Rc::clone(&self.registry);
        self.surface.on_change(move |placements| {
            reconcile(&state, &registry.borrow(), placements);
        });

        let snapshot: Vec<WidgetConfig> = self.store.load(SNAPSHOT_KEY).unwrap_or_default();
        let configs = repair_ids(snapshot);
        let instances: Vec<WidgetInstance> = {
            let registry = self.registry.borrow();
            configs
                .into_iter()
                .map(|config| registry.materialize(config))
                .collect()
        };
        let count = instances.len();
        self.state.replace_widgets(instances.clone());
        for instance in &instances {
            self.surface.add_widget(instance.config());
        }

        self.state.set_unsaved(false);
        self.state.set_initialized(true);
        tracing::info!(widgets = count, container = container.id(), "dashboard initialized");
        Ok(())
    }

    /// Add a widget chosen from the palette.
    ///
    /// The widget is 3x2 with `data = {icon, description}`; the grid picks
    /// its position. Returns the new widget's id.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::UnknownType`] when `widget_type` is not
    /// registered. Nothing changes in that case.
    pub fn add_widget_from_selection(
        &mut self,
        widget_type: &str,
        title: &str,
        icon: &str,
        description: &str,
    ) -> Result<String, WidgetError> {
        if !self.state.is_initialized() {
            tracing::warn!(widget_type, "adding widget before the dashboard is initialized");
        }
        let item = PaletteItem::new(widget_type, title, icon, description);
        let partial = PartialWidgetConfig {
            id: None,
            title: Some(title.to_string()),
            x: Some(0),
            y: Some(0),
            w: Some(item.size.w),
            h: Some(item.size.h),
            data: Some(item.data()),
        };
        let instance = self.registry.borrow().create_widget(widget_type, partial)?;
        let id = instance.id().to_string();

        self.state.push_widget(instance);
        self.surface.add_widget_from_palette(
            &item,
            Some(&id),
            PlacementHint::auto(item.size.w, item.size.h),
        );
        self.state.set_unsaved(true);
        tracing::info!(widget_id = %id, widget_type, "widget added");
        Ok(id)
    }

    /// Remove a widget. Removing an unknown id changes nothing.
    pub fn remove_widget(&mut self, id: &str) {
        if self.state.position(id).is_none() {
            tracing::debug!(widget_id = id, "remove ignored: no such widget");
            return;
        }
        self.state.remove_widget(id);
        self.surface.remove_widget(id);
        self.state.set_unsaved(true);
        tracing::info!(widget_id = id, "widget removed");
    }

    /// Remove every widget, from the surface first and then the list.
    pub fn clear_all_widgets(&mut self) {
        self.surface.clear_all_widgets();
        self.state.replace_widgets(Vec::new());
        self.state.set_unsaved(true);
        tracing::info!("all widgets cleared");
    }

    /// Merge `patch` into a widget and push the result to the surface.
    ///
    /// The widget keeps its id, type and position in the list. Returns
    /// `false`, changing nothing, when `id` is unknown.
    pub fn update_widget(&mut self, id: &str, patch: WidgetConfigPatch) -> bool {
        let Some(index) = self.state.position(id) else {
            tracing::debug!(widget_id = id, "update ignored: no such widget");
            return false;
        };
        let Some(current) = self.state.widget(id) else {
            return false;
        };
        let merged = patch.apply(current.config());
        let instance = self.registry.borrow().materialize(merged.clone());
        self.state.replace_at(index, instance);
        self.surface.update_widget(&merged);
        self.state.set_unsaved(true);
        tracing::info!(widget_id = id, "widget updated");
        true
    }

    /// Persist the surface's current layout.
    ///
    /// The snapshot is read from the surface rather than the canonical list,
    /// so placements the engine made but has not reported yet are kept. On
    /// success the canonical list is rebuilt from the snapshot and the
    /// unsaved flag is cleared.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the write is rejected. The unsaved flag
    /// is left set in that case.
    pub fn save(&mut self) -> Result<(), StoreError> {
        if !self.state.is_initialized() {
            tracing::warn!("saving before the dashboard is initialized");
        }
        let snapshot = self.surface.all_widgets();
        self.store.save(SNAPSHOT_KEY, &snapshot)?;

        let count = snapshot.len();
        let instances: Vec<WidgetInstance> = {
            let registry = self.registry.borrow();
            snapshot
                .into_iter()
                .map(|config| registry.materialize(config))
                .collect()
        };
        self.state.replace_widgets(instances);
        self.state.set_unsaved(false);
        tracing::info!(widgets = count, "layout saved");
        Ok(())
    }

    /// Tear down the surface and return to the uninitialized state.
    pub fn destroy(&mut self) {
        self.surface.destroy();
        self.state.replace_widgets(Vec::new());
        self.state.set_unsaved(false);
        self.state.set_initialized(false);
        tracing::info!("dashboard destroyed");
    }

    /// The canonical widget list.
    pub fn widgets(&self) -> Vec<WidgetInstance> {
        self.state.widgets()
    }

    /// The widget with `id`, if any.
    pub fn widget(&self, id: &str) -> Option<WidgetInstance> {
        self.state.widget(id)
    }

    /// `true` between `initialize` and `destroy`.
    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    /// `true` when the layout differs from the last save.
    pub fn has_unsaved_changes(&self) -> bool {
        self.state.has_unsaved_changes()
    }

    /// Palette catalog.
    pub fn available_widget_types(&self) -> Vec<WidgetMetadata> {
        self.registry.borrow().available_widgets()
    }

    /// A copy of the current state.
    pub fn state(&self) -> DashboardState {
        self.state.snapshot()
    }

    /// Subscribes to state updates.
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.state.subscribe()
    }

    /// Number of live state subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.state.subscriber_count()
    }

    /// The layout surface, for forwarding user gestures.
    pub fn surface_mut(&mut self) -> &mut GridSurface<E> {
        &mut self.surface
    }

    /// The layout surface.
    pub fn surface(&self) -> &GridSurface<E> {
        &self.surface
    }

    /// The widget registry, for registering types at runtime.
    pub fn registry_mut(&mut self) -> RefMut<'_, WidgetRegistry> {
        self.registry.borrow_mut()
    }

    /// The persistent store.
    pub fn store(&self) -> &PersistentStore<B> {
        &self.store
    }
}

/// Rebuild the canonical list from the surface's full placement list.
fn reconcile(state: &SharedState, registry: &WidgetRegistry, placements: &[WidgetConfig]) {
    let instances: Vec<WidgetInstance> = placements
        .iter()
        .cloned()
        .map(|config| registry.materialize(config))
        .collect();
    tracing::debug!(widgets = instances.len(), "reconciled with layout surface");
    state.replace_widgets(instances);
    state.set_unsaved(true);
}

/// Give snapshot entries with an empty or repeated id a fresh one.
fn repair_ids(configs: Vec<WidgetConfig>) -> Vec<WidgetConfig> {
    let mut seen = HashSet::new();
    configs
        .into_iter()
        .map(|mut config| {
            if config.id.is_empty() || seen.contains(&config.id) {
                let fresh = generate_id("widget");
                tracing::warn!(
                    previous = %config.id,
                    replacement = %fresh,
                    "data integrity: snapshot widget id is empty or repeated"
                );
                config.id = fresh;
            }
            seen.insert(config.id.clone());
            config
        })
        .collect()
}
