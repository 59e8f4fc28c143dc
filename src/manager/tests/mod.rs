//! Tests for the WidgetManager module.
//!
//! Tests are organized into categories:
//! - `lifecycle`: initialize, add, remove, update, clear, destroy
//! - `reconcile`: rebuilding the canonical list from surface notifications
//! - `persistence`: save and restore through the store
//! - `subscriber`: broadcast channel and state updates

mod reconcile;

use super::WidgetManager;
use crate::store::{MemoryBackend, PersistentStore};
use crate::surface::{Container, GridEngine, GridOptions, GridSurface};
use crate::widgets::WidgetRegistry;
use crate::WidgetConfig;

/// Manager over an in-memory store, not yet initialized.
pub(super) fn manager_with(backend: MemoryBackend) -> WidgetManager<GridEngine, MemoryBackend> {
    WidgetManager::new(
        WidgetRegistry::new(),
        GridSurface::new(GridOptions::default()),
        PersistentStore::new(backend),
    )
}

/// Initialized manager over a fresh in-memory store.
pub(super) fn initialized_manager() -> WidgetManager<GridEngine, MemoryBackend> {
    let mut manager = manager_with(MemoryBackend::new());
    manager
        .initialize(&Container::new("dashboard"))
        .expect("bind");
    manager
}

/// Ids of the canonical list, in order.
pub(super) fn ids(manager: &WidgetManager<GridEngine, MemoryBackend>) -> Vec<String> {
    manager
        .widgets()
        .iter()
        .map(|w| w.id().to_string())
        .collect()
}

/// A text widget config with the given id and placement.
pub(super) fn text_config(id: &str, x: u32, y: u32) -> WidgetConfig {
    WidgetConfig {
        id: id.to_string(),
        widget_type: "text".to_string(),
        title: format!("Text {id}"),
        x,
        y,
        w: 3,
        h: 2,
        data: serde_json::Map::new(),
    }
}
