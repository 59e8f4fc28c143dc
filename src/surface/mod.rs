//! Layout surface adapter.
//!
//! [`GridSurface`] wraps a [`LayoutEngine`] and speaks in widgets: it tags
//! nodes with widget attributes on the way in, reads configs back out of the
//! node list, and tells listeners about every change the engine reports.
//!
//! # Change notifications
//!
//! Every operation that reaches the engine ends by draining the engine's
//! queued events. When there are any, the full widget list is read back once
//! and handed to each listener in registration order. Listeners always see
//! the complete list, never a delta.
//!
//! # Lifecycle
//!
//! A surface starts unbound. [`initialize`](GridSurface::initialize) binds an
//! engine to a container; until then every operation is a no-op and
//! [`all_widgets`](GridSurface::all_widgets) is empty.

mod engine;
mod node;

pub use engine::{
    occupancy, Container, EngineEvent, EngineEventKind, GridEngine, GridOptions, LayoutEngine,
    MAX_ROWS,
};
pub use node::{
    GridNode, NodeElement, PlacementHint, ATTR_DATA, ATTR_ID, ATTR_TITLE, ATTR_TYPE,
    WIDGET_CLASSES,
};

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::{generate_id, GridSize, WidgetConfig, UNKNOWN_WIDGET_TYPE, UNTITLED_WIDGET};

/// Errors raised while binding the layout engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The engine could not be bound to the container.
    #[error("Failed to bind layout engine to container '{container}': {message}")]
    Binding {
        /// Id of the container that was requested.
        container: String,
        /// Engine-specific reason.
        message: String,
    },
}

/// A palette entry being placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteItem {
    /// Registry type.
    pub widget_type: String,
    /// Title given to the new widget.
    pub title: String,
    /// Icon stored in the widget data.
    pub icon: String,
    /// Description stored in the widget data.
    pub description: String,
    /// Size of the new node.
    pub size: GridSize,
}

/// Size of a widget placed from the palette.
pub const PALETTE_SIZE: GridSize = GridSize { w: 3, h: 2 };

impl PaletteItem {
    /// Palette entry with the standard 3x2 size.
    pub fn new(widget_type: &str, title: &str, icon: &str, description: &str) -> Self {
        Self {
            widget_type: widget_type.to_string(),
            title: title.to_string(),
            icon: icon.to_string(),
            description: description.to_string(),
            size: PALETTE_SIZE,
        }
    }

    /// The `data` map a widget created from this entry starts with.
    pub fn data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("icon".to_string(), Value::String(self.icon.clone()));
        data.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        data
    }
}

/// Callback receiving the full widget list after a change.
pub type ChangeListener = Box<dyn FnMut(&[WidgetConfig])>;

/// Adapter between widget configs and a layout engine.
pub struct GridSurface<E: LayoutEngine = GridEngine> {
    engine: Option<E>,
    options: GridOptions,
    listeners: Vec<ChangeListener>,
}

impl<E: LayoutEngine> fmt::Debug for GridSurface<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridSurface")
            .field("initialized", &self.engine.is_some())
            .field("options", &self.options)
            .field("nodes", &self.engine.as_ref().map_or(0, |e| e.nodes().len()))
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl<E: LayoutEngine> GridSurface<E> {
    /// Unbound surface that will bind engines with `options`.
    pub fn new(options: GridOptions) -> Self {
        Self {
            engine: None,
            options,
            listeners: Vec::new(),
        }
    }

    /// Options handed to the engine on bind.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Returns `true` once an engine is bound.
    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    /// The bound engine, if any.
    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Bind a fresh engine to `container`.
    ///
    /// Any previous engine is destroyed and its listeners dropped first.
    ///
    /// # Errors
    ///
    /// Propagates [`SurfaceError::Binding`] from the engine. The surface is
    /// left unbound in that case.
    pub fn initialize(&mut self, container: &Container) -> Result<(), SurfaceError> {
        self.destroy();
        let engine = E::bind(container, self.options.clone())?;
        tracing::info!(container = container.id(), "layout surface initialized");
        self.engine = Some(engine);
        Ok(())
    }

    /// Register a change listener.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&[WidgetConfig]) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Put a widget on the grid at its recorded placement.
    pub fn add_widget(&mut self, config: &WidgetConfig) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        engine.add_node(
            NodeElement::from_config(config),
            PlacementHint::from_config(config),
        );
        self.flush();
    }

    /// Put a palette entry on the grid.
    ///
    /// Uses `id` when given, otherwise generates one. Returns the id the node
    /// was tagged with, or `None` when the surface is unbound.
    pub fn add_widget_from_palette(
        &mut self,
        item: &PaletteItem,
        id: Option<&str>,
        hint: PlacementHint,
    ) -> Option<String> {
        let engine = self.engine.as_mut()?;
        let id = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_id("widget"),
        };
        let element = NodeElement::for_widget(&id, &item.widget_type, &item.title, &item.data());
        engine.add_node(element, hint);
        self.flush();
        Some(id)
    }

    /// Drop a palette entry at a grid cell, as a pointer drag-in would.
    pub fn drop_from_palette(&mut self, item: &PaletteItem, x: u32, y: u32) -> Option<String> {
        let hint = PlacementHint::at(x, y, item.size.w, item.size.h);
        self.add_widget_from_palette(item, None, hint)
    }

    /// Accept an element dragged in from outside the grid.
    ///
    /// A `gs-id` that duplicates a live node is replaced with a fresh id.
    /// Returns `false` when the grid does not accept external elements or is
    /// unbound.
    pub fn accept_external(&mut self, mut element: NodeElement, hint: PlacementHint) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        if !engine.options().accept_widgets {
            tracing::debug!("external drop rejected: grid does not accept widgets");
            return false;
        }
        if let Some(id) = element.attribute(ATTR_ID) {
            if engine.nodes().iter().any(|n| n.id() == Some(id)) {
                let fresh = generate_id("widget");
                tracing::warn!(
                    duplicate = id,
                    replacement = %fresh,
                    "data integrity: dropped element reuses a live id"
                );
                element.set_attribute(ATTR_ID, fresh);
            }
        }
        engine.add_node(element, hint);
        self.flush();
        true
    }

    /// Move a widget as a drag gesture would. Ignored on a static grid.
    pub fn move_widget(&mut self, id: &str, x: u32, y: u32) -> bool {
        let Some(key) = self.gesture_target(id) else {
            return false;
        };
        let moved = self
            .engine
            .as_mut()
            .is_some_and(|engine| engine.move_node(key, x, y));
        self.flush();
        moved
    }

    /// Resize a widget as a resize gesture would. Ignored on a static grid.
    pub fn resize_widget(&mut self, id: &str, w: u32, h: u32) -> bool {
        let Some(key) = self.gesture_target(id) else {
            return false;
        };
        let resized = self
            .engine
            .as_mut()
            .is_some_and(|engine| engine.resize_node(key, w, h));
        self.flush();
        resized
    }

    /// Remove a widget by dragging it off the grid.
    ///
    /// Only allowed when the grid is `removable` and not static.
    pub fn drag_out(&mut self, id: &str) -> bool {
        if !self.options.removable {
            return false;
        }
        let Some(key) = self.gesture_target(id) else {
            return false;
        };
        let removed = self
            .engine
            .as_mut()
            .is_some_and(|engine| engine.remove_node(key));
        self.flush();
        removed
    }

    /// Push a config into the node carrying its id: attributes and placement.
    pub fn update_widget(&mut self, config: &WidgetConfig) -> bool {
        let Some(key) = self.key_of(&config.id) else {
            return false;
        };
        let updated = self.engine.as_mut().is_some_and(|engine| {
            engine.update_node(
                key,
                NodeElement::from_config(config),
                PlacementHint::from_config(config),
            )
        });
        self.flush();
        updated
    }

    /// Remove the node tagged with `id`. No-op if there is none.
    pub fn remove_widget(&mut self, id: &str) -> bool {
        let Some(key) = self.key_of(id) else {
            return false;
        };
        let removed = self
            .engine
            .as_mut()
            .is_some_and(|engine| engine.remove_node(key));
        self.flush();
        removed
    }

    /// Remove every node.
    pub fn clear_all_widgets(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        engine.remove_all();
        self.flush();
    }

    /// Read the engine's node list back as widget configs.
    ///
    /// Nodes with missing or unreadable attributes are logged as data
    /// integrity problems and given fallback values.
    pub fn all_widgets(&self) -> Vec<WidgetConfig> {
        self.engine
            .as_ref()
            .map(|engine| engine.nodes().iter().map(node_to_config).collect())
            .unwrap_or_default()
    }

    /// Pixel height of the occupied grid.
    pub fn grid_height_px(&self) -> u32 {
        let rows = self
            .engine
            .as_ref()
            .and_then(|engine| engine.nodes().iter().map(GridNode::bottom).max())
            .unwrap_or(0);
        if rows == 0 {
            return 0;
        }
        rows.saturating_mul(self.options.cell_height)
            .saturating_add((rows - 1).saturating_mul(self.options.margin))
    }

    /// Tear down the engine and drop every listener.
    pub fn destroy(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
            tracing::info!("layout surface destroyed");
        }
        self.listeners.clear();
    }

    fn key_of(&self, id: &str) -> Option<u64> {
        self.engine
            .as_ref()?
            .nodes()
            .iter()
            .find(|n| n.id() == Some(id))
            .map(|n| n.key)
    }

    fn gesture_target(&self, id: &str) -> Option<u64> {
        if self.options.static_grid {
            tracing::debug!(widget_id = id, "gesture ignored on static grid");
            return None;
        }
        self.key_of(id)
    }

    /// Drain engine events and notify listeners once with the full list.
    fn flush(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let events = engine.take_events();
        if events.is_empty() {
            return;
        }
        for event in &events {
            let ids: Vec<&str> = event.nodes.iter().filter_map(GridNode::id).collect();
            tracing::debug!(kind = ?event.kind, ?ids, "layout changed");
        }
        let widgets = self.all_widgets();
        for listener in self.listeners.iter_mut() {
            listener(&widgets);
        }
    }
}

fn non_empty_attribute<'a>(element: &'a NodeElement, name: &str) -> Option<&'a str> {
    element.attribute(name).filter(|v| !v.is_empty())
}

/// Read one node back as a config, falling back for missing attributes.
fn node_to_config(node: &GridNode) -> WidgetConfig {
    let element = &node.element;
    let non_empty = |name| non_empty_attribute(element, name);

    let id = match non_empty(ATTR_ID) {
        Some(id) => id.to_string(),
        None => {
            let fallback = generate_id("fallback");
            tracing::warn!(node = node.key, fallback = %fallback, "data integrity: node has no id");
            fallback
        }
    };
    let widget_type = match non_empty(ATTR_TYPE) {
        Some(t) => t.to_string(),
        None => {
            tracing::warn!(widget_id = %id, "data integrity: node has no widget type");
            UNKNOWN_WIDGET_TYPE.to_string()
        }
    };
    let title = match non_empty(ATTR_TITLE) {
        Some(t) => t.to_string(),
        None => {
            tracing::warn!(widget_id = %id, "data integrity: node has no title");
            UNTITLED_WIDGET.to_string()
        }
    };
    let data = match element.attribute(ATTR_DATA) {
        Some(raw) => match serde_json::from_str::<Map<String, Value>>(raw) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(widget_id = %id, error = %e, "data integrity: node data is not a JSON object");
                Map::new()
            }
        },
        None => {
            tracing::warn!(widget_id = %id, "data integrity: node has no data");
            Map::new()
        }
    };

    WidgetConfig {
        id,
        widget_type,
        title,
        x: node.x,
        y: node.y,
        w: node.w,
        h: node.h,
        data,
    }
}
