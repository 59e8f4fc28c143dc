//! gridboard library
//!
//! This crate provides the widget lifecycle and layout synchronization engine
//! behind a free-form grid dashboard: a registry of widget types, a persistent
//! store for layout snapshots, an adapter over a layout engine that owns
//! placement, and the manager that keeps all three consistent.
//!
//! # Architecture
//!
//! ```text
//! palette / gestures ──▶ WidgetManager ──▶ GridSurface ──▶ LayoutEngine
//!                            ▲   │              │
//!          reconciliation ───┘   ▼              │ change notifications
//!                        PersistentStore ◀──────┘
//! ```
//!
//! The layout engine is the single source of truth for placement once it is
//! bound. Every change it reports is answered by rebuilding the manager's
//! canonical widget list from the engine's full node list.
//!
//! # Example
//!
//! ```
//! use gridboard::manager::WidgetManager;
//! use gridboard::store::{MemoryBackend, PersistentStore};
//! use gridboard::surface::{Container, GridEngine, GridOptions, GridSurface};
//! use gridboard::widgets::WidgetRegistry;
//!
//! let store = PersistentStore::new(MemoryBackend::new());
//! let surface: GridSurface<GridEngine> = GridSurface::new(GridOptions::default());
//! let mut manager = WidgetManager::new(WidgetRegistry::new(), surface, store);
//! manager.initialize(&Container::new("dashboard")).expect("bind surface");
//!
//! let id = manager
//!     .add_widget_from_selection("text", "Notes", "📝", "Scratch notes")
//!     .expect("text is a built-in type");
//! assert!(manager.widget(&id).is_some());
//! assert!(manager.has_unsaved_changes());
//!
//! manager.save().expect("memory store accepts writes");
//! assert!(!manager.has_unsaved_changes());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Configuration utilities including XDG path resolution.
pub mod config;

/// Crate-level error type used by initialization and the CLI.
pub mod error;

/// Logging initialization for the CLI.
pub mod logging;

/// Widget lifecycle manager and its observable state.
pub mod manager;

/// Namespaced key/value persistence for layout snapshots.
pub mod store;

/// Layout surface adapter and the in-memory grid engine.
pub mod surface;

/// Widget type registry and built-in widget renderers.
pub mod widgets;

pub use error::DashboardError;

/// Storage key under which the layout snapshot is written.
pub const SNAPSHOT_KEY: &str = "widgets";

/// Type name assigned to grid nodes whose widget type cannot be read back.
pub const UNKNOWN_WIDGET_TYPE: &str = "unknown";

/// Title assigned to grid nodes whose title cannot be read back.
pub const UNTITLED_WIDGET: &str = "Untitled Widget";

fn default_type() -> String {
    UNKNOWN_WIDGET_TYPE.to_string()
}

fn default_title() -> String {
    UNTITLED_WIDGET.to_string()
}

fn default_extent() -> u32 {
    1
}

/// Width and height of a widget in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    /// Width in columns.
    pub w: u32,
    /// Height in rows.
    pub h: u32,
}

impl GridSize {
    /// Creates a size, raising zero extents to one cell.
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            w: w.max(1),
            h: h.max(1),
        }
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Identity and placement record of one widget.
///
/// This is also the record format of the persisted snapshot: a JSON array of
/// `WidgetConfig` values with the keys `id`, `type`, `title`, `x`, `y`, `w`,
/// `h` and `data`. The snapshot carries no schema version, so every field has
/// a serde default and unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Opaque identifier, stable for the widget's lifetime.
    #[serde(default)]
    pub id: String,
    /// Registry key of the widget type.
    #[serde(rename = "type", default = "default_type")]
    pub widget_type: String,
    /// Display title.
    #[serde(default = "default_title")]
    pub title: String,
    /// Column of the top-left cell.
    #[serde(default)]
    pub x: u32,
    /// Row of the top-left cell.
    #[serde(default)]
    pub y: u32,
    /// Width in columns (at least 1).
    #[serde(default = "default_extent")]
    pub w: u32,
    /// Height in rows (at least 1).
    #[serde(default = "default_extent")]
    pub h: u32,
    /// Type-specific attributes.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl WidgetConfig {
    /// Returns the widget's size.
    pub fn size(&self) -> GridSize {
        GridSize::new(self.w, self.h)
    }

    /// Returns a string attribute from `data`, if present.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Returns `true` when the two widgets occupy at least one common cell.
    pub fn overlaps(&self, other: &WidgetConfig) -> bool {
        self.x < other.x.saturating_add(other.w)
            && other.x < self.x.saturating_add(self.w)
            && self.y < other.y.saturating_add(other.h)
            && other.y < self.y.saturating_add(self.h)
    }
}

/// A config with any field left open, completed by the registry's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialWidgetConfig {
    /// Identifier; generated when `None`.
    pub id: Option<String>,
    /// Title; the type's display name when `None`.
    pub title: Option<String>,
    /// Column; `0` when `None`.
    pub x: Option<u32>,
    /// Row; `0` when `None`.
    pub y: Option<u32>,
    /// Width; the type's default width when `None`.
    pub w: Option<u32>,
    /// Height; the type's default height when `None`.
    pub h: Option<u32>,
    /// Data; empty when `None`.
    pub data: Option<Map<String, Value>>,
}

impl From<WidgetConfig> for PartialWidgetConfig {
    fn from(config: WidgetConfig) -> Self {
        Self {
            id: Some(config.id),
            title: Some(config.title),
            x: Some(config.x),
            y: Some(config.y),
            w: Some(config.w),
            h: Some(config.h),
            data: Some(config.data),
        }
    }
}

/// Changes applied to an existing widget by
/// [`WidgetManager::update_widget`](manager::WidgetManager::update_widget).
///
/// `id` and `type` cannot be patched. A present `data` map replaces the old
/// one wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetConfigPatch {
    /// New title.
    pub title: Option<String>,
    /// New column.
    pub x: Option<u32>,
    /// New row.
    pub y: Option<u32>,
    /// New width.
    pub w: Option<u32>,
    /// New height.
    pub h: Option<u32>,
    /// Replacement data map.
    pub data: Option<Map<String, Value>>,
}

impl WidgetConfigPatch {
    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produces a new config with this patch merged over `base`.
    pub fn apply(&self, base: &WidgetConfig) -> WidgetConfig {
        WidgetConfig {
            id: base.id.clone(),
            widget_type: base.widget_type.clone(),
            title: self.title.clone().unwrap_or_else(|| base.title.clone()),
            x: self.x.unwrap_or(base.x),
            y: self.y.unwrap_or(base.y),
            w: self.w.unwrap_or(base.w).max(1),
            h: self.h.unwrap_or(base.h).max(1),
            data: self.data.clone().unwrap_or_else(|| base.data.clone()),
        }
    }
}

/// Generates an identifier of the form `<prefix>-<unix millis>-<9 hex chars>`.
pub(crate) fn generate_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{millis}-{}", &random[..9])
}
