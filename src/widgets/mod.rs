//! Widget type registry for the grid dashboard.
//!
//! This module defines the [`WidgetRenderer`] capability that every widget
//! type implements, the [`WidgetInstance`] pairing of a config with its
//! renderer, and the [`WidgetRegistry`] that maps type names to constructors
//! and catalog metadata.
//!
//! # Architecture
//!
//! A widget is data plus a render capability. The data is an immutable
//! [`WidgetConfig`]; the capability is a shared `Arc<dyn WidgetRenderer>`
//! that reads the type-specific `data` keys and produces a ratatui [`Text`].
//! Instances are replaced, never mutated.
//!
//! The registry is pure: creating an instance never touches the layout
//! surface or storage.
//!
//! # Example
//!
//! ```
//! use gridboard::widgets::WidgetRegistry;
//! use gridboard::PartialWidgetConfig;
//!
//! let registry = WidgetRegistry::new();
//! let types: Vec<_> = registry
//!     .available_widgets()
//!     .into_iter()
//!     .map(|meta| meta.widget_type)
//!     .collect();
//! assert_eq!(types, ["text", "chart", "image"]);
//!
//! let widget = registry
//!     .create_widget("chart", PartialWidgetConfig::default())
//!     .expect("chart is built in");
//! assert_eq!((widget.config().w, widget.config().h), (4, 3));
//! ```

pub mod chart;
pub mod image;
pub mod text;

use ratatui::text::Text;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::{generate_id, GridSize, PartialWidgetConfig, WidgetConfig};

/// Errors raised by the widget registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// No constructor is registered for the requested type.
    #[error("Unknown widget type: {widget_type}")]
    UnknownType {
        /// The type name that failed to resolve.
        widget_type: String,
    },
}

/// Render capability of a widget type.
///
/// Renderers are stateless: everything they show comes from the config they
/// are handed. They must be thread-safe (`Send + Sync`) so instances can be
/// shared with a rendering thread.
pub trait WidgetRenderer: Send + Sync {
    /// Render the widget body for the given config.
    fn render(&self, config: &WidgetConfig) -> Text<'static>;

    /// Registry key of the type this renderer draws.
    fn kind(&self) -> &'static str;
}

/// Constructor function type for renderers.
pub type WidgetConstructor = fn() -> Box<dyn WidgetRenderer>;

/// A widget: one immutable config plus its render capability.
#[derive(Clone)]
pub struct WidgetInstance {
    config: Arc<WidgetConfig>,
    renderer: Arc<dyn WidgetRenderer>,
}

impl WidgetInstance {
    fn new(config: WidgetConfig, renderer: Box<dyn WidgetRenderer>) -> Self {
        Self {
            config: Arc::new(config),
            renderer: Arc::from(renderer),
        }
    }

    /// The widget's identifier.
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// The widget's registry type.
    pub fn widget_type(&self) -> &str {
        &self.config.widget_type
    }

    /// The config this instance was built from.
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Produces the widget body.
    pub fn render(&self) -> Text<'static> {
        self.renderer.render(&self.config)
    }
}

impl fmt::Debug for WidgetInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetInstance")
            .field("config", &self.config)
            .field("renderer", &self.renderer.kind())
            .finish()
    }
}

impl PartialEq for WidgetInstance {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
    }
}

/// Catalog entry describing a widget type for the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetMetadata {
    /// Registry key.
    pub widget_type: String,
    /// Human-readable name, also the default title.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Palette icon.
    pub icon: String,
    /// Palette grouping.
    pub category: String,
    /// Size used when the caller gives none.
    pub default_size: GridSize,
}

impl WidgetMetadata {
    /// Convenience constructor.
    pub fn new(
        widget_type: &str,
        name: &str,
        description: &str,
        icon: &str,
        category: &str,
        default_size: GridSize,
    ) -> Self {
        Self {
            widget_type: widget_type.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            category: category.to_string(),
            default_size,
        }
    }
}

/// Registry mapping widget type names to constructors and metadata.
///
/// Pre-populated with the built-in `text`, `chart` and `image` types.
/// Catalog order is registration order.
pub struct WidgetRegistry {
    constructors: HashMap<String, WidgetConstructor>,
    metadata: Vec<WidgetMetadata>,
}

impl WidgetRegistry {
    /// Creates a registry with the built-in widget types.
    pub fn new() -> Self {
        let mut reg = Self::empty();
        reg.register(
            text::TYPE,
            text::TextWidget::create,
            WidgetMetadata::new(
                text::TYPE,
                "Text Widget",
                "Display text content with customizable styling",
                "📝",
                "Content",
                GridSize::new(3, 2),
            ),
        );
        reg.register(
            chart::TYPE,
            chart::ChartWidget::create,
            WidgetMetadata::new(
                chart::TYPE,
                "Chart Widget",
                "Display data in various chart formats",
                "📊",
                "Data",
                GridSize::new(4, 3),
            ),
        );
        reg.register(
            image::TYPE,
            image::ImageWidget::create,
            WidgetMetadata::new(
                image::TYPE,
                "Image Widget",
                "Display images with customizable fit modes",
                "🖼️",
                "Media",
                GridSize::new(3, 2),
            ),
        );
        reg
    }

    /// Creates a registry with no types at all.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
            metadata: Vec::new(),
        }
    }

    /// Register a widget type.
    ///
    /// Re-registering an existing type replaces its constructor and metadata
    /// but keeps its position in the catalog.
    pub fn register(
        &mut self,
        widget_type: &str,
        constructor: WidgetConstructor,
        mut metadata: WidgetMetadata,
    ) {
        metadata.widget_type = widget_type.to_string();
        self.constructors
            .insert(widget_type.to_string(), constructor);
        match self
            .metadata
            .iter_mut()
            .find(|meta| meta.widget_type == widget_type)
        {
            Some(existing) => *existing = metadata,
            None => self.metadata.push(metadata),
        }
        tracing::debug!(widget_type, "registered widget type");
    }

    /// Returns `true` if `widget_type` has a constructor.
    pub fn contains(&self, widget_type: &str) -> bool {
        self.constructors.contains_key(widget_type)
    }

    /// Catalog metadata for one type.
    pub fn metadata(&self, widget_type: &str) -> Option<&WidgetMetadata> {
        self.metadata
            .iter()
            .find(|meta| meta.widget_type == widget_type)
    }

    /// Full catalog in registration order.
    pub fn available_widgets(&self) -> Vec<WidgetMetadata> {
        self.metadata.clone()
    }

    /// Create a widget instance, filling missing fields from the type's
    /// defaults.
    ///
    /// The id is generated when absent, the title defaults to the type's
    /// display name, the size to its default size, placement to the origin
    /// and data to an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::UnknownType`] when no constructor is registered
    /// for `widget_type`.
    pub fn create_widget(
        &self,
        widget_type: &str,
        partial: PartialWidgetConfig,
    ) -> Result<WidgetInstance, WidgetError> {
        let constructor =
            self.constructors
                .get(widget_type)
                .ok_or_else(|| WidgetError::UnknownType {
                    widget_type: widget_type.to_string(),
                })?;
        let (name, size) = match self.metadata(widget_type) {
            Some(meta) => (meta.name.clone(), meta.default_size),
            None => (widget_type.to_string(), GridSize::new(1, 1)),
        };

        let config = WidgetConfig {
            id: partial
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| generate_id("widget")),
            widget_type: widget_type.to_string(),
            title: partial.title.unwrap_or(name),
            x: partial.x.unwrap_or(0),
            y: partial.y.unwrap_or(0),
            w: partial.w.unwrap_or(size.w).max(1),
            h: partial.h.unwrap_or(size.h).max(1),
            data: partial.data.unwrap_or_default(),
        };
        Ok(WidgetInstance::new(config, constructor()))
    }

    /// Build an instance for a complete config.
    ///
    /// Unlike [`create_widget`](Self::create_widget) this never fails: a type
    /// with no constructor is drawn by a placeholder renderer and logged as a
    /// data-integrity problem.
    pub fn materialize(&self, config: WidgetConfig) -> WidgetInstance {
        let renderer = match self.constructors.get(&config.widget_type) {
            Some(constructor) => constructor(),
            None => {
                tracing::warn!(
                    widget_id = %config.id,
                    widget_type = %config.widget_type,
                    "data integrity: unknown widget type, rendering placeholder"
                );
                PlaceholderWidget::create()
            }
        };
        WidgetInstance::new(config, renderer)
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<&str> = self
            .metadata
            .iter()
            .map(|meta| meta.widget_type.as_str())
            .collect();
        f.debug_struct("WidgetRegistry")
            .field("types", &types)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Placeholder renderer for types the registry cannot resolve
// ---------------------------------------------------------------------------

/// Renders `[<type>]` for a widget whose type has no constructor.
struct PlaceholderWidget;

impl PlaceholderWidget {
    fn create() -> Box<dyn WidgetRenderer> {
        Box::new(Self)
    }
}

impl WidgetRenderer for PlaceholderWidget {
    fn render(&self, config: &WidgetConfig) -> Text<'static> {
        Text::raw(format!("[{}]", config.widget_type))
    }

    fn kind(&self) -> &'static str {
        "placeholder"
    }
}
