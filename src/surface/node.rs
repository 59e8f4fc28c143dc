//! Grid nodes and the attribute tags that identify widgets on them.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::WidgetConfig;

/// Attribute carrying the widget id.
pub const ATTR_ID: &str = "gs-id";
/// Attribute carrying the widget type.
pub const ATTR_TYPE: &str = "data-widget-type";
/// Attribute carrying the widget title.
pub const ATTR_TITLE: &str = "data-widget-title";
/// Attribute carrying the JSON-encoded widget data.
pub const ATTR_DATA: &str = "data-widget-data";

/// Classes every widget node carries.
pub const WIDGET_CLASSES: [&str; 2] = ["grid-stack-item", "widget-item"];

/// The element a grid node wraps: classes plus string attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeElement {
    /// CSS-style class list.
    pub classes: Vec<String>,
    /// Attribute map.
    pub attributes: BTreeMap<String, String>,
}

impl NodeElement {
    /// An element with no classes or attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the tagged element for a widget.
    ///
    /// Every path that puts a widget on the grid goes through here, so nodes
    /// always carry the same classes and attributes.
    pub fn for_widget(id: &str, widget_type: &str, title: &str, data: &Map<String, Value>) -> Self {
        let encoded = Value::Object(data.clone()).to_string();
        let mut element = Self {
            classes: WIDGET_CLASSES.iter().map(|c| c.to_string()).collect(),
            attributes: BTreeMap::new(),
        };
        element.set_attribute(ATTR_ID, id);
        element.set_attribute(ATTR_TYPE, widget_type);
        element.set_attribute(ATTR_TITLE, title);
        element.set_attribute(ATTR_DATA, encoded);
        element
    }

    /// Builds the tagged element for an existing config.
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self::for_widget(&config.id, &config.widget_type, &config.title, &config.data)
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Sets or replaces an attribute.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    /// Reads an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns `true` if the element has `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Requested placement for a node.
///
/// When either coordinate is `None` the engine picks the first free spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementHint {
    /// Column, or `None` to auto-position.
    pub x: Option<u32>,
    /// Row, or `None` to auto-position.
    pub y: Option<u32>,
    /// Width in columns.
    pub w: u32,
    /// Height in rows.
    pub h: u32,
}

impl PlacementHint {
    /// Size only; the engine chooses the position.
    pub fn auto(w: u32, h: u32) -> Self {
        Self {
            x: None,
            y: None,
            w,
            h,
        }
    }

    /// Explicit position and size.
    pub fn at(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            w,
            h,
        }
    }

    /// The placement recorded in a config.
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self::at(config.x, config.y, config.w, config.h)
    }
}

/// A placed element in the layout engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridNode {
    /// Engine-internal handle, unique per engine for the node's lifetime.
    pub key: u64,
    /// Column of the top-left cell.
    pub x: u32,
    /// Row of the top-left cell.
    pub y: u32,
    /// Width in columns.
    pub w: u32,
    /// Height in rows.
    pub h: u32,
    /// The wrapped element.
    pub element: NodeElement,
}

impl GridNode {
    /// The widget id from the `gs-id` attribute, if tagged.
    pub fn id(&self) -> Option<&str> {
        self.element.attribute(ATTR_ID)
    }

    /// Returns `true` when this node shares a cell with the given rectangle.
    pub fn overlaps(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        self.x < x.saturating_add(w)
            && x < self.right()
            && self.y < y.saturating_add(h)
            && y < self.bottom()
    }

    /// Column just right of the node.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    /// Row just below the node.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }
}
