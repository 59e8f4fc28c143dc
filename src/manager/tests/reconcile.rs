//! Reconciliation tests: surface gestures flowing back into the canonical list.

use super::{ids, initialized_manager, text_config, WidgetManager};
use crate::store::MemoryBackend;
use crate::surface::{GridEngine, NodeElement, PlacementHint, ATTR_ID, ATTR_TYPE};
use crate::{UNKNOWN_WIDGET_TYPE, UNTITLED_WIDGET};

/// Canonical configs and the surface's configs are the same list.
fn assert_in_sync(manager: &WidgetManager<GridEngine, MemoryBackend>) {
    let canonical: Vec<_> = manager
        .widgets()
        .iter()
        .map(|w| w.config().clone())
        .collect();
    assert_eq!(canonical, manager.surface().all_widgets());
}

#[test]
fn test_move_gesture_updates_canonical_list() {
    let mut manager = initialized_manager();
    let a = manager
        .add_widget_from_selection("text", "A", "📝", "")
        .expect("added");
    manager.save().expect("saved");

    assert!(manager.surface_mut().move_widget(&a, 6, 4));

    let widget = manager.widget(&a).expect("still present");
    assert_eq!((widget.config().x, widget.config().y), (6, 4));
    assert!(manager.has_unsaved_changes());
    assert_in_sync(&manager);
}

#[test]
fn test_resize_gesture_updates_canonical_list() {
    let mut manager = initialized_manager();
    let a = manager
        .add_widget_from_selection("chart", "Sales", "📊", "")
        .expect("added");
    assert!(manager.surface_mut().resize_widget(&a, 6, 4));
    let widget = manager.widget(&a).expect("still present");
    assert_eq!((widget.config().w, widget.config().h), (6, 4));
    assert_in_sync(&manager);
}

#[test]
fn test_move_pushes_neighbour_and_both_are_reconciled() {
    let mut manager = initialized_manager();
    let a = manager
        .add_widget_from_selection("text", "A", "📝", "")
        .expect("added");
    let b = manager
        .add_widget_from_selection("text", "B", "📝", "")
        .expect("added");

    // b sits at (3,0); moving it onto a pushes a below it.
    assert!(manager.surface_mut().move_widget(&b, 0, 0));
    let a_cfg = manager.widget(&a).expect("present").config().clone();
    let b_cfg = manager.widget(&b).expect("present").config().clone();
    assert_eq!((b_cfg.x, b_cfg.y), (0, 0));
    assert_eq!((a_cfg.x, a_cfg.y), (0, 2));
    assert_in_sync(&manager);
}

#[test]
fn test_drag_out_removes_from_canonical_list() {
    let mut manager = initialized_manager();
    let a = manager
        .add_widget_from_selection("text", "A", "📝", "")
        .expect("added");
    let b = manager
        .add_widget_from_selection("image", "B", "🖼️", "")
        .expect("added");
    manager.save().expect("saved");

    assert!(manager.surface_mut().drag_out(&a));
    assert_eq!(ids(&manager), vec![b]);
    assert!(manager.has_unsaved_changes());
}

#[test]
fn test_palette_drop_adds_widget_with_generated_id() {
    use crate::surface::PaletteItem;

    let mut manager = initialized_manager();
    let item = PaletteItem::new("chart", "Dropped", "📊", "From the palette");
    let id = manager
        .surface_mut()
        .drop_from_palette(&item, 3, 1)
        .expect("surface is bound");

    let widget = manager.widget(&id).expect("reconciled");
    assert_eq!(widget.widget_type(), "chart");
    assert_eq!(widget.config().title, "Dropped");
    assert_eq!((widget.config().x, widget.config().y), (3, 1));
    assert!(manager.has_unsaved_changes());
}

#[test]
fn test_untagged_external_element_gets_fallbacks() {
    let mut manager = initialized_manager();
    assert!(manager
        .surface_mut()
        .accept_external(NodeElement::new(), PlacementHint::auto(2, 2)));

    let widgets = manager.widgets();
    assert_eq!(widgets.len(), 1);
    let config = widgets[0].config();
    assert!(config.id.starts_with("fallback-"));
    assert_eq!(config.widget_type, UNKNOWN_WIDGET_TYPE);
    assert_eq!(config.title, UNTITLED_WIDGET);
    assert!(config.data.is_empty());
    assert_eq!(widgets[0].render().to_string(), "[unknown]");
}

#[test]
fn test_unregistered_type_renders_placeholder() {
    let mut manager = initialized_manager();
    let element = NodeElement::from_config(&text_config("legacy-1", 0, 0))
        .with_attribute(ATTR_TYPE, "legacy-clock");
    assert!(manager
        .surface_mut()
        .accept_external(element, PlacementHint::auto(3, 2)));

    let widget = manager.widget("legacy-1").expect("reconciled");
    assert_eq!(widget.widget_type(), "legacy-clock");
    assert_eq!(widget.render().to_string(), "[legacy-clock]");
    assert!(format!("{widget:?}").contains("placeholder"));
}

#[test]
fn test_external_duplicate_id_is_retagged() {
    let mut manager = initialized_manager();
    let a = manager
        .add_widget_from_selection("text", "A", "📝", "")
        .expect("added");
    let element = NodeElement::from_config(&text_config("ignored", 0, 0)).with_attribute(ATTR_ID, &a);
    assert!(manager
        .surface_mut()
        .accept_external(element, PlacementHint::auto(3, 2)));

    let all = ids(&manager);
    assert_eq!(all.len(), 2);
    assert_ne!(all[0], all[1]);
    assert_in_sync(&manager);
}

#[test]
fn test_static_grid_gesture_changes_nothing() {
    use crate::store::PersistentStore;
    use crate::surface::{Container, GridOptions, GridSurface};
    use crate::widgets::WidgetRegistry;

    let mut manager = WidgetManager::new(
        WidgetRegistry::new(),
        GridSurface::<GridEngine>::new(GridOptions {
            static_grid: true,
            ..GridOptions::default()
        }),
        PersistentStore::new(MemoryBackend::new()),
    );
    manager
        .initialize(&Container::new("dashboard"))
        .expect("bind");
    let a = manager
        .add_widget_from_selection("text", "A", "📝", "")
        .expect("added");
    manager.save().expect("saved");

    assert!(!manager.surface_mut().move_widget(&a, 6, 6));
    assert!(!manager.has_unsaved_changes());
    assert_eq!(manager.widget(&a).expect("present").config().x, 0);
}

#[test]
fn test_list_matches_surface_after_mixed_operations() {
    let mut manager = initialized_manager();
    let mut added = Vec::new();
    for widget_type in ["text", "chart", "image", "text"] {
        added.push(
            manager
                .add_widget_from_selection(widget_type, "W", "•", "")
                .expect("built in"),
        );
    }
    manager.surface_mut().move_widget(&added[3], 0, 0);
    manager.surface_mut().resize_widget(&added[1], 2, 5);
    manager.remove_widget(&added[2]);
    manager.surface_mut().drag_out(&added[0]);

    assert_in_sync(&manager);
    assert_eq!(manager.widgets().len(), 2);
}
