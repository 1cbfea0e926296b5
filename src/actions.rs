//! Editor action glue
//!
//! This module handles:
//! - Forwarding collapse requests to the navigator's collapse state and the
//!   store's lazy child fetch
//! - Applying cascaded selection toggles to the entity store
//! - Tab bookkeeping for activated entities
//! - Node actions dispatched from the context menu (open, save, remove,
//!   new folder)

use bevy::prelude::*;

use crate::editor_state::{
    CollapseNodeRequested, EditorState, EntityActivated, NodeAction, NodeActionTriggered,
    NodeSelectionChanged,
};
use crate::store::{EntityStore, StoredEntity};

/// Observer to handle collapse/expand requests
///
/// Toggles the navigator-owned collapse state; expanding a group-entity
/// whose children are not loaded yet kicks off the lazy child fetch.
pub fn handle_collapse_request(
    trigger: Trigger<CollapseNodeRequested>,
    mut editor_state: ResMut<EditorState>,
    mut store: ResMut<EntityStore>,
) {
    let event = trigger.event();
    editor_state.toggle_collapsed(&event.object_id);

    if let Some(id) = &event.id {
        if !editor_state.is_collapsed(&event.object_id) {
            store.request_children(id);
        }
    }
}

/// Observer to apply a cascaded selection toggle to the store.
pub fn handle_selection_changed(
    trigger: Trigger<NodeSelectionChanged>,
    mut store: ResMut<EntityStore>,
) {
    let event = trigger.event();
    store.set_selected(&event.entity_ids, event.checked);
}

/// Observer to open a tab for a clicked entity.
pub fn handle_entity_activated(
    trigger: Trigger<EntityActivated>,
    mut editor_state: ResMut<EditorState>,
) {
    editor_state.open_tab(&trigger.event().id);
}

/// Observer to handle node actions triggered from context menus
pub fn handle_node_action(
    trigger: Trigger<NodeActionTriggered>,
    mut editor_state: ResMut<EditorState>,
    mut store: ResMut<EntityStore>,
) {
    let event = trigger.event();

    match event.action {
        NodeAction::Open => {
            editor_state.open_tab(&event.entity_id);
        }
        NodeAction::Save => {
            store.mark_saved(&event.entity_id);
            info!("saved entity {}", event.entity_id);
        }
        NodeAction::Remove => {
            if store.remove(&event.entity_id).is_none() {
                warn!("remove for unknown entity {}", event.entity_id);
                return;
            }
            editor_state.close_tab(&event.entity_id);
        }
        NodeAction::NewFolder => {
            let Some(parent_set) = store.get(&event.entity_id).map(|e| e.entity_set.clone())
            else {
                warn!("new folder under unknown entity {}", event.entity_id);
                return;
            };
            let id = format!("{}-folder-{}", event.entity_id, store.len());
            let mut folder = StoredEntity::new(id, "folders")
                .named("untitled folder")
                .with_children_loaded();
            folder.is_dirty = true;
            // Nest under container entities; otherwise create as a sibling.
            if parent_set == "folders" {
                folder.folder = Some(event.entity_id.clone());
            } else if let Some(parent_folder) =
                store.get(&event.entity_id).and_then(|e| e.folder.clone())
            {
                folder.folder = Some(parent_folder);
            }
            store.insert(folder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_sets::{EntitySetDef, EntitySetRegistry};
    use crate::registry::NodeRegistry;
    use crate::components::NodeStates;
    use crate::navigator;

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<EditorState>()
            .init_resource::<EntityStore>()
            .init_resource::<EntitySetRegistry>()
            .init_resource::<NodeRegistry>()
            .init_resource::<NodeStates>();
        app.add_observer(handle_collapse_request)
            .add_observer(handle_selection_changed)
            .add_observer(handle_entity_activated)
            .add_observer(handle_node_action);
        app.add_systems(Update, navigator::rebuild_tree);
        app
    }

    fn seed(app: &mut App) {
        {
            let mut sets = app.world_mut().resource_mut::<EntitySetRegistry>();
            sets.register(EntitySetDef::new("folders", "📂").container());
            sets.register(EntitySetDef::new("reports", "📄"));
        }
        let mut store = app.world_mut().resource_mut::<EntityStore>();
        store.insert(StoredEntity::new("f1", "folders"));
        store.insert(StoredEntity::new("r1", "reports").in_folder("f1"));
    }

    #[test]
    fn expanding_an_unloaded_group_entity_requests_children() {
        let mut app = test_app();
        seed(&mut app);
        app.update();

        // Nodes start expanded; the first toggle collapses, the second
        // expands and must kick the fetch.
        app.world_mut().commands().trigger(CollapseNodeRequested {
            object_id: "root/folders/f1".into(),
            id: Some("f1".into()),
        });
        app.update();
        assert!(app
            .world_mut()
            .resource_mut::<EntityStore>()
            .take_pending_child_loads()
            .is_empty());

        app.world_mut().commands().trigger(CollapseNodeRequested {
            object_id: "root/folders/f1".into(),
            id: Some("f1".into()),
        });
        app.update();
        assert_eq!(
            app.world_mut()
                .resource_mut::<EntityStore>()
                .take_pending_child_loads(),
            vec!["f1".to_string()]
        );
    }

    #[test]
    fn selection_cascade_applies_one_checked_value() {
        let mut app = test_app();
        seed(&mut app);

        app.world_mut().commands().trigger(NodeSelectionChanged {
            entity_ids: vec!["f1".into(), "r1".into()],
            checked: false,
        });
        app.update();

        let store = app.world().resource::<EntityStore>();
        assert_eq!(store.get("f1").unwrap().selected, Some(false));
        assert_eq!(store.get("r1").unwrap().selected, Some(false));
    }

    #[test]
    fn remove_closes_the_entity_tab() {
        let mut app = test_app();
        seed(&mut app);
        app.world_mut().commands().trigger(EntityActivated { id: "r1".into() });
        app.update();
        assert!(app.world().resource::<EditorState>().is_active("r1"));

        app.world_mut().commands().trigger(NodeActionTriggered {
            entity_id: "r1".into(),
            action: NodeAction::Remove,
        });
        app.update();

        let state = app.world().resource::<EditorState>();
        assert!(state.open_tabs.is_empty());
        assert!(app.world().resource::<EntityStore>().get("r1").is_none());
    }
}
