//! Entity store boundary
//!
//! This module handles:
//! - The `StoredEntity` record shape the tree reads (`children_loaded`,
//!   `selected`, `is_dirty`, `entity_set`)
//! - The `EntityStore` resource owning all entity records
//! - Building the canonical node hierarchy (entity-set roots + folder nesting)
//! - Pending lazy child-load bookkeeping for the host to drain

use bevy::prelude::*;
use bevy_reflect::Reflect;

use crate::components::TreeNode;
use crate::entity_sets::EntitySetRegistry;

/// A persisted entity as the store exposes it to the tree.
///
/// The tree never mutates these records directly; it reads snapshots and
/// reports intents (selection, save, remove) back through observer events.
#[derive(Debug, Clone, PartialEq, Eq, Reflect)]
pub struct StoredEntity {
    /// Unique, stable identifier.
    pub id: String,
    /// Which entity-set registry entry governs icon/name rendering.
    pub entity_set: String,
    /// Tri-state selection flag; anything but `Some(false)` means selected.
    pub selected: Option<bool>,
    /// Unsaved-changes marker, purely cosmetic (trailing `*`).
    pub is_dirty: bool,
    /// Set once by the store after a lazy child fetch completes.
    pub children_loaded: Option<bool>,
    /// Parent folder entity id, if nested.
    pub folder: Option<String>,
    /// Optional display name; falls back to the id.
    pub display_name: Option<String>,
}

impl StoredEntity {
    /// Create an entity record in the given set.
    pub fn new(id: impl Into<String>, entity_set: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_set: entity_set.into(),
            selected: None,
            is_dirty: false,
            children_loaded: None,
            folder: None,
            display_name: None,
        }
    }

    /// Builder: set the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Builder: nest under a folder entity.
    pub fn in_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.folder = Some(folder_id.into());
        self
    }

    /// Builder: mark children as already loaded.
    pub fn with_children_loaded(mut self) -> Self {
        self.children_loaded = Some(true);
        self
    }

    /// Selection semantics: only an explicit `Some(false)` is deselected.
    pub fn is_selected(&self) -> bool {
        self.selected != Some(false)
    }

    /// Display label, falling back to the id.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// Resource owning every entity record, in insertion order.
///
/// Mutation goes through the methods below so change detection drives the
/// navigator's tree rebuild.
#[derive(Resource, Default)]
pub struct EntityStore {
    entities: Vec<StoredEntity>,
    /// Entity ids with a child fetch in flight; the host drains these and
    /// eventually calls [`EntityStore::mark_children_loaded`].
    pending_child_loads: Vec<String>,
}

impl EntityStore {
    /// Insert or replace an entity record by id.
    pub fn insert(&mut self, entity: StoredEntity) {
        if let Some(existing) = self.entities.iter_mut().find(|e| e.id == entity.id) {
            *existing = entity;
        } else {
            self.entities.push(entity);
        }
    }

    pub fn get(&self, id: &str) -> Option<&StoredEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut StoredEntity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Remove an entity record, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<StoredEntity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    pub fn entities(&self) -> impl Iterator<Item = &StoredEntity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// True once the store reports children loaded for this id.
    pub fn children_loaded(&self, id: &str) -> bool {
        self.get(id).is_some_and(|e| e.children_loaded == Some(true))
    }

    /// Record a lazy child-fetch request. No-op when already loaded or
    /// already pending.
    pub fn request_children(&mut self, id: &str) {
        if self.children_loaded(id) || self.pending_child_loads.iter().any(|p| p == id) {
            return;
        }
        debug!("child fetch requested for entity {id}");
        self.pending_child_loads.push(id.to_string());
    }

    /// Drain the pending child-fetch requests for the host to service.
    pub fn take_pending_child_loads(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_child_loads)
    }

    /// Called by the host once a lazy child fetch completed.
    pub fn mark_children_loaded(&mut self, id: &str) {
        self.pending_child_loads.retain(|p| p != id);
        match self.get_mut(id) {
            Some(entity) => entity.children_loaded = Some(true),
            None => warn!("children loaded for unknown entity {id}"),
        }
    }

    /// Flip the selection flag on a set of entities.
    pub fn set_selected(&mut self, ids: &[String], checked: bool) {
        for entity in &mut self.entities {
            if ids.iter().any(|id| *id == entity.id) {
                entity.selected = Some(checked);
            }
        }
    }

    /// Clear the dirty marker after a save.
    pub fn mark_saved(&mut self, id: &str) {
        match self.get_mut(id) {
            Some(entity) => entity.is_dirty = false,
            None => warn!("save for unknown entity {id}"),
        }
    }

    pub fn mark_dirty(&mut self, id: &str) {
        if let Some(entity) = self.get_mut(id) {
            entity.is_dirty = true;
        }
    }

    /// Build the canonical node hierarchy the navigator renders.
    ///
    /// One root group per registered entity set, in registration order.
    /// Entities of a container set become group-entity nodes holding the
    /// entities nested under them; everything else becomes a leaf.
    pub fn build_tree(&self, sets: &EntitySetRegistry) -> Vec<TreeNode> {
        sets.names()
            .map(|set_name| {
                let items = self
                    .entities
                    .iter()
                    .filter(|e| e.entity_set == set_name && e.folder.is_none())
                    .map(|e| self.node_for(e, sets))
                    .collect();
                TreeNode {
                    name: set_name.to_string(),
                    data: None,
                    items: Some(items),
                    is_entity_set: true,
                }
            })
            .collect()
    }

    fn node_for(&self, entity: &StoredEntity, sets: &EntitySetRegistry) -> TreeNode {
        let is_container = sets
            .get(&entity.entity_set)
            .is_some_and(|def| def.container);
        let items = is_container.then(|| {
            self.entities
                .iter()
                .filter(|e| e.folder.as_deref() == Some(entity.id.as_str()))
                .map(|e| self.node_for(e, sets))
                .collect::<Vec<_>>()
        });
        TreeNode {
            name: sets.display_name(entity),
            data: Some(entity.clone()),
            items,
            is_entity_set: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{is_group, is_group_entity};
    use crate::entity_sets::EntitySetDef;

    fn registry() -> EntitySetRegistry {
        let mut sets = EntitySetRegistry::default();
        sets.register(EntitySetDef::new("folders", "📂").container());
        sets.register(EntitySetDef::new("reports", "📄"));
        sets
    }

    #[test]
    fn build_tree_groups_by_set_in_registration_order() {
        let mut store = EntityStore::default();
        store.insert(StoredEntity::new("r1", "reports"));
        store.insert(StoredEntity::new("f1", "folders"));

        let roots = store.build_tree(&registry());
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].name, "folders");
        assert_eq!(roots[1].name, "reports");
        assert!(roots.iter().all(|r| r.is_entity_set && is_group(r)));
    }

    #[test]
    fn container_entities_become_group_entity_nodes() {
        let mut store = EntityStore::default();
        store.insert(StoredEntity::new("f1", "folders").with_children_loaded());
        store.insert(StoredEntity::new("r1", "reports").in_folder("f1"));

        let roots = store.build_tree(&registry());
        let folder = &roots[0].items.as_ref().unwrap()[0];
        assert!(is_group_entity(folder));
        assert_eq!(folder.items.as_ref().unwrap().len(), 1);
        assert_eq!(
            folder.items.as_ref().unwrap()[0].data.as_ref().unwrap().id,
            "r1"
        );
        // Nested entities do not also appear at the set root.
        assert_eq!(roots[1].items.as_ref().unwrap().len(), 0);
    }

    #[test]
    fn request_children_is_idempotent_and_cleared_on_completion() {
        let mut store = EntityStore::default();
        store.insert(StoredEntity::new("f1", "folders"));

        store.request_children("f1");
        store.request_children("f1");
        assert_eq!(store.take_pending_child_loads(), vec!["f1".to_string()]);

        store.mark_children_loaded("f1");
        store.request_children("f1");
        assert!(store.take_pending_child_loads().is_empty());
        assert!(store.children_loaded("f1"));
    }

    #[test]
    fn selection_flag_semantics() {
        let mut entity = StoredEntity::new("r1", "reports");
        assert!(entity.is_selected());
        entity.selected = Some(false);
        assert!(!entity.is_selected());
        entity.selected = Some(true);
        assert!(entity.is_selected());
    }
}
