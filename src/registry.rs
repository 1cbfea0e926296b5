//! Node registry
//!
//! Process-wide lookup from entity id to a live node handle, used by other
//! parts of the host application for scroll-to and addressing. Entries are
//! ephemeral UI bookkeeping, not a source of truth for the hierarchy.
//!
//! Writers are exactly the navigator's lifecycle sync; no other component
//! may mutate this resource. Discipline is last-writer-wins per key.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::TreeNode;

/// Live handle to a mounted entity-bearing node.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityNodeHandle {
    /// Snapshot of the node, refreshed on every content update.
    pub node: TreeNode,
    /// The node's position-derived object id within the navigator.
    pub object_id: String,
}

/// Resource mapping entity id to its live node handle.
///
/// Invariant: at most one entry per entity id at any instant. When an id
/// changes, the old entry is removed and the new one installed within the
/// same sync pass; when only contents change, the entry is replaced.
#[derive(Resource, Default)]
pub struct NodeRegistry {
    entries: HashMap<String, EntityNodeHandle>,
}

impl NodeRegistry {
    /// Install, replace, or (with `None`) remove the entry for an id.
    pub fn register(&mut self, entity_id: &str, handle: Option<EntityNodeHandle>) {
        match handle {
            Some(handle) => {
                self.entries.insert(entity_id.to_string(), handle);
            }
            None => {
                self.entries.remove(entity_id);
            }
        }
    }

    pub fn lookup(&self, entity_id: &str) -> Option<&EntityNodeHandle> {
        self.entries.get(entity_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cleared on host shutdown together with the other registration lists.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoredEntity;

    fn handle(id: &str, object_id: &str) -> EntityNodeHandle {
        EntityNodeHandle {
            node: TreeNode::leaf(id, StoredEntity::new(id, "reports")),
            object_id: object_id.to_string(),
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = NodeRegistry::default();
        registry.register("a", Some(handle("a", "root/a")));

        let found = registry.lookup("a").unwrap();
        assert_eq!(found.object_id, "root/a");
        assert!(registry.lookup("b").is_none());
    }

    #[test]
    fn none_removes_the_entry() {
        let mut registry = NodeRegistry::default();
        registry.register("a", Some(handle("a", "root/a")));
        registry.register("a", None);
        assert!(registry.lookup("a").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn reregistration_replaces_in_place() {
        let mut registry = NodeRegistry::default();
        registry.register("a", Some(handle("a", "root/a")));
        registry.register("a", Some(handle("a", "root/moved/a")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("a").unwrap().object_id, "root/moved/a");
    }

    #[test]
    fn id_change_leaves_no_stale_entry() {
        let mut registry = NodeRegistry::default();
        registry.register("old", Some(handle("old", "root/x")));

        // Remove-then-install, as the lifecycle sync does for an id change.
        registry.register("old", None);
        registry.register("new", Some(handle("new", "root/x")));

        assert!(registry.lookup("old").is_none());
        assert_eq!(registry.lookup("new").unwrap().object_id, "root/x");
        assert_eq!(registry.len(), 1);
    }
}
