//! Tree node values and the node classifier
//!
//! This module handles:
//! - The `TreeNode` value the navigator owns and renders
//! - Pure classification predicates (group / group-entity / leaf entity)
//! - Addressable ids for entity-bearing nodes
//! - Depth-first flattening of every entity in a hierarchy

use crate::store::StoredEntity;

/// One node of the canonical hierarchy.
///
/// Values are rebuilt from the entity store on every relevant change and
/// carry no identity beyond `data.id`; per-node UI state lives elsewhere,
/// keyed by the node's object id.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Display label.
    pub name: String,
    /// Present for entity-backed nodes; `None` for pure structural groups.
    pub data: Option<StoredEntity>,
    /// Children; `None` for leaf entities.
    pub items: Option<Vec<TreeNode>>,
    /// Marks a group that represents an entity-set root (supports "new").
    pub is_entity_set: bool,
}

impl TreeNode {
    /// Create a structural group node.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: None,
            items: Some(Vec::new()),
            is_entity_set: false,
        }
    }

    /// Create a leaf node backed by an entity.
    pub fn leaf(name: impl Into<String>, entity: StoredEntity) -> Self {
        Self {
            name: name.into(),
            data: Some(entity),
            items: None,
            is_entity_set: false,
        }
    }

    /// Builder: append a child node.
    pub fn child(mut self, node: TreeNode) -> Self {
        self.items.get_or_insert_with(Vec::new).push(node);
        self
    }

    /// Builder: back this node by an entity.
    pub fn backed_by(mut self, entity: StoredEntity) -> Self {
        self.data = Some(entity);
        self
    }

    /// Builder: mark as an entity-set root.
    pub fn entity_set_root(mut self) -> Self {
        self.is_entity_set = true;
        self
    }

    /// The entity id backing this node, if any.
    pub fn entity_id(&self) -> Option<&str> {
        self.data.as_ref().map(|e| e.id.as_str())
    }
}

/// True iff the node has children (structural folder or group-entity).
pub fn is_group(node: &TreeNode) -> bool {
    node.items.is_some()
}

/// True iff the node is a group additionally backed by a persisted entity.
/// Implies [`is_group`].
pub fn is_group_entity(node: &TreeNode) -> bool {
    is_group(node) && node.data.is_some()
}

/// True iff the node participates in the registry and carries an entity id:
/// leaf entities and group-entities. Pure structural groups do not.
pub fn is_entity_node(node: &TreeNode) -> bool {
    if is_group(node) {
        is_group_entity(node)
    } else {
        node.data.is_some()
    }
}

/// Addressable id for an entity-bearing node; structural groups are not
/// individually addressable.
pub fn node_dom_id(node: &TreeNode) -> Option<String> {
    if !is_entity_node(node) {
        return None;
    }
    node.data.as_ref().map(|e| format!("entity-node-{}", e.id))
}

/// Addressable id for an entity-bearing node's title element.
pub fn node_title_dom_id(node: &TreeNode) -> Option<String> {
    if !is_entity_node(node) {
        return None;
    }
    node.data.as_ref().map(|e| format!("entity-node-title-{}", e.id))
}

/// Flatten every entity-bearing node reachable from `node`, depth-first and
/// order-preserving. Used to cascade a selection toggle to descendants.
pub fn all_entities_in_hierarchy(node: &TreeNode, include_self: bool) -> Vec<&StoredEntity> {
    let mut out = Vec::new();
    collect_entities(node, include_self, &mut out);
    out
}

fn collect_entities<'a>(node: &'a TreeNode, include_self: bool, out: &mut Vec<&'a StoredEntity>) {
    if include_self && is_entity_node(node) {
        if let Some(entity) = &node.data {
            out.push(entity);
        }
    }
    if let Some(items) = &node.items {
        for child in items {
            collect_entities(child, true, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str) -> StoredEntity {
        StoredEntity::new(id, "reports")
    }

    fn sample_tree() -> TreeNode {
        TreeNode::group("root")
            .child(
                TreeNode::group("folder-a")
                    .backed_by(entity("a"))
                    .child(TreeNode::leaf("a1", entity("a1")))
                    .child(TreeNode::leaf("a2", entity("a2"))),
            )
            .child(TreeNode::group("empty"))
            .child(TreeNode::leaf("b", entity("b")))
    }

    #[test]
    fn group_entity_implies_group() {
        let group = TreeNode::group("g");
        let group_entity = TreeNode::group("ge").backed_by(entity("ge"));
        let leaf = TreeNode::leaf("l", entity("l"));

        assert!(is_group(&group) && !is_group_entity(&group));
        assert!(is_group(&group_entity) && is_group_entity(&group_entity));
        assert!(!is_group(&leaf) && !is_group_entity(&leaf));
    }

    #[test]
    fn structural_groups_are_not_addressable() {
        let group = TreeNode::group("g");
        assert_eq!(node_dom_id(&group), None);
        assert_eq!(node_title_dom_id(&group), None);

        let leaf = TreeNode::leaf("l", entity("x"));
        assert_eq!(node_dom_id(&leaf).as_deref(), Some("entity-node-x"));
        assert_eq!(
            node_title_dom_id(&leaf).as_deref(),
            Some("entity-node-title-x")
        );
    }

    #[test]
    fn hierarchy_flattening_is_depth_first_and_ordered() {
        let tree = sample_tree();
        let ids: Vec<_> = all_entities_in_hierarchy(&tree, true)
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();
        // Root is a pure structural group, so include_self contributes nothing.
        assert_eq!(ids, ["a", "a1", "a2", "b"]);
    }

    #[test]
    fn include_self_adds_the_entity_bearing_root() {
        let folder = TreeNode::group("f")
            .backed_by(entity("f"))
            .child(TreeNode::leaf("c", entity("c")));

        let with_self: Vec<_> = all_entities_in_hierarchy(&folder, true)
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(with_self, ["f", "c"]);

        let without_self: Vec<_> = all_entities_in_hierarchy(&folder, false)
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(without_self, ["c"]);
    }
}
