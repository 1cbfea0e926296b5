//! Drag-and-drop capabilities for tree nodes
//!
//! The tree abstracts its drag/drop framework as two small capabilities, a
//! drag source and a drop target, independent of any specific UI library.
//! The navigator wires them to egui pointer state and arbitrates hover so
//! that only the deepest target under the pointer reacts (shallow hover),
//! preventing ancestor targets from double-firing.

use smallvec::SmallVec;

use crate::components::{is_group_entity, TreeNode};

/// Payload carried by a dragged node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDragPayload {
    pub entity_set: String,
    pub is_group_entity: bool,
    pub is_collapsed: bool,
    pub node: TreeNode,
}

/// Reorder/insertion preview payload reported while hovering a target.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDragOverInfo {
    pub entity_set: String,
    pub is_group_entity: bool,
    pub is_collapsed: bool,
    pub target_node: TreeNode,
}

/// Typed drop outcome reported to the framework, never thrown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropResult {
    /// Loading nodes never accept structural mutation; the payload must
    /// not be applied.
    pub cancelled: bool,
}

/// Drag-source capability of one node instance.
pub trait DragSource {
    fn can_drag(&self) -> bool;
    /// Payload for a drag that is starting; `None` when the node cannot
    /// produce one (no backing entity).
    fn begin_drag(&self) -> Option<NodeDragPayload>;
}

/// Drop-target capability of one node instance.
pub trait DropTarget {
    fn can_accept(&self) -> bool;
    /// Preview payload for the external drag-over handler.
    fn hover(&self) -> Option<NodeDragOverInfo>;
    /// Drop outcome. `None` when a descendant target already consumed the
    /// drop (this target is a no-op); otherwise a typed result that is
    /// cancelled while the node is loading.
    fn drop_on(&self, descendant_consumed: bool) -> Option<DropResult>;
}

/// Per-render view of one node's drag/drop participation.
#[derive(Debug, Clone, Copy)]
pub struct NodeDragBehavior<'a> {
    pub node: &'a TreeNode,
    pub is_collapsed: bool,
    /// Selection mode disables drag/drop entirely.
    pub in_selection_mode: bool,
    pub draggable: bool,
    /// Loading nodes neither start drags nor accept drops.
    pub loading: bool,
}

impl DragSource for NodeDragBehavior<'_> {
    fn can_drag(&self) -> bool {
        !self.in_selection_mode && self.draggable && !self.loading
    }

    fn begin_drag(&self) -> Option<NodeDragPayload> {
        if !self.can_drag() {
            return None;
        }
        let entity = self.node.data.as_ref()?;
        Some(NodeDragPayload {
            entity_set: entity.entity_set.clone(),
            is_group_entity: is_group_entity(self.node),
            is_collapsed: self.is_collapsed,
            node: self.node.clone(),
        })
    }
}

impl DropTarget for NodeDragBehavior<'_> {
    fn can_accept(&self) -> bool {
        !self.in_selection_mode && self.draggable
    }

    fn hover(&self) -> Option<NodeDragOverInfo> {
        if !self.can_accept() {
            return None;
        }
        let entity = self.node.data.as_ref()?;
        Some(NodeDragOverInfo {
            entity_set: entity.entity_set.clone(),
            is_group_entity: is_group_entity(self.node),
            is_collapsed: self.is_collapsed,
            target_node: self.node.clone(),
        })
    }

    fn drop_on(&self, descendant_consumed: bool) -> Option<DropResult> {
        if descendant_consumed {
            return None;
        }
        Some(DropResult {
            cancelled: self.loading,
        })
    }
}

/// One hovered drop target collected during a render pass.
#[derive(Debug, Clone)]
pub struct DropCandidate {
    pub depth: usize,
    pub info: NodeDragOverInfo,
    /// Outcome the target would report if the drag released on it.
    pub drop: DropResult,
}

/// Shallow-hover arbitration: collects every target under the pointer
/// during a render pass and yields only the deepest one.
#[derive(Default)]
pub struct HoverArbiter {
    candidates: SmallVec<[DropCandidate; 8]>,
}

impl HoverArbiter {
    pub fn offer(&mut self, candidate: DropCandidate) {
        self.candidates.push(candidate);
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The innermost hovered target; later offers win depth ties since
    /// children are visited after their ancestors.
    pub fn take_deepest(&mut self) -> Option<DropCandidate> {
        let mut best: Option<DropCandidate> = None;
        for candidate in self.candidates.drain(..) {
            match &best {
                Some(current) if current.depth > candidate.depth => {}
                _ => best = Some(candidate),
            }
        }
        best
    }
}
