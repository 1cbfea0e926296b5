//! Editor state management, events, and shared types

use bevy::prelude::*;
use egui::Pos2;
use std::collections::HashSet;
use std::time::Duration;

use crate::components::TreeNode;
use crate::dragdrop::{NodeDragOverInfo, NodeDragPayload};

/// Configuration of the tree panel, owned by the plugin.
#[derive(Resource)]
pub struct TreeConfig {
    /// Horizontal indentation per depth level, in points.
    pub padding_by_level: f32,
    /// Grace period before a pending child fetch shows its indicator.
    pub loading_indicator_delay: Duration,
    /// Whether nodes participate in drag-and-drop at all.
    pub draggable: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            padding_by_level: 14.0,
            loading_indicator_delay: Duration::from_millis(250),
            draggable: true,
        }
    }
}

/// A pending context-menu request.
#[derive(Debug, Clone)]
pub struct ContextMenuState {
    pub entity_id: String,
    pub position: Pos2,
}

/// Resource that holds the navigator's UI state
///
/// The navigator owns the canonical node array and all collapse, selection
/// and active-entity state; tree nodes only report intents upward.
#[derive(Resource, Default)]
pub struct EditorState {
    /// Canonical node hierarchy, rebuilt from the entity store.
    pub nodes: Vec<TreeNode>,
    /// Object ids of collapsed nodes; absent means expanded.
    collapsed: HashSet<String>,
    /// Selection mode swaps collapse-on-click for checkbox selection.
    pub selection_mode: bool,
    /// Entity currently highlighted as active in the tree.
    pub active_entity: Option<String>,
    /// Entity for which a context menu is requested.
    pub context_menu: Option<ContextMenuState>,
    /// Open editor tabs, in opening order.
    pub open_tabs: Vec<String>,
    /// Currently focused tab.
    pub active_tab: Option<String>,
}

impl EditorState {
    pub fn is_collapsed(&self, object_id: &str) -> bool {
        self.collapsed.contains(object_id)
    }

    pub fn toggle_collapsed(&mut self, object_id: &str) {
        if !self.collapsed.remove(object_id) {
            self.collapsed.insert(object_id.to_string());
        }
    }

    /// Open a tab for an entity (or focus it if already open) and make the
    /// entity active.
    pub fn open_tab(&mut self, entity_id: &str) {
        if !self.open_tabs.iter().any(|t| t == entity_id) {
            self.open_tabs.push(entity_id.to_string());
        }
        self.active_tab = Some(entity_id.to_string());
        self.active_entity = Some(entity_id.to_string());
    }

    /// Close a tab, focusing the previous one if the closed tab was active.
    pub fn close_tab(&mut self, entity_id: &str) {
        self.open_tabs.retain(|t| t != entity_id);
        if self.active_tab.as_deref() == Some(entity_id) {
            self.active_tab = self.open_tabs.last().cloned();
            self.active_entity = self.active_tab.clone();
        }
    }

    pub fn is_active(&self, entity_id: &str) -> bool {
        self.active_entity.as_deref() == Some(entity_id)
    }
}

/// Event fired when a node requests a collapse/expand toggle
///
/// The entity id is attached only for group-entity nodes; the external
/// handler uses it to kick off the lazy child fetch.
#[derive(Event, Debug, Clone)]
pub struct CollapseNodeRequested {
    pub object_id: String,
    pub id: Option<String>,
}

/// Event fired when a selection checkbox cascades over a hierarchy.
#[derive(Event, Debug, Clone)]
pub struct NodeSelectionChanged {
    /// Every entity-bearing descendant, depth-first.
    pub entity_ids: Vec<String>,
    /// Identical value applied to each of them.
    pub checked: bool,
}

/// Event fired by the "new entity" affordance of an entity-set root.
#[derive(Event, Debug, Clone)]
pub struct NewEntityRequested {
    pub entity_set: String,
}

/// Event fired when a leaf entity is clicked.
#[derive(Event, Debug, Clone)]
pub struct EntityActivated {
    pub id: String,
}

/// Event fired when a context menu is requested for a node
#[derive(Event, Debug, Clone)]
pub struct NodeContextMenuRequested {
    pub entity_id: String,
    pub position: Pos2,
}

/// Available actions that can be performed on nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Open,
    Save,
    Remove,
    NewFolder,
}

/// Event fired when a node action is triggered
#[derive(Event, Debug, Clone)]
pub struct NodeActionTriggered {
    pub entity_id: String,
    pub action: NodeAction,
}

/// Event fired while a drag hovers the deepest target under the pointer.
#[derive(Event, Debug, Clone)]
pub struct NodeDragOver {
    pub info: NodeDragOverInfo,
}

/// Event fired when a drag is released over a target
///
/// A cancelled drop must not be applied to the hierarchy.
#[derive(Event, Debug, Clone)]
pub struct NodeDropped {
    pub payload: NodeDragPayload,
    pub target: NodeDragOverInfo,
    pub cancelled: bool,
}
