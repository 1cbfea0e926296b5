//! Tree navigator
//!
//! This module handles:
//! - Rebuilding the canonical node array from the entity store
//! - The node registration lifecycle (mount, update, unmount) driving the
//!   node registry, with removals applied before installs in one pass
//! - Ticking per-node loading states against the store and clock
//! - Recursive rendering of tree nodes (group and leaf branches)
//! - Shallow drag-over arbitration and drop delivery

use bevy::prelude::*;
use bevy_ecs::system::SystemParam;
use bevy_egui::egui;
use std::collections::HashMap;
use std::time::Duration;

use crate::components::{
    all_entities_in_hierarchy, is_entity_node, is_group, is_group_entity, node_dom_id, NodeKind,
    NodeStates, TreeNode,
};
use crate::dragdrop::{
    DragSource, DropCandidate, DropTarget, HoverArbiter, NodeDragBehavior, NodeDragPayload,
};
use crate::editor_state::{
    CollapseNodeRequested, EditorState, EntityActivated, NewEntityRequested,
    NodeContextMenuRequested, NodeDragOver, NodeDropped, NodeSelectionChanged, TreeConfig,
};
use crate::entity_sets::EntitySetRegistry;
use crate::extensions::{ExtensionComponents, ExtensionSlot, SlotProps};
use crate::icons::{IconContext, IconResolvers};
use crate::registry::{EntityNodeHandle, NodeRegistry};
use crate::store::EntityStore;

/// Object id of the (invisible) tree root.
pub const ROOT_OBJECT_ID: &str = "root";

/// Position-derived object id of a child node.
pub fn child_object_id(parent_object_id: &str, name: &str) -> String {
    format!("{parent_object_id}/{name}")
}

/// Everything the tree panel reads and writes each frame.
#[derive(SystemParam)]
pub struct TreeContext<'w> {
    pub editor_state: ResMut<'w, EditorState>,
    pub config: Res<'w, TreeConfig>,
    pub entity_sets: Res<'w, EntitySetRegistry>,
    pub icon_resolvers: Res<'w, IconResolvers>,
    pub extensions: Res<'w, ExtensionComponents>,
    pub node_states: ResMut<'w, NodeStates>,
    pub time: Res<'w, Time>,
}

/// Borrowed view of one render pass over the tree.
pub struct NavigatorFrame<'w, 's, 'a> {
    pub editor_state: &'a EditorState,
    pub config: &'a TreeConfig,
    pub entity_sets: &'a EntitySetRegistry,
    pub icon_resolvers: &'a IconResolvers,
    pub extensions: &'a ExtensionComponents,
    pub node_states: &'a mut NodeStates,
    pub commands: &'a mut Commands<'w, 's>,
    pub now: Duration,
    arbiter: HoverArbiter,
}

impl<'w, 's, 'a> NavigatorFrame<'w, 's, 'a> {
    pub fn new(
        editor_state: &'a EditorState,
        config: &'a TreeConfig,
        entity_sets: &'a EntitySetRegistry,
        icon_resolvers: &'a IconResolvers,
        extensions: &'a ExtensionComponents,
        node_states: &'a mut NodeStates,
        commands: &'a mut Commands<'w, 's>,
        now: Duration,
    ) -> Self {
        Self {
            editor_state,
            config,
            entity_sets,
            icon_resolvers,
            extensions,
            node_states,
            commands,
            now,
            arbiter: HoverArbiter::default(),
        }
    }
}

/// System to rebuild the canonical node array whenever the store or the
/// entity-set registry changed.
pub fn rebuild_tree(
    store: Res<EntityStore>,
    entity_sets: Res<EntitySetRegistry>,
    mut editor_state: ResMut<EditorState>,
) {
    if store.is_changed() || entity_sets.is_changed() {
        editor_state.nodes = store.build_tree(&entity_sets);
    }
}

fn visit_nodes<'a>(
    nodes: &'a [TreeNode],
    parent_object_id: &str,
    f: &mut impl FnMut(String, &'a TreeNode),
) {
    for node in nodes {
        let object_id = child_object_id(parent_object_id, &node.name);
        f(object_id.clone(), node);
        if let Some(items) = &node.items {
            visit_nodes(items, &object_id, f);
        }
    }
}

/// System implementing the node registration lifecycle
///
/// Diffs the current hierarchy against the previously mounted one, keyed by
/// object id. Retirements (unmounts and entity-id changes) run before
/// installs so a changed id never leaves a stale entry and never observably
/// holds both or neither entry. Content-only changes refresh the handle in
/// place. An entity-id change also drops the node's transient UI state
/// (remount semantics).
pub fn sync_node_registry(
    editor_state: Res<EditorState>,
    mut registry: ResMut<NodeRegistry>,
    mut node_states: ResMut<NodeStates>,
    mut mounted: Local<HashMap<String, Option<String>>>,
) {
    let mut current: Vec<(String, &TreeNode)> = Vec::new();
    visit_nodes(&editor_state.nodes, ROOT_OBJECT_ID, &mut |object_id, node| {
        current.push((object_id, node));
    });

    let current_ids: HashMap<String, Option<String>> = current
        .iter()
        .map(|(object_id, node)| {
            let entity_id = is_entity_node(node)
                .then(|| node.entity_id().map(str::to_string))
                .flatten();
            (object_id.clone(), entity_id)
        })
        .collect();

    // Retire before installing.
    for (object_id, prev_entity_id) in mounted.iter() {
        let next_entity_id = current_ids.get(object_id);
        let unmounted = next_entity_id.is_none();
        let id_changed = next_entity_id.is_some_and(|next| next != prev_entity_id);
        if unmounted || id_changed {
            if let Some(prev_id) = prev_entity_id {
                registry.register(prev_id, None);
            }
            node_states.remove(object_id);
        }
    }

    // Install mounts and refresh surviving handles with fresh snapshots.
    for (object_id, node) in &current {
        if !is_entity_node(node) {
            continue;
        }
        let Some(entity) = &node.data else { continue };
        registry.register(
            &entity.id,
            Some(EntityNodeHandle {
                node: (*node).clone(),
                object_id: object_id.clone(),
            }),
        );
    }

    *mounted = current_ids;
}

/// System advancing per-node loading states against the store and clock.
///
/// The deferred indicator check reads the store's current flag when the
/// deadline fires, so a fire after the fetch completed is a no-op.
pub fn tick_loading_states(
    mut node_states: ResMut<NodeStates>,
    store: Res<EntityStore>,
    time: Res<Time>,
) {
    let now = time.elapsed();
    for (_, state) in node_states.iter_mut() {
        if !state.is_loading() {
            continue;
        }
        let Some(entity_id) = state.entity_id.clone() else {
            continue;
        };
        if store.children_loaded(&entity_id) {
            state.complete_child_load();
        } else {
            state.tick(now, false);
        }
    }
}

/// Render the whole tree into `ui` and finalize drag/drop arbitration.
pub fn render_entity_tree(ui: &mut egui::Ui, frame: &mut NavigatorFrame, roots: &[TreeNode]) {
    for node in roots {
        render_node(frame, ui, node, 0, ROOT_OBJECT_ID);
    }
    finish_drag_frame(ui, frame);
}

fn render_node(
    frame: &mut NavigatorFrame,
    ui: &mut egui::Ui,
    node: &TreeNode,
    depth: usize,
    parent_object_id: &str,
) {
    let object_id = child_object_id(parent_object_id, &node.name);
    match NodeKind::of(node) {
        NodeKind::Group | NodeKind::GroupEntity => {
            render_group_node(frame, ui, node, depth, &object_id);
        }
        NodeKind::LeafEntity => render_entity_node(frame, ui, node, depth, &object_id),
    }
}

fn indent_for(depth: usize, config: &TreeConfig) -> f32 {
    (depth as f32 + 1.0) * config.padding_by_level
}

fn render_group_node(
    frame: &mut NavigatorFrame,
    ui: &mut egui::Ui,
    node: &TreeNode,
    depth: usize,
    object_id: &str,
) {
    let group_is_entity = is_group_entity(node);
    let is_collapsed = frame.editor_state.is_collapsed(object_id);
    let (loading, animating) = match frame.node_states.get(object_id) {
        Some(state) => (state.is_loading(), state.shows_indicator()),
        None => (false, false),
    };
    let extensions = frame.extensions;
    // Addressable scope id for entity-bearing nodes; structural groups fall
    // back to their position-derived object id.
    let scope_id = node_dom_id(node).unwrap_or_else(|| object_id.to_string());

    ui.push_id(scope_id, |ui| {
        if animating {
            ui.set_opacity(0.6);
        }

        let header = ui
            .horizontal(|ui| {
                ui.add_space(indent_for(depth, frame.config));

                if frame.editor_state.selection_mode {
                    let mut checked = node.data.as_ref().map_or(true, |e| e.is_selected());
                    if ui.checkbox(&mut checked, "").changed() {
                        frame.commands.trigger(NodeSelectionChanged {
                            entity_ids: hierarchy_entity_ids(node),
                            checked,
                        });
                    }
                }

                let title_response = ui.selectable_label(
                    node_is_active(frame.editor_state, node),
                    group_title(frame, node, is_collapsed),
                );

                if animating {
                    let dots = 1 + (ui.input(|i| i.time) * 3.0) as usize % 3;
                    ui.label(".".repeat(dots));
                    ui.ctx().request_repaint();
                }

                if let Some(entity) = &node.data {
                    extensions.render_list(ExtensionSlot::GroupRight, ui, &SlotProps { entity });
                }

                if node.is_entity_set && !frame.editor_state.selection_mode {
                    if ui.small_button("+").clicked() {
                        frame.commands.trigger(NewEntityRequested {
                            entity_set: node.name.clone(),
                        });
                    }
                }

                title_response
            })
            .inner;

        if header.clicked() {
            if frame.editor_state.selection_mode {
                // Selection mode and collapse-by-click are mutually
                // exclusive; the title drives selection here.
                let checked = node.data.as_ref().map_or(true, |e| e.is_selected());
                frame.commands.trigger(NodeSelectionChanged {
                    entity_ids: hierarchy_entity_ids(node),
                    checked: !checked,
                });
            } else {
                request_collapse(frame, node, object_id);
            }
        }

        if group_is_entity && !loading && header.secondary_clicked() {
            if let Some(entity) = &node.data {
                frame.commands.trigger(NodeContextMenuRequested {
                    entity_id: entity.id.clone(),
                    position: header.interact_pointer_pos().unwrap_or(header.rect.min),
                });
            }
        }

        node_drag_drop(frame, &header, node, depth, is_collapsed, loading);

        if !is_collapsed {
            if let Some(items) = &node.items {
                for child in items {
                    render_node(frame, ui, child, depth + 1, object_id);
                }
            }
        }
    });
}

fn group_title(frame: &NavigatorFrame, node: &TreeNode, is_collapsed: bool) -> String {
    let arrow = if is_collapsed { "▸" } else { "▾" };
    let mut title = format!("{arrow} ");
    if let Some(entity) = &node.data {
        if let Some(icon) = frame
            .icon_resolvers
            .resolve(entity, &IconContext { is_collapsed })
        {
            title.push_str(icon);
            title.push(' ');
        }
    }
    title.push_str(&node.name);
    if is_group_entity(node) && node.data.as_ref().is_some_and(|e| e.is_dirty) {
        title.push('*');
    }
    title
}

fn render_entity_node(
    frame: &mut NavigatorFrame,
    ui: &mut egui::Ui,
    node: &TreeNode,
    depth: usize,
    _object_id: &str,
) {
    let Some(entity) = &node.data else {
        // Childless node without a backing entity: host defect, render the
        // bare label and move on.
        warn!("leaf node {} has no entity data", node.name);
        ui.horizontal(|ui| {
            ui.add_space(indent_for(depth, frame.config));
            ui.label(&node.name);
        });
        return;
    };
    let extensions = frame.extensions;
    let scope_id = node_dom_id(node).unwrap_or_else(|| node.name.clone());

    ui.push_id(scope_id, |ui| {
        ui.horizontal(|ui| {
            ui.add_space(indent_for(depth, frame.config));

            let props = SlotProps { entity };
            extensions.render_container(ui, &props, &mut |ui| {
                if frame.editor_state.selection_mode {
                    let mut checked = entity.is_selected();
                    ui.add_enabled(false, egui::Checkbox::new(&mut checked, ""));
                }

                let icon = frame
                    .icon_resolvers
                    .resolve(entity, &IconContext::default())
                    .unwrap_or_else(|| frame.entity_sets.default_icon(entity));
                let dirty = if entity.is_dirty { "*" } else { "" };
                let label = format!("{icon} {}{dirty}", frame.entity_sets.display_name(entity));

                let response =
                    ui.selectable_label(frame.editor_state.is_active(&entity.id), label);
                if response.clicked() {
                    frame.commands.trigger(EntityActivated {
                        id: entity.id.clone(),
                    });
                }
                if response.secondary_clicked() {
                    frame.commands.trigger(NodeContextMenuRequested {
                        entity_id: entity.id.clone(),
                        position: response.interact_pointer_pos().unwrap_or(response.rect.min),
                    });
                }
                node_drag_drop(frame, &response, node, depth, false, false);

                extensions.render_list(ExtensionSlot::Right, ui, &props);
            });
        });
    });
}

/// Forward a collapse toggle upward, entering the loading lifecycle first
/// for group-entities whose children are not loaded. Ignored entirely while
/// the node is already loading.
fn request_collapse(frame: &mut NavigatorFrame, node: &TreeNode, object_id: &str) {
    if frame.node_states.is_loading(object_id) {
        return;
    }

    let mut id = None;
    if is_group(node) {
        if let Some(entity) = &node.data {
            id = Some(entity.id.clone());
            if entity.children_loaded != Some(true) {
                frame
                    .node_states
                    .entry(object_id, Some(&entity.id))
                    .begin_child_load(frame.now, frame.config.loading_indicator_delay);
            }
        }
    }

    frame.commands.trigger(CollapseNodeRequested {
        object_id: object_id.to_string(),
        id,
    });
}

fn hierarchy_entity_ids(node: &TreeNode) -> Vec<String> {
    all_entities_in_hierarchy(node, true)
        .into_iter()
        .map(|e| e.id.clone())
        .collect()
}

fn node_is_active(editor_state: &EditorState, node: &TreeNode) -> bool {
    node.entity_id().is_some_and(|id| editor_state.is_active(id))
}

fn node_drag_drop(
    frame: &mut NavigatorFrame,
    response: &egui::Response,
    node: &TreeNode,
    depth: usize,
    is_collapsed: bool,
    loading: bool,
) {
    let behavior = NodeDragBehavior {
        node,
        is_collapsed,
        in_selection_mode: frame.editor_state.selection_mode,
        draggable: frame.config.draggable,
        loading,
    };

    if response.drag_started() {
        if let Some(payload) = behavior.begin_drag() {
            egui::DragAndDrop::set_payload(&response.ctx, payload);
        }
    }

    if egui::DragAndDrop::has_any_payload(&response.ctx) && response.contains_pointer() {
        if let (Some(info), Some(drop)) = (behavior.hover(), behavior.drop_on(false)) {
            frame.arbiter.offer(DropCandidate { depth, info, drop });
        }
    }
}

/// Deliver drag-over to the deepest hovered target, and on release deliver
/// the drop there with its typed (possibly cancelled) result.
fn finish_drag_frame(ui: &mut egui::Ui, frame: &mut NavigatorFrame) {
    let ctx = ui.ctx().clone();
    let Some(payload) = egui::DragAndDrop::payload::<NodeDragPayload>(&ctx) else {
        return;
    };
    let released = ui.input(|i| i.pointer.any_released());

    match frame.arbiter.take_deepest() {
        Some(candidate) => {
            if released {
                frame.commands.trigger(NodeDropped {
                    payload: (*payload).clone(),
                    target: candidate.info,
                    cancelled: candidate.drop.cancelled,
                });
                egui::DragAndDrop::clear_payload(&ctx);
            } else {
                frame.commands.trigger(NodeDragOver {
                    info: candidate.info,
                });
            }
        }
        None => {
            if released {
                egui::DragAndDrop::clear_payload(&ctx);
            }
        }
    }
}
