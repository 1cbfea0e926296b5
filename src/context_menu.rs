//! Context menu system for node interactions
//!
//! This module handles:
//! - Right-click context menu rendering and interaction
//! - Node action dispatch (Open, Save, Remove, New Folder)

use bevy::prelude::*;
use bevy_egui::egui;

use crate::editor_state::{
    ContextMenuState, EditorState, NodeAction, NodeActionTriggered, NodeContextMenuRequested,
};

/// Observer to handle context menu requests
///
/// Stores the request for rendering; dispatch sites already suppress the
/// menu for nodes that are mid-loading.
pub fn handle_context_menu_request(
    trigger: Trigger<NodeContextMenuRequested>,
    mut editor_state: ResMut<EditorState>,
) {
    let event = trigger.event();
    editor_state.context_menu = Some(ContextMenuState {
        entity_id: event.entity_id.clone(),
        position: event.position,
    });
}

/// Render context menu UI if one is requested
///
/// This function should be called during UI rendering to display context menus.
pub fn render_context_menu(
    ctx: &egui::Context,
    editor_state: &mut EditorState,
    commands: &mut Commands,
) {
    let Some(menu) = editor_state.context_menu.clone() else {
        return;
    };

    let menu_id = egui::Id::new("entity_context_menu").with(&menu.entity_id);
    let mut chosen = None;

    egui::Area::new(menu_id)
        .fixed_pos(menu.position)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_min_width(120.0);

                for (label, action) in [
                    ("Open", NodeAction::Open),
                    ("Save", NodeAction::Save),
                    ("New folder", NodeAction::NewFolder),
                    ("Remove", NodeAction::Remove),
                ] {
                    if ui.button(label).clicked() {
                        chosen = Some(action);
                    }
                }
            });
        });

    if let Some(action) = chosen {
        commands.trigger(NodeActionTriggered {
            entity_id: menu.entity_id.clone(),
            action,
        });
        editor_state.context_menu = None;
        return;
    }

    // Close the context menu if clicked elsewhere
    if ctx.input(|i| i.pointer.any_click()) {
        let pointer_pos = ctx.input(|i| i.pointer.hover_pos().unwrap_or_default());
        let menu_rect = egui::Rect::from_min_size(menu.position, egui::Vec2::new(120.0, 100.0));

        if !menu_rect.contains(pointer_pos) {
            editor_state.context_menu = None;
        }
    }
}
