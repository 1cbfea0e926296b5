//! Studio Entity Tree
//!
//! An entity tree navigator for studio-style editor shells: hierarchical
//! groups and entities with lazy child loading, a live node-handle
//! registry, icon-resolver and extension-slot plugin points, and
//! drag-and-drop.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContext, EguiPlugin, EguiPrimaryContextPass, PrimaryEguiContext};

// Module declarations
mod actions;
mod context_menu;
mod editor_state;
pub mod components;
pub mod dragdrop;
pub mod entity_sets;
pub mod extensions;
pub mod icons;
pub mod navigator;
pub mod registry;
pub mod store;

// Re-exports
pub use editor_state::*;

use components::NodeStates;
use entity_sets::EntitySetRegistry;
use extensions::ExtensionComponents;
use icons::IconResolvers;
use registry::NodeRegistry;
use store::{EntityStore, StoredEntity};

/// Main plugin for the entity tree navigator
pub struct EntityTreePlugin;

impl Plugin for EntityTreePlugin {
    fn build(&self, app: &mut App) {
        // Add required plugins
        app.add_plugins(EguiPlugin::default());

        // Initialize resources
        app.init_resource::<EditorState>()
            .init_resource::<TreeConfig>()
            .init_resource::<EntityStore>()
            .init_resource::<EntitySetRegistry>()
            .init_resource::<NodeRegistry>()
            .init_resource::<NodeStates>()
            .init_resource::<IconResolvers>()
            .init_resource::<ExtensionComponents>();

        app.register_type::<StoredEntity>();

        // Add systems
        app.add_systems(
            Update,
            (
                navigator::rebuild_tree,
                navigator::sync_node_registry,
                navigator::tick_loading_states,
            )
                .chain(),
        );
        app.add_systems(EguiPrimaryContextPass, tree_panel_system);

        // Add observers
        app.add_observer(actions::handle_collapse_request)
            .add_observer(actions::handle_selection_changed)
            .add_observer(actions::handle_entity_activated)
            .add_observer(actions::handle_node_action)
            .add_observer(context_menu::handle_context_menu_request);
    }
}

/// System to render the tree panel into the primary egui context
fn tree_panel_system(
    mut editor_context: Query<&mut EguiContext, With<PrimaryEguiContext>>,
    mut tree: navigator::TreeContext,
    mut commands: Commands,
) {
    let Ok(mut egui_context) = editor_context.single_mut() else {
        return;
    };
    let ctx = egui_context.get_mut();

    let roots = tree.editor_state.nodes.clone();
    let now = tree.time.elapsed();

    {
        let mut frame = navigator::NavigatorFrame::new(
            &tree.editor_state,
            &tree.config,
            &tree.entity_sets,
            &tree.icon_resolvers,
            &tree.extensions,
            &mut tree.node_states,
            &mut commands,
            now,
        );

        egui::SidePanel::left("entity_tree_panel")
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        navigator::render_entity_tree(ui, &mut frame, &roots);
                    });
            });
    }

    // Render context menu if requested
    context_menu::render_context_menu(ctx, &mut tree.editor_state, &mut commands);
}
