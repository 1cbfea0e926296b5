//! Extension slot composer
//!
//! Named insertion points where externally registered UI fragments are
//! composed into a node's rendering without modifying the tree itself:
//!
//! - `Right` / `GroupRight` are list slots: every registered component
//!   renders as a sibling with identical props, in registration order.
//! - `Container` is a wrapping slot: registered wrappers nest around the
//!   original content, first-registered outermost, so `[A, B]` around
//!   content `C` renders as `A(B(C))`. Zero registrations render the
//!   original content unchanged.
//!
//! Registration is an explicit mutable resource cleared on host shutdown.

use bevy::prelude::*;

use crate::store::StoredEntity;

/// Named insertion points in a node's rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionSlot {
    /// Wraps a leaf row's entire content.
    Container,
    /// Trails a leaf row's name.
    Right,
    /// Trails a group header's title.
    GroupRight,
}

/// Props handed to every slot component.
pub struct SlotProps<'a> {
    pub entity: &'a StoredEntity,
}

type SlotComponent = Box<dyn Fn(&mut egui::Ui, &SlotProps) + Send + Sync>;
type SlotWrapper =
    Box<dyn Fn(&mut egui::Ui, &SlotProps, &mut dyn FnMut(&mut egui::Ui)) + Send + Sync>;

/// Resource holding the registered components per slot.
#[derive(Resource, Default)]
pub struct ExtensionComponents {
    right: Vec<SlotComponent>,
    group_right: Vec<SlotComponent>,
    container: Vec<SlotWrapper>,
}

impl ExtensionComponents {
    /// Register a component in a list slot (`Right` or `GroupRight`).
    pub fn register(
        &mut self,
        slot: ExtensionSlot,
        component: impl Fn(&mut egui::Ui, &SlotProps) + Send + Sync + 'static,
    ) {
        match slot {
            ExtensionSlot::Right => self.right.push(Box::new(component)),
            ExtensionSlot::GroupRight => self.group_right.push(Box::new(component)),
            ExtensionSlot::Container => {
                warn!("Container is a wrapping slot; use register_container");
            }
        }
    }

    /// Register a wrapper in the `Container` slot. The wrapper receives the
    /// previously composed result as its single child.
    pub fn register_container(
        &mut self,
        wrapper: impl Fn(&mut egui::Ui, &SlotProps, &mut dyn FnMut(&mut egui::Ui))
            + Send
            + Sync
            + 'static,
    ) {
        self.container.push(Box::new(wrapper));
    }

    /// Render every component of a list slot as siblings, registration
    /// order. Zero registrations render nothing.
    pub fn render_list(&self, slot: ExtensionSlot, ui: &mut egui::Ui, props: &SlotProps) {
        let components = match slot {
            ExtensionSlot::Right => &self.right,
            ExtensionSlot::GroupRight => &self.group_right,
            ExtensionSlot::Container => {
                warn!("Container is a wrapping slot; use render_container");
                return;
            }
        };
        for component in components {
            component(ui, props);
        }
    }

    /// Render the `Container` slot: wrappers nest around `content`,
    /// first-registered outermost. Zero registrations call `content`
    /// directly, unchanged.
    pub fn render_container(
        &self,
        ui: &mut egui::Ui,
        props: &SlotProps,
        content: &mut dyn FnMut(&mut egui::Ui),
    ) {
        compose(&self.container, ui, props, content);
    }

    /// Cleared on host shutdown.
    pub fn clear(&mut self) {
        self.right.clear();
        self.group_right.clear();
        self.container.clear();
    }
}

fn compose(
    wrappers: &[SlotWrapper],
    ui: &mut egui::Ui,
    props: &SlotProps,
    content: &mut dyn FnMut(&mut egui::Ui),
) {
    match wrappers.split_first() {
        None => content(ui),
        Some((outermost, rest)) => {
            outermost(ui, props, &mut |ui: &mut egui::Ui| {
                compose(rest, ui, props, content);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn entity() -> StoredEntity {
        StoredEntity::new("e1", "reports")
    }

    fn run_ui(f: impl FnOnce(&mut egui::Ui)) {
        let ctx = egui::Context::default();
        let mut f = Some(f);
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                (f.take().unwrap())(ui);
            });
        });
    }

    #[test]
    fn wrapping_slot_nests_first_registered_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut extensions = ExtensionComponents::default();

        for name in ["A", "B"] {
            let log = Arc::clone(&log);
            extensions.register_container(move |ui, _props, child| {
                log.lock().unwrap().push(format!("{name}-enter"));
                child(ui);
                log.lock().unwrap().push(format!("{name}-exit"));
            });
        }

        let entity = entity();
        let inner_log = Arc::clone(&log);
        run_ui(|ui| {
            extensions.render_container(ui, &SlotProps { entity: &entity }, &mut |_ui| {
                inner_log.lock().unwrap().push("C".to_string());
            });
        });

        // [A, B] around C composes as A(B(C)).
        assert_eq!(
            *log.lock().unwrap(),
            ["A-enter", "B-enter", "C", "B-exit", "A-exit"]
        );
    }

    #[test]
    fn empty_wrapping_slot_renders_content_unchanged() {
        let extensions = ExtensionComponents::default();
        let entity = entity();
        let called = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&called);

        run_ui(|ui| {
            extensions.render_container(ui, &SlotProps { entity: &entity }, &mut |_ui| {
                *counter.lock().unwrap() += 1;
            });
        });

        assert_eq!(*called.lock().unwrap(), 1);
    }

    #[test]
    fn list_slot_renders_siblings_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut extensions = ExtensionComponents::default();

        for name in ["first", "second"] {
            let log = Arc::clone(&log);
            extensions.register(ExtensionSlot::Right, move |_ui, props| {
                log.lock().unwrap().push(format!("{name}:{}", props.entity.id));
            });
        }

        let entity = entity();
        run_ui(|ui| {
            extensions.render_list(ExtensionSlot::Right, ui, &SlotProps { entity: &entity });
        });

        assert_eq!(*log.lock().unwrap(), ["first:e1", "second:e1"]);
    }

    #[test]
    fn empty_list_slot_renders_nothing() {
        let extensions = ExtensionComponents::default();
        let entity = entity();
        run_ui(|ui| {
            extensions.render_list(ExtensionSlot::GroupRight, ui, &SlotProps { entity: &entity });
        });
    }
}
