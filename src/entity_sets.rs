//! Entity-set registry
//!
//! Maps an entity's `entity_set` name to its default icon and display-name
//! accessor. Hosts must register every set they render before the first
//! frame; an unknown set is a host defect and falls back to generic
//! rendering with a warning.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::store::StoredEntity;

/// Icon used when neither a resolver nor the entity-set default applies.
pub const DEFAULT_ENTITY_ICON: &str = "📄";

type DisplayNameFn = Box<dyn Fn(&StoredEntity) -> String + Send + Sync>;

/// Definition of one entity set.
pub struct EntitySetDef {
    pub name: String,
    /// Icon token used when the resolver chain yields nothing.
    pub default_icon: &'static str,
    /// Entities of this set group children nested under them.
    pub container: bool,
    display_name: Option<DisplayNameFn>,
}

impl EntitySetDef {
    pub fn new(name: impl Into<String>, default_icon: &'static str) -> Self {
        Self {
            name: name.into(),
            default_icon,
            container: false,
            display_name: None,
        }
    }

    /// Builder: entities of this set act as folders for other entities.
    pub fn container(mut self) -> Self {
        self.container = true;
        self
    }

    /// Builder: custom display-name accessor.
    pub fn with_display_name(
        mut self,
        accessor: impl Fn(&StoredEntity) -> String + Send + Sync + 'static,
    ) -> Self {
        self.display_name = Some(Box::new(accessor));
        self
    }
}

/// Resource mapping set names to their definitions, in registration order.
#[derive(Resource, Default)]
pub struct EntitySetRegistry {
    order: Vec<String>,
    sets: HashMap<String, EntitySetDef>,
}

impl EntitySetRegistry {
    pub fn register(&mut self, def: EntitySetDef) {
        if !self.sets.contains_key(&def.name) {
            self.order.push(def.name.clone());
        }
        self.sets.insert(def.name.clone(), def);
    }

    pub fn get(&self, name: &str) -> Option<&EntitySetDef> {
        self.sets.get(name)
    }

    /// Registered set names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Default icon for an entity's set, or the generic default.
    pub fn default_icon(&self, entity: &StoredEntity) -> &'static str {
        match self.get(&entity.entity_set) {
            Some(def) => def.default_icon,
            None => {
                warn!("unknown entity set {} for {}", entity.entity_set, entity.id);
                DEFAULT_ENTITY_ICON
            }
        }
    }

    /// Display name for an entity via its set's accessor.
    pub fn display_name(&self, entity: &StoredEntity) -> String {
        match self.get(&entity.entity_set).and_then(|d| d.display_name.as_ref()) {
            Some(accessor) => accessor(entity),
            None => entity.label().to_string(),
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.sets.clear();
    }
}
