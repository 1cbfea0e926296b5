//! Per-node loading state machine
//!
//! This module handles:
//! - The three-state child-loading lifecycle of group-entity nodes
//!   (`NotLoading -> Initial -> Animation -> NotLoading`)
//! - The deferred loading-indicator check, realized as a stored deadline
//!   re-evaluated against current store state when it fires
//! - Clearing the state when the store reports children loaded for the
//!   same entity id
//!
//! Only group-entity nodes whose children are not yet loaded ever leave
//! `NotLoading`; every other node kind stays there permanently.

use bevy::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

/// Loading lifecycle of one tree node instance. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildrenLoading {
    /// No child fetch in flight.
    #[default]
    NotLoading,
    /// A fetch was just requested; the indicator is withheld for a grace
    /// period in case the fetch completes quickly.
    Initial,
    /// The grace period elapsed with the fetch still pending; the loading
    /// indicator is shown.
    Animation,
}

/// Transient UI state of one node instance, keyed by its object id.
#[derive(Debug, Clone, Default)]
pub struct NodeUiState {
    /// Entity id the state was created for. An id change invalidates the
    /// whole state (remount semantics) rather than transitioning it.
    pub entity_id: Option<String>,
    pub loading: ChildrenLoading,
    indicator_deadline: Option<Duration>,
}

impl NodeUiState {
    pub fn for_entity(entity_id: Option<&str>) -> Self {
        Self {
            entity_id: entity_id.map(str::to_string),
            ..Default::default()
        }
    }

    /// True while a child load is in flight; collapse requests are ignored
    /// and drag/drop participation is suspended.
    pub fn is_loading(&self) -> bool {
        self.loading != ChildrenLoading::NotLoading
    }

    /// True once the withheld indicator should actually render.
    pub fn shows_indicator(&self) -> bool {
        self.loading == ChildrenLoading::Animation
    }

    /// `NotLoading -> Initial`: a collapse request hit a group-entity whose
    /// children are not loaded yet. Schedules the deferred indicator check.
    pub fn begin_child_load(&mut self, now: Duration, indicator_delay: Duration) {
        if self.is_loading() {
            return;
        }
        self.loading = ChildrenLoading::Initial;
        self.indicator_deadline = Some(now + indicator_delay);
    }

    /// Deferred check: `Initial -> Animation` only if the deadline elapsed
    /// and the store still reports children not loaded. `children_loaded`
    /// must be the store's current value, not a captured snapshot, so a
    /// fire after completion is a no-op.
    pub fn tick(&mut self, now: Duration, children_loaded: bool) {
        if children_loaded {
            // The completion rule below already returned the state to
            // NotLoading or is about to; the deadline must not resurrect it.
            self.indicator_deadline = None;
            return;
        }
        if self.loading != ChildrenLoading::Initial {
            return;
        }
        if let Some(deadline) = self.indicator_deadline {
            if now >= deadline {
                self.loading = ChildrenLoading::Animation;
                self.indicator_deadline = None;
            }
        }
    }

    /// `{Initial, Animation} -> NotLoading` when the store reports children
    /// loaded for the same entity id. Callers guarantee the id is unchanged;
    /// an id change removes the state instead (remount).
    pub fn complete_child_load(&mut self) {
        if !self.is_loading() {
            return;
        }
        self.loading = ChildrenLoading::NotLoading;
        self.indicator_deadline = None;
    }
}

/// Resource holding the transient UI state of every mounted node, keyed by
/// object id. Entries are pruned by the navigator's lifecycle sync.
#[derive(Resource, Default)]
pub struct NodeStates {
    states: HashMap<String, NodeUiState>,
}

impl NodeStates {
    pub fn get(&self, object_id: &str) -> Option<&NodeUiState> {
        self.states.get(object_id)
    }

    /// State for a node instance, created on first access.
    pub fn entry(&mut self, object_id: &str, entity_id: Option<&str>) -> &mut NodeUiState {
        self.states
            .entry(object_id.to_string())
            .or_insert_with(|| NodeUiState::for_entity(entity_id))
    }

    pub fn remove(&mut self, object_id: &str) {
        self.states.remove(object_id);
    }

    pub fn is_loading(&self, object_id: &str) -> bool {
        self.get(object_id).is_some_and(NodeUiState::is_loading)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut NodeUiState)> {
        self.states.iter_mut()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
