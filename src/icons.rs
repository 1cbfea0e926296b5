//! Icon resolver chain
//!
//! Ordered list of externally registered resolver functions. Resolvers are
//! tried in registration order and the first non-`None` result wins; when
//! every resolver declines, callers fall back to the entity-set default
//! icon, then the generic default.
//!
//! Registration is an explicit mutable resource with a documented teardown
//! (`clear`), not ambient global state.

use bevy::prelude::*;

use crate::store::StoredEntity;

/// Context handed to each resolver alongside the entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct IconContext {
    /// Whether the node being rendered is currently collapsed. Leaf nodes
    /// always resolve with the default context.
    pub is_collapsed: bool,
}

type IconResolver = Box<dyn Fn(&StoredEntity, &IconContext) -> Option<&'static str> + Send + Sync>;

/// Resource holding the resolver chain, in registration order.
#[derive(Resource, Default)]
pub struct IconResolvers {
    resolvers: Vec<IconResolver>,
}

impl IconResolvers {
    pub fn register(
        &mut self,
        resolver: impl Fn(&StoredEntity, &IconContext) -> Option<&'static str>
            + Send
            + Sync
            + 'static,
    ) {
        self.resolvers.push(Box::new(resolver));
    }

    /// First non-`None` result in registration order, or `None` when every
    /// resolver declines.
    pub fn resolve(&self, entity: &StoredEntity, context: &IconContext) -> Option<&'static str> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver(entity, context))
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Cleared on host shutdown.
    pub fn clear(&mut self) {
        self.resolvers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_null_resolver_wins() {
        let mut chain = IconResolvers::default();
        chain.register(|_, _| None);
        chain.register(|e, _| (e.entity_set == "reports").then_some("📊"));
        chain.register(|_, _| Some("never-reached"));

        let report = StoredEntity::new("r1", "reports");
        assert_eq!(chain.resolve(&report, &IconContext::default()), Some("📊"));
    }

    #[test]
    fn later_resolvers_do_not_override_an_earlier_match() {
        let mut chain = IconResolvers::default();
        chain.register(|_, _| Some("first"));
        chain.register(|_, _| Some("second"));

        let entity = StoredEntity::new("x", "any");
        assert_eq!(chain.resolve(&entity, &IconContext::default()), Some("first"));
    }

    #[test]
    fn empty_or_declining_chain_yields_none() {
        let mut chain = IconResolvers::default();
        let entity = StoredEntity::new("x", "any");
        assert_eq!(chain.resolve(&entity, &IconContext::default()), None);

        chain.register(|_, _| None);
        assert_eq!(chain.resolve(&entity, &IconContext::default()), None);
    }

    #[test]
    fn resolvers_see_the_collapse_context() {
        let mut chain = IconResolvers::default();
        chain.register(|_, ctx| Some(if ctx.is_collapsed { "📁" } else { "📂" }));

        let entity = StoredEntity::new("f", "folders");
        assert_eq!(
            chain.resolve(&entity, &IconContext { is_collapsed: true }),
            Some("📁")
        );
        assert_eq!(
            chain.resolve(&entity, &IconContext { is_collapsed: false }),
            Some("📂")
        );
    }
}
