#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure filtering system that derives the visible subset of the entity store.

use seadog_core::{Entity, EntityId, FilterSelection};
use tracing::debug;

/// Ordered snapshot of the entities that satisfy a predicate pair.
///
/// The view holds copies taken at derivation time. It is owned by whoever
/// renders it for a single render cycle and is never patched in place; a
/// predicate change always produces a fresh view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredView {
    selection: FilterSelection,
    entities: Vec<Entity>,
}

impl FilteredView {
    /// Predicate pair the view was derived from.
    #[must_use]
    pub const fn selection(&self) -> FilterSelection {
        self.selection
    }

    /// Iterator over the matching entities in store order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Identifiers of the matching entities in store order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().map(|entity| entity.id)
    }

    /// Number of matching entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Consumes the view, yielding the matching entities.
    #[must_use]
    pub fn into_vec(self) -> Vec<Entity> {
        self.entities
    }
}

/// Derives the entities satisfying both dimensions of `selection`.
///
/// Inclusion is `category matches && activity matches`, where `All` matches
/// everything. Store order is preserved and an empty result is valid.
#[must_use]
pub fn apply(entities: &[Entity], selection: FilterSelection) -> FilteredView {
    let matching: Vec<Entity> = entities
        .iter()
        .filter(|entity| selection.matches(entity))
        .cloned()
        .collect();

    debug!(
        category = %selection.category,
        activity = %selection.activity,
        matched = matching.len(),
        total = entities.len(),
        "filter applied"
    );

    FilteredView {
        selection,
        entities: matching,
    }
}

#[cfg(test)]
mod tests {
    use super::apply;
    use seadog_core::FilterSelection;

    #[test]
    fn empty_store_yields_empty_view() {
        let view = apply(&[], FilterSelection::default());
        assert!(view.is_empty());
        assert_eq!(view.len(), 0);
        assert_eq!(view.ids().count(), 0);
    }
}
