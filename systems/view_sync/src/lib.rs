#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! View synchronization system that keeps the marker layer, list panel, and
//! stats panel consistent with a filtered view.
//!
//! [`ViewSync`] exclusively owns the live marker set. A full sync reconciles
//! markers against the view, rebuilds the list, and recomputes the stats.
//! Position pushes from the perturbation timer only move markers that are
//! already live because drift never changes filter membership, list content,
//! or aggregates.

use std::collections::{BTreeMap, HashSet};

use seadog_core::{
    Entity, EntityId, ListEntry, MapWidget, MarkerDescriptor, MarkerStyle, Position, RenderError,
    StatsReport, SyncOutcome, FOCUS_ZOOM,
};
use seadog_system_filtering::FilteredView;
use thiserror::Error;
use tracing::{debug, error, warn};

/// State of a marker currently drawn on the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerRecord {
    /// Position the marker was last drawn at.
    pub position: Position,
    /// Style the marker was last drawn with.
    pub style: MarkerStyle,
}

/// Reasons a list selection could not be turned into navigation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The entity is not part of the current list.
    #[error("{0} is not in the list panel")]
    NotListed(EntityId),
    /// The widget failed to move the viewport.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Outcome of a successful list selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Focus {
    /// Entity the viewport was centered on.
    pub entity: EntityId,
    /// Position the viewport was centered on.
    pub position: Position,
    /// Whether the entity's callout was opened.
    pub callout_opened: bool,
}

/// Owner of the three views derived from the filtered subset.
#[derive(Debug, Default)]
pub struct ViewSync {
    markers: BTreeMap<EntityId, MarkerRecord>,
    list: Vec<ListEntry>,
    stats: StatsReport,
    degraded: bool,
}

impl ViewSync {
    /// Creates a view synchronizer with nothing rendered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles markers, list, and stats against `view`.
    ///
    /// `store` is the complete entity collection and is only read by the
    /// fallback path, which draws plain markers for every entity when the
    /// widget rejects a styled marker. Repeating the call with the same view
    /// issues no widget calls.
    pub fn full_sync<W>(
        &mut self,
        view: &FilteredView,
        store: &[Entity],
        widget: &mut W,
    ) -> SyncOutcome
    where
        W: MapWidget + ?Sized,
    {
        let outcome = match self.reconcile_markers(view, widget) {
            Ok(()) => {
                self.degraded = false;
                SyncOutcome::Rendered
            }
            Err(err) => {
                warn!(%err, "marker reconciliation failed, drawing fallback markers");
                self.render_fallback(store, widget);
                self.degraded = true;
                SyncOutcome::Degraded
            }
        };

        self.list = view.iter().map(ListEntry::for_entity).collect();
        self.stats = compute_stats(view);

        let selection = view.selection();
        debug!(
            category = %selection.category,
            activity = %selection.activity,
            filtered = view.len(),
            markers = self.markers.len(),
            ?outcome,
            "view synchronized"
        );
        outcome
    }

    /// Moves the live markers of entities reported by a perturbation tick.
    ///
    /// Ids without a live marker are skipped. List and stats are untouched.
    /// Returns the number of markers moved.
    pub fn push_positions<W>(
        &mut self,
        moved: &[EntityId],
        store: &[Entity],
        widget: &mut W,
    ) -> usize
    where
        W: MapWidget + ?Sized,
    {
        let mut updated = 0;
        for id in moved {
            let Some(record) = self.markers.get_mut(id) else {
                continue;
            };
            let Some(entity) = store.iter().find(|entity| entity.id == *id) else {
                continue;
            };

            let descriptor = descriptor_for(entity, record.style);
            match widget.create_or_update_marker(entity.id, entity.position, &descriptor) {
                Ok(()) => {
                    record.position = entity.position;
                    updated += 1;
                }
                Err(err) => warn!(entity = id.get(), %err, "marker position update failed"),
            }
        }
        updated
    }

    /// Centers the map on a listed entity and opens its callout.
    ///
    /// The position comes from `store` so the viewport follows the entity's
    /// current location rather than the one captured at sync time. Entity state
    /// is never modified.
    pub fn select_entry<W>(
        &self,
        entity: EntityId,
        store: &[Entity],
        widget: &mut W,
    ) -> Result<Focus, NavigationError>
    where
        W: MapWidget + ?Sized,
    {
        if !self.list.iter().any(|entry| entry.id == entity) {
            return Err(NavigationError::NotListed(entity));
        }
        let position = store
            .iter()
            .find(|candidate| candidate.id == entity)
            .map(|candidate| candidate.position)
            .ok_or(NavigationError::NotListed(entity))?;

        widget.center_on(position, FOCUS_ZOOM)?;

        let callout_opened = if self.markers.contains_key(&entity) {
            match widget.open_callout(entity) {
                Ok(()) => true,
                Err(err) => {
                    warn!(entity = entity.get(), %err, "callout could not be opened");
                    false
                }
            }
        } else {
            false
        };

        Ok(Focus {
            entity,
            position,
            callout_opened,
        })
    }

    /// Identifiers of the live markers in ascending order.
    pub fn live_marker_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.markers.keys().copied()
    }

    /// Looks up the live marker for an entity.
    #[must_use]
    pub fn marker(&self, entity: EntityId) -> Option<&MarkerRecord> {
        self.markers.get(&entity)
    }

    /// Current list panel rows.
    #[must_use]
    pub fn list(&self) -> &[ListEntry] {
        &self.list
    }

    /// Current stats panel values.
    #[must_use]
    pub const fn stats(&self) -> StatsReport {
        self.stats
    }

    /// Reports whether the last full sync fell back to plain markers.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn reconcile_markers<W>(
        &mut self,
        view: &FilteredView,
        widget: &mut W,
    ) -> Result<(), RenderError>
    where
        W: MapWidget + ?Sized,
    {
        let wanted: HashSet<EntityId> = view.ids().collect();
        let stale: Vec<EntityId> = self
            .markers
            .keys()
            .copied()
            .filter(|id| !wanted.contains(id))
            .collect();

        for id in stale {
            widget.remove_marker(id)?;
            let _ = self.markers.remove(&id);
        }

        for entity in view.iter() {
            let record = MarkerRecord {
                position: entity.position,
                style: MarkerStyle::for_entity(entity),
            };
            if self.markers.get(&entity.id) == Some(&record) {
                continue;
            }
            widget.create_or_update_marker(
                entity.id,
                entity.position,
                &MarkerDescriptor::tracked(entity),
            )?;
            let _ = self.markers.insert(entity.id, record);
        }

        Ok(())
    }

    fn render_fallback<W>(&mut self, store: &[Entity], widget: &mut W)
    where
        W: MapWidget + ?Sized,
    {
        for (id, _) in std::mem::take(&mut self.markers) {
            if let Err(err) = widget.remove_marker(id) {
                debug!(entity = id.get(), %err, "stale marker removal failed during fallback");
            }
        }

        let plain = MarkerDescriptor::plain();
        for entity in store {
            match widget.create_or_update_marker(entity.id, entity.position, &plain) {
                Ok(()) => {
                    let _ = self.markers.insert(
                        entity.id,
                        MarkerRecord {
                            position: entity.position,
                            style: MarkerStyle::Plain,
                        },
                    );
                }
                Err(err) => error!(entity = entity.id.get(), %err, "fallback marker failed"),
            }
        }
    }
}

/// Aggregates the stats panel values for a filtered view.
///
/// The average depth is rounded half up and is `None` for an empty view.
#[must_use]
pub fn compute_stats(view: &FilteredView) -> StatsReport {
    let count = u32::try_from(view.len()).unwrap_or(u32::MAX);
    let active = view.iter().filter(|entity| entity.activity.is_active()).count();
    let active_count = u32::try_from(active).unwrap_or(u32::MAX);
    let total_depth: u64 = view.iter().map(|entity| u64::from(entity.depth)).sum();

    let average_depth = if count == 0 {
        None
    } else {
        let count = u64::from(count);
        let rounded = (total_depth * 2 + count) / (count * 2);
        Some(u32::try_from(rounded).unwrap_or(u32::MAX))
    };

    StatsReport {
        count,
        active_count,
        recent_pings: active_count.saturating_mul(3),
        average_depth,
    }
}

fn descriptor_for(entity: &Entity, style: MarkerStyle) -> MarkerDescriptor {
    match style {
        MarkerStyle::Tracked { .. } => MarkerDescriptor::tracked(entity),
        MarkerStyle::Plain => MarkerDescriptor::plain(),
    }
}

#[cfg(test)]
mod tests {
    use super::descriptor_for;
    use seadog_core::{
        ActivityState, Category, Entity, EntityId, MarkerDescriptor, MarkerStyle, Position,
    };

    #[test]
    fn position_pushes_keep_the_drawn_style() {
        let entity = Entity {
            id: EntityId::new(4),
            name: "Stripes".to_owned(),
            category: Category::Tiger,
            position: Position::new(25.7617, -80.1918),
            activity: ActivityState::Inactive,
            depth: 65,
            last_contact: "2 hours ago".to_owned(),
        };

        assert_eq!(
            descriptor_for(&entity, MarkerStyle::Plain),
            MarkerDescriptor::plain()
        );
        assert_eq!(
            descriptor_for(&entity, MarkerStyle::for_entity(&entity)),
            MarkerDescriptor::tracked(&entity)
        );
    }
}
