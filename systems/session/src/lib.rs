#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session system that drives the tracker on a single logical thread.
//!
//! The session owns the entity store, the filter controller, the view
//! synchronizer, and the map widget. Adapters feed it [`Command`] values and
//! simulated time; it interleaves perturbation ticks and coalesced filter syncs
//! strictly at their scheduled instants and reports [`Event`] values. No two
//! reconciliations ever overlap because each runs to completion before the
//! next scheduled instant is considered.

use std::time::Duration;

use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use seadog_core::{
    ActivityFilter, CategoryFilter, Command, EntityId, Event, FilterSelection, MapWidget,
    SyncOutcome,
};
use seadog_system_filter_controller::{self as filter_controller, FilterController};
use seadog_system_filtering as filtering;
use seadog_system_view_sync::{NavigationError, ViewSync};
use seadog_world::{query, Perturbation, World, WorldError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

const DEFAULT_SEED: u64 = 0x5ea_d06_5eed;
const DEFAULT_TICK_INTERVAL_MS: u64 = 5_000;
const DEFAULT_COALESCING_WINDOW_MS: u64 = 100;
const DEFAULT_MOVE_PROBABILITY: f64 = 0.3;
const DEFAULT_MAX_STEP_DEGREES: f64 = 0.005;

/// Tunables for a tracker session.
///
/// Every field has a default so partial configuration files are accepted.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Seed for the perturbation random source.
    pub seed: u64,
    /// Milliseconds between perturbation ticks.
    pub tick_interval_ms: u64,
    /// Milliseconds a filter selection waits for further selections.
    pub coalescing_window_ms: u64,
    /// Per-tick chance that an active entity moves.
    pub move_probability: f64,
    /// Largest per-axis offset applied by a tick, in degrees.
    pub max_step_degrees: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            coalescing_window_ms: DEFAULT_COALESCING_WINDOW_MS,
            move_probability: DEFAULT_MOVE_PROBABILITY,
            max_step_degrees: DEFAULT_MAX_STEP_DEGREES,
        }
    }
}

impl SessionConfig {
    /// Interval between perturbation ticks.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Length of the filter coalescing window.
    #[must_use]
    pub const fn coalescing_window(&self) -> Duration {
        Duration::from_millis(self.coalescing_window_ms)
    }

    /// Validates the configuration and derives the perturbation parameters.
    pub fn perturbation(&self) -> Result<Perturbation, ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(Perturbation::new(
            self.move_probability,
            self.max_step_degrees,
        )?)
    }
}

/// Errors raised while building a session.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The perturbation timer would fire continuously.
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
    /// The store rejected the configuration or the seed list.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// The tracker's single logical thread of control.
#[derive(Debug)]
pub struct Session<W> {
    world: World,
    rng: ChaCha8Rng,
    controller: FilterController,
    view_sync: ViewSync,
    widget: W,
    tick_interval: Duration,
    next_tick_at: Duration,
    now: Duration,
    applied: FilterSelection,
}

impl<W: MapWidget> Session<W> {
    /// Creates a session over the built-in seed list.
    pub fn new(config: &SessionConfig, widget: W) -> Result<Self, ConfigError> {
        Self::with_world(config, World::new(), widget)
    }

    /// Creates a session over a caller supplied store.
    ///
    /// The configured perturbation parameters replace whatever the store
    /// carried.
    pub fn with_world(
        config: &SessionConfig,
        world: World,
        widget: W,
    ) -> Result<Self, ConfigError> {
        let perturbation = config.perturbation()?;
        let tick_interval = config.tick_interval();
        Ok(Self {
            world: world.with_perturbation(perturbation),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            controller: FilterController::new(filter_controller::Config::new(
                config.coalescing_window(),
            )),
            view_sync: ViewSync::new(),
            widget,
            tick_interval,
            next_tick_at: tick_interval,
            now: Duration::ZERO,
            applied: FilterSelection::default(),
        })
    }

    /// Performs the initial render with both filters set to `All`.
    pub fn start(&mut self, out: &mut Vec<Event>) {
        info!(
            entities = query::entities(&self.world).len(),
            tick_interval = ?self.tick_interval,
            "session started"
        );
        let selection = self.controller.selection();
        self.sync(selection, out);
    }

    /// Routes an adapter command at the current simulated time.
    ///
    /// Filter selections only arm the coalescing window; the resulting sync
    /// happens in [`Session::advance`] or [`Session::flush`].
    pub fn submit(&mut self, command: Command, out: &mut Vec<Event>) {
        match command {
            Command::SelectCategory { filter } => self.select_category(filter),
            Command::SelectActivity { filter } => self.select_activity(filter),
            Command::SelectEntry { entity } => out.push(self.select_entry(entity)),
        }
    }

    /// Activates a category filter and arms the coalescing window.
    pub fn select_category(&mut self, filter: CategoryFilter) {
        self.controller.select_category(filter, self.now);
    }

    /// Activates an activity filter and arms the coalescing window.
    pub fn select_activity(&mut self, filter: ActivityFilter) {
        self.controller.select_activity(filter, self.now);
    }

    /// Navigates to a listed entity.
    ///
    /// Returns [`Event::EntryRejected`] when the entity is not listed or the
    /// widget refused to move the viewport.
    pub fn select_entry(&mut self, entity: EntityId) -> Event {
        let store = query::entities(&self.world);
        match self.view_sync.select_entry(entity, store, &mut self.widget) {
            Ok(focus) => Event::EntryFocused {
                entity: focus.entity,
                callout_opened: focus.callout_opened,
            },
            Err(NavigationError::NotListed(entity)) => {
                debug!(entity = entity.get(), "selection ignored, entity not listed");
                Event::EntryRejected { entity }
            }
            Err(NavigationError::Render(err)) => {
                warn!(entity = entity.get(), %err, "navigation failed");
                Event::EntryRejected { entity }
            }
        }
    }

    /// Advances simulated time, running every tick and sync that falls due.
    ///
    /// Due work runs in chronological order. When a filter deadline and a tick
    /// coincide the filter sync runs first.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let target = self.now.saturating_add(dt);
        out.push(Event::TimeAdvanced { dt });

        loop {
            let filter_due = self.controller.deadline().filter(|due| *due <= target);
            let tick_due = Some(self.next_tick_at).filter(|due| *due <= target);

            match (filter_due, tick_due) {
                (Some(filter_at), Some(tick_at)) if filter_at <= tick_at => {
                    self.now = filter_at;
                    self.release_filter(out);
                }
                (Some(filter_at), None) => {
                    self.now = filter_at;
                    self.release_filter(out);
                }
                (_, Some(tick_at)) => {
                    self.now = tick_at;
                    self.next_tick_at = tick_at.saturating_add(self.tick_interval);
                    self.perturb(out);
                }
                (None, None) => break,
            }
        }

        self.now = target;
    }

    /// Syncs a pending filter selection immediately.
    pub fn flush(&mut self, out: &mut Vec<Event>) {
        if let Some(selection) = self.controller.flush() {
            self.sync(selection, out);
        }
    }

    /// Simulated time elapsed since the session was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Predicate pair of the most recent sync.
    #[must_use]
    pub fn applied_selection(&self) -> FilterSelection {
        self.applied
    }

    /// Read access to the entity store.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read access to the synchronized views.
    #[must_use]
    pub fn views(&self) -> &ViewSync {
        &self.view_sync
    }

    /// Read access to the map widget.
    #[must_use]
    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Mutable access to the map widget.
    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    fn release_filter(&mut self, out: &mut Vec<Event>) {
        if let Some(selection) = self.controller.poll(self.now) {
            self.sync(selection, out);
        }
    }

    fn sync(&mut self, selection: FilterSelection, out: &mut Vec<Event>) {
        let store = query::entities(&self.world);
        let view = filtering::apply(store, selection);
        let outcome = self.view_sync.full_sync(&view, store, &mut self.widget);
        if outcome == SyncOutcome::Degraded {
            warn!(now = ?self.now, "view rendered with fallback markers");
        }
        self.applied = selection;
        out.push(Event::ViewSynced {
            selection,
            stats: self.view_sync.stats(),
            outcome,
        });
    }

    fn perturb(&mut self, out: &mut Vec<Event>) {
        let moved = self.world.tick(&mut self.rng);
        let pushed =
            self.view_sync
                .push_positions(&moved, query::entities(&self.world), &mut self.widget);
        debug!(now = ?self.now, moved = moved.len(), pushed, "positions pushed");
        out.push(Event::EntitiesMoved { entities: moved });
    }
}
