#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative entity store for the SeaDog tracker.
//!
//! The store owns every tracked entity for the lifetime of the process. The
//! only mutation it accepts is [`World::tick`], a random-walk step applied to
//! active entities using a caller supplied random source so replays stay
//! deterministic.

use std::collections::HashSet;

use rand::Rng;
use seadog_core::{ActivityState, Category, Entity, EntityId, Position};
use thiserror::Error;
use tracing::{debug, trace};

const DEFAULT_MOVE_PROBABILITY: f64 = 0.3;
const DEFAULT_MAX_STEP_DEGREES: f64 = 0.005;

/// Largest accepted per-axis step, in degrees.
pub const MAX_STEP_DEGREES: f64 = 180.0;

/// Parameters of the random walk applied to active entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perturbation {
    probability: f64,
    max_step: f64,
}

impl Perturbation {
    /// Creates perturbation parameters.
    ///
    /// `probability` is the per-tick chance an active entity moves and must lie
    /// in `0.0..=1.0`. `max_step` bounds the offset applied to each coordinate
    /// in degrees and must lie in `0.0..=MAX_STEP_DEGREES`.
    pub fn new(probability: f64, max_step: f64) -> Result<Self, WorldError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(WorldError::ProbabilityOutOfRange(probability));
        }
        if !(0.0..=MAX_STEP_DEGREES).contains(&max_step) {
            return Err(WorldError::InvalidStep(max_step));
        }
        Ok(Self {
            probability,
            max_step,
        })
    }

    /// Per-tick chance that an active entity moves.
    #[must_use]
    pub const fn probability(&self) -> f64 {
        self.probability
    }

    /// Largest offset applied to either coordinate, in degrees.
    #[must_use]
    pub const fn max_step(&self) -> f64 {
        self.max_step
    }
}

impl Default for Perturbation {
    fn default() -> Self {
        Self {
            probability: DEFAULT_MOVE_PROBABILITY,
            max_step: DEFAULT_MAX_STEP_DEGREES,
        }
    }
}

/// Errors raised while constructing the store.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum WorldError {
    /// Two seed entries share an identifier.
    #[error("duplicate entity id {0}")]
    DuplicateEntity(EntityId),
    /// Move probability outside `0.0..=1.0`.
    #[error("move probability {0} is outside 0.0..=1.0")]
    ProbabilityOutOfRange(f64),
    /// Step bound negative or not finite.
    #[error("max step {0} is outside 0.0..=180.0 degrees")]
    InvalidStep(f64),
}

/// Represents the authoritative collection of tracked entities.
#[derive(Debug)]
pub struct World {
    entities: Vec<Entity>,
    perturbation: Perturbation,
    tick_index: u64,
}

impl World {
    /// Creates a store populated with the built-in seed list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: seed_entities(),
            perturbation: Perturbation::default(),
            tick_index: 0,
        }
    }

    /// Creates a store from an arbitrary seed list, preserving its order.
    pub fn from_entities(entities: Vec<Entity>) -> Result<Self, WorldError> {
        let mut seen = HashSet::with_capacity(entities.len());
        for entity in &entities {
            if !seen.insert(entity.id) {
                return Err(WorldError::DuplicateEntity(entity.id));
            }
        }
        Ok(Self {
            entities,
            perturbation: Perturbation::default(),
            tick_index: 0,
        })
    }

    /// Replaces the random walk parameters.
    #[must_use]
    pub fn with_perturbation(mut self, perturbation: Perturbation) -> Self {
        self.perturbation = perturbation;
        self
    }

    /// Applies one random-walk step and reports which entities moved.
    ///
    /// Each active entity moves with the configured probability by an
    /// independent uniform offset on each axis. Inactive entities consume no
    /// randomness. Positions are not clamped.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<EntityId> {
        self.tick_index = self.tick_index.saturating_add(1);
        let probability = self.perturbation.probability;
        let max_step = self.perturbation.max_step;

        let mut moved = Vec::new();
        for entity in self
            .entities
            .iter_mut()
            .filter(|entity| entity.activity == ActivityState::Active)
        {
            if !rng.gen_bool(probability) {
                continue;
            }
            let d_latitude = rng.gen_range(-max_step..=max_step);
            let d_longitude = rng.gen_range(-max_step..=max_step);
            entity.position = entity.position.offset(d_latitude, d_longitude);
            trace!(
                entity = entity.id.get(),
                latitude = entity.position.latitude(),
                longitude = entity.position.longitude(),
                "entity drifted"
            );
            moved.push(entity.id);
        }

        debug!(tick = self.tick_index, moved = moved.len(), "perturbation applied");
        moved
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Query functions that provide read-only access to the store.
pub mod query {
    use super::{Perturbation, World};
    use seadog_core::{Entity, EntityId};

    /// Every entity in load order.
    #[must_use]
    pub fn entities(world: &World) -> &[Entity] {
        &world.entities
    }

    /// Looks up a single entity.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<&Entity> {
        world.entities.iter().find(|entity| entity.id == id)
    }

    /// Number of perturbation ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Random walk parameters currently in effect.
    #[must_use]
    pub fn perturbation(world: &World) -> Perturbation {
        world.perturbation
    }
}

struct EntitySeed {
    id: u32,
    name: &'static str,
    category: Category,
    latitude: f64,
    longitude: f64,
    activity: ActivityState,
    depth: u32,
    last_contact: &'static str,
}

const SEED: [EntitySeed; 12] = [
    seed(
        1,
        "Bruce",
        Category::GreatWhite,
        36.7783,
        -119.4179,
        ActivityState::Active,
        42,
        "2 min ago",
    ),
    seed(
        2,
        "Jaws",
        Category::GreatWhite,
        34.0522,
        -118.2437,
        ActivityState::Active,
        38,
        "5 min ago",
    ),
    seed(
        3,
        "Hammertime",
        Category::Hammerhead,
        32.7157,
        -117.1611,
        ActivityState::Active,
        52,
        "1 min ago",
    ),
    seed(
        4,
        "Stripes",
        Category::Tiger,
        25.7617,
        -80.1918,
        ActivityState::Inactive,
        65,
        "2 hours ago",
    ),
    seed(5, "Chomper", Category::Bull, 29.7604, -95.3698, ActivityState::Active, 28, "3 min ago"),
    seed(
        6,
        "Megalodon Jr",
        Category::GreatWhite,
        37.7749,
        -122.4194,
        ActivityState::Active,
        48,
        "1 min ago",
    ),
    seed(
        7,
        "Hammer",
        Category::Hammerhead,
        26.0112,
        -80.1378,
        ActivityState::Active,
        35,
        "4 min ago",
    ),
    seed(
        8,
        "Finnegan",
        Category::Tiger,
        21.3099,
        -157.8581,
        ActivityState::Active,
        71,
        "2 min ago",
    ),
    seed(
        9,
        "Sharkira",
        Category::Bull,
        27.9506,
        -82.4572,
        ActivityState::Inactive,
        33,
        "1 hour ago",
    ),
    seed(
        10,
        "Deep Blue",
        Category::GreatWhite,
        40.7128,
        -74.0060,
        ActivityState::Active,
        89,
        "6 min ago",
    ),
    seed(
        11,
        "Sickle",
        Category::Hammerhead,
        33.6846,
        -116.2437,
        ActivityState::Inactive,
        44,
        "3 hours ago",
    ),
    seed(12, "Torpedo", Category::Tiger, 35.2271, -80.8431, ActivityState::Active, 56, "1 min ago"),
];

#[allow(clippy::too_many_arguments)]
const fn seed(
    id: u32,
    name: &'static str,
    category: Category,
    latitude: f64,
    longitude: f64,
    activity: ActivityState,
    depth: u32,
    last_contact: &'static str,
) -> EntitySeed {
    EntitySeed {
        id,
        name,
        category,
        latitude,
        longitude,
        activity,
        depth,
        last_contact,
    }
}

fn seed_entities() -> Vec<Entity> {
    SEED.iter()
        .map(|seed| Entity {
            id: EntityId::new(seed.id),
            name: seed.name.to_owned(),
            category: seed.category,
            position: Position::new(seed.latitude, seed.longitude),
            activity: seed.activity,
            depth: seed.depth,
            last_contact: seed.last_contact.to_owned(),
        })
        .collect()
}
