#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the SeaDog tracker.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative entity store, and pure systems. Adapters submit [`Command`]
//! values describing user intent or timer expiry, the session routes them to
//! the store and systems, and then reports [`Event`] values describing what
//! changed. Rendering happens exclusively through the [`MapWidget`] boundary so
//! systems never depend on a concrete mapping library.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the tracker boots.
pub const WELCOME_BANNER: &str = "SeaDog live shark tracker";

/// Map center shown before the user navigates anywhere.
pub const DEFAULT_VIEW_CENTER: Position = Position::new(32.0, -117.0);

/// Zoom level shown before the user navigates anywhere.
pub const DEFAULT_ZOOM: ZoomLevel = ZoomLevel::new(5);

/// Zoom level applied when a list entry is selected.
pub const FOCUS_ZOOM: ZoomLevel = ZoomLevel::new(8);

/// Commands that express every input the tracker reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Activates a category filter, deactivating its siblings.
    SelectCategory {
        /// Filter value to activate.
        filter: CategoryFilter,
    },
    /// Activates an activity filter, deactivating its siblings.
    SelectActivity {
        /// Filter value to activate.
        filter: ActivityFilter,
    },
    /// Requests navigation to the entity shown in the list panel.
    SelectEntry {
        /// Identifier of the entity whose list entry was chosen.
        entity: EntityId,
    },
}

/// Events reported after the session processes commands or advances time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed.
        dt: Duration,
    },
    /// Reports which entities moved during a perturbation tick.
    EntitiesMoved {
        /// Identifiers of the moved entities in store order.
        entities: Vec<EntityId>,
    },
    /// Confirms that the marker layer, list, and stats were reconciled.
    ViewSynced {
        /// Predicate pair the view was derived from.
        selection: FilterSelection,
        /// Aggregates computed for the filtered view.
        stats: StatsReport,
        /// Whether the marker layer rendered normally or fell back.
        outcome: SyncOutcome,
    },
    /// Confirms that the map was centered on a list entry.
    EntryFocused {
        /// Identifier of the focused entity.
        entity: EntityId,
        /// Whether the entity's callout was opened.
        callout_opened: bool,
    },
    /// Reports that a list selection referenced an entity not in the list.
    EntryRejected {
        /// Identifier supplied with the selection.
        entity: EntityId,
    },
}

/// Unique identifier assigned to a tracked entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Species categories a tracked entity may belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Great white shark.
    GreatWhite,
    /// Hammerhead shark.
    Hammerhead,
    /// Tiger shark.
    Tiger,
    /// Bull shark.
    Bull,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 4] = [
        Category::GreatWhite,
        Category::Hammerhead,
        Category::Tiger,
        Category::Bull,
    ];

    /// Human readable species name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GreatWhite => "Great White",
            Self::Hammerhead => "Hammerhead",
            Self::Tiger => "Tiger",
            Self::Bull => "Bull",
        }
    }

    /// Lowercase, dash separated identifier used by filter buttons.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::GreatWhite => "great-white",
            Self::Hammerhead => "hammerhead",
            Self::Tiger => "tiger",
            Self::Bull => "bull",
        }
    }
}

/// Whether an entity is currently transmitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityState {
    /// The tag reported recently and the entity drifts on every tick.
    Active,
    /// The tag went quiet; position is frozen.
    Inactive,
}

impl ActivityState {
    /// Reports whether the state is [`ActivityState::Active`].
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Lowercase label shown in list entries and callouts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Geographic position in decimal degrees.
///
/// No range is enforced; perturbation may drift past the poles or the
/// antimeridian and the value is kept as is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    latitude: f64,
    longitude: f64,
}

impl Position {
    /// Creates a position from latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns the position shifted by the provided deltas.
    #[must_use]
    pub fn offset(self, d_latitude: f64, d_longitude: f64) -> Self {
        Self {
            latitude: self.latitude + d_latitude,
            longitude: self.longitude + d_longitude,
        }
    }
}

/// Map zoom level understood by the mapping widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    /// Creates a new zoom level.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric zoom level.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// A tracked entity as held by the authoritative store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier assigned at load.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Species category; fixed at load.
    pub category: Category,
    /// Last known position.
    pub position: Position,
    /// Transmission state; fixed at load.
    pub activity: ActivityState,
    /// Last reported depth in metres.
    pub depth: u32,
    /// Free-form description of the last contact, e.g. `"2 min ago"`.
    pub last_contact: String,
}

/// Category dimension of the predicate pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryFilter {
    /// Every category passes.
    #[default]
    All,
    /// Only the named category passes.
    Only(Category),
}

impl CategoryFilter {
    /// Reports whether the category passes the filter.
    #[must_use]
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(category) => f.write_str(category.slug()),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseFilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase().replace(' ', "-");
        if normalised == "all" {
            return Ok(Self::All);
        }
        Category::ALL
            .into_iter()
            .find(|category| category.slug() == normalised)
            .map(Self::Only)
            .ok_or_else(|| ParseFilterError::UnknownCategory(value.to_owned()))
    }
}

/// Activity dimension of the predicate pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityFilter {
    /// Every activity state passes.
    #[default]
    All,
    /// Only the named activity state passes.
    Only(ActivityState),
}

impl ActivityFilter {
    /// Reports whether the activity state passes the filter.
    #[must_use]
    pub fn matches(self, activity: ActivityState) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == activity,
        }
    }
}

impl fmt::Display for ActivityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(activity) => f.write_str(activity.label()),
        }
    }
}

impl FromStr for ActivityFilter {
    type Err = ParseFilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Only(ActivityState::Active)),
            "inactive" => Ok(Self::Only(ActivityState::Inactive)),
            _ => Err(ParseFilterError::UnknownActivity(value.to_owned())),
        }
    }
}

/// Reasons a filter slug could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseFilterError {
    /// The slug does not name `all` or a known category.
    #[error("unknown category filter `{0}`")]
    UnknownCategory(String),
    /// The slug is not `all`, `active`, or `inactive`.
    #[error("unknown activity filter `{0}`")]
    UnknownActivity(String),
}

/// The predicate pair that fully determines view membership.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Active category filter.
    pub category: CategoryFilter,
    /// Active activity filter.
    pub activity: ActivityFilter,
}

impl FilterSelection {
    /// Creates a selection from both dimensions.
    #[must_use]
    pub const fn new(category: CategoryFilter, activity: ActivityFilter) -> Self {
        Self { category, activity }
    }

    /// Reports whether the entity satisfies both predicates.
    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        self.category.matches(entity.category) && self.activity.matches(entity.activity)
    }
}

/// Visual treatment requested for a marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerStyle {
    /// Category colored marker dimmed or pulsing according to activity.
    Tracked {
        /// Category that selects the marker color.
        category: Category,
        /// Activity that selects opacity and animation.
        activity: ActivityState,
    },
    /// Default widget marker used by the fallback render path.
    Plain,
}

impl MarkerStyle {
    /// Style for a marker representing the entity under normal rendering.
    #[must_use]
    pub const fn for_entity(entity: &Entity) -> Self {
        Self::Tracked {
            category: entity.category,
            activity: entity.activity,
        }
    }
}

/// Popup content bound to a marker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callout {
    /// Entity name shown as the popup title.
    pub title: String,
    /// Species line shown below the title.
    pub subtitle: String,
    /// Detail lines in display order.
    pub details: Vec<String>,
}

impl Callout {
    /// Builds the popup content for an entity.
    #[must_use]
    pub fn for_entity(entity: &Entity) -> Self {
        Self {
            title: entity.name.clone(),
            subtitle: format!("{} Shark", entity.category.label()),
            details: vec![
                format!("Status: {}", entity.activity.label()),
                format!("Depth: {}m", entity.depth),
                format!("Last Ping: {}", entity.last_contact),
            ],
        }
    }
}

/// Everything the mapping widget needs to draw one marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerDescriptor {
    /// Visual treatment of the marker.
    pub style: MarkerStyle,
    /// Popup content; plain fallback markers carry none.
    pub callout: Option<Callout>,
}

impl MarkerDescriptor {
    /// Descriptor for a styled marker with its popup.
    #[must_use]
    pub fn tracked(entity: &Entity) -> Self {
        Self {
            style: MarkerStyle::for_entity(entity),
            callout: Some(Callout::for_entity(entity)),
        }
    }

    /// Descriptor for an unstyled fallback marker.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            style: MarkerStyle::Plain,
            callout: None,
        }
    }
}

/// Failures reported by a mapping widget.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The widget refused to draw or move the marker.
    #[error("marker {entity} rejected: {reason}")]
    MarkerRejected {
        /// Entity whose marker failed.
        entity: EntityId,
        /// Widget supplied description.
        reason: String,
    },
    /// The widget has no marker with the provided identifier.
    #[error("no marker exists for {entity}")]
    UnknownMarker {
        /// Entity whose marker was requested.
        entity: EntityId,
    },
    /// The widget cannot render at all.
    #[error("map surface unavailable: {0}")]
    SurfaceUnavailable(String),
}

/// Boundary to the external mapping library.
///
/// Implementations own pan, zoom, and tile rendering. The tracker only ever
/// asks for markers to be created, moved, restyled, or removed, and for the
/// viewport to be moved.
pub trait MapWidget {
    /// Draws the marker for `entity`, replacing any marker already drawn for it.
    fn create_or_update_marker(
        &mut self,
        entity: EntityId,
        position: Position,
        descriptor: &MarkerDescriptor,
    ) -> Result<(), RenderError>;

    /// Removes the marker drawn for `entity`.
    fn remove_marker(&mut self, entity: EntityId) -> Result<(), RenderError>;

    /// Centers the viewport on `position` at the provided zoom level.
    fn center_on(&mut self, position: Position, zoom: ZoomLevel) -> Result<(), RenderError>;

    /// Opens the popup bound to the marker for `entity`.
    fn open_callout(&mut self, entity: EntityId) -> Result<(), RenderError>;
}

/// One row of the list panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    /// Entity the row navigates to when selected.
    pub id: EntityId,
    /// Entity name.
    pub name: String,
    /// Species line, e.g. `"Tiger Shark"`.
    pub subtitle: String,
    /// Activity state driving the status dot.
    pub activity: ActivityState,
    /// Status line, e.g. `"active • 2 min ago"`.
    pub status_line: String,
}

impl ListEntry {
    /// Builds the list row for an entity.
    #[must_use]
    pub fn for_entity(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            subtitle: format!("{} Shark", entity.category.label()),
            activity: entity.activity,
            status_line: format!("{} • {}", entity.activity.label(), entity.last_contact),
        }
    }
}

/// Aggregates shown in the stats panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatsReport {
    /// Number of entities in the filtered view.
    pub count: u32,
    /// Number of active entities in the filtered view.
    pub active_count: u32,
    /// Display heuristic of three pings per active entity; not a measurement.
    pub recent_pings: u32,
    /// Rounded mean depth in metres, or `None` when the view is empty.
    pub average_depth: Option<u32>,
}

impl StatsReport {
    /// Placeholder shown when no average depth exists.
    pub const DEPTH_SENTINEL: &'static str = "—";

    /// Average depth formatted for the stats panel.
    #[must_use]
    pub fn average_depth_label(&self) -> String {
        match self.average_depth {
            Some(depth) => format!("{depth}m"),
            None => Self::DEPTH_SENTINEL.to_owned(),
        }
    }
}

/// Result of a full reconciliation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncOutcome {
    /// Markers mirror the filtered view.
    Rendered,
    /// Marker rendering failed and the plain fallback layer was drawn instead.
    Degraded,
}
