#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts and a headless map surface for SeaDog adapters.
//!
//! [`HeadlessMap`] implements [`MapWidget`] without a tile renderer. It keeps
//! the drawn markers, the viewport, and the open callout in memory so the CLI
//! can print them and tests can inspect them. Failures can be injected to
//! exercise the fallback render path.

use std::{collections::BTreeMap, io::Write};

use anyhow::{Context, Result as AnyResult};
use glam::DVec2;
use seadog_core::{
    ActivityState, Callout, Category, EntityId, ListEntry, MapWidget, MarkerDescriptor,
    MarkerStyle, Position, RenderError, StatsReport, ZoomLevel, DEFAULT_VIEW_CENTER, DEFAULT_ZOOM,
};
use tracing::trace;

const INACTIVE_OPACITY: f32 = 0.6;

/// RGBA color used when presenting markers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the color with its alpha channel replaced.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Formats the RGB channels as `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue)
        )
    }
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Color assigned to markers of a category.
#[must_use]
pub const fn category_color(category: Category) -> Color {
    match category {
        Category::GreatWhite => Color::from_rgb_u8(0xef, 0x44, 0x44),
        Category::Hammerhead => Color::from_rgb_u8(0xf5, 0x9e, 0x0b),
        Category::Tiger => Color::from_rgb_u8(0x8b, 0x5c, 0xf6),
        Category::Bull => Color::from_rgb_u8(0x10, 0xb9, 0x81),
    }
}

/// Color of the widget's stock pin.
pub const STOCK_COLOR: Color = Color::from_rgb_u8(0x3b, 0x82, 0xf6);

/// Resolved look of a drawn marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkerAppearance {
    /// Category colored dot.
    Styled {
        /// Fill color including opacity.
        color: Color,
        /// Whether the pulse animation plays.
        pulsing: bool,
    },
    /// The widget's stock pin.
    Stock,
}

impl MarkerAppearance {
    /// Resolves the look for a requested style.
    ///
    /// Inactive entities are dimmed and never pulse.
    #[must_use]
    pub fn for_style(style: MarkerStyle) -> Self {
        match style {
            MarkerStyle::Tracked { category, activity } => {
                let base = category_color(category);
                match activity {
                    ActivityState::Active => Self::Styled {
                        color: base,
                        pulsing: true,
                    },
                    ActivityState::Inactive => Self::Styled {
                        color: base.with_alpha(INACTIVE_OPACITY),
                        pulsing: false,
                    },
                }
            }
            MarkerStyle::Plain => Self::Stock,
        }
    }

    /// Fill color the marker is drawn with.
    #[must_use]
    pub const fn color(&self) -> Color {
        match self {
            Self::Styled { color, .. } => *color,
            Self::Stock => STOCK_COLOR,
        }
    }

    /// Whether the pulse animation plays.
    #[must_use]
    pub const fn is_pulsing(&self) -> bool {
        matches!(self, Self::Styled { pulsing: true, .. })
    }
}

/// Marker held by the headless surface.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawnMarker {
    /// Position the marker is drawn at.
    pub position: Position,
    /// Resolved look of the marker.
    pub appearance: MarkerAppearance,
    /// Popup bound to the marker, if any.
    pub callout: Option<Callout>,
}

/// Visible map region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Center expressed as `(longitude, latitude)`.
    pub center: DVec2,
    /// Zoom level.
    pub zoom: ZoomLevel,
}

impl Viewport {
    /// Creates a viewport centered on `position`.
    #[must_use]
    pub fn centered_on(position: Position, zoom: ZoomLevel) -> Self {
        Self {
            center: DVec2::new(position.longitude(), position.latitude()),
            zoom,
        }
    }

    /// Center converted back into a geographic position.
    #[must_use]
    pub fn center_position(&self) -> Position {
        Position::new(self.center.y, self.center.x)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::centered_on(DEFAULT_VIEW_CENTER, DEFAULT_ZOOM)
    }
}

/// Number of calls the surface accepted, per kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallLog {
    /// Successful `create_or_update_marker` calls.
    pub markers_drawn: u32,
    /// Successful `remove_marker` calls.
    pub markers_removed: u32,
    /// Successful `center_on` calls.
    pub recenters: u32,
    /// Successful `open_callout` calls.
    pub callouts_opened: u32,
}

impl CallLog {
    /// Sum of every accepted call.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.markers_drawn + self.markers_removed + self.recenters + self.callouts_opened
    }
}

/// In-memory [`MapWidget`] used by the CLI and by tests.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    markers: BTreeMap<EntityId, DrawnMarker>,
    viewport: Viewport,
    open_callout: Option<EntityId>,
    calls: CallLog,
    reject_styled: bool,
    unavailable: bool,
}

impl HeadlessMap {
    /// Creates an empty surface at the default viewport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the surface reject every styled marker while still accepting
    /// plain ones.
    pub fn reject_styled_markers(&mut self, reject: bool) {
        self.reject_styled = reject;
    }

    /// Makes every call fail with [`RenderError::SurfaceUnavailable`].
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Markers currently drawn, keyed by entity.
    #[must_use]
    pub fn markers(&self) -> &BTreeMap<EntityId, DrawnMarker> {
        &self.markers
    }

    /// Current viewport.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Entity whose callout is open, if any.
    #[must_use]
    pub const fn callout_target(&self) -> Option<EntityId> {
        self.open_callout
    }

    /// Calls accepted so far.
    #[must_use]
    pub const fn calls(&self) -> CallLog {
        self.calls
    }

    fn ensure_available(&self) -> Result<(), RenderError> {
        if self.unavailable {
            Err(RenderError::SurfaceUnavailable("surface disabled".to_owned()))
        } else {
            Ok(())
        }
    }
}

impl MapWidget for HeadlessMap {
    fn create_or_update_marker(
        &mut self,
        entity: EntityId,
        position: Position,
        descriptor: &MarkerDescriptor,
    ) -> Result<(), RenderError> {
        self.ensure_available()?;
        if self.reject_styled && descriptor.style != MarkerStyle::Plain {
            return Err(RenderError::MarkerRejected {
                entity,
                reason: "styled markers disabled".to_owned(),
            });
        }

        trace!(entity = entity.get(), ?position, style = ?descriptor.style, "marker drawn");
        let _ = self.markers.insert(
            entity,
            DrawnMarker {
                position,
                appearance: MarkerAppearance::for_style(descriptor.style),
                callout: descriptor.callout.clone(),
            },
        );
        self.calls.markers_drawn += 1;
        Ok(())
    }

    fn remove_marker(&mut self, entity: EntityId) -> Result<(), RenderError> {
        self.ensure_available()?;
        if self.markers.remove(&entity).is_none() {
            return Err(RenderError::UnknownMarker { entity });
        }
        if self.open_callout == Some(entity) {
            self.open_callout = None;
        }
        trace!(entity = entity.get(), "marker removed");
        self.calls.markers_removed += 1;
        Ok(())
    }

    fn center_on(&mut self, position: Position, zoom: ZoomLevel) -> Result<(), RenderError> {
        self.ensure_available()?;
        self.viewport = Viewport::centered_on(position, zoom);
        trace!(?position, zoom = zoom.get(), "viewport moved");
        self.calls.recenters += 1;
        Ok(())
    }

    fn open_callout(&mut self, entity: EntityId) -> Result<(), RenderError> {
        self.ensure_available()?;
        let marker = self
            .markers
            .get(&entity)
            .ok_or(RenderError::UnknownMarker { entity })?;
        if marker.callout.is_none() {
            return Err(RenderError::MarkerRejected {
                entity,
                reason: "no callout bound".to_owned(),
            });
        }
        self.open_callout = Some(entity);
        self.calls.callouts_opened += 1;
        Ok(())
    }
}

/// Writes the list panel as text, one entity per block.
pub fn write_list<W: Write>(out: &mut W, entries: &[ListEntry]) -> AnyResult<()> {
    if entries.is_empty() {
        writeln!(out, "  (no sharks match the active filters)").context("failed to write list")?;
        return Ok(());
    }
    for entry in entries {
        let dot = if entry.activity.is_active() { '●' } else { '○' };
        writeln!(out, "  {} {}", entry.id, entry.name).context("failed to write list entry")?;
        writeln!(out, "     {}", entry.subtitle).context("failed to write list entry")?;
        writeln!(out, "     {dot} {}", entry.status_line).context("failed to write list entry")?;
    }
    Ok(())
}

/// Writes the four stats panel fields as text.
pub fn write_stats<W: Write>(out: &mut W, stats: &StatsReport) -> AnyResult<()> {
    writeln!(
        out,
        "  total {} | active {} | recent pings {} | avg depth {}",
        stats.count,
        stats.active_count,
        stats.recent_pings,
        stats.average_depth_label()
    )
    .context("failed to write stats")
}
