//! Snapshot of a finished session printed by the command-line adapter.

use std::io::Write;

use anyhow::{Context, Result};
use seadog_core::{EntityId, Event, FilterSelection, ListEntry, StatsReport, WELCOME_BANNER};
use seadog_rendering::{write_list, write_stats, HeadlessMap};
use seadog_system_session::Session;
use serde::Serialize;

/// Everything the adapter reports once the scripted run is over.
#[derive(Debug, Serialize)]
pub(crate) struct Report {
    elapsed_ms: u64,
    ticks: usize,
    selection: FilterSelection,
    degraded: bool,
    stats: StatsReport,
    list: Vec<ListEntry>,
    markers: Vec<MarkerRow>,
    viewport: ViewportRow,
    focus: Option<FocusRow>,
}

#[derive(Debug, Serialize)]
struct MarkerRow {
    id: EntityId,
    latitude: f64,
    longitude: f64,
    color: String,
    pulsing: bool,
}

#[derive(Debug, Serialize)]
struct ViewportRow {
    latitude: f64,
    longitude: f64,
    zoom: u8,
}

#[derive(Debug, Serialize)]
struct FocusRow {
    id: EntityId,
    accepted: bool,
    callout_opened: bool,
}

impl Report {
    /// Captures the session views and the outcome of the last list selection.
    pub(crate) fn capture(session: &Session<HeadlessMap>, events: &[Event]) -> Self {
        let map = session.widget();
        let ticks = events
            .iter()
            .filter(|event| matches!(event, Event::EntitiesMoved { .. }))
            .count();
        let focus = events.iter().rev().find_map(|event| match event {
            Event::EntryFocused {
                entity,
                callout_opened,
            } => Some(FocusRow {
                id: *entity,
                accepted: true,
                callout_opened: *callout_opened,
            }),
            Event::EntryRejected { entity } => Some(FocusRow {
                id: *entity,
                accepted: false,
                callout_opened: false,
            }),
            _ => None,
        });

        let markers = map
            .markers()
            .iter()
            .map(|(id, marker)| MarkerRow {
                id: *id,
                latitude: marker.position.latitude(),
                longitude: marker.position.longitude(),
                color: marker.appearance.color().to_hex(),
                pulsing: marker.appearance.is_pulsing(),
            })
            .collect();

        let viewport = map.viewport();
        let center = viewport.center_position();

        Self {
            elapsed_ms: u64::try_from(session.now().as_millis()).unwrap_or(u64::MAX),
            ticks,
            selection: session.applied_selection(),
            degraded: session.views().is_degraded(),
            stats: session.views().stats(),
            list: session.views().list().to_vec(),
            markers,
            viewport: ViewportRow {
                latitude: center.latitude(),
                longitude: center.longitude(),
                zoom: viewport.zoom.get(),
            },
            focus,
        }
    }

    /// Writes the report as pretty-printed JSON.
    pub(crate) fn write_json<O: Write>(&self, out: &mut O) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, self).context("failed to encode report")?;
        writeln!(out).context("failed to write report")
    }

    /// Writes the report as the list and stats panels.
    pub(crate) fn write_text<O: Write>(&self, out: &mut O) -> Result<()> {
        writeln!(out, "{WELCOME_BANNER}").context("failed to write report")?;
        writeln!(
            out,
            "filters: category {} | activity {}{}",
            self.selection.category,
            self.selection.activity,
            if self.degraded { " (fallback markers)" } else { "" }
        )
        .context("failed to write report")?;
        writeln!(
            out,
            "elapsed {}ms over {} ticks, {} markers drawn",
            self.elapsed_ms,
            self.ticks,
            self.markers.len()
        )
        .context("failed to write report")?;
        write_stats(out, &self.stats)?;
        write_list(out, &self.list)?;
        if let Some(focus) = &self.focus {
            if focus.accepted {
                writeln!(
                    out,
                    "focused {} at {:.4}, {:.4} (zoom {}){}",
                    focus.id,
                    self.viewport.latitude,
                    self.viewport.longitude,
                    self.viewport.zoom,
                    if focus.callout_opened { ", callout open" } else { "" }
                )
                .context("failed to write report")?;
            } else {
                writeln!(out, "{} is not in the list", focus.id).context("failed to write report")?;
            }
        }
        Ok(())
    }
}
