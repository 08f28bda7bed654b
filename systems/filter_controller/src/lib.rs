#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Filter controller that owns the predicate pair and coalesces bursts of
//! selection events into a single downstream sync.

use std::time::Duration;

use seadog_core::{ActivityFilter, CategoryFilter, FilterSelection};
use tracing::{debug, trace};

/// Default length of the coalescing window.
pub const DEFAULT_COALESCING_WINDOW: Duration = Duration::from_millis(100);

/// Configuration parameters required to construct the controller.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    coalescing_window: Duration,
}

impl Config {
    /// Creates a configuration with the provided coalescing window.
    #[must_use]
    pub const fn new(coalescing_window: Duration) -> Self {
        Self { coalescing_window }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_COALESCING_WINDOW)
    }
}

/// Holds the active predicate pair and the pending-sync deadline.
///
/// Selecting a value replaces the previous value of the same dimension, so
/// sibling buttons are implicitly deactivated. Every selection re-arms the
/// window; only the state present when the window finally expires is handed
/// out, once.
#[derive(Debug)]
pub struct FilterController {
    window: Duration,
    selection: FilterSelection,
    deadline: Option<Duration>,
    coalesced: u32,
}

impl FilterController {
    /// Creates a controller with both dimensions set to `All` and nothing
    /// pending.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            window: config.coalescing_window,
            selection: FilterSelection::default(),
            deadline: None,
            coalesced: 0,
        }
    }

    /// Activates a category filter at simulated time `now`.
    pub fn select_category(&mut self, filter: CategoryFilter, now: Duration) {
        self.selection.category = filter;
        trace!(category = %filter, ?now, "category selected");
        self.arm(now);
    }

    /// Activates an activity filter at simulated time `now`.
    pub fn select_activity(&mut self, filter: ActivityFilter, now: Duration) {
        self.selection.activity = filter;
        trace!(activity = %filter, ?now, "activity selected");
        self.arm(now);
    }

    /// Returns the selection to sync once the window has elapsed.
    ///
    /// Yields `None` while nothing is pending or the window is still open.
    pub fn poll(&mut self, now: Duration) -> Option<FilterSelection> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.take(),
            _ => None,
        }
    }

    /// Returns a pending selection immediately, ignoring the window.
    pub fn flush(&mut self) -> Option<FilterSelection> {
        if self.deadline.is_none() {
            return None;
        }
        self.take()
    }

    /// The latest requested predicate pair, pending or not.
    #[must_use]
    pub const fn selection(&self) -> FilterSelection {
        self.selection
    }

    /// Simulated time at which the pending selection becomes due.
    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Reports whether a selection is waiting for its window to close.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    fn arm(&mut self, now: Duration) {
        if self.deadline.is_some() {
            self.coalesced = self.coalesced.saturating_add(1);
        }
        self.deadline = Some(now.saturating_add(self.window));
    }

    fn take(&mut self) -> Option<FilterSelection> {
        self.deadline = None;
        let coalesced = std::mem::take(&mut self.coalesced);
        debug!(
            category = %self.selection.category,
            activity = %self.selection.activity,
            coalesced,
            "filter selection released"
        );
        Some(self.selection)
    }
}

impl Default for FilterController {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
