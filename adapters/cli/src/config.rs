//! Session configuration loading for the command-line adapter.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use seadog_system_session::SessionConfig;

/// Flag values that take precedence over the configuration file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) tick_interval_ms: Option<u64>,
    pub(crate) coalescing_window_ms: Option<u64>,
    pub(crate) move_probability: Option<f64>,
    pub(crate) max_step_degrees: Option<f64>,
}

impl Overrides {
    /// Replaces every field of `config` that has a flag value.
    pub(crate) fn apply(self, mut config: SessionConfig) -> SessionConfig {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(interval) = self.tick_interval_ms {
            config.tick_interval_ms = interval;
        }
        if let Some(window) = self.coalescing_window_ms {
            config.coalescing_window_ms = window;
        }
        if let Some(probability) = self.move_probability {
            config.move_probability = probability;
        }
        if let Some(step) = self.max_step_degrees {
            config.max_step_degrees = step;
        }
        config
    }
}

/// Reads the session configuration, falling back to defaults without a path.
pub(crate) fn load(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid config file {}", path.display()))
}

fn parse(text: &str) -> Result<SessionConfig> {
    toml::from_str(text).context("failed to parse session configuration")
}
