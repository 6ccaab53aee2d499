//! # Runtime Settings
//!
//! User-tunable values read once at startup from `assets/settings.json`.
//! Every field has a default, so a partial file (or no file at all) is valid.
//!
//! ```json
//! { "seed": 1234, "vsync": false, "mouse_sensitivity": 0.25 }
//! ```

use std::path::Path;

use anyhow::Context;
use log::{info, warn};
use serde::Deserialize;
use web_time::Duration;

use crate::engine_state::physics::tick_seconds;

/// Location of the optional settings file, relative to the working directory.
pub const SETTINGS_PATH: &str = "assets/settings.json";

/// Startup configuration for the window, the camera and the world.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Initial window width in physical pixels
    pub window_width: u32,
    /// Initial window height in physical pixels
    pub window_height: u32,
    /// Whether presentation waits for vertical blank.
    ///
    /// Physics integration is skipped for frames longer than one tick, so a
    /// 60 Hz vsync'd swapchain would freeze the player in place.
    pub vsync: bool,
    /// Degrees of camera rotation per pixel of mouse motion
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// World seed; a random one is drawn when absent
    pub seed: Option<u32>,
    /// Real-time minutes per in-game day
    pub day_minutes: f32,
    /// Number of ticks the edit queue may spend applying edits each frame
    pub edit_budget_ticks: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            vsync: false,
            mouse_sensitivity: 0.25,
            fov_degrees: 70.0,
            seed: None,
            day_minutes: 0.1,
            edit_budget_ticks: 1.0,
        }
    }
}

impl Settings {
    /// Parses settings from a JSON string.
    ///
    /// An edit budget that does not fit a `Duration` (JSON numbers beyond `f32`
    /// read as infinity) is replaced by the default with a warning.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let mut settings: Self =
            serde_json::from_str(json).context("settings file is not valid JSON")?;
        if budget_from_ticks(settings.edit_budget_ticks).is_none() {
            let fallback = Self::default().edit_budget_ticks;
            warn!(
                "edit_budget_ticks {} is out of range, using {}",
                settings.edit_budget_ticks, fallback
            );
            settings.edit_budget_ticks = fallback;
        }
        Ok(settings)
    }

    /// Reads settings from `path`.
    ///
    /// # Errors
    /// Fails if the file cannot be read or does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Loads [`SETTINGS_PATH`], falling back to defaults when it is missing or broken.
    pub fn load_or_default() -> Self {
        match Self::from_file(SETTINGS_PATH) {
            Ok(settings) => {
                info!("Loaded settings from {}", SETTINGS_PATH);
                settings
            }
            Err(err) => {
                warn!("Using default settings: {:#}", err);
                Self::default()
            }
        }
    }

    /// Wall-clock time the edit queue may spend each frame.
    ///
    /// Negative budgets apply nothing; unrepresentable ones fall back to one tick.
    pub fn edit_budget(&self) -> Duration {
        budget_from_ticks(self.edit_budget_ticks)
            .unwrap_or_else(|| Duration::from_secs_f32(tick_seconds()))
    }

    /// Returns the configured seed, or draws a fresh one.
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(|| fastrand::u32(0..=1_000_000))
    }
}

fn budget_from_ticks(ticks: f32) -> Option<Duration> {
    Duration::try_from_secs_f32(ticks.max(0.0) * tick_seconds()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let settings = Settings::from_json(r#"{ "seed": 7, "vsync": true }"#).unwrap();

        assert_eq!(settings.seed, Some(7));
        assert!(settings.vsync);
        assert_eq!(settings.window_width, 1280);
        assert_eq!(settings.mouse_sensitivity, 0.25);
    }

    #[test]
    fn configured_seed_is_used_verbatim() {
        let settings = Settings {
            seed: Some(99),
            ..Settings::default()
        };

        assert_eq!(settings.resolve_seed(), 99);
    }

    #[test]
    fn edit_budget_is_measured_in_ticks() {
        let settings = Settings {
            edit_budget_ticks: 2.0,
            ..Settings::default()
        };

        assert_eq!(settings.edit_budget(), Duration::from_secs_f32(2.0 * tick_seconds()));
        assert_eq!(
            Settings { edit_budget_ticks: -3.0, ..settings }.edit_budget(),
            Duration::ZERO
        );
    }

    #[test]
    fn oversized_edit_budget_falls_back_to_one_tick() {
        let settings = Settings::from_json(r#"{ "edit_budget_ticks": 1e39 }"#).unwrap();
        assert_eq!(settings.edit_budget_ticks, 1.0);

        let built = Settings {
            edit_budget_ticks: f32::INFINITY,
            ..Settings::default()
        };
        assert_eq!(built.edit_budget(), Duration::from_secs_f32(tick_seconds()));

        let nan = Settings {
            edit_budget_ticks: f32::NAN,
            ..Settings::default()
        };
        assert_eq!(nan.edit_budget(), Duration::ZERO);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Settings::from_json("{ seed: ").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Settings::from_file("does/not/exist.json").is_err());
    }
}
