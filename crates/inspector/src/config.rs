//! Inspector tuning knobs, loaded from the environment.

use core::time::Duration;
use std::env;

/// Runtime configuration for the interaction controller and its helpers.
#[derive(Clone, Debug, PartialEq)]
pub struct InspectorConfig {
    /// Maximum number of palette colors kept
    pub palette_cap: usize,
    /// Distance of the floating panel from the pointer, in both axes
    pub panel_offset: f64,
    /// How long the selection glow stays on
    pub glow_ms: u64,
    /// Recompute the cached palette when the page's stylesheets change
    pub refresh_palette: bool,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            palette_cap: 18,
            panel_offset: 15.0,
            glow_ms: 200,
            refresh_palette: false,
        }
    }
}

impl InspectorConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `LENS_PALETTE_CAP`: palette size limit (default: 18)
    /// - `LENS_PANEL_OFFSET`: panel offset from the pointer in pixels (default: 15)
    /// - `LENS_GLOW_MS`: selection glow duration in milliseconds (default: 200)
    /// - `LENS_REFRESH_PALETTE`: set to "1" to refresh the palette on stylesheet changes
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            palette_cap: env::var("LENS_PALETTE_CAP")
                .ok()
                .and_then(|val| val.trim().parse::<usize>().ok())
                .unwrap_or(defaults.palette_cap),
            panel_offset: env::var("LENS_PANEL_OFFSET")
                .ok()
                .and_then(|val| val.trim().parse::<f64>().ok())
                .filter(|offset| offset.is_finite())
                .unwrap_or(defaults.panel_offset),
            glow_ms: env::var("LENS_GLOW_MS")
                .ok()
                .and_then(|val| val.trim().parse::<u64>().ok())
                .unwrap_or(defaults.glow_ms),
            refresh_palette: env::var("LENS_REFRESH_PALETTE").ok().as_deref() == Some("1"),
        }
    }

    #[inline]
    #[must_use]
    pub const fn glow_duration(&self) -> Duration {
        Duration::from_millis(self.glow_ms)
    }
}
