//! Configuration settings for the Lens page host.
//!
//! This module defines the viewport the page is evaluated against and the
//! timeout used when fetching the document and its linked stylesheets.
//! Configuration can be loaded from environment variables or constructed
//! programmatically.

use core::time::Duration;
use std::env;

use css::Viewport;

/// Runtime configuration for a hosted page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageConfig {
    /// Viewport width in CSS pixels
    pub viewport_width: f64,
    /// Viewport height in CSS pixels
    pub viewport_height: f64,
    /// Timeout for every network fetch, in milliseconds
    pub fetch_timeout_ms: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::new(1280.0, 800.0, 10_000)
    }
}

impl PageConfig {
    /// Construct a new `PageConfig` with explicit values.
    ///
    /// Non-positive viewport sizes fall back to the defaults and the timeout
    /// is clamped to at least one millisecond.
    #[inline]
    #[must_use]
    pub fn new(viewport_width: f64, viewport_height: f64, fetch_timeout_ms: u64) -> Self {
        Self {
            viewport_width: positive_or(viewport_width, 1280.0),
            viewport_height: positive_or(viewport_height, 800.0),
            fetch_timeout_ms: fetch_timeout_ms.max(1),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `LENS_VIEWPORT_WIDTH`: viewport width in pixels (default: 1280)
    /// - `LENS_VIEWPORT_HEIGHT`: viewport height in pixels (default: 800)
    /// - `LENS_FETCH_TIMEOUT_MS`: fetch timeout in milliseconds (default: 10000)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let number = |key: &str| env::var(key).ok().and_then(|val| val.trim().parse::<f64>().ok());
        let fetch_timeout_ms = env::var("LENS_FETCH_TIMEOUT_MS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(10_000);
        Self::new(
            number("LENS_VIEWPORT_WIDTH").unwrap_or(1280.0),
            number("LENS_VIEWPORT_HEIGHT").unwrap_or(800.0),
            fetch_timeout_ms,
        )
    }

    #[inline]
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_values_fall_back() {
        let config = PageConfig::new(-1.0, f64::NAN, 0);
        assert_eq!(config.viewport(), Viewport::default());
        assert_eq!(config.fetch_timeout(), Duration::from_millis(1));
    }
}
