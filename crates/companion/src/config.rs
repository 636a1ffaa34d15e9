//! Assistant endpoint settings, loaded from the environment.

use core::time::Duration;
use std::env;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Model name placed in the request path
    pub model: String,
    /// Scheme and host of the API, without a trailing slash
    pub endpoint: String,
    /// Whole-request timeout
    pub timeout_ms: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout_ms: 60_000,
        }
    }
}

impl AssistantConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `LENS_GEMINI_MODEL`: model name (default: gemini-2.5-flash)
    /// - `LENS_GEMINI_ENDPOINT`: API base URL (default: the public Gemini API)
    /// - `LENS_GEMINI_TIMEOUT_MS`: request timeout in milliseconds (default: 60000)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: env::var("LENS_GEMINI_MODEL")
                .ok()
                .map(|model| model.trim().to_owned())
                .filter(|model| !model.is_empty())
                .unwrap_or(defaults.model),
            endpoint: env::var("LENS_GEMINI_ENDPOINT")
                .ok()
                .map(|endpoint| endpoint.trim().trim_end_matches('/').to_owned())
                .filter(|endpoint| !endpoint.is_empty())
                .unwrap_or(defaults.endpoint),
            timeout_ms: env::var("LENS_GEMINI_TIMEOUT_MS")
                .ok()
                .and_then(|val| val.trim().parse::<u64>().ok())
                .filter(|timeout| *timeout > 0)
                .unwrap_or(defaults.timeout_ms),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        endpoint.trim_end_matches('/').clone_into(&mut self.endpoint);
        self
    }

    #[inline]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `generateContent` URL for the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_url_names_model() {
        let config = AssistantConfig::default().with_endpoint("http://127.0.0.1:9/");
        assert_eq!(
            config.generate_url(),
            "http://127.0.0.1:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
