//! Gemini `generateContent` client.

use log::{debug, error};
use reqwest::Client;

use crate::config::AssistantConfig;
use crate::context::AttachedContext;
use crate::error::AssistantError;
use crate::prompt::{SYSTEM_INSTRUCTION, component_part};
use crate::types::{Content, GenerateRequest, GenerateResponse, Part};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    url: String,
    client: Client,
}

impl GeminiClient {
    /// Client for the configured endpoint and model.
    pub fn new(config: &AssistantConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|err| {
                debug!("falling back to default HTTP client: {err}");
                Client::new()
            });
        Self {
            url: config.generate_url(),
            client,
        }
    }

    /// Client posting to an explicit `generateContent` URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request body for one prompt: the prompt text, the attached component's
    /// markup and the attached images, in that order.
    pub fn build_request(prompt: &str, context: &AttachedContext) -> GenerateRequest {
        let mut parts = vec![Part::text(prompt)];
        if let Some(element) = &context.element {
            parts.push(Part::text(component_part(&element.outer_html)));
        }
        parts.extend(context.images.iter().map(|image| image.to_part()));
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(SYSTEM_INSTRUCTION)],
            },
            contents: vec![Content { role: None, parts }],
        }
    }

    /// Send one prompt and return the first text part of the first candidate.
    ///
    /// # Errors
    ///
    /// - [`AssistantError::KeyNotFound`] when no key is configured; nothing is sent.
    /// - [`AssistantError::Network`] when the request or body read fails.
    /// - [`AssistantError::Api`] when the body carries an error object.
    /// - [`AssistantError::Malformed`] when the body has no text candidate.
    pub async fn generate(
        &self,
        api_key: Option<&str>,
        prompt: &str,
        context: &AttachedContext,
    ) -> Result<String, AssistantError> {
        let key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AssistantError::KeyNotFound)?;
        let body = Self::build_request(prompt, context);
        debug!(
            "generateContent: {} part(s) to {}",
            body.contents.iter().map(|content| content.parts.len()).sum::<usize>(),
            self.url
        );

        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                error!("generateContent request failed: {err}");
                AssistantError::Network(err.to_string())
            })?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: GenerateResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(AssistantError::Api {
                    message: format!("HTTP {}: {}", status.as_u16(), text.trim()),
                });
            }
            Err(err) => return Err(AssistantError::Malformed(err.to_string())),
        };
        if let Some(api_error) = parsed.error {
            error!("generateContent returned an error: {}", api_error.message);
            return Err(AssistantError::Api {
                message: api_error.message,
            });
        }
        parsed
            .first_text()
            .map(str::to_owned)
            .ok_or_else(|| AssistantError::Malformed("no text candidate".to_owned()))
    }
}
