mod client;
pub(crate) mod types;

use std::sync::Arc;

use tracing::debug;

use crate::error::{GeminiError, Result};
use crate::keys::KeyPool;
use client::GeminiClient;
use types::GenerateRequest;

/// Primary tier: cheap and fast, carries the bulk of extraction work.
const FAST_MODEL: &str = "gemini-1.5-flash-latest";
/// Escalation tier: stronger and more deterministic, used when the fast
/// tier fails validation or confidence is low.
const STRONG_MODEL: &str = "gemini-1.5-pro-latest";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Fast,
    Strong,
}

impl ModelTier {
    pub fn model_name(&self) -> &'static str {
        match self {
            ModelTier::Fast => FAST_MODEL,
            ModelTier::Strong => STRONG_MODEL,
        }
    }
}

/// Gemini agent. Reads the active API key from the injected pool on every
/// call, so a rotation by one task is picked up by all of them.
#[derive(Clone)]
pub struct Gemini {
    keys: Arc<KeyPool>,
    base_url: Option<String>,
}

impl Gemini {
    pub fn new(keys: Arc<KeyPool>) -> Self {
        Self {
            keys,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn keys(&self) -> &Arc<KeyPool> {
        &self.keys
    }

    fn client(&self) -> GeminiClient {
        let client = GeminiClient::new();
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// Send one prompt to the given tier and return the raw response text.
    /// No structural guarantee on the text; callers own JSON extraction.
    pub async fn generate(
        &self,
        prompt: &str,
        tier: ModelTier,
        temperature: f32,
    ) -> Result<String> {
        let model = tier.model_name();
        let request = GenerateRequest::new(prompt, temperature);

        let response = self
            .client()
            .generate(model, self.keys.current(), &request)
            .await?;

        let text = response.text().ok_or(GeminiError::EmptyResponse)?;
        debug!(model, response_chars = text.len(), "Gemini response received");
        Ok(text)
    }
}
