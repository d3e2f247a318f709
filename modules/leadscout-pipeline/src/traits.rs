//! Async seams between the pipeline and its external services.

use async_trait::async_trait;
use leadscout_common::LeadScoutError;

use ai_client::{Gemini, ModelTier};
use browserless_client::BrowserlessClient;

/// Fetches readable page text for a URL. `Ok(None)` means the page rendered
/// but yielded no usable text.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>, LeadScoutError>;
}

/// Generates text from a prompt at a given model tier.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        tier: ModelTier,
        temperature: f32,
    ) -> Result<String, LeadScoutError>;

    /// Advance to the next credential after a quota or auth failure.
    fn rotate_credentials(&self);
}

#[async_trait]
impl ContentFetcher for BrowserlessClient {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>, LeadScoutError> {
        self.text(url)
            .await
            .map_err(|e| LeadScoutError::FetchFailure(e.to_string()))
    }
}

#[async_trait]
impl TextGenerator for Gemini {
    async fn generate(
        &self,
        prompt: &str,
        tier: ModelTier,
        temperature: f32,
    ) -> Result<String, LeadScoutError> {
        Gemini::generate(self, prompt, tier, temperature)
            .await
            .map_err(|e| {
                if e.is_credential_error() {
                    LeadScoutError::ProviderAuth(e.to_string())
                } else {
                    LeadScoutError::Provider(e.to_string())
                }
            })
    }

    fn rotate_credentials(&self) {
        self.keys().rotate();
    }
}
