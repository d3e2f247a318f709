//! Scripted fakes for the pipeline's async seams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use leadscout_common::LeadScoutError;

use ai_client::ModelTier;

use crate::traits::{ContentFetcher, TextGenerator};

/// A fetcher that replays scripted outcomes in order, regardless of URL.
pub struct MockFetcher {
    responses: Mutex<Vec<Result<Option<String>, LeadScoutError>>>,
    requested: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new(responses: Vec<Result<Option<String>, LeadScoutError>>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(text: &str) -> Self {
        Self::new(vec![Ok(Some(text.to_string()))])
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>, LeadScoutError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(LeadScoutError::FetchFailure("mock script exhausted".into())))
    }
}

/// One recorded call to [`MockGenerator::generate`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub tier: ModelTier,
    pub temperature: f32,
}

/// A generator that replays scripted responses in order and records every
/// prompt it receives.
pub struct MockGenerator {
    responses: Mutex<Vec<Result<String, LeadScoutError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    rotations: AtomicUsize,
}

impl MockGenerator {
    pub fn new(responses: Vec<Result<String, LeadScoutError>>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
            rotations: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn rotations(&self) -> usize {
        self.rotations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        prompt: &str,
        tier: ModelTier,
        temperature: f32,
    ) -> Result<String, LeadScoutError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            tier,
            temperature,
        });
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(LeadScoutError::Provider("mock script exhausted".into())))
    }

    fn rotate_credentials(&self) {
        self.rotations.fetch_add(1, Ordering::SeqCst);
    }
}
