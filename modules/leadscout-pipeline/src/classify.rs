//! Classification over extracted facts, with confidence-gated escalation.
//!
//! The fast tier answers first. The verdict escalates to the strong tier
//! when the extraction confidence sits below the profile's floor, or when a
//! No Match lands in the ambiguous confidence band. A strong verdict that
//! parses cleanly replaces the fast one; otherwise the fast verdict stands.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use ai_client::ModelTier;
use leadscout_common::LeadScoutError;

use crate::extract::ExtractedFacts;
use crate::json_repair;
use crate::profiles::ProfileDefinition;
use crate::prompts;
use crate::traits::TextGenerator;
use crate::types::{Classification, ClassificationVerdict, STRONG_REVIEWER};

const MAX_FAST_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const FAST_TEMPERATURE: f32 = 0.2;
const STRONG_TEMPERATURE: f32 = 0.0;

/// No Match verdicts whose extraction confidence falls in this half-open
/// band are second-guessed by the strong tier.
const AMBIGUOUS_BAND: std::ops::Range<f64> = 35.0..65.0;

pub struct Classifier<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> Classifier<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    pub async fn classify(
        &self,
        facts: &ExtractedFacts,
        profile: &ProfileDefinition,
    ) -> Result<ClassificationVerdict, LeadScoutError> {
        let prompt = prompts::render_classification(
            profile.classification_prompt,
            &facts.summary_json(),
        );
        let extraction_confidence = facts.validation.score;

        let fast = self.attempt_with_retries(&prompt, extraction_confidence).await;

        let verdict = match fast {
            Ok(verdict) => {
                if self.should_escalate(&verdict, profile) {
                    debug!(
                        profile = profile.id,
                        classification = %verdict.classification,
                        extraction_confidence,
                        "escalating verdict to strong tier"
                    );
                    match self.attempt(&prompt, ModelTier::Strong, STRONG_TEMPERATURE, extraction_confidence).await {
                        Ok(mut strong) => {
                            strong.reviewed_by = Some(STRONG_REVIEWER);
                            strong
                        }
                        Err(e) => {
                            warn!(profile = profile.id, error = %e, "strong review failed, keeping fast verdict");
                            verdict
                        }
                    }
                } else {
                    verdict
                }
            }
            // The fast tier never produced a usable verdict; the strong tier
            // is the last resort rather than a reviewer.
            Err(e) => {
                warn!(profile = profile.id, error = %e, "fast tier exhausted, strong fallback");
                let mut strong = self
                    .attempt(&prompt, ModelTier::Strong, STRONG_TEMPERATURE, extraction_confidence)
                    .await?;
                strong.reviewed_by = Some(STRONG_REVIEWER);
                strong
            }
        };

        Ok(verdict)
    }

    fn should_escalate(&self, verdict: &ClassificationVerdict, profile: &ProfileDefinition) -> bool {
        let confidence = verdict.extraction_confidence as f64;
        if confidence < profile.escalation_threshold {
            return true;
        }
        verdict.classification == Classification::NoMatch && AMBIGUOUS_BAND.contains(&confidence)
    }

    async fn attempt_with_retries(
        &self,
        prompt: &str,
        extraction_confidence: u32,
    ) -> Result<ClassificationVerdict, LeadScoutError> {
        let mut last_err = None;
        for attempt in 0..MAX_FAST_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(RETRY_DELAY).await;
            }
            match self
                .attempt(prompt, ModelTier::Fast, FAST_TEMPERATURE, extraction_confidence)
                .await
            {
                Ok(verdict) => return Ok(verdict),
                Err(e) => {
                    warn!(attempt, error = %e, "classification attempt failed");
                    if matches!(e, LeadScoutError::ProviderAuth(_)) {
                        self.generator.rotate_credentials();
                    }
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            LeadScoutError::ClassificationFormat("no classification attempts ran".into())
        }))
    }

    async fn attempt(
        &self,
        prompt: &str,
        tier: ModelTier,
        temperature: f32,
        extraction_confidence: u32,
    ) -> Result<ClassificationVerdict, LeadScoutError> {
        let raw = self.generator.generate(prompt, tier, temperature).await?;
        let parsed = json_repair::parse_object(&raw)
            .ok_or_else(|| LeadScoutError::ParseFailure("no JSON object in response".into()))?;
        parse_verdict(&parsed, extraction_confidence)
    }
}

/// Validate the structural contract of a classifier response.
fn parse_verdict(
    parsed: &Value,
    extraction_confidence: u32,
) -> Result<ClassificationVerdict, LeadScoutError> {
    let reasoning = nonempty_str(parsed, "reasoning")?;
    let raw_class = nonempty_str(parsed, "classification")?;
    let final_output = nonempty_str(parsed, "final_output")?;

    let classification = Classification::parse(&raw_class).ok_or_else(|| {
        LeadScoutError::ClassificationFormat(format!("unrecognized classification '{raw_class}'"))
    })?;

    Ok(ClassificationVerdict {
        classification,
        final_output,
        reasoning,
        extraction_confidence,
        reviewed_by: None,
    })
}

fn nonempty_str(parsed: &Value, key: &str) -> Result<String, LeadScoutError> {
    let s = parsed
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");
    if s.is_empty() {
        return Err(LeadScoutError::ClassificationFormat(format!(
            "missing or empty '{key}'"
        )));
    }
    Ok(s.to_string())
}
