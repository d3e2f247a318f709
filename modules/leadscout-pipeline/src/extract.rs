//! Structured fact extraction with validation-driven retries.
//!
//! The extractor runs up to [`MAX_FAST_ATTEMPTS`] passes on the fast tier.
//! After a failed attempt the prompt is extended with the validator's
//! findings, credential errors rotate the key pool, and attempts back off
//! exponentially with jitter. If the fast tier never produces a valid
//! extraction, a single strong-tier pass at temperature 0.0 gets the final
//! word.

use std::time::Duration;

use rand::Rng;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use ai_client::util::truncate_to_char_boundary;
use ai_client::ModelTier;
use leadscout_common::LeadScoutError;

use crate::profiles::ProfileDefinition;
use crate::prompts::{self, MAX_PROMPT_CONTENT};
use crate::traits::TextGenerator;
use crate::validate::{self, FieldValidation};
use crate::{json_repair, types::STRONG_REVIEWER};

const MAX_FAST_ATTEMPTS: u32 = 3;
const FAST_TEMPERATURE: f32 = 0.2;
const STRONG_TEMPERATURE: f32 = 0.0;

#[derive(Debug, Clone)]
pub struct ExtractedFacts {
    pub fields: Map<String, Value>,
    pub validation: FieldValidation,
    /// Set when the strong tier produced the accepted extraction.
    pub reviewed_by: Option<&'static str>,
}

impl ExtractedFacts {
    /// Compact JSON of the fields, fed to the classification prompt.
    pub fn summary_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

pub struct Extractor<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> Extractor<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    pub async fn extract(
        &self,
        content: &str,
        profile: &ProfileDefinition,
    ) -> Result<ExtractedFacts, LeadScoutError> {
        let content = truncate_to_char_boundary(content, MAX_PROMPT_CONTENT);
        let base_prompt = prompts::render_extraction(profile.extraction_prompt, content);

        let mut last_failure: Option<String> = None;
        for attempt in 0..MAX_FAST_ATTEMPTS {
            if attempt > 0 {
                backoff(attempt).await;
            }
            let prompt = match &last_failure {
                Some(feedback) => remediation_prompt(&base_prompt, feedback),
                None => base_prompt.clone(),
            };

            match self.attempt(&prompt, ModelTier::Fast, FAST_TEMPERATURE, profile).await {
                Ok(facts) if facts.validation.is_valid => {
                    debug!(
                        profile = profile.id,
                        attempt,
                        score = facts.validation.score,
                        "extraction accepted"
                    );
                    return Ok(facts);
                }
                Ok(facts) => {
                    warn!(
                        profile = profile.id,
                        attempt,
                        score = facts.validation.score,
                        threshold = profile.validity_threshold,
                        "extraction below validity threshold"
                    );
                    last_failure = Some(validation_feedback(&facts.validation));
                }
                Err(LeadScoutError::ProviderAuth(msg)) => {
                    warn!(profile = profile.id, attempt, error = %msg, "credential error, rotating key");
                    self.generator.rotate_credentials();
                    last_failure = Some("The previous request failed before producing output.".into());
                }
                Err(e) => {
                    warn!(profile = profile.id, attempt, error = %e, "extraction attempt failed");
                    last_failure = Some("The previous request failed before producing output.".into());
                }
            }
        }

        // Strong-tier escalation: one deterministic pass on the original
        // prompt, with no remediation feedback carried over.
        warn!(profile = profile.id, "escalating extraction to strong tier");
        let mut facts = self
            .attempt(&base_prompt, ModelTier::Strong, STRONG_TEMPERATURE, profile)
            .await?;
        facts.reviewed_by = Some(STRONG_REVIEWER);
        if !facts.validation.is_valid {
            return Err(LeadScoutError::ValidationFailure(format!(
                "extraction score {} below threshold {} after escalation",
                facts.validation.score, profile.validity_threshold
            )));
        }
        Ok(facts)
    }

    async fn attempt(
        &self,
        prompt: &str,
        tier: ModelTier,
        temperature: f32,
        profile: &ProfileDefinition,
    ) -> Result<ExtractedFacts, LeadScoutError> {
        let raw = self.generator.generate(prompt, tier, temperature).await?;
        let parsed = json_repair::parse_object(&raw)
            .ok_or_else(|| LeadScoutError::ParseFailure("no JSON object in response".into()))?;
        let Value::Object(fields) = parsed else {
            return Err(LeadScoutError::ParseFailure("response is not a JSON object".into()));
        };
        let validation = validate::validate(&fields, profile);
        Ok(ExtractedFacts {
            fields,
            validation,
            reviewed_by: None,
        })
    }
}

fn remediation_prompt(base: &str, feedback: &str) -> String {
    format!(
        "{base}\n\n**IMPORTANT — a previous attempt was rejected:** {feedback}\n\
         Re-read the content carefully and fill every field you can support with evidence. \
         Return only the JSON object."
    )
}

fn validation_feedback(validation: &FieldValidation) -> String {
    if validation.missing_fields.is_empty() {
        format!(
            "the extraction scored {} which is too low; field values were too thin",
            validation.score
        )
    } else {
        format!(
            "the extraction scored {} and left these fields empty: {}",
            validation.score,
            validation.missing_fields.join(", ")
        )
    }
}

async fn backoff(attempt: u32) {
    let base_ms = 1000u64 * (1 << attempt);
    let jitter_ms = rand::rng().random_range(0..500);
    tokio::time::sleep(Duration::from_millis(base_ms + jitter_ms)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::profile;
    use crate::testing::MockGenerator;

    const VALID_SOFTWARE: &str = r#"{
        "company_description": "ACME builds project tracking software.",
        "business_model": "SaaS",
        "software_name": "AcmeTrack",
        "software_purpose": "Tracks engineering projects.",
        "mentioned_products": ["AcmeTrack"],
        "has_login_button": true,
        "has_pricing_page": true,
        "target_audience": "General B2B"
    }"#;

    const THIN_SOFTWARE: &str = r#"{
        "company_description": "x",
        "business_model": null,
        "software_name": null,
        "software_purpose": null,
        "mentioned_products": [],
        "has_login_button": false,
        "has_pricing_page": false,
        "target_audience": null
    }"#;

    #[tokio::test]
    async fn first_attempt_success_needs_no_retry() {
        let gen = MockGenerator::new(vec![Ok(VALID_SOFTWARE.into())]);
        let facts = Extractor::new(&gen)
            .extract("some page text", profile("software").unwrap())
            .await
            .unwrap();
        assert!(facts.validation.is_valid);
        assert!(facts.reviewed_by.is_none());
        assert_eq!(gen.calls().len(), 1);
        assert_eq!(gen.calls()[0].tier, ModelTier::Fast);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_attempts_retry_with_remediation_then_escalate() {
        let gen = MockGenerator::new(vec![
            Ok(THIN_SOFTWARE.into()),
            Ok(THIN_SOFTWARE.into()),
            Ok(THIN_SOFTWARE.into()),
            Ok(VALID_SOFTWARE.into()),
        ]);
        let facts = Extractor::new(&gen)
            .extract("some page text", profile("software").unwrap())
            .await
            .unwrap();
        assert!(facts.validation.is_valid);
        assert_eq!(facts.reviewed_by, Some("pro"));

        let calls = gen.calls();
        assert_eq!(calls.len(), 4);
        assert!(!calls[0].prompt.contains("previous attempt was rejected"));
        assert!(calls[1].prompt.contains("previous attempt was rejected"));
        assert_eq!(calls[3].tier, ModelTier::Strong);
        assert_eq!(calls[3].temperature, 0.0);
        // The escalation pass gets the untouched original prompt.
        assert!(!calls[3].prompt.contains("previous attempt was rejected"));
        assert_eq!(calls[3].prompt, calls[0].prompt);
    }

    #[tokio::test(start_paused = true)]
    async fn credential_errors_rotate_keys() {
        let gen = MockGenerator::new(vec![
            Err(LeadScoutError::ProviderAuth("status 429".into())),
            Ok(VALID_SOFTWARE.into()),
        ]);
        let facts = Extractor::new(&gen)
            .extract("some page text", profile("software").unwrap())
            .await
            .unwrap();
        assert!(facts.validation.is_valid);
        assert_eq!(gen.rotations(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn escalation_failure_surfaces_validation_error() {
        let gen = MockGenerator::new(vec![
            Ok(THIN_SOFTWARE.into()),
            Ok(THIN_SOFTWARE.into()),
            Ok(THIN_SOFTWARE.into()),
            Ok(THIN_SOFTWARE.into()),
        ]);
        let err = Extractor::new(&gen)
            .extract("some page text", profile("software").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, LeadScoutError::ValidationFailure(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn garbage_responses_count_as_failed_attempts() {
        let gen = MockGenerator::new(vec![
            Ok("not json at all".into()),
            Ok(VALID_SOFTWARE.into()),
        ]);
        let facts = Extractor::new(&gen)
            .extract("some page text", profile("software").unwrap())
            .await
            .unwrap();
        assert!(facts.validation.is_valid);
        assert_eq!(gen.calls().len(), 2);
    }
}
