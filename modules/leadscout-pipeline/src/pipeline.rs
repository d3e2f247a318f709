//! Six-stage orchestration for a single site.
//!
//! Stages run in strict order and each gates the next: content extraction,
//! content validation, initial (keyword) classification, detailed LLM
//! analysis, cross-validation, final decision. A failed stage ends the run
//! with no decision; a pre-filter rejection ends it with a cheap No Match
//! decision and no model calls.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use leadscout_common::LeadScoutError;

use crate::classify::Classifier;
use crate::extract::Extractor;
use crate::prefilter::{self, PrefilterVerdict};
use crate::profiles::ProfileDefinition;
use crate::quality::{self, MIN_CONTENT_LENGTH};
use crate::traits::{ContentFetcher, TextGenerator};
use crate::types::{
    Classification, ClassificationVerdict, FinalDecision, PipelineRun, Stage, StageResult,
};
use crate::util;

/// Score contribution of the classifier's verdict in the final blend.
const MATCH_SIGNAL: f64 = 70.0;
const NO_MATCH_SIGNAL: f64 = 30.0;
/// Added when the keyword pre-filter and the LLM verdict agree.
const CONSISTENCY_BONUS: f64 = 20.0;

pub struct SitePipeline {
    fetcher: Arc<dyn ContentFetcher>,
    generator: Arc<dyn TextGenerator>,
    profile: &'static ProfileDefinition,
    strict_content_gate: bool,
    confidence_threshold: f64,
}

impl SitePipeline {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        generator: Arc<dyn TextGenerator>,
        profile: &'static ProfileDefinition,
        strict_content_gate: bool,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            fetcher,
            generator,
            profile,
            strict_content_gate,
            confidence_threshold,
        }
    }

    /// Run all stages for one site. Stage-level failures are recorded on the
    /// run, never propagated; the returned run always tells the whole story.
    pub async fn run(&self, url: &str) -> PipelineRun {
        let started = Instant::now();
        let domain = util::extract_domain(url);
        let mut stages = Vec::with_capacity(6);

        // Stage 1: content extraction.
        let stage_start = Instant::now();
        let content = match self.fetch_content(url).await {
            Ok(text) => {
                stages.push(StageResult::ok(
                    Stage::ContentExtraction,
                    100.0,
                    stage_start.elapsed(),
                ));
                text
            }
            Err(e) => {
                warn!(domain, error = %e, "content extraction failed");
                stages.push(StageResult::failed(
                    Stage::ContentExtraction,
                    stage_start.elapsed(),
                    e.to_string(),
                ));
                return self.finish(domain, stages, None, started);
            }
        };

        // Stage 2: content validation.
        let stage_start = Instant::now();
        let verdict = quality::score(&content, self.strict_content_gate);
        if !verdict.passed {
            stages.push(StageResult::failed(
                Stage::ContentValidation,
                stage_start.elapsed(),
                format!(
                    "quality score {} below minimum ({})",
                    verdict.quality_score,
                    verdict.issues.join("; ")
                ),
            ));
            return self.finish(domain, stages, None, started);
        }
        if verdict.forced_pass {
            info!(
                domain,
                quality = verdict.quality_score,
                "low-quality content passed through lenient gate"
            );
        }
        stages.push(StageResult::ok(
            Stage::ContentValidation,
            verdict.quality_score as f64,
            stage_start.elapsed(),
        ));

        // Stage 3: initial keyword classification.
        let stage_start = Instant::now();
        let prefilter = prefilter::evaluate(&content, self.profile);
        stages.push(StageResult::ok(
            Stage::InitialClassification,
            prefilter.confidence as f64,
            stage_start.elapsed(),
        ));
        if !prefilter.potential_match {
            info!(
                domain,
                profile_score = prefilter.profile_score,
                exclusion_score = prefilter.exclusion_score,
                "rejected by keyword pre-filter"
            );
            let decision = FinalDecision {
                is_match: false,
                label: None,
                reasoning: format!(
                    "Keyword pre-filter rejection: {} profile keyword(s), {} exclusion keyword(s)",
                    prefilter.profile_score, prefilter.exclusion_score
                ),
                blended_score: 0.0,
                reviewed_by: None,
            };
            stages.push(StageResult::ok(Stage::FinalDecision, 100.0, stage_start.elapsed()));
            return self.finish(domain, stages, Some(decision), started);
        }

        // Stage 4: detailed LLM analysis.
        let stage_start = Instant::now();
        let (facts_reviewed_by, extraction_confidence, verdict) =
            match self.detailed_analysis(&content).await {
                Ok(parts) => parts,
                Err(e) => {
                    warn!(domain, error = %e, "detailed analysis failed");
                    stages.push(StageResult::failed(
                        Stage::DetailedAnalysis,
                        stage_start.elapsed(),
                        e.to_string(),
                    ));
                    return self.finish(domain, stages, None, started);
                }
            };
        stages.push(StageResult::ok(
            Stage::DetailedAnalysis,
            extraction_confidence as f64,
            stage_start.elapsed(),
        ));

        // Stage 5: cross-validation of the cheap and the LLM verdicts.
        let stage_start = Instant::now();
        let consistent = self.is_consistent(&prefilter, &verdict);
        stages.push(StageResult::ok(
            Stage::CrossValidation,
            if consistent { 100.0 } else { 50.0 },
            stage_start.elapsed(),
        ));

        // Stage 6: final decision.
        let stage_start = Instant::now();
        let decision = self.decide(&verdict, extraction_confidence, consistent, facts_reviewed_by);
        stages.push(StageResult::ok(
            Stage::FinalDecision,
            decision.blended_score,
            stage_start.elapsed(),
        ));

        info!(
            domain,
            is_match = decision.is_match,
            score = decision.blended_score,
            "site classified"
        );
        self.finish(domain, stages, Some(decision), started)
    }

    async fn fetch_content(&self, url: &str) -> Result<String, LeadScoutError> {
        let text = self
            .fetcher
            .fetch_text(url)
            .await?
            .unwrap_or_default();
        if text.len() < MIN_CONTENT_LENGTH {
            return Err(LeadScoutError::ContentTooShort {
                length: text.len(),
                minimum: MIN_CONTENT_LENGTH,
            });
        }
        Ok(text)
    }

    async fn detailed_analysis(
        &self,
        content: &str,
    ) -> Result<(Option<&'static str>, u32, ClassificationVerdict), LeadScoutError> {
        let facts = Extractor::new(self.generator.as_ref())
            .extract(content, self.profile)
            .await?;
        let verdict = Classifier::new(self.generator.as_ref())
            .classify(&facts, self.profile)
            .await?;
        Ok((facts.reviewed_by, facts.validation.score, verdict))
    }

    fn is_consistent(&self, prefilter: &PrefilterVerdict, verdict: &ClassificationVerdict) -> bool {
        prefilter.potential_match == verdict.classification.is_match()
    }

    fn decide(
        &self,
        verdict: &ClassificationVerdict,
        extraction_confidence: u32,
        consistent: bool,
        facts_reviewed_by: Option<&'static str>,
    ) -> FinalDecision {
        let verdict_signal = match verdict.classification {
            Classification::Match => MATCH_SIGNAL,
            Classification::NoMatch => NO_MATCH_SIGNAL,
        };
        let bonus = if consistent { CONSISTENCY_BONUS } else { 0.0 };
        let blended_score = (extraction_confidence as f64 + verdict_signal + bonus) / 3.0;

        let is_match =
            verdict.classification.is_match() && blended_score >= self.confidence_threshold;

        FinalDecision {
            is_match,
            label: is_match.then(|| self.match_label(verdict)),
            reasoning: verdict.reasoning.clone(),
            blended_score,
            reviewed_by: verdict.reviewed_by.or(facts_reviewed_by),
        }
    }

    fn match_label(&self, verdict: &ClassificationVerdict) -> String {
        match self.profile.match_label {
            Some(label) => label.to_string(),
            // EdTech splits on whether the reasoning points at a software
            // provider rather than a platform operator.
            None => {
                if verdict.reasoning.to_lowercase().contains("provider") {
                    "EdTech Software Provider".to_string()
                } else {
                    "EdTech Platform".to_string()
                }
            }
        }
    }

    fn finish(
        &self,
        domain: String,
        stages: Vec<StageResult>,
        decision: Option<FinalDecision>,
        started: Instant,
    ) -> PipelineRun {
        PipelineRun {
            domain,
            stages,
            decision,
            elapsed: started.elapsed(),
        }
    }
}
