//! Core data model for one site's journey through the pipeline.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pipeline stages, in strict sequence. Each gates the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ContentExtraction,
    ContentValidation,
    InitialClassification,
    DetailedAnalysis,
    CrossValidation,
    FinalDecision,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ContentExtraction => "content_extraction",
            Stage::ContentValidation => "content_validation",
            Stage::InitialClassification => "initial_classification",
            Stage::DetailedAnalysis => "detailed_analysis",
            Stage::CrossValidation => "cross_validation",
            Stage::FinalDecision => "final_decision",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one stage for one site.
#[derive(Debug, Clone)]
pub struct StageResult {
    pub stage: Stage,
    pub success: bool,
    pub confidence: f64,
    pub elapsed: Duration,
    pub error: Option<String>,
}

impl StageResult {
    pub fn ok(stage: Stage, confidence: f64, elapsed: Duration) -> Self {
        Self {
            stage,
            success: true,
            confidence,
            elapsed,
            error: None,
        }
    }

    pub fn failed(stage: Stage, elapsed: Duration, error: impl Into<String>) -> Self {
        Self {
            stage,
            success: false,
            confidence: 0.0,
            elapsed,
            error: Some(error.into()),
        }
    }
}

/// The classifier's binary verdict. Anything else out of the model is a
/// format failure, not a third value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "Match")]
    Match,
    #[serde(rename = "No Match")]
    NoMatch,
}

impl Classification {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Match" => Some(Classification::Match),
            "No Match" => Some(Classification::NoMatch),
            _ => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Classification::Match)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Match => f.write_str("Match"),
            Classification::NoMatch => f.write_str("No Match"),
        }
    }
}

/// Reviewer tag recorded when the strong tier produced the accepted result.
pub const STRONG_REVIEWER: &str = "pro";

/// Terminal artifact of the classification stage for one site.
#[derive(Debug, Clone)]
pub struct ClassificationVerdict {
    pub classification: Classification,
    pub final_output: String,
    pub reasoning: String,
    /// Carried from the extraction stage's validation result; this, not the
    /// classifier's own confidence, drives escalation and blending.
    pub extraction_confidence: u32,
    pub reviewed_by: Option<&'static str>,
}

/// The pipeline's final answer for a site that completed all six stages.
#[derive(Debug, Clone)]
pub struct FinalDecision {
    pub is_match: bool,
    /// Profile-specific human-readable label, present only on a match.
    pub label: Option<String>,
    pub reasoning: String,
    pub blended_score: f64,
    pub reviewed_by: Option<&'static str>,
}

/// One site's aggregated journey: per-stage outcomes plus the final
/// decision (None when a stage short-circuited the run).
#[derive(Debug)]
pub struct PipelineRun {
    pub domain: String,
    pub stages: Vec<StageResult>,
    pub decision: Option<FinalDecision>,
    pub elapsed: Duration,
}

impl PipelineRun {
    pub fn stages_completed(&self) -> usize {
        self.stages.iter().filter(|s| s.success).count()
    }

    pub fn is_match(&self) -> bool {
        self.decision.as_ref().is_some_and(|d| d.is_match)
    }
}
