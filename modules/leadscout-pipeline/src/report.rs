//! Batch-level quality monitoring.
//!
//! Aggregates per-site runs into error categories, a confidence
//! distribution, and operator-facing recommendations. Printed at the end of
//! a batch via `Display`.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::types::PipelineRun;

#[derive(Debug, Default)]
pub struct BatchReport {
    pub total: usize,
    pub completed: usize,
    pub matches: usize,
    pub failures: usize,
    pub strong_reviews: usize,
    pub elapsed_total: Duration,
    error_categories: BTreeMap<&'static str, usize>,
    distribution: ConfidenceDistribution,
}

#[derive(Debug, Default)]
struct ConfidenceDistribution {
    excellent: usize,
    good: usize,
    average: usize,
    poor: usize,
}

impl BatchReport {
    pub fn observe(&mut self, run: &PipelineRun) {
        self.total += 1;
        self.elapsed_total += run.elapsed;

        match &run.decision {
            Some(decision) => {
                self.completed += 1;
                if decision.is_match {
                    self.matches += 1;
                }
                if decision.reviewed_by.is_some() {
                    self.strong_reviews += 1;
                }
                match decision.blended_score {
                    s if s >= 80.0 => self.distribution.excellent += 1,
                    s if s >= 60.0 => self.distribution.good += 1,
                    s if s >= 40.0 => self.distribution.average += 1,
                    _ => self.distribution.poor += 1,
                }
            }
            None => {
                self.failures += 1;
                let category = run
                    .stages
                    .iter()
                    .find_map(|s| s.error.as_deref())
                    .map(categorize_error)
                    .unwrap_or("other");
                *self.error_categories.entry(category).or_default() += 1;
            }
        }
    }

    pub fn match_rate(&self) -> f64 {
        if self.completed == 0 {
            return 0.0;
        }
        self.matches as f64 / self.completed as f64 * 100.0
    }

    pub fn failure_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.failures as f64 / self.total as f64 * 100.0
    }

    /// Operator-facing hints derived from the aggregate shape of the batch.
    pub fn recommendations(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.total == 0 {
            return out;
        }
        if self.failure_rate() > 30.0 {
            out.push(format!(
                "{:.0}% of sites failed before a decision; check scraper connectivity and timeouts",
                self.failure_rate()
            ));
        }
        if let Some(&n) = self.error_categories.get("timeout") {
            if n as f64 / self.total as f64 > 0.15 {
                out.push(format!(
                    "{n} timeouts; consider raising the per-site timeout or lowering concurrency"
                ));
            }
        }
        if let Some(&n) = self.error_categories.get("json_parsing") {
            if n > 0 {
                out.push(format!(
                    "{n} unparseable model responses survived repair; inspect prompt drift"
                ));
            }
        }
        if self.completed > 0 {
            let poor_share = self.distribution.poor as f64 / self.completed as f64;
            if poor_share > 0.4 {
                out.push(
                    "over 40% of decisions scored poor; the input list may not fit this profile"
                        .to_string(),
                );
            }
        }
        out
    }
}

/// Bucket a stage error message into a monitoring category.
fn categorize_error(message: &str) -> &'static str {
    let m = message.to_lowercase();
    if m.contains("timed out") || m.contains("timeout") {
        "timeout"
    } else if m.contains("certificate") || m.contains("ssl") || m.contains("tls") {
        "ssl_certificate"
    } else if m.contains("too short") || m.contains("quality score") {
        "insufficient_content"
    } else if m.contains("json") || m.contains("parse") {
        "json_parsing"
    } else if m.contains("provider") || m.contains("status") {
        "api_error"
    } else if m.contains("fetch") || m.contains("network") || m.contains("connection") {
        "network_error"
    } else {
        "other"
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch summary")?;
        writeln!(
            f,
            "  sites: {} ({} completed, {} failed)",
            self.total, self.completed, self.failures
        )?;
        writeln!(
            f,
            "  matches: {} ({:.1}% of completed)",
            self.matches,
            self.match_rate()
        )?;
        writeln!(f, "  strong-tier reviews: {}", self.strong_reviews)?;
        writeln!(
            f,
            "  confidence: {} excellent / {} good / {} average / {} poor",
            self.distribution.excellent,
            self.distribution.good,
            self.distribution.average,
            self.distribution.poor
        )?;
        if !self.error_categories.is_empty() {
            writeln!(f, "  errors:")?;
            for (category, count) in &self.error_categories {
                writeln!(f, "    {category}: {count}")?;
            }
        }
        for hint in self.recommendations() {
            writeln!(f, "  hint: {hint}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FinalDecision, Stage, StageResult};

    fn decided(score: f64, is_match: bool) -> PipelineRun {
        PipelineRun {
            domain: "a.example.com".into(),
            stages: vec![],
            decision: Some(FinalDecision {
                is_match,
                label: None,
                reasoning: String::new(),
                blended_score: score,
                reviewed_by: None,
            }),
            elapsed: Duration::from_secs(1),
        }
    }

    fn failed(error: &str) -> PipelineRun {
        PipelineRun {
            domain: "b.example.com".into(),
            stages: vec![StageResult::failed(
                Stage::ContentExtraction,
                Duration::from_secs(1),
                error,
            )],
            decision: None,
            elapsed: Duration::from_secs(1),
        }
    }

    #[test]
    fn rates_and_distribution_accumulate() {
        let mut report = BatchReport::default();
        report.observe(&decided(85.0, true));
        report.observe(&decided(63.0, true));
        report.observe(&decided(35.0, false));
        report.observe(&failed("Site timed out after 45 seconds"));

        assert_eq!(report.total, 4);
        assert_eq!(report.completed, 3);
        assert_eq!(report.matches, 2);
        assert!((report.match_rate() - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.failure_rate(), 25.0);
        assert_eq!(report.distribution.excellent, 1);
        assert_eq!(report.distribution.good, 1);
        assert_eq!(report.distribution.poor, 1);
        assert_eq!(report.error_categories.get("timeout"), Some(&1));
    }

    #[test]
    fn error_messages_bucket_into_categories() {
        assert_eq!(categorize_error("Site timed out after 45 seconds"), "timeout");
        assert_eq!(categorize_error("invalid TLS certificate"), "ssl_certificate");
        assert_eq!(
            categorize_error("Content too short: 12 chars (minimum 30)"),
            "insufficient_content"
        );
        assert_eq!(categorize_error("no JSON object in response"), "json_parsing");
        assert_eq!(categorize_error("Provider error: status 500"), "api_error");
        assert_eq!(categorize_error("Fetch failure: connection refused"), "network_error");
        assert_eq!(categorize_error("mystery"), "other");
    }

    #[test]
    fn high_failure_rate_produces_a_hint() {
        let mut report = BatchReport::default();
        report.observe(&failed("Fetch failure: connection refused"));
        report.observe(&decided(70.0, true));
        let hints = report.recommendations();
        assert!(hints.iter().any(|h| h.contains("failed before a decision")));
    }

    #[test]
    fn empty_report_has_no_hints() {
        assert!(BatchReport::default().recommendations().is_empty());
        assert_eq!(BatchReport::default().match_rate(), 0.0);
    }
}
