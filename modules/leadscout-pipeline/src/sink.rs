//! Result persistence. One row per processed site, append-only CSV so an
//! interrupted batch can resume by skipping domains already on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use leadscout_common::LeadScoutError;

use crate::types::PipelineRun;

const HEADER: &str =
    "url,domain,is_match,label,blended_score,stages_completed,reviewed_by,reasoning,error,processed_at\n";

#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn record(&self, url: &str, run: &PipelineRun) -> Result<(), LeadScoutError>;
}

/// Append-only CSV sink. Writes are serialized through an internal lock so
/// concurrent site tasks never interleave rows.
pub struct CsvSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvSink {
    /// Open (or create) the output file, writing the header only when the
    /// file is new or empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, LeadScoutError> {
        let path = path.into();
        let needs_header = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        if needs_header {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await
                .map_err(|e| LeadScoutError::Config(format!("cannot open {}: {e}", path.display())))?;
            file.write_all(HEADER.as_bytes())
                .await
                .map_err(|e| LeadScoutError::Config(e.to_string()))?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Domains already present in an output file, for resume-skip.
    pub async fn processed_domains(path: &Path) -> HashSet<String> {
        let Ok(existing) = tokio::fs::read_to_string(path).await else {
            return HashSet::new();
        };
        let domains: HashSet<String> = existing
            .lines()
            .skip(1)
            .filter_map(|line| nth_csv_field(line, 1))
            .filter(|d| !d.is_empty())
            .collect();
        if !domains.is_empty() {
            info!(count = domains.len(), "resuming past already-processed domains");
        }
        domains
    }
}

#[async_trait]
impl ResultSink for CsvSink {
    async fn record(&self, url: &str, run: &PipelineRun) -> Result<(), LeadScoutError> {
        let row = format_csv_row(url, run);
        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| LeadScoutError::Config(format!("cannot open {}: {e}", self.path.display())))?;
        file.write_all(row.as_bytes())
            .await
            .map_err(|e| LeadScoutError::Config(e.to_string()))?;
        Ok(())
    }
}

fn format_csv_row(url: &str, run: &PipelineRun) -> String {
    let (is_match, label, score, reviewed_by, reasoning) = match &run.decision {
        Some(d) => (
            d.is_match.to_string(),
            d.label.clone().unwrap_or_default(),
            format!("{:.1}", d.blended_score),
            d.reviewed_by.unwrap_or(""),
            d.reasoning.clone(),
        ),
        None => (String::from("false"), String::new(), String::new(), "", String::new()),
    };
    let error = run
        .stages
        .iter()
        .find_map(|s| s.error.clone())
        .unwrap_or_default();

    let stages_completed = run.stages_completed().to_string();
    let processed_at = Utc::now().to_rfc3339();
    let fields: [&str; 10] = [
        url,
        run.domain.as_str(),
        is_match.as_str(),
        label.as_str(),
        score.as_str(),
        stages_completed.as_str(),
        reviewed_by,
        reasoning.as_str(),
        error.as_str(),
        processed_at.as_str(),
    ];
    let mut row = fields.map(csv_quote).join(",");
    row.push('\n');
    row
}

/// Extract the nth field of a CSV row, honoring quoted fields so a comma
/// inside a quoted URL does not shift the columns.
fn nth_csv_field(line: &str, n: usize) -> Option<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                if fields.len() > n {
                    break;
                }
            }
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields.into_iter().nth(n)
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn csv_quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FinalDecision, Stage, StageResult};
    use std::time::Duration;

    fn run_with_decision() -> PipelineRun {
        PipelineRun {
            domain: "acme.example.com".into(),
            stages: vec![StageResult::ok(
                Stage::ContentExtraction,
                100.0,
                Duration::from_millis(5),
            )],
            decision: Some(FinalDecision {
                is_match: true,
                label: Some("Software Lead".into()),
                reasoning: "SaaS, with \"login\" and pricing".into(),
                blended_score: 63.333,
                reviewed_by: None,
            }),
            elapsed: Duration::from_secs(1),
        }
    }

    #[test]
    fn rows_quote_embedded_commas_and_quotes() {
        let row = format_csv_row("https://acme.example.com", &run_with_decision());
        assert!(row.contains("\"SaaS, with \"\"login\"\" and pricing\""));
        assert!(row.contains("acme.example.com,true,Software Lead,63.3,1,"));
        assert!(row.ends_with('\n'));
    }

    #[tokio::test]
    async fn header_written_once_and_rows_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let sink = CsvSink::open(&path).await.unwrap();
        sink.record("https://acme.example.com", &run_with_decision())
            .await
            .unwrap();
        drop(sink);

        // Re-opening an existing file must not duplicate the header.
        let sink = CsvSink::open(&path).await.unwrap();
        sink.record("https://other.example.com", &run_with_decision())
            .await
            .unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents.matches("url,domain").count(), 1);
        assert_eq!(contents.lines().count(), 3);
    }

    #[tokio::test]
    async fn processed_domains_reads_the_second_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let sink = CsvSink::open(&path).await.unwrap();
        sink.record("https://acme.example.com", &run_with_decision())
            .await
            .unwrap();

        let domains = CsvSink::processed_domains(&path).await;
        assert!(domains.contains("acme.example.com"));
        assert_eq!(domains.len(), 1);
    }

    #[tokio::test]
    async fn quoted_commas_in_the_url_do_not_shift_the_domain_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let sink = CsvSink::open(&path).await.unwrap();
        let mut run = run_with_decision();
        run.domain = "query.example.com".into();
        sink.record("https://query.example.com/search?a=1,b=2", &run)
            .await
            .unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.contains("\"https://query.example.com/search?a=1,b=2\""));

        let domains = CsvSink::processed_domains(&path).await;
        assert!(domains.contains("query.example.com"));
        assert_eq!(domains.len(), 1);
    }

    #[test]
    fn nth_csv_field_unescapes_quoted_fields() {
        let line = r#""https://a.example.com/x,y",a.example.com,true,"said ""hi""""#;
        assert_eq!(
            nth_csv_field(line, 0).as_deref(),
            Some("https://a.example.com/x,y")
        );
        assert_eq!(nth_csv_field(line, 1).as_deref(), Some("a.example.com"));
        assert_eq!(nth_csv_field(line, 3).as_deref(), Some(r#"said "hi""#));
        assert_eq!(nth_csv_field(line, 4), None);
    }

    #[tokio::test]
    async fn missing_file_yields_no_processed_domains() {
        let domains = CsvSink::processed_domains(Path::new("/nonexistent/results.csv")).await;
        assert!(domains.is_empty());
    }
}
