//! Batch driver: loads the URL list, dedupes by domain, skips domains that
//! already have a row in the output file, and drives the per-site pipeline
//! under a concurrency cap with a hard per-site deadline.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use leadscout_common::LeadScoutError;

use crate::pipeline::SitePipeline;
use crate::report::BatchReport;
use crate::sink::ResultSink;
use crate::types::{PipelineRun, Stage, StageResult};
use crate::util;

pub struct BatchRunner {
    pipeline: Arc<SitePipeline>,
    sink: Arc<dyn ResultSink>,
    max_concurrent: usize,
    site_timeout: Duration,
    fail_fast: bool,
}

impl BatchRunner {
    pub fn new(
        pipeline: Arc<SitePipeline>,
        sink: Arc<dyn ResultSink>,
        max_concurrent: usize,
        site_timeout_secs: u64,
        fail_fast: bool,
    ) -> Self {
        Self {
            pipeline,
            sink,
            max_concurrent: max_concurrent.max(1),
            site_timeout: Duration::from_secs(site_timeout_secs),
            fail_fast,
        }
    }

    /// Process every URL and return the aggregated report.
    pub async fn run(&self, urls: Vec<String>, skip_domains: &HashSet<String>) -> BatchReport {
        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        for url in urls {
            let domain = util::extract_domain(&url);
            if domain.is_empty() || !seen.insert(domain.clone()) {
                continue;
            }
            if skip_domains.contains(&domain) {
                continue;
            }
            pending.push(url);
        }
        info!(
            sites = pending.len(),
            concurrency = self.max_concurrent,
            "starting batch"
        );

        let report = Mutex::new(BatchReport::default());
        let abort = AtomicBool::new(false);

        stream::iter(pending)
            .for_each_concurrent(self.max_concurrent, |url| {
                let report = &report;
                let abort = &abort;
                async move {
                    if abort.load(Ordering::SeqCst) {
                        return;
                    }
                    let run = self.run_one(&url).await;
                    if self.fail_fast && run.decision.is_none() {
                        warn!(domain = %run.domain, "fail-fast triggered, aborting batch");
                        abort.store(true, Ordering::SeqCst);
                    }
                    if let Err(e) = self.sink.record(&url, &run).await {
                        error!(domain = %run.domain, error = %e, "failed to persist result");
                    }
                    report.lock().await.observe(&run);
                }
            })
            .await;

        report.into_inner()
    }

    /// One site under the hard deadline; a timeout becomes a failed run.
    async fn run_one(&self, url: &str) -> PipelineRun {
        match tokio::time::timeout(self.site_timeout, self.pipeline.run(url)).await {
            Ok(run) => run,
            Err(_) => {
                let err = LeadScoutError::TimeoutExceeded(self.site_timeout.as_secs());
                warn!(url, "{err}");
                PipelineRun {
                    domain: util::extract_domain(url),
                    stages: vec![StageResult::failed(
                        Stage::ContentExtraction,
                        self.site_timeout,
                        err.to_string(),
                    )],
                    decision: None,
                    elapsed: self.site_timeout,
                }
            }
        }
    }
}

/// Load candidate URLs from the first column of a CSV file. Header rows and
/// implausible entries are dropped; entries are scheme-normalized.
pub async fn load_urls(path: &Path) -> Result<Vec<String>, LeadScoutError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LeadScoutError::Config(format!("cannot read {}: {e}", path.display())))?;

    let urls: Vec<String> = raw
        .lines()
        .filter_map(|line| line.split(',').next())
        .map(|cell| cell.trim().trim_matches('"'))
        .filter(|cell| util::is_plausible_url(cell))
        .map(util::normalize_url)
        .collect();

    if urls.is_empty() {
        return Err(LeadScoutError::Config(format!(
            "no usable URLs in {}",
            path.display()
        )));
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::profile;
    use crate::testing::{MockFetcher, MockGenerator};
    use std::io::Write as _;

    struct MemorySink {
        rows: std::sync::Mutex<Vec<String>>,
    }

    impl MemorySink {
        fn new() -> Self {
            Self {
                rows: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ResultSink for MemorySink {
        async fn record(&self, url: &str, _run: &PipelineRun) -> Result<(), LeadScoutError> {
            self.rows.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn pipeline_with(fetcher: MockFetcher) -> Arc<SitePipeline> {
        Arc::new(SitePipeline::new(
            Arc::new(fetcher),
            Arc::new(MockGenerator::new(vec![])),
            profile("software").unwrap(),
            false,
            50.0,
        ))
    }

    #[tokio::test]
    async fn deduplicates_by_domain_and_skips_processed() {
        let fetcher = MockFetcher::new(vec![Err(LeadScoutError::FetchFailure("down".into()))]);
        let sink = Arc::new(MemorySink::new());
        let runner = BatchRunner::new(pipeline_with(fetcher), sink.clone(), 4, 45, false);

        let mut skip = HashSet::new();
        skip.insert("done.example.com".to_string());

        let report = runner
            .run(
                vec![
                    "https://acme.example.com/a".into(),
                    "https://acme.example.com/b".into(),
                    "https://done.example.com".into(),
                ],
                &skip,
            )
            .await;

        assert_eq!(report.total, 1);
        assert_eq!(sink.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_sites_are_recorded_as_timeouts() {
        struct NeverFetcher;
        #[async_trait::async_trait]
        impl crate::traits::ContentFetcher for NeverFetcher {
            async fn fetch_text(&self, _url: &str) -> Result<Option<String>, LeadScoutError> {
                futures::future::pending().await
            }
        }
        let pipeline = Arc::new(SitePipeline::new(
            Arc::new(NeverFetcher),
            Arc::new(MockGenerator::new(vec![])),
            profile("software").unwrap(),
            false,
            50.0,
        ));
        let sink = Arc::new(MemorySink::new());
        let runner = BatchRunner::new(pipeline, sink, 1, 45, false);

        let report = runner
            .run(vec!["https://slow.example.com".into()], &HashSet::new())
            .await;
        assert_eq!(report.failures, 1);
    }

    #[tokio::test]
    async fn fail_fast_stops_the_batch() {
        // Every fetch fails; fail-fast aborts after the first.
        let fetcher = MockFetcher::new(vec![
            Err(LeadScoutError::FetchFailure("down".into())),
            Err(LeadScoutError::FetchFailure("down".into())),
            Err(LeadScoutError::FetchFailure("down".into())),
        ]);
        let sink = Arc::new(MemorySink::new());
        let runner = BatchRunner::new(pipeline_with(fetcher), sink, 1, 45, true);

        let report = runner
            .run(
                vec![
                    "https://a.example.com".into(),
                    "https://b.example.com".into(),
                    "https://c.example.com".into(),
                ],
                &HashSet::new(),
            )
            .await;
        assert_eq!(report.total, 1);
    }

    #[tokio::test]
    async fn load_urls_takes_first_column_and_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "website,city").unwrap();
        writeln!(file, "acme.example.com,Berlin").unwrap();
        writeln!(file, "\"https://other.example.com\",Munich").unwrap();
        writeln!(file, ",").unwrap();

        let urls = load_urls(&path).await.unwrap();
        assert_eq!(
            urls,
            vec![
                "https://acme.example.com".to_string(),
                "https://other.example.com".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn empty_input_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "website\n").unwrap();
        let err = load_urls(&path).await.unwrap_err();
        assert!(matches!(err, LeadScoutError::Config(_)));
    }
}
