use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use ai_client::{Gemini, KeyPool};
use browserless_client::BrowserlessClient;
use leadscout_common::{Config, LeadScoutError};

use leadscout_pipeline::pipeline::SitePipeline;
use leadscout_pipeline::profiles;
use leadscout_pipeline::runner::{self, BatchRunner};
use leadscout_pipeline::sink::CsvSink;

/// Classify a list of company websites against a vertical profile.
#[derive(Parser, Debug)]
#[command(name = "leadscout", version, about)]
struct Cli {
    /// Vertical profile to classify against.
    #[arg(long)]
    profile: Option<String>,

    /// Input CSV; URLs are read from the first column.
    #[arg(long)]
    input: Option<String>,

    /// Output CSV; existing rows are kept and their domains skipped.
    #[arg(long)]
    output: Option<String>,

    /// Maximum concurrent site analyses.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Abort the batch on the first site that fails without a decision.
    #[arg(long)]
    fail_fast: bool,

    /// Hard-fail sites whose content quality score is below the minimum.
    #[arg(long)]
    strict_content: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(profile) = cli.profile {
        config.profile = profile.trim().to_lowercase();
    }
    if let Some(input) = cli.input {
        config.input_file = input;
    }
    if let Some(output) = cli.output {
        config.output_file = output;
    }
    if let Some(concurrency) = cli.concurrency {
        config.max_concurrent = concurrency;
    }
    config.fail_fast = config.fail_fast || cli.fail_fast;
    config.strict_content_gate = config.strict_content_gate || cli.strict_content;
    config.log_redacted();

    let Some(profile) = profiles::profile(&config.profile) else {
        return Err(LeadScoutError::UnknownProfile(format!(
            "{} (known: {})",
            config.profile,
            profiles::known_ids().join(", ")
        ))
        .into());
    };

    let keys = Arc::new(KeyPool::new(config.gemini_api_keys.clone())?);
    let generator = Arc::new(Gemini::new(keys));
    let fetcher = Arc::new(BrowserlessClient::new(
        &config.browserless_url,
        config.browserless_token.as_deref(),
    ));

    let pipeline = Arc::new(SitePipeline::new(
        fetcher,
        generator,
        profile,
        config.strict_content_gate,
        config.confidence_threshold as f64,
    ));

    let output_path = Path::new(&config.output_file);
    let skip_domains: HashSet<String> = CsvSink::processed_domains(output_path).await;
    let sink = Arc::new(CsvSink::open(output_path).await?);

    let urls = runner::load_urls(Path::new(&config.input_file))
        .await
        .context("loading input URLs")?;

    let batch = BatchRunner::new(
        pipeline,
        sink,
        config.max_concurrent,
        config.site_timeout_secs,
        config.fail_fast,
    );
    let report = batch.run(urls, &skip_domains).await;

    info!(profile = profile.id, "batch finished");
    println!("{report}");

    if config.fail_fast && report.failures > 0 {
        bail!("batch aborted after {} failure(s)", report.failures);
    }
    Ok(())
}
