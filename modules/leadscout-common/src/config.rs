use std::env;

use tracing::info;

/// Application configuration loaded from environment variables.
/// CLI flags may override individual fields after loading.
#[derive(Debug, Clone)]
pub struct Config {
    // Gemini (one required key, optional extras for rotation)
    pub gemini_api_keys: Vec<String>,

    // Browserless
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    // Run shape
    pub profile: String,
    pub input_file: String,
    pub output_file: String,

    // Concurrency and budgets
    pub max_concurrent: usize,
    pub site_timeout_secs: u64,

    // Decision policy
    pub confidence_threshold: u32,
    pub strict_content_gate: bool,
    pub fail_fast: bool,
}

/// Hard ceiling on concurrent site analyses, whatever the core count says.
/// Protects the Browserless instance and the provider's per-minute budget.
const MAX_CONCURRENT_CEILING: usize = 35;

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        let mut gemini_api_keys = vec![required_env("GEMINI_API_KEY")];
        if let Ok(extra) = env::var("GEMINI_API_KEY_2") {
            if !extra.is_empty() {
                gemini_api_keys.push(extra);
            }
        }

        Self {
            gemini_api_keys,
            browserless_url: env::var("BROWSERLESS_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok().filter(|t| !t.is_empty()),
            profile: env::var("PROFILE")
                .unwrap_or_else(|_| "software".to_string())
                .trim()
                .to_lowercase(),
            input_file: env::var("INPUT_FILE").unwrap_or_else(|_| "web.csv".to_string()),
            output_file: env::var("OUTPUT_FILE")
                .unwrap_or_else(|_| "results_final.csv".to_string()),
            max_concurrent: env::var("MAX_CONCURRENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_concurrency),
            site_timeout_secs: env::var("SITE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(45),
            confidence_threshold: env::var("CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
            strict_content_gate: env_flag("STRICT_CONTENT_GATE"),
            fail_fast: env_flag("FAIL_FAST"),
        }
    }

    /// Log the effective configuration without leaking credentials.
    pub fn log_redacted(&self) {
        info!(
            profile = %self.profile,
            input = %self.input_file,
            output = %self.output_file,
            max_concurrent = self.max_concurrent,
            site_timeout_secs = self.site_timeout_secs,
            confidence_threshold = self.confidence_threshold,
            strict_content_gate = self.strict_content_gate,
            fail_fast = self.fail_fast,
            gemini_keys = self.gemini_api_keys.len(),
            browserless = %self.browserless_url,
            "Configuration loaded"
        );
    }
}

/// Concurrency scales with the machine: 3x cores, capped. The workload is
/// I/O-bound (network fetches and model calls), so oversubscription is fine.
pub fn default_concurrency() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    (cores * 3).min(MAX_CONCURRENT_CEILING)
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|v| v == "true" || v == "1").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_concurrency_is_bounded() {
        let n = default_concurrency();
        assert!(n >= 1);
        assert!(n <= MAX_CONCURRENT_CEILING);
    }
}
