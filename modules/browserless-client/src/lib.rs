//! Browserless-backed page fetcher.
//!
//! `content()` returns the fully rendered HTML from the Browserless
//! `/content` endpoint; `text()` layers Readability main-content extraction
//! on top and returns clean, bounded, human-readable text for downstream
//! analysis. Scripts, styles, and navigation are gone by the time callers
//! see the text.

pub mod error;

pub use error::{BrowserlessError, Result};

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::{info, warn};

/// Cap on text handed to downstream analysis. Enough context for one page's
/// business description without blowing the model budget.
pub const MAX_TEXT_LENGTH: usize = 6000;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Fetch fully-rendered HTML for a URL via the Browserless /content
    /// endpoint.
    pub async fn content(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url)
            .map_err(|e| BrowserlessError::InvalidUrl(format!("{url}: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(BrowserlessError::InvalidUrl(format!(
                "only http/https URLs are allowed, got: {}",
                parsed.scheme()
            )));
        }

        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let body = serde_json::json!({ "url": url });

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }

    /// Fetch a page and reduce it to clean readable text, truncated to
    /// `MAX_TEXT_LENGTH`. Returns `Ok(None)` when the page rendered but no
    /// usable main content came out of Readability extraction.
    pub async fn text(&self, url: &str) -> Result<Option<String>> {
        let html = self.content(url).await?;

        if html.trim().is_empty() {
            warn!(url, "Browserless returned an empty document");
            return Ok(None);
        }

        let text = extract_readable_text(&html, url);
        if text.is_empty() {
            warn!(url, "Empty content after Readability extraction");
            return Ok(None);
        }

        info!(url, chars = text.len(), "Fetched readable text");
        Ok(Some(text))
    }
}

/// Readability main-content extraction plus whitespace normalization.
fn extract_readable_text(html: &str, url: &str) -> String {
    let parsed_url = url::Url::parse(url).ok();
    let config = TransformConfig {
        readability: true,
        main_content: true,
        return_format: ReturnFormat::Markdown,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: parsed_url.as_ref(),
        content: html.as_bytes(),
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    let text = transform_content_input(input, &config);
    let text = WHITESPACE.replace_all(text.trim(), " ");

    truncate_on_char_boundary(&text, MAX_TEXT_LENGTH).to_string()
}

fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_text_is_whitespace_normalized_and_bounded() {
        let html = format!(
            "<html><body><main><p>{}</p></main></body></html>",
            "We build school  management\n\nsoftware. ".repeat(400)
        );
        let text = extract_readable_text(&html, "https://example.com");
        assert!(text.len() <= MAX_TEXT_LENGTH);
        assert!(!text.contains('\n'));
        assert!(!text.contains("  "));
    }

    #[test]
    fn scripts_do_not_survive_extraction() {
        let html = "<html><body><script>var secret = 1;</script>\
                    <main><p>Payment processing for merchants, POS solutions \
                    and a payment gateway for small businesses.</p></main></body></html>";
        let text = extract_readable_text(html, "https://example.com");
        assert!(text.contains("Payment processing"));
        assert!(!text.contains("var secret"));
    }

    #[test]
    fn non_http_schemes_are_rejected() {
        let client = BrowserlessClient::new("http://localhost:3000", None);
        let err = tokio_block_on(client.content("ftp://example.com"));
        assert!(matches!(err, Err(BrowserlessError::InvalidUrl(_))));
    }

    fn tokio_block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio_runtime().block_on(fut)
    }

    fn tokio_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }
}
