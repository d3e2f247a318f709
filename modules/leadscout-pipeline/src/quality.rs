//! Content quality gate: cheap, deterministic scoring of raw page text.
//! Runs before any paid model call.

/// Minimum raw content length for a site to enter the pipeline at all.
pub const MIN_CONTENT_LENGTH: usize = 30;

/// Quality score below this is a failing grade. Whether a failing grade
/// blocks the pipeline depends on the strict flag; the shipped default lets
/// low-quality content through as a "forced pass" (recall over precision).
pub const MIN_QUALITY_SCORE: u32 = 30;

/// Generic business vocabulary; presence suggests the page is a company
/// site rather than a parked domain or an error page.
const BUSINESS_KEYWORDS: &[&str] = &[
    "services", "products", "solutions", "company", "business", "about",
    "contact", "pricing", "features", "software", "platform",
];

#[derive(Debug, Clone)]
pub struct ContentQualityVerdict {
    /// 0-100, from length, word-count, and keyword-density bands.
    pub quality_score: u32,
    pub word_count: usize,
    pub keyword_matches: usize,
    pub issues: Vec<String>,
    pub passed: bool,
    /// True when the score failed the threshold but the lenient policy let
    /// the site continue anyway.
    pub forced_pass: bool,
}

/// Score raw extracted text. `strict` turns the historically-soft gate into
/// a hard one.
pub fn score(content: &str, strict: bool) -> ContentQualityVerdict {
    let text_lower = content.to_lowercase();
    let word_count = content.split_whitespace().count();
    let keyword_matches = BUSINESS_KEYWORDS
        .iter()
        .filter(|k| text_lower.contains(*k))
        .count();

    let mut quality_score = 0u32;

    // Length bands (40 max)
    quality_score += match content.len() {
        0..=199 => 0,
        200..=499 => 20,
        500..=999 => 30,
        _ => 40,
    };

    // Word-count bands (30 max)
    quality_score += match word_count {
        0..=49 => 0,
        50..=99 => 10,
        100..=199 => 20,
        _ => 30,
    };

    // Business keywords, 5 points per match (30 max)
    quality_score += (keyword_matches as u32 * 5).min(30);

    let mut issues = Vec::new();
    if content.len() < MIN_CONTENT_LENGTH {
        issues.push("Content too short".to_string());
    }
    if word_count < 30 {
        issues.push("Too few meaningful words".to_string());
    }
    if keyword_matches == 0 {
        issues.push("No business-related keywords found".to_string());
    }

    let meets_threshold = quality_score >= MIN_QUALITY_SCORE;
    let passed = meets_threshold || !strict;
    let forced_pass = passed && !meets_threshold;

    ContentQualityVerdict {
        quality_score,
        word_count,
        keyword_matches,
        issues,
        passed,
        forced_pass,
    }
}
