//! Tolerant JSON recovery for model responses.
//!
//! Models wrap JSON in markdown fences, prefix it with prose, or leave keys
//! unquoted. Parsing runs in tiers, strict first, and stops at the first tier
//! that yields a JSON object.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static UNQUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)(\s*:)"#).unwrap());

/// Parse a model response into a JSON object, repairing common damage.
/// Returns `None` when no object can be recovered.
pub fn parse_object(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Tier 1: the response is already valid JSON.
    if let Some(v) = as_object(serde_json::from_str(trimmed).ok()) {
        return Some(v);
    }

    // Tier 2: strip markdown code fences.
    if let Some(inner) = strip_fences(trimmed) {
        if let Some(v) = as_object(serde_json::from_str(inner).ok()) {
            return Some(v);
        }
    }

    // Tier 3: scan for the first balanced {...} span, skipping leading prose.
    if let Some(span) = balanced_object_span(trimmed) {
        if let Some(v) = as_object(serde_json::from_str(span).ok()) {
            return Some(v);
        }
        // Tier 4: quote bare keys inside the recovered span.
        let repaired = UNQUOTED_KEY.replace_all(span, r#"${1}"${2}"${3}"#);
        if let Some(v) = as_object(serde_json::from_str(&repaired).ok()) {
            return Some(v);
        }
    }

    None
}

fn as_object(parsed: Option<Value>) -> Option<Value> {
    parsed.filter(|v| v.is_object())
}

fn strip_fences(s: &str) -> Option<&str> {
    let rest = s.strip_prefix("```")?;
    // Drop an optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    let end = rest.rfind("```")?;
    Some(rest[..end].trim())
}

/// Find the first top-level balanced object, respecting string literals.
fn balanced_object_span(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_json_parses_directly() {
        let v = parse_object(r#"{"classification": "Match", "confidence": 80}"#).unwrap();
        assert_eq!(v["classification"], "Match");
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "```json\n{\"reasoning\": \"ok\", \"classification\": \"No Match\"}\n```";
        let v = parse_object(raw).unwrap();
        assert_eq!(v["classification"], "No Match");
    }

    #[test]
    fn leading_prose_is_skipped() {
        let raw = "Sure, here is the JSON you asked for:\n{\"a\": 1} trailing note";
        assert_eq!(parse_object(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn unquoted_keys_are_repaired() {
        let v = parse_object(r#"{reasoning: "x", classification: "Match"}"#).unwrap();
        assert_eq!(v["classification"], "Match");
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_the_scan() {
        let raw = r#"note {"desc": "uses {braces} and \"quotes\"", "n": 2} end"#;
        let v = parse_object(raw).unwrap();
        assert_eq!(v["n"], 2);
    }

    #[test]
    fn nested_objects_stay_intact() {
        let raw = r#"{"outer": {"inner": [1, 2]}}"#;
        let v = parse_object(raw).unwrap();
        assert_eq!(v["outer"]["inner"][1], 2);
    }

    #[test]
    fn hopeless_input_is_none() {
        assert!(parse_object("").is_none());
        assert!(parse_object("no json here").is_none());
        assert!(parse_object("[1, 2, 3]").is_none());
        assert!(parse_object("{broken").is_none());
    }

    #[test]
    fn repair_is_idempotent() {
        let first = parse_object(r#"{key: "value"}"#).unwrap();
        let second = parse_object(&first.to_string()).unwrap();
        assert_eq!(first, second);
    }
}
