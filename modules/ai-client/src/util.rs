/// Truncate a string to at most `max_bytes` bytes at a character boundary.
/// Page content is truncated before templating to stay inside the model's
/// context budget.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
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
    fn truncates_multibyte_text_on_a_boundary() {
        let text = "Schule für alle — über uns";
        let truncated = truncate_to_char_boundary(text, 12);
        assert!(truncated.len() <= 12);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn short_text_is_returned_unchanged() {
        assert_eq!(truncate_to_char_boundary("hello", 100), "hello");
    }
}
