use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::LlmResponse;
use crate::shared::constants::RAW_EXCERPT_MAX_CHARS;

const JSON_FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Model output that could not be parsed as the expected JSON object
#[derive(Debug, Clone, Error)]
#[error("Failed to parse JSON from model output: {reason}")]
pub struct ParseError {
    pub reason: String,
    /// Leading characters of the cleaned text, for diagnostics
    pub excerpt: String,
}

/// Strip one optional markdown fence pair from model output
///
/// Trims surrounding whitespace, removes a single leading "```json" and a
/// single trailing "```", then trims again. Interior content is untouched.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix(JSON_FENCE_OPEN).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(FENCE_CLOSE).unwrap_or(trimmed);
    trimmed.trim()
}

/// First `max_chars` characters of `text` (char-boundary safe)
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Parse model output as a JSON object of the target type
///
/// Only the fence pair is removed before parsing. No repair is attempted:
/// anything serde_json rejects, or any JSON value that is not an object, is
/// a [`ParseError`].
pub fn try_parse<T>(text: &str) -> Result<T, ParseError>
where
    T: DeserializeOwned,
{
    let json_str = strip_code_fence(text);

    tracing::debug!(
        "Cleaned model output (first 500 chars): {}",
        excerpt(json_str, 500)
    );

    let fail = |reason: String| ParseError {
        reason,
        excerpt: excerpt(json_str, RAW_EXCERPT_MAX_CHARS),
    };

    let value: Value = serde_json::from_str(json_str).map_err(|e| fail(e.to_string()))?;
    if !value.is_object() {
        return Err(fail("expected a JSON object".to_string()));
    }

    serde_json::from_value::<T>(value).map_err(|e| fail(e.to_string()))
}

/// Parse LLM response text with graceful fallback
///
/// If parsing fails, returns `T::default()` marked as a fallback carrying the
/// parse error.
///
/// # Example
///
/// ```ignore
/// use crate::shared::llm::{parse_with_fallback, LlmResponse};
///
/// let response = parse_with_fallback::<ExtractedKtpData>(model_output);
/// if response.is_success() {
///     // Use parsed data
/// } else {
///     // Handle fallback case
/// }
/// ```
pub fn parse_with_fallback<T>(text: &str) -> T
where
    T: LlmResponse,
{
    match try_parse::<T>(text) {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::warn!(
                "LLM response parsing failed, using fallback: {} (raw: {})",
                error.reason,
                error.excerpt
            );
            let mut fallback = T::default();
            fallback.mark_as_fallback(error);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn default_true() -> bool {
        true
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    struct TestResponse {
        #[serde(default)]
        pub title: String,

        #[serde(default = "default_true")]
        pub is_llm_success: bool,

        #[serde(skip)]
        pub llm_error: Option<ParseError>,
    }

    impl LlmResponse for TestResponse {
        fn mark_as_fallback(&mut self, error: ParseError) {
            self.is_llm_success = false;
            self.llm_error = Some(error);
        }

        fn is_success(&self) -> bool {
            self.is_llm_success
        }
    }

    // ==================== strip_code_fence tests ====================

    #[test]
    fn test_strip_code_fence_json_block() {
        let inner = "{\"NIK\":\"456\"}";
        let wrapped = format!("```json\n{}\n```", inner);
        assert_eq!(strip_code_fence(&wrapped), inner);
    }

    #[test]
    fn test_strip_code_fence_plain_text_untouched() {
        let plain = r#"{"NIK": "123", "NAMA": "Budi"}"#;
        assert_eq!(strip_code_fence(plain), plain);
    }

    #[test]
    fn test_strip_code_fence_trims_whitespace() {
        assert_eq!(strip_code_fence("  \n{\"a\":1}\n\n"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_code_fence_only_one_pair() {
        // Interior fences and a second closing fence are preserved
        let wrapped = "```json\n{\"note\":\"```\"}\n``````";
        assert_eq!(strip_code_fence(wrapped), "{\"note\":\"```\"}\n```");
    }

    #[test]
    fn test_strip_code_fence_generic_fence_is_not_json_fence() {
        // Only the literal "```json" opener is recognised
        let wrapped = "```\n{\"a\":1}\n```";
        assert_eq!(strip_code_fence(wrapped), "```\n{\"a\":1}");
    }

    #[test]
    fn test_strip_code_fence_preserves_multibyte_content() {
        let inner = "{\"ALAMAT\":\"Jl. Café ñ 東\"}";
        let wrapped = format!("```json{}```", inner);
        assert_eq!(strip_code_fence(&wrapped), inner);
    }

    // ==================== excerpt tests ====================

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let text = "é".repeat(150);
        let cut = excerpt(&text, 100);
        assert_eq!(cut.chars().count(), 100);
        assert!(text.starts_with(&cut));
    }

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(excerpt("short", 100), "short");
    }

    // ==================== parse_with_fallback tests ====================

    #[test]
    fn test_parse_with_fallback_valid_json() {
        let result: TestResponse = parse_with_fallback(r#"{"title": "Test Title"}"#);

        assert!(result.is_success());
        assert_eq!(result.title, "Test Title");
        assert!(result.llm_error.is_none());
    }

    #[test]
    fn test_parse_with_fallback_fenced_json() {
        let result: TestResponse = parse_with_fallback("```json\n{\"title\": \"Fenced\"}\n```");

        assert!(result.is_success());
        assert_eq!(result.title, "Fenced");
    }

    #[test]
    fn test_parse_with_fallback_invalid_returns_fallback() {
        let result: TestResponse = parse_with_fallback("not json at all");

        assert!(!result.is_success());
        assert!(result.title.is_empty());
        let error = result.llm_error.unwrap();
        assert_eq!(error.excerpt, "not json at all");
    }

    #[test]
    fn test_parse_with_fallback_does_not_repair() {
        // Trailing commas are rejected rather than repaired
        let result: TestResponse = parse_with_fallback(r#"{"title": "Test",}"#);
        assert!(!result.is_success());
    }

    #[test]
    fn test_parse_with_fallback_rejects_non_object() {
        let result: TestResponse = parse_with_fallback(r#"["Test"]"#);
        assert!(!result.is_success());
        assert_eq!(result.llm_error.unwrap().reason, "expected a JSON object");
    }

    #[test]
    fn test_parse_error_excerpt_is_bounded() {
        let long = "x".repeat(500);
        let error = try_parse::<TestResponse>(&long).unwrap_err();
        assert_eq!(error.excerpt.chars().count(), RAW_EXCERPT_MAX_CHARS);
    }

    #[test]
    fn test_parse_error_excerpt_uses_cleaned_text() {
        let error = try_parse::<TestResponse>("```json\nbroken\n```").unwrap_err();
        assert_eq!(error.excerpt, "broken");
    }
}
