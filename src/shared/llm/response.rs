use serde::de::DeserializeOwned;

use super::ParseError;

/// Trait for LLM response types that support fallback behavior
///
/// Types implementing this trait can be parsed with graceful degradation -
/// if parsing fails, a default fallback value is returned with the parse
/// error attached.
pub trait LlmResponse: DeserializeOwned + Default {
    /// Mark this response as a fallback due to parsing failure
    fn mark_as_fallback(&mut self, error: ParseError);

    /// Check if this response was successfully parsed
    fn is_success(&self) -> bool;
}
