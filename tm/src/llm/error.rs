//! Generation service error types

use thiserror::Error;

/// Errors that can occur when calling the generation service
///
/// Rate-limit classification is deliberately textual: the retry controller
/// matches the rendered message against a fixed marker set, because
/// providers signal quota exhaustion in the message body as often as in
/// the status code.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("rate limited by provider: {message}")]
    RateLimited { message: String },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error(
        "generation failed after {attempts} attempts: {last}. \
         The provider is rate limiting this key; wait a few minutes before retrying, \
         or switch to a key with more headroom."
    )]
    RetriesExhausted { attempts: u32, last: String },
}

impl GenerationError {
    /// Whether this error already carries the exhausted-retries guidance
    pub fn is_exhausted(&self) -> bool {
        matches!(self, GenerationError::RetriesExhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_contains_marker() {
        let err = GenerationError::RateLimited {
            message: "slow down".to_string(),
        };
        assert!(err.to_string().to_lowercase().contains("rate limit"));
    }

    #[test]
    fn test_api_429_message_contains_status() {
        let err = GenerationError::Api {
            status: 429,
            message: "try later".to_string(),
        };
        assert!(err.to_string().contains("429"));
    }
}
