//! Generation service client module
//!
//! Everything the engine knows about the outside text-generation service:
//! the [`GenerationClient`] trait (prompt in, text out, may fail
//! transiently), the Gemini HTTP implementation, and the retry/backoff
//! controller that wraps calls to it.

use std::sync::Arc;

use tracing::debug;

mod client;
mod error;
mod gemini;
mod retry;

pub use client::GenerationClient;
pub use error::GenerationError;
pub use gemini::GeminiClient;
pub use retry::{RATE_LIMIT_MARKERS, RetryPolicy, is_rate_limit_text};

#[cfg(test)]
pub use client::mock::{MockGenerationClient, MockReply};

use crate::config::GenerationConfig;

/// Create a generation client from configuration
///
/// Only the "gemini" provider is currently wired; the trait keeps the rest
/// of the engine provider-agnostic.
pub fn create_client(config: &GenerationConfig) -> Result<Arc<dyn GenerationClient>, GenerationError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::from_config(config)?)),
        other => Err(GenerationError::InvalidResponse(format!(
            "Unknown generation provider: '{}'. Supported: gemini",
            other
        ))),
    }
}
