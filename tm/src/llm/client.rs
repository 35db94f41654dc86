//! GenerationClient trait definition

use async_trait::async_trait;

use super::GenerationError;

/// Stateless generation service client - each call is independent
///
/// This is the engine's only window onto the outside world. The contract
/// is deliberately narrow: a prompt goes in, free text comes out, and
/// failures are either transient (rate-limit class, retried by the
/// controller) or permanent (propagated). No conversation state is kept
/// between calls.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send one prompt and wait for the complete text response
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tracing::debug;

    use super::*;

    /// Scripted reply for the mock client
    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// Successful generation with this text
        Text(String),
        /// Rate-limit-class failure (matches the retry markers)
        RateLimited,
        /// Permanent failure with this message
        Fail(String),
    }

    impl MockReply {
        fn into_result(self) -> Result<String, GenerationError> {
            match self {
                MockReply::Text(text) => Ok(text),
                MockReply::RateLimited => Err(GenerationError::Api {
                    status: 429,
                    message: "quota exceeded for this minute".to_string(),
                }),
                MockReply::Fail(message) => Err(GenerationError::InvalidResponse(message)),
            }
        }
    }

    /// Mock generation client for unit tests
    ///
    /// Replies are chosen by routing first: the first `(marker, reply)`
    /// pair whose marker appears in the prompt wins. This keeps fan-out
    /// tests deterministic even though branch prompts arrive in arbitrary
    /// order. Prompts with no matching route consume the sequential queue.
    pub struct MockGenerationClient {
        routes: Vec<(String, MockReply)>,
        queue: Mutex<VecDeque<MockReply>>,
        call_count: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl MockGenerationClient {
        pub fn new(replies: Vec<MockReply>) -> Self {
            Self {
                routes: Vec::new(),
                queue: Mutex::new(replies.into()),
                call_count: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// Add a routed reply: used whenever `marker` appears in a prompt
        pub fn route(mut self, marker: impl Into<String>, reply: MockReply) -> Self {
            self.routes.push((marker.into(), reply));
            self
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// All prompts seen so far, in arrival order
        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().expect("mock mutex poisoned").clone()
        }
    }

    #[async_trait]
    impl GenerationClient for MockGenerationClient {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.prompts
                .lock()
                .expect("mock mutex poisoned")
                .push(prompt.to_string());

            for (marker, reply) in &self.routes {
                if prompt.contains(marker.as_str()) {
                    debug!(%marker, "MockGenerationClient::generate: routed reply");
                    return reply.clone().into_result();
                }
            }

            let next = self.queue.lock().expect("mock mutex poisoned").pop_front();
            match next {
                Some(reply) => reply.into_result(),
                None => Err(GenerationError::InvalidResponse(
                    "no scripted mock reply for prompt".to_string(),
                )),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_sequential_replies() {
            let client = MockGenerationClient::new(vec![
                MockReply::Text("first".to_string()),
                MockReply::Text("second".to_string()),
            ]);

            assert_eq!(client.generate("a").await.unwrap(), "first");
            assert_eq!(client.generate("b").await.unwrap(), "second");
            assert!(client.generate("c").await.is_err());
            assert_eq!(client.call_count(), 3);
        }

        #[tokio::test]
        async fn test_mock_routes_by_marker() {
            let client = MockGenerationClient::new(vec![])
                .route("restaurants", MockReply::Text("dining here".to_string()))
                .route("flight", MockReply::RateLimited);

            assert_eq!(client.generate("find restaurants in Lyon").await.unwrap(), "dining here");
            assert!(client.generate("flight options please").await.is_err());
        }
    }
}
