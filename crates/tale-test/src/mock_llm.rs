//! Mock LLM provider for testing.
//!
//! [`MockLlmProvider`] replays pre-configured turns, so storyteller and
//! end-to-end tests run without a real API.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use tale_llm::{LlmError, LlmProvider, LlmResponse, LlmResult, Message, StopReason, Usage};

/// A single scripted turn that the mock provider will replay.
#[derive(Debug, Clone)]
pub enum MockLlmTurn {
    /// A text response.
    Text {
        /// The text the assistant produces.
        text: String,
        /// Optional `(input_tokens, output_tokens)` usage override.
        usage: Option<(usize, usize)>,
    },
    /// Produce an error.
    Error(
        /// The error message.
        String,
    ),
}

impl MockLlmTurn {
    /// Create a text turn with default usage.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            usage: None,
        }
    }

    /// Create a text turn with explicit usage.
    #[must_use]
    pub fn text_with_usage(text: impl Into<String>, input: usize, output: usize) -> Self {
        Self::Text {
            text: text.into(),
            usage: Some((input, output)),
        }
    }

    /// Create an error turn.
    #[must_use]
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }
}

/// A deterministic, queue-based [`LlmProvider`] for tests.
///
/// Turns are popped from the front of the queue on each call to
/// [`complete`](LlmProvider::complete). An exhausted queue yields an error.
/// Messages and system prompts passed by the caller are captured.
pub struct MockLlmProvider {
    turns: Mutex<VecDeque<MockLlmTurn>>,
    call_count: Mutex<usize>,
    captured_messages: Mutex<Vec<Vec<Message>>>,
    captured_systems: Mutex<Vec<String>>,
}

impl MockLlmProvider {
    /// Create a new mock provider preloaded with the given turns.
    #[must_use]
    pub fn new(turns: Vec<MockLlmTurn>) -> Self {
        Self {
            turns: Mutex::new(VecDeque::from(turns)),
            call_count: Mutex::new(0),
            captured_messages: Mutex::new(Vec::new()),
            captured_systems: Mutex::new(Vec::new()),
        }
    }

    /// Provider that answers every call in `texts` order.
    #[must_use]
    pub fn replying<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(MockLlmTurn::text).collect())
    }

    /// Number of times `complete` has been called.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().expect("lock poisoned")
    }

    /// Snapshot of all captured message slices, one per call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn captured_messages(&self) -> Vec<Vec<Message>> {
        self.captured_messages
            .lock()
            .expect("lock poisoned")
            .clone()
    }

    /// Snapshot of the system prompts, one per call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn captured_systems(&self) -> Vec<String> {
        self.captured_systems
            .lock()
            .expect("lock poisoned")
            .clone()
    }

    /// Record a call and pop the next turn.
    fn next_turn(&self, messages: &[Message], system: &str) -> LlmResult<MockLlmTurn> {
        {
            let mut count = self.call_count.lock().expect("lock poisoned");
            *count = count.saturating_add(1);
        }
        self.captured_messages
            .lock()
            .expect("lock poisoned")
            .push(messages.to_vec());
        self.captured_systems
            .lock()
            .expect("lock poisoned")
            .push(system.to_string());

        self.turns
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .ok_or_else(|| {
                LlmError::ApiRequestFailed("MockLlmProvider: no more turns queued".to_string())
            })
    }
}

#[async_trait]
#[allow(clippy::unnecessary_literal_bound)]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, messages: &[Message], system: &str) -> LlmResult<LlmResponse> {
        match self.next_turn(messages, system)? {
            MockLlmTurn::Text { text, usage } => {
                let (input_tokens, output_tokens) = usage.unwrap_or((100, 50));
                Ok(LlmResponse {
                    message: Message::assistant(text),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage {
                        input_tokens,
                        output_tokens,
                    },
                })
            },
            MockLlmTurn::Error(msg) => Err(LlmError::ApiRequestFailed(msg)),
        }
    }
}

impl std::fmt::Debug for MockLlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLlmProvider")
            .field("call_count", &self.call_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_turns_in_order() {
        let provider = MockLlmProvider::new(vec![
            MockLlmTurn::text("first"),
            MockLlmTurn::text_with_usage("second", 7, 3),
        ]);

        let a = provider.complete(&[Message::user("1")], "sys").await.unwrap();
        let b = provider.complete(&[Message::user("2")], "").await.unwrap();

        assert_eq!(a.message.content, "first");
        assert_eq!(b.usage.total(), 10);
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.captured_messages()[1], vec![Message::user("2")]);
        assert_eq!(provider.captured_systems(), vec!["sys".to_string(), String::new()]);
    }

    #[tokio::test]
    async fn error_turn_and_exhaustion_fail() {
        let provider = MockLlmProvider::new(vec![MockLlmTurn::error("overloaded")]);

        assert!(provider.complete(&[], "").await.is_err());
        assert!(provider.complete(&[], "").await.is_err());
        assert_eq!(provider.call_count(), 2);
    }
}
