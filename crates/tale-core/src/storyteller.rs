//! Story continuation via a language model.

use async_trait::async_trait;
use tale_llm::{LlmProvider, Message};
use tracing::debug;

use crate::error::{StoryError, StoryResult};
use crate::types::{Role, StoryMessage};

/// Default system preamble sent ahead of every transcript.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI trained to write stories in the style of \"choose your own adventure\". You have started a story and prompted the user to make a choice.";

/// Continues a story given the transcript so far.
#[async_trait]
pub trait Storyteller: Send + Sync {
    /// Produce the next story segment.
    async fn complete_story(&self, transcript: &[StoryMessage]) -> StoryResult<String>;
}

/// [`Storyteller`] backed by an [`LlmProvider`].
pub struct LlmStoryteller<P> {
    provider: P,
    system_prompt: String,
}

impl<P: LlmProvider> LlmStoryteller<P> {
    /// Wrap a provider with the default system preamble.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Override the system preamble.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

fn to_message(msg: &StoryMessage) -> Message {
    match msg.role {
        Role::Assistant => Message::assistant(msg.content.clone()),
        Role::User => Message::user(msg.content.clone()),
        Role::System => Message::system(msg.content.clone()),
    }
}

#[async_trait]
impl<P: LlmProvider> Storyteller for LlmStoryteller<P> {
    async fn complete_story(&self, transcript: &[StoryMessage]) -> StoryResult<String> {
        if transcript.is_empty() {
            return Err(StoryError::EmptyTranscript);
        }

        let messages: Vec<Message> = transcript.iter().map(to_message).collect();
        debug!(
            provider = self.provider.name(),
            model = self.provider.model(),
            messages = messages.len(),
            "Requesting story continuation"
        );

        let response = self
            .provider
            .complete(&messages, &self.system_prompt)
            .await?;
        debug!(
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "Story continuation received"
        );
        Ok(response.message.content)
    }
}

impl<P: LlmProvider> std::fmt::Debug for LlmStoryteller<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmStoryteller")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Storyteller + ?Sized> Storyteller for std::sync::Arc<T> {
    async fn complete_story(&self, transcript: &[StoryMessage]) -> StoryResult<String> {
        (**self).complete_story(transcript).await
    }
}
