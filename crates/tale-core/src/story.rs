//! Starting new stories.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::TurnResult;
use crate::format::{ReplyKind, format_story};
use crate::platform::Platform;
use crate::settings::StorySettings;
use crate::storyteller::Storyteller;
use crate::types::{Publication, PublishCommand, StoryMessage};

/// Where a new story is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryTarget {
    /// A fresh post on the page feed.
    NewPost,
    /// A comment under an existing post.
    CommentOn(String),
}

/// Opens new stories from the seed prompt.
pub struct StoryStarter {
    platform: Arc<dyn Platform>,
    storyteller: Arc<dyn Storyteller>,
    settings: StorySettings,
}

impl StoryStarter {
    /// Create a starter.
    pub fn new(
        platform: Arc<dyn Platform>,
        storyteller: Arc<dyn Storyteller>,
        settings: StorySettings,
    ) -> Self {
        Self {
            platform,
            storyteller,
            settings,
        }
    }

    /// Opening transcript: a single user seed.
    #[must_use]
    pub fn seed_transcript(&self) -> Vec<StoryMessage> {
        vec![StoryMessage::user(self.settings.seed_prompt.clone())]
    }

    /// Generate part 1 and publish it at `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::Upstream`](crate::TurnError::Upstream) if
    /// generation or publication fails.
    #[instrument(skip(self))]
    pub async fn start(&self, target: &StoryTarget) -> TurnResult<Publication> {
        let completion = self
            .storyteller
            .complete_story(&self.seed_transcript())
            .await?;
        let text = format_story(&completion, 1, ReplyKind::Comment);

        let publication = match target {
            StoryTarget::NewPost => {
                self.platform.publish_post(&text).await?;
                Publication::Post { text }
            },
            StoryTarget::CommentOn(post_id) => {
                self.platform.publish_comment(post_id, &text).await?;
                Publication::Comment(PublishCommand {
                    target_id: post_id.clone(),
                    text,
                })
            },
        };

        info!("Started new story");
        Ok(publication)
    }
}

impl std::fmt::Debug for StoryStarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryStarter")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
