//! Turn resolution: from a player's comment to the next story segment.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::{TurnError, TurnResult, ValidationFailure};
use crate::format::{ReplyKind, format_story, part_number};
use crate::moves::extract_move_with;
use crate::platform::Platform;
use crate::settings::StorySettings;
use crate::storyteller::Storyteller;
use crate::transcript::{TranscriptContext, build_transcript};
use crate::types::{IncomingEvent, ItemKind, PublishCommand, StoryMessage, Verb};

/// A turn that is ready to be sent to the storyteller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTurn {
    /// Transcript including the new move.
    pub transcript: Vec<StoryMessage>,
    /// Comment (or post) the continuation is published under.
    pub anchor_id: String,
}

/// Resolves player comments into published story continuations.
pub struct TurnResolver {
    platform: Arc<dyn Platform>,
    storyteller: Arc<dyn Storyteller>,
    settings: StorySettings,
}

impl TurnResolver {
    /// Create a resolver.
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

    /// Settings in use.
    #[must_use]
    pub fn settings(&self) -> &StorySettings {
        &self.settings
    }

    /// Check that `event` is a new comment from someone other than the page.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::Validation`] describing the first failed check.
    pub fn validate(&self, event: &IncomingEvent) -> TurnResult<()> {
        if event.verb != Verb::Add {
            return Err(ValidationFailure::NotAnAddition(event.verb.to_string()).into());
        }
        if event.item != ItemKind::Comment {
            return Err(ValidationFailure::NotAComment(event.item.to_string()).into());
        }
        let author = event
            .author_id
            .as_deref()
            .ok_or(ValidationFailure::MissingField("from"))?;
        if author == self.settings.page_id {
            return Err(ValidationFailure::OwnComment.into());
        }
        Ok(())
    }

    /// Validate the event and rebuild the transcript, without calling the
    /// storyteller or publishing anything.
    ///
    /// # Errors
    ///
    /// Any [`TurnError`] except those raised by generation or publication.
    pub async fn prepare(&self, event: &IncomingEvent) -> TurnResult<PreparedTurn> {
        self.validate(event)?;

        let mv = extract_move_with(self.settings.move_policy, &event.message)
            .ok_or(TurnError::NoMove)?;

        let post = self
            .platform
            .fetch_post(&event.post_id)
            .await?
            .ok_or_else(|| TurnError::NotFound {
                kind: "post",
                id: event.post_id.clone(),
            })?;

        let mut transcript = build_transcript(
            self.platform.as_ref(),
            TranscriptContext {
                post: &post,
                event,
                mv: &mv,
                page_id: &self.settings.page_id,
            },
        )
        .await?;

        if !event.is_root_comment() {
            transcript.push(StoryMessage::user(mv.raw_text.clone()));
        }

        Ok(PreparedTurn {
            transcript,
            anchor_id: event.anchor_id().to_string(),
        })
    }

    /// Resolve a turn end to end and publish the continuation.
    ///
    /// # Errors
    ///
    /// Any [`TurnError`]. Nothing is published when an error is returned.
    #[instrument(skip_all, fields(post_id = %event.post_id, comment_id = ?event.comment_id))]
    pub async fn resolve(&self, event: &IncomingEvent) -> TurnResult<PublishCommand> {
        let prepared = self.prepare(event).await?;
        debug!(messages = prepared.transcript.len(), "Transcript ready");

        let completion = self.storyteller.complete_story(&prepared.transcript).await?;
        let text = format_story(
            &completion,
            part_number(&prepared.transcript),
            ReplyKind::Reply,
        );

        let command = PublishCommand {
            target_id: prepared.anchor_id,
            text,
        };
        self.platform
            .publish_comment(&command.target_id, &command.text)
            .await?;

        info!(target_id = %command.target_id, "Published story continuation");
        Ok(command)
    }
}

impl std::fmt::Debug for TurnResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnResolver")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::MovePolicy;
    use crate::testing::{FixedStoryteller, StubPlatform, comment};

    fn resolver(
        platform: StubPlatform,
        storyteller: FixedStoryteller,
    ) -> (TurnResolver, Arc<StubPlatform>, Arc<FixedStoryteller>) {
        let platform = Arc::new(platform);
        let storyteller = Arc::new(storyteller);
        let resolver = TurnResolver::new(
            Arc::clone(&platform) as Arc<dyn Platform>,
            Arc::clone(&storyteller) as Arc<dyn Storyteller>,
            StorySettings::new("page"),
        );
        (resolver, platform, storyteller)
    }

    fn root_comment(message: &str) -> IncomingEvent {
        IncomingEvent {
            item: ItemKind::Comment,
            verb: Verb::Add,
            post_id: "p".to_string(),
            parent_id: Some("p".to_string()),
            comment_id: Some("p_c1".to_string()),
            author_id: Some("ada".to_string()),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn root_comment_publishes_part_two() {
        let (resolver, platform, storyteller) = resolver(
            StubPlatform::default().with_post("p", "Intro. 1. Left 2. Right"),
            FixedStoryteller::replying("You go right."),
        );

        let command = resolver.resolve(&root_comment("2")).await.unwrap();

        assert_eq!(command.target_id, "p_c1");
        assert!(command.text.starts_with("*** PART 2 ***"));
        assert!(command.text.ends_with("*** Add a reply with the number of your choice. ***"));
        assert_eq!(
            storyteller.seen(),
            vec![vec![
                StoryMessage::assistant("Intro. 1. Left 2. Right"),
                StoryMessage::user("2"),
            ]]
        );
        assert_eq!(platform.published(), vec![(Some("p_c1".to_string()), command.text)]);
    }

    #[tokio::test]
    async fn reply_appends_move_after_history() {
        let (resolver, _platform, storyteller) = resolver(
            StubPlatform::default()
                .with_post("p", "Intro")
                .with_comment("p_c1", "ada", "1")
                .with_thread(
                    "p_c1",
                    vec![
                        comment("p_c3", Some("ada"), "pick 2"),
                        comment("p_c2", Some("page"), "Part two"),
                    ],
                ),
            FixedStoryteller::replying("Part three"),
        );
        let mut event = root_comment("pick 2");
        event.parent_id = Some("p_c1".to_string());
        event.comment_id = Some("p_c3".to_string());

        let command = resolver.resolve(&event).await.unwrap();

        assert_eq!(command.target_id, "p_c1");
        assert!(command.text.starts_with("*** PART 3 ***"));
        assert_eq!(
            storyteller.seen()[0],
            vec![
                StoryMessage::assistant("Intro"),
                StoryMessage::user("1"),
                StoryMessage::assistant("Part two"),
                StoryMessage::user("2"),
            ]
        );
    }

    #[tokio::test]
    async fn page_comment_is_rejected() {
        let (resolver, platform, _) =
            resolver(StubPlatform::default(), FixedStoryteller::default());
        let mut event = root_comment("2");
        event.author_id = Some("page".to_string());

        let err = resolver.resolve(&event).await.unwrap_err();
        assert!(matches!(
            err,
            TurnError::Validation(ValidationFailure::OwnComment)
        ));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn validation_checks_verb_item_and_author() {
        let (resolver, _, _) = resolver(StubPlatform::default(), FixedStoryteller::default());

        let mut edited = root_comment("2");
        edited.verb = Verb::Edited;
        let mut status = root_comment("2");
        status.item = ItemKind::Status;
        let mut anonymous = root_comment("2");
        anonymous.author_id = None;

        assert!(matches!(
            resolver.validate(&edited),
            Err(TurnError::Validation(ValidationFailure::NotAnAddition(_)))
        ));
        assert!(matches!(
            resolver.validate(&status),
            Err(TurnError::Validation(ValidationFailure::NotAComment(_)))
        ));
        assert!(matches!(
            resolver.validate(&anonymous),
            Err(TurnError::Validation(ValidationFailure::MissingField("from")))
        ));
    }

    #[tokio::test]
    async fn comment_without_choice_is_dropped() {
        let (resolver, platform, _) =
            resolver(StubPlatform::default(), FixedStoryteller::default());
        let err = resolver
            .resolve(&root_comment("what a story"))
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::NoMove));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn strict_policy_rejects_sentences() {
        let platform = Arc::new(StubPlatform::default().with_post("p", "Intro"));
        let resolver = TurnResolver::new(
            platform,
            Arc::new(FixedStoryteller::replying("ok")),
            StorySettings::new("page").with_move_policy(MovePolicy::Strict),
        );
        assert!(matches!(
            resolver.prepare(&root_comment("I pick 2")).await,
            Err(TurnError::NoMove)
        ));
        assert!(resolver.prepare(&root_comment(" 2 ")).await.is_ok());
    }

    #[tokio::test]
    async fn deleted_post_is_not_found() {
        let (resolver, _, storyteller) =
            resolver(StubPlatform::default(), FixedStoryteller::default());
        let err = resolver.resolve(&root_comment("1")).await.unwrap_err();
        assert!(matches!(err, TurnError::NotFound { kind: "post", .. }));
        assert!(storyteller.seen().is_empty());
    }

    #[tokio::test]
    async fn storyteller_failure_publishes_nothing() {
        let (resolver, platform, _) = resolver(
            StubPlatform::default().with_post("p", "Intro"),
            FixedStoryteller::default(),
        );
        let err = resolver.resolve(&root_comment("1")).await.unwrap_err();
        assert!(matches!(err, TurnError::Upstream(_)));
        assert!(platform.published().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_is_upstream() {
        let mut stub = StubPlatform::default().with_post("p", "Intro");
        stub.fail_publish = true;
        let (resolver, _, _) = resolver(stub, FixedStoryteller::replying("next"));
        let err = resolver.resolve(&root_comment("1")).await.unwrap_err();
        assert_eq!(err.reason(), "upstream");
    }
}
