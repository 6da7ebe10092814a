//! Transcript reconstruction from a comment thread.
//!
//! The thread is the only state a story has. A transcript always opens with
//! the story post (as the assistant), followed by the player's initial
//! comment and then every later reply in the branch written by either the
//! page or that same player.
//!
//! The Graph API omits `from` on comments by users who have not authorized
//! the app. A thread comment with no author is taken as the player's, and a
//! hidden initial-comment author disables the same-author check.

use tracing::{debug, warn};

use crate::error::{TurnError, TurnResult};
use crate::platform::Platform;
use crate::types::{Comment, IncomingEvent, Move, Post, StoryMessage};

/// Everything needed to rebuild the history of one turn.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptContext<'a> {
    /// Story post.
    pub post: &'a Post,
    /// Triggering event.
    pub event: &'a IncomingEvent,
    /// Move extracted from the event.
    pub mv: &'a Move,
    /// Page account id; its comments are the assistant's turns.
    pub page_id: &'a str,
}

/// Build the ordered transcript for a turn.
///
/// For a root comment the result is `[Assistant(post), User(choice)]`. For a
/// reply the initial comment and the earlier branch replies are included; the
/// caller appends the new move afterwards.
///
/// # Errors
///
/// - [`TurnError::NotFound`] if the initial comment no longer exists.
/// - [`TurnError::AuthorMismatch`] if the reply is not from the branch owner.
///   Only checked when the platform reports the owner.
/// - [`TurnError::Upstream`] on platform failures.
pub async fn build_transcript(
    platform: &dyn Platform,
    ctx: TranscriptContext<'_>,
) -> TurnResult<Vec<StoryMessage>> {
    let mut transcript = vec![StoryMessage::assistant(ctx.post.message.clone())];

    if ctx.event.is_root_comment() {
        transcript.push(StoryMessage::user(ctx.mv.raw_text.clone()));
        return Ok(transcript);
    }

    let anchor = ctx.event.anchor_id();
    let initial = platform
        .fetch_comment(anchor)
        .await?
        .ok_or_else(|| TurnError::NotFound {
            kind: "comment",
            id: anchor.to_string(),
        })?;

    let author = ctx.event.author_id.as_deref().unwrap_or_default();
    match initial.author_id.as_deref() {
        Some(owner) if owner != author => {
            return Err(TurnError::AuthorMismatch {
                comment_id: initial.id,
                actual: author.to_string(),
            });
        },
        Some(_) => {},
        None => warn!(
            anchor = %initial.id,
            author,
            "Initial comment author hidden by the platform; skipping same-author check"
        ),
    }
    transcript.push(StoryMessage::user(initial.message.clone()));

    let replies = platform.list_comments(&initial.id).await?;
    let history = thread_messages(replies, ctx.page_id, author, ctx.event.comment_id.as_deref());
    debug!(
        anchor = %initial.id,
        replies = history.len(),
        "Rebuilt branch history"
    );
    transcript.extend(history);

    Ok(transcript)
}

/// Turn a newest-first reply list into chronological transcript messages.
///
/// Keeps replies by the page (assistant) and by `author_id` (user), drops
/// replies by any other known account and skips the triggering reply
/// `exclude_id`. Replies whose author is hidden count as the player's.
#[must_use]
pub fn thread_messages(
    mut replies: Vec<Comment>,
    page_id: &str,
    author_id: &str,
    exclude_id: Option<&str>,
) -> Vec<StoryMessage> {
    replies.reverse();
    replies
        .into_iter()
        .filter(|c| exclude_id != Some(c.id.as_str()))
        .filter_map(|c| match c.author_id.as_deref() {
            Some(id) if id == page_id => Some(StoryMessage::assistant(c.message)),
            Some(id) if id == author_id => Some(StoryMessage::user(c.message)),
            Some(_) => None,
            None => Some(StoryMessage::user(c.message)),
        })
        .collect()
}
