//! Error types for the story relay core.

use thiserror::Error;

/// Errors surfaced by a [`Platform`](crate::Platform) implementation.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The request could not be sent or did not complete.
    #[error("platform request failed: {0}")]
    Request(String),

    /// The platform answered with a non-success status.
    #[error("platform returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("invalid platform response: {0}")]
    Decode(String),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Errors surfaced by a [`Storyteller`](crate::Storyteller).
#[derive(Debug, Error)]
pub enum StoryError {
    /// The language model call failed.
    #[error("story completion failed: {0}")]
    Completion(#[from] tale_llm::LlmError),

    /// The transcript handed to the storyteller was empty.
    #[error("cannot continue an empty transcript")]
    EmptyTranscript,
}

/// Result type for storyteller operations.
pub type StoryResult<T> = Result<T, StoryError>;

/// Why a webhook change or event was not usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// The change carried no `value` object.
    #[error("change has no value")]
    MissingValue,

    /// The change value did not have the expected shape.
    #[error("undecodable change value: {0}")]
    Undecodable(String),

    /// A required field was absent or empty.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// The item is not a comment.
    #[error("item `{0}` is not a comment")]
    NotAComment(String),

    /// The verb is not `add`.
    #[error("verb `{0}` is not add")]
    NotAnAddition(String),

    /// The comment was written by the page itself.
    #[error("comment authored by the page account")]
    OwnComment,
}

/// Why a turn was rejected.
///
/// Every variant is terminal for the turn: nothing is published.
#[derive(Debug, Error)]
pub enum TurnError {
    /// Malformed or irrelevant event.
    #[error("invalid event: {0}")]
    Validation(#[from] ValidationFailure),

    /// The comment does not contain a choice.
    #[error("comment does not contain a choice")]
    NoMove,

    /// A referenced post or comment no longer exists.
    #[error("{kind} {id} not found")]
    NotFound {
        /// `"post"` or `"comment"`.
        kind: &'static str,
        /// Platform object id.
        id: String,
    },

    /// Someone other than the branch owner replied.
    #[error("author {actual} cannot continue the branch of comment {comment_id}")]
    AuthorMismatch {
        /// Initial comment anchoring the branch.
        comment_id: String,
        /// Author of the reply.
        actual: String,
    },

    /// The platform or the language model failed.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl TurnError {
    /// Short machine-readable reason, used as a log field.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NoMove => "no_move",
            Self::NotFound { .. } => "not_found",
            Self::AuthorMismatch { .. } => "author_mismatch",
            Self::Upstream(_) => "upstream",
        }
    }
}

impl From<PlatformError> for TurnError {
    fn from(e: PlatformError) -> Self {
        Self::Upstream(e.to_string())
    }
}

impl From<StoryError> for TurnError {
    fn from(e: StoryError) -> Self {
        Self::Upstream(e.to_string())
    }
}

/// Result type for turn resolution.
pub type TurnResult<T> = Result<T, TurnError>;

/// Errors returned by the [`EventRouter`](crate::EventRouter).
///
/// These are the only failures visible to the caller of the webhook.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Subscription handshake failed (wrong mode or token).
    #[error("webhook verification rejected")]
    VerificationRejected,

    /// Scheduled trigger carried a missing or wrong token.
    #[error("story trigger rejected")]
    TriggerRejected,

    /// Notification body is not valid JSON for a webhook payload.
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),
}

/// Result type for routing.
pub type RouteResult<T> = Result<T, RouteError>;
