//! Domain types shared by the relay.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationFailure;
use crate::webhook::ChangeValue;

/// Role of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Written by the page (the storyteller).
    Assistant,
    /// Written by the player.
    User,
    /// Instructions.
    System,
}

/// One message of the story so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryMessage {
    /// Who said it.
    pub role: Role,
    /// What was said.
    pub content: String,
}

impl StoryMessage {
    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// A player's choice extracted from a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    /// The chosen option number.
    pub choice: u32,
    /// The choice text as matched in the comment.
    pub raw_text: String,
}

/// A page post as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Post id.
    pub id: String,
    /// Author id, when the platform discloses it.
    pub author_id: Option<String>,
    /// Post text.
    pub message: String,
}

/// A comment as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment id.
    pub id: String,
    /// Author id, when the platform discloses it.
    pub author_id: Option<String>,
    /// Comment text.
    pub message: String,
    /// Parent object id (post or initial comment).
    pub parent_id: Option<String>,
}

/// Instruction to publish a comment under `target_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCommand {
    /// Post or comment that receives the reply.
    pub target_id: String,
    /// Comment text.
    pub text: String,
}

/// What the relay published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publication {
    /// A comment under an existing object.
    Comment(PublishCommand),
    /// A new root post on the page.
    Post {
        /// Post text.
        text: String,
    },
}

/// Kind of object a webhook change refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// A comment or reply.
    Comment,
    /// A status update (page post).
    Status,
    /// A generic post.
    Post,
    /// Anything else (reactions, photos, ...).
    Other(String),
}

impl From<&str> for ItemKind {
    fn from(s: &str) -> Self {
        match s {
            "comment" => Self::Comment,
            "status" => Self::Status,
            "post" => Self::Post,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment => f.write_str("comment"),
            Self::Status => f.write_str("status"),
            Self::Post => f.write_str("post"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// What happened to the object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Created.
    Add,
    /// Edited.
    Edited,
    /// Removed.
    Remove,
    /// Anything else.
    Other(String),
}

impl From<&str> for Verb {
    fn from(s: &str) -> Self {
        match s {
            "add" => Self::Add,
            "edited" => Self::Edited,
            "remove" => Self::Remove,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::Edited => f.write_str("edited"),
            Self::Remove => f.write_str("remove"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// A webhook change, normalized and checked for required fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingEvent {
    /// Object kind.
    pub item: ItemKind,
    /// Action taken.
    pub verb: Verb,
    /// Root post id.
    pub post_id: String,
    /// Parent id: the post for first-level comments, the initial comment
    /// for replies.
    pub parent_id: Option<String>,
    /// Id of the comment itself.
    pub comment_id: Option<String>,
    /// Author id (`from.id`).
    pub author_id: Option<String>,
    /// Raw text.
    pub message: String,
}

impl IncomingEvent {
    /// Whether this comment sits directly under the root post.
    #[must_use]
    pub fn is_root_comment(&self) -> bool {
        self.parent_id
            .as_deref()
            .is_none_or(|parent| parent == self.post_id)
    }

    /// Id of the initial comment anchoring this event's branch.
    ///
    /// For a first-level comment that is the comment itself (or the post
    /// when the payload omits `comment_id`); for a reply it is `parent_id`.
    #[must_use]
    pub fn anchor_id(&self) -> &str {
        if self.is_root_comment() {
            self.comment_id.as_deref().unwrap_or(&self.post_id)
        } else {
            self.parent_id.as_deref().unwrap_or(&self.post_id)
        }
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationFailure> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ValidationFailure::MissingField(field))
}

impl TryFrom<ChangeValue> for IncomingEvent {
    type Error = ValidationFailure;

    fn try_from(value: ChangeValue) -> Result<Self, Self::Error> {
        let item = required(value.item, "item")?;
        let verb = required(value.verb, "verb")?;
        let post_id = required(value.post_id, "post_id")?;
        let message = required(value.message, "message")?;

        Ok(Self {
            item: ItemKind::from(item.as_str()),
            verb: Verb::from(verb.as_str()),
            post_id,
            parent_id: value.parent_id.filter(|v| !v.is_empty()),
            comment_id: value.comment_id.filter(|v| !v.is_empty()),
            author_id: value.from.and_then(|f| f.id).filter(|v| !v.is_empty()),
            message,
        })
    }
}
