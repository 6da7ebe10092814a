//! Reply formatting: part markers and choice instructions.

use crate::types::{Role, StoryMessage};

/// Prefix of the part marker line.
pub const PART_MARKER: &str = "*** PART";

/// Phrase that identifies an instructions line already written by the model.
pub const CHOICE_PHRASE: &str = "with the number of your choice";

/// Where the reader is expected to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// A top-level comment under a post.
    Comment,
    /// A reply inside a comment thread.
    Reply,
}

impl ReplyKind {
    fn noun(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Reply => "reply",
        }
    }
}

/// Part number of the next story segment.
///
/// Counts the assistant messages already in the transcript.
#[must_use]
pub fn part_number(transcript: &[StoryMessage]) -> usize {
    transcript
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .count()
        .saturating_add(1)
}

/// Decorate a model completion for publication.
#[must_use]
pub fn format_story(completion: &str, part: usize, kind: ReplyKind) -> String {
    let body = completion.trim();
    let mut text = String::with_capacity(body.len().saturating_add(96));

    if !body.contains(PART_MARKER) {
        text.push_str(&format!("{PART_MARKER} {part} ***\n\n"));
    }
    text.push_str(body);
    if !body.contains(CHOICE_PHRASE) {
        text.push_str(&format!(
            "\n\n*** Add a {} {CHOICE_PHRASE}. ***",
            kind.noun()
        ));
    }
    text
}
