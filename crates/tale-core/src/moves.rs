//! Move extraction.
//!
//! A move is the option number a player picks by commenting. Two policies
//! exist: [`MovePolicy::Lenient`] takes the first standalone number anywhere
//! in the comment ("I pick 2!"), [`MovePolicy::Strict`] only accepts a
//! comment that is nothing but a number.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::Move;

#[allow(clippy::expect_used)]
static CHOICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]+\b").expect("invalid regex"));

/// How strictly comment text is read as a choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovePolicy {
    /// The whole trimmed comment must be an integer.
    Strict,
    /// The first standalone run of digits is the choice.
    #[default]
    Lenient,
}

impl FromStr for MovePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown move policy `{other}`")),
        }
    }
}

/// Extract a move using the lenient policy.
#[must_use]
pub fn extract_move(text: &str) -> Option<Move> {
    extract_move_with(MovePolicy::Lenient, text)
}

/// Extract a move using `policy`.
///
/// Returns `None` when no choice is present or the number does not fit a
/// `u32`.
#[must_use]
pub fn extract_move_with(policy: MovePolicy, text: &str) -> Option<Move> {
    let text = text.to_lowercase();
    let digits = match policy {
        MovePolicy::Strict => {
            let trimmed = text.trim();
            (!trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()))
                .then_some(trimmed)?
        },
        MovePolicy::Lenient => CHOICE_RE.find(&text)?.as_str(),
    };

    let choice = digits.parse::<u32>().ok()?;
    Some(Move {
        choice,
        raw_text: digits.to_string(),
    })
}
