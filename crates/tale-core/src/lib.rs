//! Tale Core - thread reconstruction and turn resolution.
//!
//! A story lives entirely in a page's comment threads. For every incoming
//! comment the core:
//!
//! 1. routes the webhook payload to an [`Action`] ([`EventRouter`]),
//! 2. reads the player's choice ([`extract_move`]),
//! 3. rebuilds the story so far from the thread ([`build_transcript`]),
//! 4. asks a [`Storyteller`] for the next part and publishes it
//!    ([`TurnResolver`]).
//!
//! The platform and the language model are reached only through the
//! [`Platform`] and [`Storyteller`] traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tale_core::prelude::*;
//!
//! # async fn example(platform: Arc<dyn Platform>, storyteller: Arc<dyn Storyteller>) {
//! let router = EventRouter::new(RouterSettings::new("verify-token"));
//! let engine = Engine::new(platform, storyteller, StorySettings::new("page_id"));
//!
//! let body = br#"{"object":"page","entry":[]}"#;
//! if let Ok(actions) = router.route(Inbound::Notification(body)) {
//!     engine.handle_all(actions).await;
//! }
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod format;
pub mod moves;
pub mod transcript;
pub mod webhook;

mod engine;
mod error;
mod platform;
mod router;
mod settings;
mod story;
mod storyteller;
mod turn;
mod types;

#[cfg(test)]
mod testing;

pub use engine::{Engine, Outcome};
pub use error::{
    PlatformError, PlatformResult, RouteError, RouteResult, StoryError, StoryResult, TurnError,
    TurnResult, ValidationFailure,
};
pub use format::{ReplyKind, format_story, part_number};
pub use moves::{MovePolicy, extract_move, extract_move_with};
pub use platform::Platform;
pub use router::{Action, EventRouter, Inbound, VerificationQuery};
pub use settings::{DEFAULT_SEED_PROMPT, DEFAULT_TRIGGER_KEYWORD, RouterSettings, StorySettings};
pub use story::{StoryStarter, StoryTarget};
pub use storyteller::{DEFAULT_SYSTEM_PROMPT, LlmStoryteller, Storyteller};
pub use transcript::{TranscriptContext, build_transcript};
pub use turn::{PreparedTurn, TurnResolver};
pub use types::{
    Comment, IncomingEvent, ItemKind, Move, Post, Publication, PublishCommand, Role, StoryMessage,
    Verb,
};
