//! Prelude module - commonly used types for convenient import.
//!
//! Use `use tale_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{PlatformError, PlatformResult, RouteError, StoryError, StoryResult, TurnError};

// Collaborators
pub use crate::{LlmStoryteller, Platform, Storyteller};

// Routing and execution
pub use crate::{Action, Engine, EventRouter, Inbound, Outcome, VerificationQuery};

// Settings
pub use crate::{MovePolicy, RouterSettings, StorySettings};

// Domain types
pub use crate::{Comment, IncomingEvent, Post, Publication, PublishCommand, StoryMessage};
