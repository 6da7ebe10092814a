//! Action execution.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::TurnError;
use crate::platform::Platform;
use crate::router::Action;
use crate::settings::StorySettings;
use crate::story::StoryStarter;
use crate::storyteller::Storyteller;
use crate::turn::TurnResolver;
use crate::types::Publication;

/// Result of executing one [`Action`].
#[derive(Debug)]
pub enum Outcome {
    /// Handshake answered.
    Challenge(String),
    /// Something was published.
    Published(Publication),
    /// The turn or story start was dropped.
    Rejected(TurnError),
    /// Nothing to do.
    Ignored,
}

impl Outcome {
    /// Whether anything was published.
    #[must_use]
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published(_))
    }
}

/// Executes routed actions against the platform and storyteller.
///
/// Failures never escape: they are logged and reported as
/// [`Outcome::Rejected`].
#[derive(Debug)]
pub struct Engine {
    resolver: TurnResolver,
    starter: StoryStarter,
}

impl Engine {
    /// Create an engine sharing one platform and storyteller.
    pub fn new(
        platform: Arc<dyn Platform>,
        storyteller: Arc<dyn Storyteller>,
        settings: StorySettings,
    ) -> Self {
        Self {
            resolver: TurnResolver::new(
                Arc::clone(&platform),
                Arc::clone(&storyteller),
                settings.clone(),
            ),
            starter: StoryStarter::new(platform, storyteller, settings),
        }
    }

    /// The turn resolver.
    #[must_use]
    pub fn resolver(&self) -> &TurnResolver {
        &self.resolver
    }

    /// The story starter.
    #[must_use]
    pub fn starter(&self) -> &StoryStarter {
        &self.starter
    }

    /// Execute one action.
    pub async fn handle(&self, action: Action) -> Outcome {
        match action {
            Action::VerifyChallenge(challenge) => Outcome::Challenge(challenge),
            Action::Ignore => Outcome::Ignored,
            Action::ResolveTurn(event) => match self.resolver.resolve(&event).await {
                Ok(command) => Outcome::Published(Publication::Comment(command)),
                Err(e) => {
                    log_rejection(&e);
                    Outcome::Rejected(e)
                },
            },
            Action::StartNewStory(target) => match self.starter.start(&target).await {
                Ok(publication) => Outcome::Published(publication),
                Err(e) => {
                    log_rejection(&e);
                    Outcome::Rejected(e)
                },
            },
        }
    }

    /// Execute actions in order.
    pub async fn handle_all(&self, actions: Vec<Action>) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(actions.len());
        for action in actions {
            outcomes.push(self.handle(action).await);
        }
        outcomes
    }
}

fn log_rejection(e: &TurnError) {
    match e {
        TurnError::Upstream(_) => warn!(reason = e.reason(), error = %e, "Turn failed upstream"),
        _ => info!(reason = e.reason(), error = %e, "Turn dropped"),
    }
}
