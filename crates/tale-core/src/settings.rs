//! Runtime settings consumed by the core.

use crate::moves::MovePolicy;

/// Default opening prompt for a new story.
pub const DEFAULT_SEED_PROMPT: &str = "Start a story in the style of \"choose your own adventure\". Prompt me with a numbered list of options for me to choose what happens next.";

/// Default keyword a page status must start with to open a story under it.
pub const DEFAULT_TRIGGER_KEYWORD: &str = "start";

/// Settings for turn resolution and story start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorySettings {
    /// Page account id.
    pub page_id: String,
    /// How comments are read as choices.
    pub move_policy: MovePolicy,
    /// Opening prompt for new stories.
    pub seed_prompt: String,
}

impl StorySettings {
    /// Settings for `page_id` with defaults elsewhere.
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            move_policy: MovePolicy::default(),
            seed_prompt: DEFAULT_SEED_PROMPT.to_string(),
        }
    }

    /// Set the move policy.
    #[must_use]
    pub fn with_move_policy(mut self, policy: MovePolicy) -> Self {
        self.move_policy = policy;
        self
    }

    /// Set the seed prompt.
    #[must_use]
    pub fn with_seed_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.seed_prompt = prompt.into();
        self
    }
}

/// Settings for the event router.
#[derive(Clone)]
pub struct RouterSettings {
    /// Token expected in the subscription handshake.
    pub verify_token: String,
    /// Token expected on the scheduled trigger.
    pub trigger_token: String,
    /// Status prefix that starts a story under the status.
    pub trigger_keyword: String,
}

impl RouterSettings {
    /// Settings where the trigger shares the verification token.
    pub fn new(verify_token: impl Into<String>) -> Self {
        let verify_token = verify_token.into();
        Self {
            trigger_token: verify_token.clone(),
            verify_token,
            trigger_keyword: DEFAULT_TRIGGER_KEYWORD.to_string(),
        }
    }

    /// Use a separate trigger token.
    #[must_use]
    pub fn with_trigger_token(mut self, token: impl Into<String>) -> Self {
        self.trigger_token = token.into();
        self
    }

    /// Set the trigger keyword.
    #[must_use]
    pub fn with_trigger_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.trigger_keyword = keyword.into();
        self
    }
}

impl std::fmt::Debug for RouterSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterSettings")
            .field("has_verify_token", &!self.verify_token.is_empty())
            .field("has_trigger_token", &!self.trigger_token.is_empty())
            .field("trigger_keyword", &self.trigger_keyword)
            .finish()
    }
}
