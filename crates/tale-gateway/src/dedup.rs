//! Suppression of redelivered webhook changes.
//!
//! The platform retries deliveries it considers failed, and the gateway
//! acknowledges before the turn is resolved, so the same comment can arrive
//! twice. [`DeliveryDedup`] remembers recently dispatched keys for a fixed
//! window within one process lifetime.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tale_core::{Action, StoryTarget};

/// Entries kept before expired keys are swept.
const SWEEP_THRESHOLD: usize = 1024;

/// Window of recently dispatched delivery keys.
#[derive(Debug)]
pub struct DeliveryDedup {
    window: Duration,
    seen: DashMap<String, Instant>,
}

impl DeliveryDedup {
    /// Remember keys for `window`. A zero window disables dedup.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: DashMap::new(),
        }
    }

    /// Dedup that lets everything through.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Whether keys are remembered at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.window.is_zero()
    }

    /// Number of remembered keys, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no key is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Record `key`. Returns `false` if it was already seen within the window.
    pub fn first_sighting(&self, key: &str) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let now = Instant::now();
        if self.seen.len() >= SWEEP_THRESHOLD {
            self.sweep(now);
        }

        match self.seen.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if now.duration_since(*entry.get()) < self.window {
                    false
                } else {
                    entry.insert(now);
                    true
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            },
        }
    }

    /// Whether `action` should run. Actions without a delivery key always run.
    pub fn admit(&self, action: &Action) -> bool {
        match delivery_key(action) {
            Some(key) => self.first_sighting(&key),
            None => true,
        }
    }

    fn sweep(&self, now: Instant) {
        self.seen
            .retain(|_, at| now.duration_since(*at) < self.window);
    }
}

/// Identity of the webhook change behind `action`.
///
/// Scheduled triggers have no key: every trigger call starts a story.
/// Neither do turns without a comment id, which cannot be told apart.
#[must_use]
pub fn delivery_key(action: &Action) -> Option<String> {
    match action {
        Action::ResolveTurn(event) => event
            .comment_id
            .as_deref()
            .map(|comment_id| format!("comment:{comment_id}")),
        Action::StartNewStory(StoryTarget::CommentOn(post_id)) => Some(format!("status:{post_id}")),
        Action::StartNewStory(StoryTarget::NewPost)
        | Action::VerifyChallenge(_)
        | Action::Ignore => None,
    }
}
