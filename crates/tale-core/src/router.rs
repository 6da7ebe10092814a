//! Classification of inbound webhook traffic.
//!
//! The router is pure: it decodes and checks requests and returns the
//! actions to take, leaving execution to the [`Engine`](crate::Engine).

use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::error::{RouteError, RouteResult};
use crate::settings::RouterSettings;
use crate::story::StoryTarget;
use crate::types::{IncomingEvent, ItemKind, Verb};
use crate::webhook::Notification;

/// Query string of the subscription handshake.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationQuery {
    /// Must be `subscribe`.
    #[serde(rename = "hub.mode", default)]
    pub mode: Option<String>,
    /// Token configured on the platform side.
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: Option<String>,
    /// Value to echo back.
    #[serde(rename = "hub.challenge", default)]
    pub challenge: Option<String>,
}

/// An inbound request.
#[derive(Debug, Clone, Copy)]
pub enum Inbound<'a> {
    /// Subscription handshake.
    Verification(&'a VerificationQuery),
    /// Scheduled story start.
    Trigger {
        /// Token presented by the scheduler.
        token: Option<&'a str>,
    },
    /// Raw notification body.
    Notification(&'a [u8]),
}

/// What to do in response to an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Answer the handshake with this challenge.
    VerifyChallenge(String),
    /// Start a new story.
    StartNewStory(StoryTarget),
    /// Resolve a player's turn.
    ResolveTurn(IncomingEvent),
    /// Nothing to do.
    Ignore,
}

/// Routes inbound requests to actions.
#[derive(Debug, Clone)]
pub struct EventRouter {
    settings: RouterSettings,
}

impl EventRouter {
    /// Create a router.
    #[must_use]
    pub fn new(settings: RouterSettings) -> Self {
        Self { settings }
    }

    /// Classify an inbound request.
    ///
    /// # Errors
    ///
    /// Fails on a rejected handshake or trigger and on an undecodable
    /// notification body. Individual malformed changes are skipped.
    pub fn route(&self, inbound: Inbound<'_>) -> RouteResult<Vec<Action>> {
        match inbound {
            Inbound::Verification(query) => self.verify(query).map(|c| vec![c]),
            Inbound::Trigger { token } => {
                if token.is_some_and(|t| tokens_match(t, &self.settings.trigger_token)) {
                    Ok(vec![Action::StartNewStory(StoryTarget::NewPost)])
                } else {
                    warn!("Rejected story trigger");
                    Err(RouteError::TriggerRejected)
                }
            },
            Inbound::Notification(body) => {
                let notification: Notification = serde_json::from_slice(body)
                    .map_err(|e| RouteError::MalformedPayload(e.to_string()))?;
                Ok(self.route_notification(notification))
            },
        }
    }

    fn verify(&self, query: &VerificationQuery) -> RouteResult<Action> {
        let subscribed = query.mode.as_deref() == Some("subscribe");
        let token_ok = query
            .verify_token
            .as_deref()
            .is_some_and(|t| tokens_match(t, &self.settings.verify_token));

        if subscribed && token_ok {
            Ok(Action::VerifyChallenge(
                query.challenge.clone().unwrap_or_default(),
            ))
        } else {
            warn!(mode = ?query.mode, "Rejected webhook verification");
            Err(RouteError::VerificationRejected)
        }
    }

    /// Map every change of a decoded notification to an action.
    #[must_use]
    pub fn route_notification(&self, notification: Notification) -> Vec<Action> {
        if !notification.is_page() {
            debug!(object = ?notification.object, "Ignoring non-page notification");
            return Vec::new();
        }

        notification
            .entry
            .into_iter()
            .flat_map(|entry| entry.changes)
            .filter_map(|change| {
                let field = change.field.clone();
                match change.decode_value().and_then(IncomingEvent::try_from) {
                    Ok(event) => Some(self.classify(event)),
                    Err(failure) => {
                        warn!(field = ?field, %failure, "Skipping malformed change");
                        None
                    },
                }
            })
            .collect()
    }

    fn classify(&self, event: IncomingEvent) -> Action {
        match (&event.item, &event.verb) {
            (ItemKind::Comment, Verb::Add) => Action::ResolveTurn(event),
            (ItemKind::Status, Verb::Add) if self.is_trigger_status(&event.message) => {
                Action::StartNewStory(StoryTarget::CommentOn(event.post_id))
            },
            _ => Action::Ignore,
        }
    }

    fn is_trigger_status(&self, message: &str) -> bool {
        let keyword = self.settings.trigger_keyword.to_lowercase();
        !keyword.is_empty() && message.trim_start().to_lowercase().starts_with(&keyword)
    }
}

/// Constant-time token comparison. An empty configured token never matches.
fn tokens_match(given: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(given.as_bytes().ct_eq(expected.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> EventRouter {
        EventRouter::new(RouterSettings::new("tok"))
    }

    fn query(mode: &str, token: &str, challenge: &str) -> VerificationQuery {
        VerificationQuery {
            mode: Some(mode.to_string()),
            verify_token: Some(token.to_string()),
            challenge: Some(challenge.to_string()),
        }
    }

    #[test]
    fn verification_echoes_challenge() {
        let q = query("subscribe", "tok", "123");
        assert_eq!(
            router().route(Inbound::Verification(&q)).unwrap(),
            vec![Action::VerifyChallenge("123".to_string())]
        );
    }

    #[test]
    fn verification_rejects_wrong_token_or_mode() {
        let wrong_token = query("subscribe", "nope", "123");
        let wrong_mode = query("unsubscribe", "tok", "123");
        for q in [&wrong_token, &wrong_mode] {
            assert!(matches!(
                router().route(Inbound::Verification(q)),
                Err(RouteError::VerificationRejected)
            ));
        }
        assert!(matches!(
            router().route(Inbound::Verification(&VerificationQuery::default())),
            Err(RouteError::VerificationRejected)
        ));
    }

    #[test]
    fn trigger_requires_token() {
        assert_eq!(
            router()
                .route(Inbound::Trigger { token: Some("tok") })
                .unwrap(),
            vec![Action::StartNewStory(StoryTarget::NewPost)]
        );
        assert!(matches!(
            router().route(Inbound::Trigger { token: None }),
            Err(RouteError::TriggerRejected)
        ));
        assert!(matches!(
            router().route(Inbound::Trigger { token: Some("to") }),
            Err(RouteError::TriggerRejected)
        ));
    }

    #[test]
    fn token_comparison() {
        assert!(tokens_match("cron-token", "cron-token"));
        assert!(!tokens_match("cron-tokem", "cron-token"));
        assert!(!tokens_match("cron", "cron-token"));
        assert!(!tokens_match("", ""));
    }

    #[test]
    fn empty_configured_token_never_matches() {
        let router = EventRouter::new(RouterSettings::new(""));
        assert!(router.route(Inbound::Trigger { token: Some("") }).is_err());
    }

    #[test]
    fn comment_add_resolves_turn() {
        let body = br#"{"object":"page","entry":[{"changes":[{"field":"feed","value":
            {"item":"comment","verb":"add","post_id":"p","comment_id":"p_c","message":"2","from":{"id":"u"}}}]}]}"#;
        let actions = router().route(Inbound::Notification(body)).unwrap();
        assert!(matches!(&actions[..], [Action::ResolveTurn(e)] if e.message == "2"));
    }

    #[test]
    fn status_without_keyword_is_ignored() {
        let body = br#"{"object":"page","entry":[{"changes":[{"value":
            {"item":"status","verb":"add","post_id":"p","message":"Hello fans"}}]}]}"#;
        assert_eq!(
            router().route(Inbound::Notification(body)).unwrap(),
            vec![Action::Ignore]
        );
    }

    #[test]
    fn status_with_keyword_starts_story_under_it() {
        let body = br#"{"object":"page","entry":[{"changes":[{"value":
            {"item":"status","verb":"add","post_id":"p","message":"Start a new adventure!"}}]}]}"#;
        assert_eq!(
            router().route(Inbound::Notification(body)).unwrap(),
            vec![Action::StartNewStory(StoryTarget::CommentOn("p".to_string()))]
        );
    }

    #[test]
    fn malformed_change_skipped_siblings_continue() {
        let body = br#"{"object":"page","entry":[
            {"changes":[{"value":{"item":"comment","verb":"add","message":"2"}}, {}]},
            {"changes":[{"value":{"item":"comment","verb":"edited","post_id":"p","message":"3"}}]}
        ]}"#;
        assert_eq!(
            router().route(Inbound::Notification(body)).unwrap(),
            vec![Action::Ignore]
        );
    }

    #[test]
    fn sender_without_id_does_not_drop_valid_sibling() {
        let body = br#"{"object":"page","entry":[{"changes":[
            {"field":"feed","value":{"item":"comment","verb":"add","post_id":"p","comment_id":"p_c1","message":"2","from":{"id":"u"}}},
            {"field":"feed","value":{"item":"comment","verb":"add","post_id":"p","comment_id":"p_c2","message":"3","from":{"name":"x"}}},
            {"field":"feed","value":{"item":"comment","verb":"add","post_id":"p","message":{"text":"4"}}}
        ]}]}"#;
        let actions = router().route(Inbound::Notification(body)).unwrap();
        assert_eq!(actions.len(), 2);
        assert!(matches!(
            &actions[0],
            Action::ResolveTurn(e) if e.comment_id.as_deref() == Some("p_c1")
        ));
        assert!(matches!(
            &actions[1],
            Action::ResolveTurn(e) if e.comment_id.as_deref() == Some("p_c2") && e.author_id.is_none()
        ));
    }

    #[test]
    fn non_page_object_yields_nothing() {
        let body = br#"{"object":"user","entry":[{"changes":[{"value":
            {"item":"comment","verb":"add","post_id":"p","message":"2"}}]}]}"#;
        assert!(router().route(Inbound::Notification(body)).unwrap().is_empty());
    }

    #[test]
    fn undecodable_body_is_malformed() {
        assert!(matches!(
            router().route(Inbound::Notification(b"not json")),
            Err(RouteError::MalformedPayload(_))
        ));
    }
}
