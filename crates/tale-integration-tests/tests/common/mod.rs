//! Shared harness: a gateway wired to an in-memory page and a scripted model.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tale_core::{
    Engine, EventRouter, LlmStoryteller, MovePolicy, Platform, RouterSettings, StorySettings,
    Storyteller,
};
use tale_gateway::{Gateway, GatewaySettings, SIGNATURE_HEADER, TRIGGER_TOKEN_HEADER, signature};
use tale_test::{
    ChangeBuilder, MockLlmProvider, MockPlatform, notification_body, setup_test_logging,
};
use tower::ServiceExt as _;

pub const PAGE_ID: &str = "page";
pub const APP_SECRET: &str = "app-secret";
pub const VERIFY_TOKEN: &str = "verify-me";

/// A relay over [`MockPlatform`] and [`MockLlmProvider`].
pub struct RelayHarness {
    pub gateway: Gateway,
    pub page: Arc<MockPlatform>,
    pub llm: Arc<MockLlmProvider>,
}

impl RelayHarness {
    pub fn builder(page: MockPlatform) -> HarnessBuilder {
        HarnessBuilder {
            page,
            replies: Vec::new(),
            policy: MovePolicy::Lenient,
            dedup_window: Duration::ZERO,
        }
    }

    /// Deliver a signed notification and wait for every spawned action.
    pub async fn deliver(&self, changes: &[ChangeBuilder]) -> StatusCode {
        let body = notification_body(PAGE_ID, changes);
        let request = Request::post("/webhook")
            .header(SIGNATURE_HEADER, signature::sign(APP_SECRET, &body))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Deliver a raw body signed with the app secret.
    pub async fn deliver_raw(&self, body: Vec<u8>) -> StatusCode {
        let request = Request::post("/webhook")
            .header(SIGNATURE_HEADER, signature::sign(APP_SECRET, &body))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Run the subscription handshake; returns status and body.
    pub async fn verify(&self, token: &str, challenge: &str) -> (StatusCode, String) {
        let uri = format!(
            "/webhook?hub.mode=subscribe&hub.verify_token={token}&hub.challenge={challenge}"
        );
        let response = self
            .gateway
            .app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// Hit `/trigger` and wait for the story start.
    pub async fn trigger(&self, token: &str) -> StatusCode {
        let request = Request::post("/trigger")
            .header(TRIGGER_TOKEN_HEADER, token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> StatusCode {
        let status = self
            .gateway
            .app()
            .oneshot(request)
            .await
            .unwrap()
            .status();
        self.gateway.wait_idle().await;
        status
    }
}

pub struct HarnessBuilder {
    page: MockPlatform,
    replies: Vec<String>,
    policy: MovePolicy,
    dedup_window: Duration,
}

impl HarnessBuilder {
    pub fn replies(mut self, replies: &[&str]) -> Self {
        self.replies = replies.iter().map(ToString::to_string).collect();
        self
    }

    pub fn policy(mut self, policy: MovePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    pub fn build(self) -> RelayHarness {
        setup_test_logging("tale_core=debug,tale_gateway=debug,warn");
        let page = Arc::new(self.page);
        let llm = Arc::new(MockLlmProvider::replying(self.replies));
        let engine = Engine::new(
            Arc::clone(&page) as Arc<dyn Platform>,
            Arc::new(LlmStoryteller::new(Arc::clone(&llm))) as Arc<dyn Storyteller>,
            StorySettings::new(PAGE_ID).with_move_policy(self.policy),
        );
        let gateway = Gateway::new(
            EventRouter::new(RouterSettings::new(VERIFY_TOKEN)),
            Arc::new(engine),
            GatewaySettings::new(APP_SECRET).with_dedup_window(self.dedup_window),
        );
        RelayHarness { gateway, page, llm }
    }
}
