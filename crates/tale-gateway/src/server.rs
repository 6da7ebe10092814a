//! HTTP routes and server loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tale_core::{Action, Engine, EventRouter, Inbound, StoryTarget, VerificationQuery};
use tale_telemetry::RequestContext;
use tokio::net::TcpListener;
use tracing::{Instrument, debug, info, instrument, warn};

use crate::dedup::DeliveryDedup;
use crate::error::{GatewayError, GatewayResult};
use crate::signature::{self, SIGNATURE_HEADER};
use crate::tracker::InFlight;

/// Header the scheduler presents on `/trigger`.
pub const TRIGGER_TOKEN_HEADER: &str = "x-tale-trigger-token";

/// How long shutdown waits for running actions.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway settings.
#[derive(Clone, Default)]
pub struct GatewaySettings {
    /// App secret for `X-Hub-Signature-256`. `None` skips verification.
    pub app_secret: Option<String>,
    /// How long a dispatched change is remembered. Zero disables dedup.
    pub dedup_window: Duration,
}

impl GatewaySettings {
    /// Settings verifying signatures with `app_secret`.
    pub fn new(app_secret: impl Into<String>) -> Self {
        Self {
            app_secret: Some(app_secret.into()),
            dedup_window: Duration::ZERO,
        }
    }

    /// Set the dedup window.
    #[must_use]
    pub fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("has_app_secret", &self.app_secret.is_some())
            .field("dedup_window", &self.dedup_window)
            .finish()
    }
}

struct Shared {
    router: EventRouter,
    engine: Arc<Engine>,
    app_secret: Option<String>,
    dedup: DeliveryDedup,
    in_flight: InFlight,
}

type AppState = Arc<Shared>;

/// The webhook server.
///
/// Requests are acknowledged as soon as they are verified and routed;
/// actions run on background tasks.
#[derive(Clone)]
pub struct Gateway {
    state: AppState,
}

impl Gateway {
    /// Create a gateway routing with `router` and executing on `engine`.
    #[must_use]
    pub fn new(router: EventRouter, engine: Arc<Engine>, settings: GatewaySettings) -> Self {
        if settings.app_secret.is_none() {
            warn!("No app secret configured; webhook signatures are not checked");
        }
        Self {
            state: Arc::new(Shared {
                router,
                engine,
                app_secret: settings.app_secret,
                dedup: DeliveryDedup::new(settings.dedup_window),
                in_flight: InFlight::new(),
            }),
        }
    }

    /// The axum application.
    pub fn app(&self) -> Router {
        Router::new()
            .route("/webhook", get(verify_subscription).post(receive_notification))
            .route("/trigger", post(trigger_story))
            .route("/health", get(health))
            .with_state(Arc::clone(&self.state))
    }

    /// Actions still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state.in_flight.pending()
    }

    /// Resolve once every dispatched action has finished.
    pub async fn wait_idle(&self) {
        self.state.in_flight.wait_idle().await;
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Fails if the address cannot be bound or the server stops with an
    /// I/O error.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> GatewayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves, then
    /// wait for running actions.
    ///
    /// # Errors
    ///
    /// Fails if the server stops with an I/O error.
    pub async fn serve_listener<F>(self, listener: TcpListener, shutdown: F) -> GatewayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(%addr, "Webhook gateway listening");

        axum::serve(listener, self.app())
            .with_graceful_shutdown(shutdown)
            .await?;

        let pending = self.in_flight();
        if pending > 0 {
            info!(pending, "Waiting for running actions");
        }
        if tokio::time::timeout(DRAIN_TIMEOUT, self.wait_idle())
            .await
            .is_err()
        {
            warn!(pending = self.in_flight(), "Shutdown with actions still running");
        }
        info!("Webhook gateway stopped");
        Ok(())
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("has_app_secret", &self.state.app_secret.is_some())
            .field("dedup_enabled", &self.state.dedup.is_enabled())
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

#[instrument(name = "webhook.verify", skip_all)]
async fn verify_subscription(
    State(state): State<AppState>,
    Query(query): Query<VerificationQuery>,
) -> Response {
    match state.router.route(Inbound::Verification(&query)) {
        Ok(actions) => {
            let challenge = actions
                .into_iter()
                .find_map(|action| match action {
                    Action::VerifyChallenge(challenge) => Some(challenge),
                    _ => None,
                })
                .unwrap_or_default();
            info!("Webhook subscription verified");
            (StatusCode::OK, challenge).into_response()
        },
        Err(_) => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn receive_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let ctx = RequestContext::new("webhook").with_operation("notification");
    ctx.span().in_scope(|| {
        if let Some(secret) = &state.app_secret {
            let sig = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
            match sig {
                Some(sig) if signature::verify(secret, &body, sig) => {},
                Some(_) => {
                    warn!("Invalid webhook signature");
                    return StatusCode::UNAUTHORIZED;
                },
                None => {
                    warn!("Missing X-Hub-Signature-256 header");
                    return StatusCode::UNAUTHORIZED;
                },
            }
        }

        match state.router.route(Inbound::Notification(&body)) {
            Ok(actions) => {
                debug!(actions = actions.len(), "Notification routed");
                dispatch(&state, &ctx, actions);
                StatusCode::OK
            },
            Err(e) => {
                warn!(error = %e, "Undecodable notification");
                StatusCode::BAD_REQUEST
            },
        }
    })
}

async fn trigger_story(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let ctx = RequestContext::new("trigger").with_operation("start_story");
    ctx.span().in_scope(|| {
        let token = headers
            .get(TRIGGER_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        match state.router.route(Inbound::Trigger { token }) {
            Ok(actions) => {
                dispatch(&state, &ctx, actions);
                StatusCode::ACCEPTED
            },
            Err(_) => StatusCode::UNAUTHORIZED,
        }
    })
}

async fn health() -> &'static str {
    "ok"
}

/// Spawn one task per action, skipping no-ops and redeliveries.
fn dispatch(state: &AppState, ctx: &RequestContext, actions: Vec<Action>) {
    for action in actions {
        if matches!(action, Action::Ignore) {
            continue;
        }
        if !state.dedup.admit(&action) {
            info!("Skipping redelivered change");
            continue;
        }

        let child = action_context(ctx, &action);
        let span = child.span();
        let engine = Arc::clone(&state.engine);
        state.in_flight.spawn(
            async move {
                let outcome = engine.handle(action).await;
                debug!(
                    published = outcome.is_published(),
                    elapsed_ms = child.elapsed_ms(),
                    "Action finished"
                );
            }
            .instrument(span),
        );
    }
}

fn action_context(parent: &RequestContext, action: &Action) -> RequestContext {
    let child = parent.child("engine");
    match action {
        Action::ResolveTurn(event) => {
            let child = child.with_operation("resolve_turn").with_post(&event.post_id);
            match &event.comment_id {
                Some(comment_id) => child.with_comment(comment_id),
                None => child,
            }
        },
        Action::StartNewStory(StoryTarget::CommentOn(post_id)) => {
            child.with_operation("start_story").with_post(post_id)
        },
        Action::StartNewStory(StoryTarget::NewPost) => child.with_operation("start_story"),
        Action::VerifyChallenge(_) | Action::Ignore => child,
    }
}
