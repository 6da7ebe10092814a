//! Per-delivery context for correlating log lines.
//!
//! Every webhook delivery or trigger call gets a [`RequestContext`]. Actions
//! spawned from it take a [`child`](RequestContext::child) context that
//! keeps the correlation id and names the post and comment being handled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation data carried through one delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique id of this unit of work.
    pub request_id: Uuid,
    /// Shared by a delivery and every action it spawns.
    pub correlation_id: Uuid,
    /// Request this one was spawned from.
    pub parent_id: Option<Uuid>,
    /// When the work started.
    pub started_at: DateTime<Utc>,
    /// Component that created the context (`webhook`, `trigger`, `cli`).
    pub source: String,
    /// Operation being performed.
    pub operation: Option<String>,
    /// Post the work concerns.
    pub post_id: Option<String>,
    /// Comment the work concerns.
    pub comment_id: Option<String>,
}

impl RequestContext {
    /// Create a root context.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        Self {
            request_id: id,
            correlation_id: id,
            parent_id: None,
            started_at: Utc::now(),
            source: source.into(),
            operation: None,
            post_id: None,
            comment_id: None,
        }
    }

    /// Create a child context that inherits correlation info.
    #[must_use]
    pub fn child(&self, source: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            correlation_id: self.correlation_id,
            parent_id: Some(self.request_id),
            started_at: Utc::now(),
            source: source.into(),
            operation: None,
            post_id: self.post_id.clone(),
            comment_id: self.comment_id.clone(),
        }
    }

    /// Set the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Set the post id.
    #[must_use]
    pub fn with_post(mut self, post_id: impl Into<String>) -> Self {
        self.post_id = Some(post_id.into());
        self
    }

    /// Set the comment id.
    #[must_use]
    pub fn with_comment(mut self, comment_id: impl Into<String>) -> Self {
        self.comment_id = Some(comment_id.into());
        self
    }

    /// Time since the work started.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        // started_at is set at creation time, so now is never earlier
        #[allow(clippy::arithmetic_side_effects)]
        let elapsed = Utc::now() - self.started_at;
        elapsed
    }

    /// Elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        self.elapsed().num_milliseconds()
    }

    /// A tracing span carrying this context.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.short_id(),
            correlation_id = %self.correlation_id,
            source = %self.source,
            operation = self.operation.as_deref(),
            post_id = self.post_id.as_deref(),
            comment_id = self.comment_id.as_deref(),
        )
    }

    /// First eight characters of the request id.
    #[must_use]
    pub fn short_id(&self) -> String {
        let mut id = self.request_id.simple().to_string();
        id.truncate(8);
        id
    }
}
