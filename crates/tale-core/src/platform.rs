//! Social platform abstraction.

use async_trait::async_trait;

use crate::error::PlatformResult;
use crate::types::{Comment, Post};

/// Read and write access to the page the story lives on.
///
/// Lookups return `Ok(None)` when the object does not exist (deleted, or
/// never existed); every other failure is an error.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Fetch a post by id.
    async fn fetch_post(&self, id: &str) -> PlatformResult<Option<Post>>;

    /// Fetch a comment by id.
    async fn fetch_comment(&self, id: &str) -> PlatformResult<Option<Comment>>;

    /// List the comments attached to `root_id`, newest first.
    async fn list_comments(&self, root_id: &str) -> PlatformResult<Vec<Comment>>;

    /// Publish a comment under `target_id`.
    async fn publish_comment(&self, target_id: &str, text: &str) -> PlatformResult<()>;

    /// Publish a new post on the page feed.
    async fn publish_post(&self, text: &str) -> PlatformResult<()>;
}

#[async_trait]
impl<T: Platform + ?Sized> Platform for std::sync::Arc<T> {
    async fn fetch_post(&self, id: &str) -> PlatformResult<Option<Post>> {
        (**self).fetch_post(id).await
    }

    async fn fetch_comment(&self, id: &str) -> PlatformResult<Option<Comment>> {
        (**self).fetch_comment(id).await
    }

    async fn list_comments(&self, root_id: &str) -> PlatformResult<Vec<Comment>> {
        (**self).list_comments(root_id).await
    }

    async fn publish_comment(&self, target_id: &str, text: &str) -> PlatformResult<()> {
        (**self).publish_comment(target_id, text).await
    }

    async fn publish_post(&self, text: &str) -> PlatformResult<()> {
        (**self).publish_post(text).await
    }
}
