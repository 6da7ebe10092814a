//! In-memory page for testing.
//!
//! [`MockPlatform`] keeps posts and comments in memory and implements
//! [`Platform`]. Anything it publishes becomes a page-authored comment or
//! post, so multi-turn tests can feed the thread back through the relay.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use tale_core::{
    Comment, Platform, PlatformError, PlatformResult, Post, Publication, PublishCommand,
};

/// An in-memory [`Platform`].
pub struct MockPlatform {
    page_id: String,
    posts: Mutex<HashMap<String, Post>>,
    /// Insertion order is chronological order.
    comments: Mutex<Vec<Comment>>,
    published: Mutex<Vec<Publication>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    fail_publish: AtomicBool,
    fail_reads: AtomicBool,
}

impl MockPlatform {
    /// An empty page owned by `page_id`.
    #[must_use]
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            posts: Mutex::default(),
            comments: Mutex::default(),
            published: Mutex::default(),
            calls: Mutex::default(),
            next_id: AtomicUsize::new(1),
            fail_publish: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Add a page-authored post.
    #[must_use]
    pub fn with_post(self, id: &str, message: &str) -> Self {
        self.insert_post(id, message);
        self
    }

    /// Add a comment under `parent_id`.
    #[must_use]
    pub fn with_comment(self, id: &str, parent_id: &str, author: &str, message: &str) -> Self {
        self.add_comment(id, parent_id, Some(author), message);
        self
    }

    /// Page id this mock publishes as.
    #[must_use]
    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Add a page-authored post after construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert_post(&self, id: &str, message: &str) {
        self.posts.lock().expect("lock poisoned").insert(
            id.to_string(),
            Post {
                id: id.to_string(),
                author_id: Some(self.page_id.clone()),
                message: message.to_string(),
            },
        );
    }

    /// Append a comment after construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_comment(&self, id: &str, parent_id: &str, author: Option<&str>, message: &str) {
        self.comments.lock().expect("lock poisoned").push(Comment {
            id: id.to_string(),
            author_id: author.map(ToString::to_string),
            message: message.to_string(),
            parent_id: Some(parent_id.to_string()),
        });
    }

    /// Make every publish call fail with a 500.
    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Make every read call fail with a request error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Everything published so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn published(&self) -> Vec<Publication> {
        self.published.lock().expect("lock poisoned").clone()
    }

    /// Comments published so far, oldest first.
    #[must_use]
    pub fn published_comments(&self) -> Vec<PublishCommand> {
        self.published()
            .into_iter()
            .filter_map(|p| match p {
                Publication::Comment(c) => Some(c),
                Publication::Post { .. } => None,
            })
            .collect()
    }

    /// Every platform call in order, as `method:id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Number of platform calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock poisoned").push(call);
    }

    fn check_reads(&self) -> PlatformResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PlatformError::Request("connection reset".to_string()));
        }
        Ok(())
    }

    fn check_publish(&self) -> PlatformResult<()> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(PlatformError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(())
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}_{n}")
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn fetch_post(&self, id: &str) -> PlatformResult<Option<Post>> {
        self.record(format!("fetch_post:{id}"));
        self.check_reads()?;
        Ok(self.posts.lock().expect("lock poisoned").get(id).cloned())
    }

    async fn fetch_comment(&self, id: &str) -> PlatformResult<Option<Comment>> {
        self.record(format!("fetch_comment:{id}"));
        self.check_reads()?;
        Ok(self
            .comments
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list_comments(&self, root_id: &str) -> PlatformResult<Vec<Comment>> {
        self.record(format!("list_comments:{root_id}"));
        self.check_reads()?;
        Ok(self
            .comments
            .lock()
            .expect("lock poisoned")
            .iter()
            .rev()
            .filter(|c| c.parent_id.as_deref() == Some(root_id))
            .cloned()
            .collect())
    }

    async fn publish_comment(&self, target_id: &str, text: &str) -> PlatformResult<()> {
        self.record(format!("publish_comment:{target_id}"));
        self.check_publish()?;
        let id = self.fresh_id(target_id);
        let page_id = self.page_id.clone();
        self.add_comment(&id, target_id, Some(&page_id), text);
        self.published
            .lock()
            .expect("lock poisoned")
            .push(Publication::Comment(PublishCommand {
                target_id: target_id.to_string(),
                text: text.to_string(),
            }));
        Ok(())
    }

    async fn publish_post(&self, text: &str) -> PlatformResult<()> {
        self.record("publish_post".to_string());
        self.check_publish()?;
        let id = self.fresh_id(&self.page_id);
        self.insert_post(&id, text);
        self.published
            .lock()
            .expect("lock poisoned")
            .push(Publication::Post {
                text: text.to_string(),
            });
        Ok(())
    }
}

impl std::fmt::Debug for MockPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPlatform")
            .field("page_id", &self.page_id)
            .finish_non_exhaustive()
    }
}
