//! In-crate fakes for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{PlatformError, PlatformResult, StoryError, StoryResult};
use crate::platform::Platform;
use crate::storyteller::Storyteller;
use crate::types::{Comment, Post, StoryMessage};

#[derive(Default)]
pub(crate) struct StubPlatform {
    pub(crate) posts: HashMap<String, Post>,
    pub(crate) comments: HashMap<String, Comment>,
    pub(crate) threads: HashMap<String, Vec<Comment>>,
    pub(crate) fail_publish: bool,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) published: Mutex<Vec<(Option<String>, String)>>,
}

impl StubPlatform {
    pub(crate) fn with_post(mut self, id: &str, message: &str) -> Self {
        self.posts.insert(
            id.to_string(),
            Post {
                id: id.to_string(),
                author_id: Some("page".to_string()),
                message: message.to_string(),
            },
        );
        self
    }

    pub(crate) fn with_comment(mut self, id: &str, author: &str, message: &str) -> Self {
        self.comments
            .insert(id.to_string(), comment(id, Some(author), message));
        self
    }

    pub(crate) fn with_thread(mut self, root_id: &str, newest_first: Vec<Comment>) -> Self {
        self.threads.insert(root_id.to_string(), newest_first);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn published(&self) -> Vec<(Option<String>, String)> {
        self.published.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub(crate) fn comment(id: &str, author: Option<&str>, message: &str) -> Comment {
    Comment {
        id: id.to_string(),
        author_id: author.map(ToString::to_string),
        message: message.to_string(),
        parent_id: None,
    }
}

#[async_trait]
impl Platform for StubPlatform {
    async fn fetch_post(&self, id: &str) -> PlatformResult<Option<Post>> {
        self.record(format!("fetch_post:{id}"));
        Ok(self.posts.get(id).cloned())
    }

    async fn fetch_comment(&self, id: &str) -> PlatformResult<Option<Comment>> {
        self.record(format!("fetch_comment:{id}"));
        Ok(self.comments.get(id).cloned())
    }

    async fn list_comments(&self, root_id: &str) -> PlatformResult<Vec<Comment>> {
        self.record(format!("list_comments:{root_id}"));
        Ok(self.threads.get(root_id).cloned().unwrap_or_default())
    }

    async fn publish_comment(&self, target_id: &str, text: &str) -> PlatformResult<()> {
        self.record(format!("publish_comment:{target_id}"));
        if self.fail_publish {
            return Err(PlatformError::Status {
                status: 500,
                body: "down".to_string(),
            });
        }
        self.published
            .lock()
            .unwrap()
            .push((Some(target_id.to_string()), text.to_string()));
        Ok(())
    }

    async fn publish_post(&self, text: &str) -> PlatformResult<()> {
        self.record("publish_post".to_string());
        self.published.lock().unwrap().push((None, text.to_string()));
        Ok(())
    }
}

/// Returns a fixed completion (or fails) and records every transcript.
#[derive(Default)]
pub(crate) struct FixedStoryteller {
    pub(crate) reply: Option<String>,
    pub(crate) seen: Mutex<Vec<Vec<StoryMessage>>>,
}

impl FixedStoryteller {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            seen: Mutex::default(),
        }
    }

    pub(crate) fn seen(&self) -> Vec<Vec<StoryMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storyteller for FixedStoryteller {
    async fn complete_story(&self, transcript: &[StoryMessage]) -> StoryResult<String> {
        self.seen.lock().unwrap().push(transcript.to_vec());
        self.reply.clone().ok_or_else(|| {
            StoryError::Completion(tale_llm::LlmError::ApiRequestFailed(
                "offline".to_string(),
            ))
        })
    }
}
