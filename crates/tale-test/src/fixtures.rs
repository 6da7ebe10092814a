//! Webhook payload builders.

use serde_json::{Value, json};

/// Builds one feed change value.
#[derive(Debug, Clone)]
pub struct ChangeBuilder {
    item: String,
    verb: String,
    post_id: String,
    parent_id: Option<String>,
    comment_id: Option<String>,
    author_id: Option<String>,
    message: String,
}

impl ChangeBuilder {
    /// A new first-level comment on `post_id`.
    #[must_use]
    pub fn root_comment(post_id: &str, comment_id: &str, author: &str, message: &str) -> Self {
        Self {
            item: "comment".to_string(),
            verb: "add".to_string(),
            post_id: post_id.to_string(),
            parent_id: Some(post_id.to_string()),
            comment_id: Some(comment_id.to_string()),
            author_id: Some(author.to_string()),
            message: message.to_string(),
        }
    }

    /// A new reply under `parent_id`.
    #[must_use]
    pub fn reply(
        post_id: &str,
        parent_id: &str,
        comment_id: &str,
        author: &str,
        message: &str,
    ) -> Self {
        Self {
            parent_id: Some(parent_id.to_string()),
            ..Self::root_comment(post_id, comment_id, author, message)
        }
    }

    /// A new status post on the page.
    #[must_use]
    pub fn status(post_id: &str, author: &str, message: &str) -> Self {
        Self {
            item: "status".to_string(),
            verb: "add".to_string(),
            post_id: post_id.to_string(),
            parent_id: None,
            comment_id: None,
            author_id: Some(author.to_string()),
            message: message.to_string(),
        }
    }

    /// Replace the verb.
    #[must_use]
    pub fn verb(mut self, verb: &str) -> Self {
        self.verb = verb.to_string();
        self
    }

    /// Drop the `from` field.
    #[must_use]
    pub fn without_author(mut self) -> Self {
        self.author_id = None;
        self
    }

    /// The change as `{"field": "feed", "value": {...}}`.
    #[must_use]
    pub fn build(&self) -> Value {
        let mut value = json!({
            "item": self.item,
            "verb": self.verb,
            "post_id": self.post_id,
            "message": self.message,
            "created_time": 1_700_000_000,
        });
        if let Some(parent_id) = &self.parent_id {
            value["parent_id"] = json!(parent_id);
        }
        if let Some(comment_id) = &self.comment_id {
            value["comment_id"] = json!(comment_id);
        }
        if let Some(author_id) = &self.author_id {
            value["from"] = json!({ "id": author_id, "name": "Test Player" });
        }
        json!({ "field": "feed", "value": value })
    }
}

/// A page notification with one entry holding `changes`.
#[must_use]
pub fn notification(page_id: &str, changes: &[ChangeBuilder]) -> Value {
    json!({
        "object": "page",
        "entry": [{
            "id": page_id,
            "time": 1_700_000_000,
            "changes": changes.iter().map(ChangeBuilder::build).collect::<Vec<_>>(),
        }],
    })
}

/// [`notification`] serialized to bytes, as delivered on the wire.
///
/// # Panics
///
/// Panics if serialization fails.
#[must_use]
pub fn notification_body(page_id: &str, changes: &[ChangeBuilder]) -> Vec<u8> {
    serde_json::to_vec(&notification(page_id, changes)).expect("serializable notification")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_has_parent_and_author() {
        let change = ChangeBuilder::reply("p", "c1", "c2", "ada", "2").build();
        assert_eq!(change["value"]["parent_id"], "c1");
        assert_eq!(change["value"]["from"]["id"], "ada");
    }

    #[test]
    fn status_has_no_comment_id() {
        let change = ChangeBuilder::status("p", "page", "start").without_author().build();
        assert!(change["value"].get("comment_id").is_none());
        assert!(change["value"].get("from").is_none());
    }

    #[test]
    fn notification_wraps_changes() {
        let body = notification(
            "page",
            &[ChangeBuilder::root_comment("p", "c1", "ada", "1").verb("edited")],
        );
        assert_eq!(body["object"], "page");
        assert_eq!(body["entry"][0]["changes"][0]["value"]["verb"], "edited");
    }
}
