//! Page webhook payloads.
//!
//! Every field is optional on the wire; required fields are checked when a
//! [`ChangeValue`] is converted into an [`IncomingEvent`](crate::IncomingEvent).
//! Change values are decoded one at a time so a malformed change cannot take
//! its siblings down with it.

use serde::Deserialize;

use crate::error::ValidationFailure;

/// Top-level notification body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notification {
    /// Subscription object, `"page"` for page webhooks.
    #[serde(default)]
    pub object: Option<String>,
    /// Batched entries.
    #[serde(default)]
    pub entry: Vec<Entry>,
}

impl Notification {
    /// Whether this notification is about a page.
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.object.as_deref() == Some("page")
    }
}

/// One entry in a notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    /// Page id.
    #[serde(default)]
    pub id: Option<String>,
    /// Field changes.
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// One field change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Change {
    /// Subscribed field, usually `"feed"`.
    #[serde(default)]
    pub field: Option<String>,
    /// Change payload, decoded lazily by [`Change::decode_value`].
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl Change {
    /// Decode the payload of this change.
    ///
    /// # Errors
    ///
    /// [`ValidationFailure::MissingValue`] when there is no payload and
    /// [`ValidationFailure::Undecodable`] when it does not have the shape of
    /// a feed change.
    pub fn decode_value(self) -> Result<ChangeValue, ValidationFailure> {
        let value = self.value.ok_or(ValidationFailure::MissingValue)?;
        serde_json::from_value(value).map_err(|e| ValidationFailure::Undecodable(e.to_string()))
    }
}

/// Payload of a feed change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    /// `comment`, `status`, `post`, ...
    #[serde(default)]
    pub item: Option<String>,
    /// `add`, `edited`, `remove`, ...
    #[serde(default)]
    pub verb: Option<String>,
    /// Root post id.
    #[serde(default)]
    pub post_id: Option<String>,
    /// Parent object id.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Comment id.
    #[serde(default)]
    pub comment_id: Option<String>,
    /// Text.
    #[serde(default)]
    pub message: Option<String>,
    /// Author.
    #[serde(default)]
    pub from: Option<Sender>,
}

/// Author of a change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sender {
    /// Account id.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_comment_notification() {
        let body = r#"{
            "object": "page",
            "entry": [{
                "id": "page_1",
                "time": 1700000000,
                "changes": [{
                    "field": "feed",
                    "value": {
                        "item": "comment",
                        "verb": "add",
                        "post_id": "page_1_post",
                        "parent_id": "page_1_post",
                        "comment_id": "page_1_c1",
                        "message": "2",
                        "created_time": 1700000000,
                        "from": {"id": "user_9", "name": "Ada"}
                    }
                }]
            }]
        }"#;

        let notification: Notification = serde_json::from_str(body).unwrap();
        assert!(notification.is_page());
        let change = notification.entry[0].changes[0].clone();
        let value = change.decode_value().unwrap();
        assert_eq!(value.item.as_deref(), Some("comment"));
        assert_eq!(value.from.unwrap().id.as_deref(), Some("user_9"));
    }

    #[test]
    fn sender_without_id_still_decodes() {
        let change: Change = serde_json::from_str(
            r#"{"value": {"item": "comment", "verb": "add", "from": {"name": "x"}}}"#,
        )
        .unwrap();
        let value = change.decode_value().unwrap();
        assert!(value.from.unwrap().id.is_none());
    }

    #[test]
    fn mistyped_value_is_a_validation_failure() {
        let change: Change =
            serde_json::from_str(r#"{"value": {"item": "comment", "message": 42}}"#).unwrap();
        assert!(matches!(
            change.decode_value(),
            Err(ValidationFailure::Undecodable(_))
        ));
    }

    #[test]
    fn tolerates_sparse_payload() {
        let notification: Notification =
            serde_json::from_str(r#"{"entry": [{"changes": [{}]}]}"#).unwrap();
        assert!(!notification.is_page());
        assert_eq!(
            notification.entry[0].changes[0].clone().decode_value().unwrap_err(),
            ValidationFailure::MissingValue
        );
    }
}
