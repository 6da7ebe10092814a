//! Graph API response bodies.

use serde::Deserialize;
use tale_core::{Comment, Post};

#[derive(Debug, Deserialize)]
pub(crate) struct GraphAuthor {
    pub(crate) id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphParent {
    pub(crate) id: String,
}

/// A post or comment object.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphObject {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) from: Option<GraphAuthor>,
    #[serde(default)]
    pub(crate) parent: Option<GraphParent>,
}

impl From<GraphObject> for Post {
    fn from(o: GraphObject) -> Self {
        Self {
            id: o.id,
            author_id: o.from.map(|f| f.id),
            message: o.message.unwrap_or_default(),
        }
    }
}

impl From<GraphObject> for Comment {
    fn from(o: GraphObject) -> Self {
        Self {
            id: o.id,
            author_id: o.from.map(|f| f.id),
            message: o.message.unwrap_or_default(),
            parent_id: o.parent.map(|p| p.id),
        }
    }
}

/// A page of an edge listing.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphList {
    #[serde(default)]
    pub(crate) data: Vec<GraphObject>,
    #[serde(default)]
    pub(crate) paging: Option<GraphPaging>,
}

impl GraphList {
    /// URL of the following page, if any.
    pub(crate) fn next_page(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_deref())
            .filter(|next| !next.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphPaging {
    #[serde(default)]
    pub(crate) next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorBody {
    pub(crate) error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorDetail {
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) code: i64,
}
