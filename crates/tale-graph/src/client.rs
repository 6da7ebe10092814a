//! Graph API REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tale_core::{Comment, Platform, PlatformResult, Post};
use tracing::{debug, error, warn};
use url::Url;

use crate::error::{GraphError, GraphResult};
use crate::model::{GraphErrorBody, GraphList, GraphObject};

/// Default Graph API host.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";

/// Default Graph API version.
pub const DEFAULT_API_VERSION: &str = "v18.0";

/// Graph error code for objects that do not exist or cannot be read.
const NONEXISTENT_OBJECT_CODE: i64 = 100;

/// Comments requested per listing page.
const COMMENTS_PAGE_LIMIT: &str = "100";

/// Upper bound on listing pages followed for one thread.
const MAX_COMMENT_PAGES: usize = 50;

/// Graph client settings.
#[derive(Clone)]
pub struct GraphConfig {
    /// API host, without version.
    pub graph_url: String,
    /// API version segment (`v18.0`). Empty for unversioned calls.
    pub api_version: String,
    /// Page access token.
    pub access_token: String,
    /// Page id; new posts go to its feed.
    pub page_id: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl GraphConfig {
    /// Settings for `page_id` using `access_token` and default endpoints.
    pub fn new(page_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: access_token.into(),
            page_id: page_id.into(),
            timeout_secs: 30,
        }
    }

    /// Override the API host.
    #[must_use]
    pub fn graph_url(mut self, url: impl Into<String>) -> Self {
        self.graph_url = url.into();
        self
    }

    /// Override the API version.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl std::fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphConfig")
            .field("graph_url", &self.graph_url)
            .field("api_version", &self.api_version)
            .field("has_access_token", &!self.access_token.is_empty())
            .field("page_id", &self.page_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// [`Platform`] implementation over the Graph API.
pub struct GraphClient {
    client: Client,
    base: Url,
    access_token: String,
    page_id: String,
}

impl GraphClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Fails if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &GraphConfig) -> GraphResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut base = Url::parse(config.graph_url.trim_end_matches('/'))?;
        if !config.api_version.is_empty() {
            base.path_segments_mut()
                .map_err(|()| GraphError::Decode("graph_url cannot be a base".to_string()))?
                .pop_if_empty()
                .push(&config.api_version);
        }

        Ok(Self {
            client,
            base,
            access_token: config.access_token.clone(),
            page_id: config.page_id.clone(),
        })
    }

    /// URL of `{base}/{id}[/{edge}]` with the access token and query pairs.
    pub(crate) fn url(&self, id: &str, edge: Option<&str>, query: &[(&str, &str)]) -> GraphResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| GraphError::Decode("graph_url cannot be a base".to_string()))?;
            segments.pop_if_empty().push(id);
            if let Some(edge) = edge {
                segments.push(edge);
            }
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("access_token", &self.access_token);
        }
        Ok(url)
    }

    async fn get_object<T: DeserializeOwned>(&self, url: Url) -> GraphResult<Option<T>> {
        let response = self.client.get(url).send().await?;
        let response = match missing_as_none(check(response).await)? {
            Some(response) => response,
            None => return Ok(None),
        };
        decode(response).await.map(Some)
    }

    async fn post_message(&self, url: Url, text: &str) -> GraphResult<()> {
        let response = self
            .client
            .post(url)
            .form(&[("message", text)])
            .send()
            .await?;
        check(response).await.map(|_| ())
    }
}

/// Map "no such object" API errors to `Ok(None)`.
pub(crate) fn missing_as_none<T>(result: GraphResult<T>) -> GraphResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(GraphError::Api { status, code, .. })
            if status == StatusCode::NOT_FOUND.as_u16() || code == NONEXISTENT_OBJECT_CODE =>
        {
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

/// Turn a non-success response into [`GraphError::Api`].
async fn check(response: Response) -> GraphResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}

pub(crate) fn api_error(status: u16, body: &str) -> GraphError {
    match serde_json::from_str::<GraphErrorBody>(body) {
        Ok(parsed) => GraphError::Api {
            status,
            code: parsed.error.code,
            message: parsed.error.message,
        },
        Err(_) => GraphError::Api {
            status,
            code: 0,
            message: body.to_string(),
        },
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> GraphResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| GraphError::Decode(e.to_string()))
}

#[async_trait]
impl Platform for GraphClient {
    async fn fetch_post(&self, id: &str) -> PlatformResult<Option<Post>> {
        debug!(id, "Fetching post");
        let url = self.url(id, None, &[("fields", "from,message")])?;
        let post = self.get_object::<GraphObject>(url).await?;
        Ok(post.map(Post::from))
    }

    async fn fetch_comment(&self, id: &str) -> PlatformResult<Option<Comment>> {
        debug!(id, "Fetching comment");
        let url = self.url(id, None, &[("fields", "from,message,parent")])?;
        let comment = self.get_object::<GraphObject>(url).await?;
        Ok(comment.map(Comment::from))
    }

    async fn list_comments(&self, root_id: &str) -> PlatformResult<Vec<Comment>> {
        debug!(root_id, "Listing comments");
        let mut url = self.url(
            root_id,
            Some("comments"),
            &[
                ("fields", "from,message,parent"),
                ("order", "reverse_chronological"),
                ("limit", COMMENTS_PAGE_LIMIT),
            ],
        )?;

        // Pages arrive newest first, so appending keeps the whole list newest first.
        let mut comments = Vec::new();
        for page in 1..=MAX_COMMENT_PAGES {
            let Some(list) = self.get_object::<GraphList>(url).await? else {
                break;
            };
            let next = list.next_page().map(Url::parse).transpose().map_err(GraphError::from)?;
            comments.extend(list.data.into_iter().map(Comment::from));
            match next {
                Some(next) if page < MAX_COMMENT_PAGES => url = next,
                Some(_) => {
                    warn!(root_id, pages = page, "Comment listing truncated");
                    break;
                },
                None => break,
            }
        }
        Ok(comments)
    }

    async fn publish_comment(&self, target_id: &str, text: &str) -> PlatformResult<()> {
        let url = self.url(target_id, Some("comments"), &[])?;
        self.post_message(url, text).await.map_err(|e| {
            error!(target_id, error = %e, "Failed to publish comment");
            e.into()
        })
    }

    async fn publish_post(&self, text: &str) -> PlatformResult<()> {
        let url = self.url(&self.page_id, Some("feed"), &[])?;
        self.post_message(url, text).await.map_err(|e| {
            error!(page_id = %self.page_id, error = %e, "Failed to publish post");
            e.into()
        })
    }
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base", &self.base.as_str())
            .field("page_id", &self.page_id)
            .field("has_access_token", &!self.access_token.is_empty())
            .finish_non_exhaustive()
    }
}
