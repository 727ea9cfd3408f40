pub mod auth;
pub mod chat;
pub mod error;
pub mod feed;
pub mod media;
pub mod posts;
pub mod subreddits;
pub mod subscriptions;
pub mod votes;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use session::SessionStore;
use std::sync::Arc;

pub use auth::{AuthApi, AuthGateway};
pub use chat::{ChatApi, ChatService};
pub use error::ApiError;
pub use feed::{FeedApi, FeedService};
pub use media::MediaService;
pub use posts::{PostApi, PostService};
pub use subreddits::{SubredditApi, SubredditService};
pub use subscriptions::{SubscriptionApi, SubscriptionService};
pub use votes::{VoteApi, VoteService};

pub type ApiResult<T> = Result<T, ApiError>;

/// Shared HTTP plumbing. Every request built here carries the current
/// access token, if there is one; nothing is retried automatically.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(http: Client, base_url: &str, session: Arc<SessionStore>) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.session.access_token() {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.request(Method::PUT, path)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    pub async fn send(&self, req: RequestBuilder) -> ApiResult<Response> {
        let res = req.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        tracing::debug!("Request failed: {} - {}", status, body);
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    pub async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let res = self.send(req).await?;
        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn send_text(&self, req: RequestBuilder) -> ApiResult<String> {
        let res = self.send(req).await?;
        Ok(res.text().await?)
    }
}

/// Prepends a scheme when missing and drops trailing slashes.
pub fn normalize_base_url(url: &str) -> String {
    let mut host = url.trim().to_string();
    if !host.starts_with("http://") && !host.starts_with("https://") {
        host = format!("http://{}", host);
    }
    while host.ends_with('/') {
        host.pop();
    }
    host
}

/// Percent-encodes a user supplied path segment.
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
