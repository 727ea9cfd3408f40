use crate::{segment, ApiClient, ApiResult};

const SUBSCRIPTIONS: &str = "/api/v1/subscriptions";

#[async_trait::async_trait]
pub trait SubscriptionApi: Send + Sync {
    async fn subscribe(&self, subreddit_name: &str) -> ApiResult<()>;
    async fn unsubscribe(&self, subreddit_name: &str) -> ApiResult<()>;
    /// Names of the subreddits the current user follows.
    async fn list(&self) -> ApiResult<Vec<String>>;
}

pub struct SubscriptionService {
    api: ApiClient,
}

impl SubscriptionService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl SubscriptionApi for SubscriptionService {
    async fn subscribe(&self, subreddit_name: &str) -> ApiResult<()> {
        let req = self
            .api
            .post(&format!("{}/subscribe/{}", SUBSCRIPTIONS, segment(subreddit_name)))
            .json(&serde_json::json!({}));
        self.api.send(req).await?;
        Ok(())
    }

    async fn unsubscribe(&self, subreddit_name: &str) -> ApiResult<()> {
        let req = self
            .api
            .post(&format!("{}/unsubscribe/{}", SUBSCRIPTIONS, segment(subreddit_name)))
            .json(&serde_json::json!({}));
        self.api.send(req).await?;
        Ok(())
    }

    async fn list(&self) -> ApiResult<Vec<String>> {
        let req = self.api.get(SUBSCRIPTIONS);
        self.api.send_json(req).await
    }
}
