use crate::{ApiClient, ApiResult};
use forest_core::Post;

#[async_trait::async_trait]
pub trait FeedApi: Send + Sync {
    /// Personalised feed of the logged-in user.
    async fn my_feed(&self) -> ApiResult<Vec<Post>>;
    async fn trending(&self) -> ApiResult<Vec<Post>>;
}

pub struct FeedService {
    api: ApiClient,
}

impl FeedService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl FeedApi for FeedService {
    async fn my_feed(&self) -> ApiResult<Vec<Post>> {
        let req = self.api.get("/api/v1/feed");
        self.api.send_json(req).await
    }

    async fn trending(&self) -> ApiResult<Vec<Post>> {
        let req = self.api.get("/api/v1/trending");
        self.api.send_json(req).await
    }
}
