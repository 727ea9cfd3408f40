use crate::{segment, ApiClient, ApiResult};
use forest_core::Subreddit;

const SUBREDDITS: &str = "/api/v1/subreddit";

#[async_trait::async_trait]
pub trait SubredditApi: Send + Sync {
    async fn get_all(&self) -> ApiResult<Vec<Subreddit>>;
    async fn get(&self, id: &str) -> ApiResult<Subreddit>;
    async fn create(&self, subreddit: &Subreddit) -> ApiResult<Subreddit>;
}

pub struct SubredditService {
    api: ApiClient,
}

impl SubredditService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl SubredditApi for SubredditService {
    async fn get_all(&self) -> ApiResult<Vec<Subreddit>> {
        let req = self.api.get(SUBREDDITS);
        self.api.send_json(req).await
    }

    async fn get(&self, id: &str) -> ApiResult<Subreddit> {
        let req = self.api.get(&format!("{}/{}", SUBREDDITS, segment(id)));
        self.api.send_json(req).await
    }

    async fn create(&self, subreddit: &Subreddit) -> ApiResult<Subreddit> {
        let req = self.api.post(SUBREDDITS).json(subreddit);
        self.api.send_json(req).await
    }
}
