use crate::{segment, ApiClient, ApiResult};
use forest_core::{Post, PostRequest};

const POSTS: &str = "/api/v1/mongo/posts";

#[async_trait::async_trait]
pub trait PostApi: Send + Sync {
    async fn get_all(&self) -> ApiResult<Vec<Post>>;
    async fn create(&self, req: &PostRequest) -> ApiResult<Post>;
    async fn get(&self, id: &str) -> ApiResult<Post>;
    async fn by_user(&self, username: &str) -> ApiResult<Vec<Post>>;
    async fn by_subreddit(&self, subreddit_id: &str) -> ApiResult<Vec<Post>>;
    async fn search(&self, query: &str) -> ApiResult<Vec<Post>>;
    async fn delete(&self, id: &str) -> ApiResult<()>;
    async fn update(&self, post: &Post) -> ApiResult<Post>;
    /// Returns the status the server settled on.
    async fn toggle_notifications(&self, id: &str, enabled: bool) -> ApiResult<bool>;
}

pub struct PostService {
    api: ApiClient,
}

impl PostService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl PostApi for PostService {
    async fn get_all(&self) -> ApiResult<Vec<Post>> {
        let req = self.api.get(&format!("{}/", POSTS));
        self.api.send_json(req).await
    }

    async fn create(&self, req: &PostRequest) -> ApiResult<Post> {
        let builder = self.api.post(&format!("{}/", POSTS)).json(req);
        self.api.send_json(builder).await
    }

    async fn get(&self, id: &str) -> ApiResult<Post> {
        let req = self.api.get(&format!("{}/{}", POSTS, segment(id)));
        self.api.send_json(req).await
    }

    async fn by_user(&self, username: &str) -> ApiResult<Vec<Post>> {
        let req = self.api.get(&format!("{}/user/{}", POSTS, segment(username)));
        self.api.send_json(req).await
    }

    async fn by_subreddit(&self, subreddit_id: &str) -> ApiResult<Vec<Post>> {
        let req = self
            .api
            .get(&format!("{}/subreddit-id/{}", POSTS, segment(subreddit_id)));
        self.api.send_json(req).await
    }

    async fn search(&self, query: &str) -> ApiResult<Vec<Post>> {
        let req = self
            .api
            .get(&format!("{}/search", POSTS))
            .query(&[("query", query)]);
        self.api.send_json(req).await
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        let req = self.api.delete(&format!("{}/{}", POSTS, segment(id)));
        self.api.send(req).await?;
        Ok(())
    }

    async fn update(&self, post: &Post) -> ApiResult<Post> {
        let builder = self
            .api
            .put(&format!("{}/", POSTS))
            .json(&PostRequest::from_post(post));
        self.api.send_json(builder).await
    }

    async fn toggle_notifications(&self, id: &str, enabled: bool) -> ApiResult<bool> {
        let builder = self
            .api
            .put(&format!("{}/toggle-notifications/{}", POSTS, segment(id)))
            .json(&enabled);
        self.api.send_json(builder).await
    }
}
