use crate::{ApiClient, ApiResult};
use forest_core::VotePayload;

#[async_trait::async_trait]
pub trait VoteApi: Send + Sync {
    async fn vote(&self, payload: &VotePayload) -> ApiResult<()>;
}

pub struct VoteService {
    api: ApiClient,
}

impl VoteService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl VoteApi for VoteService {
    async fn vote(&self, payload: &VotePayload) -> ApiResult<()> {
        let req = self.api.post("/api/v1/votes").json(payload);
        let body = self.api.send_text(req).await?;
        tracing::debug!("Vote accepted for {}: {}", payload.post_id, body);
        Ok(())
    }
}
