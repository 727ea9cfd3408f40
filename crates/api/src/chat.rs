use crate::{ApiClient, ApiResult};
use forest_core::{ChatRequest, RagQueryResponse};

#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    async fn ask(&self, question: &str) -> ApiResult<RagQueryResponse>;
}

/// Client of the backend's RAG question-answering endpoint.
pub struct ChatService {
    api: ApiClient,
}

impl ChatService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl ChatApi for ChatService {
    async fn ask(&self, question: &str) -> ApiResult<RagQueryResponse> {
        let req = self.api.post("/api/chat/ask").json(&ChatRequest {
            question: question.to_string(),
        });
        self.api.send_json(req).await
    }
}
