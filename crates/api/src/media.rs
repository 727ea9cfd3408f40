//! 写真・動画のアップロード（multipart/form-data）

use crate::{ApiClient, ApiResult};
use forest_core::UploadResponse;
use reqwest::multipart::{Form, Part};
use std::path::Path;

pub struct MediaService {
    api: ApiClient,
}

impl MediaService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `title` + `image` フィールドで送信する
    pub async fn upload_photo(&self, title: &str, path: &Path) -> ApiResult<UploadResponse> {
        let form = Form::new()
            .text("title", title.to_string())
            .part("image", file_part(path).await?);
        let req = self.api.post("/api/v1/photos").multipart(form);
        let res: UploadResponse = self.api.send_json(req).await?;
        tracing::info!("Uploaded photo {} -> {}", res.id, res.url);
        Ok(res)
    }

    /// `title` + `file` フィールドで送信する
    pub async fn upload_video(&self, title: &str, path: &Path) -> ApiResult<UploadResponse> {
        let form = Form::new()
            .text("title", title.to_string())
            .part("file", file_part(path).await?);
        let req = self.api.post("/api/v1/videos/add").multipart(form);
        let res: UploadResponse = self.api.send_json(req).await?;
        tracing::info!("Uploaded video {} -> {}", res.id, res.url);
        Ok(res)
    }
}

async fn file_part(path: &Path) -> ApiResult<Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Part::bytes(bytes).file_name(file_name))
}
