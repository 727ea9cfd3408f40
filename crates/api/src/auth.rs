use crate::{ApiClient, ApiError, ApiResult};
use forest_core::{
    AuthenticationResponse, LoginRequest, LogoutRequest, RefreshTokenRequest, Session,
    SignupRequest,
};
use reqwest::header::CONTENT_TYPE;
use tokio::sync::Mutex;

#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    async fn signup(&self, req: &SignupRequest) -> ApiResult<String>;
    /// On success the session is persisted and broadcast.
    async fn login(&self, req: &LoginRequest) -> ApiResult<()>;
    async fn refresh(&self) -> ApiResult<()>;
    /// Never fails: backend errors are logged and the local session is cleared anyway.
    async fn logout(&self);
    async fn forgot_password(&self, email: &str) -> ApiResult<String>;
    async fn reset_password(&self, token: &str, new_password: &str) -> ApiResult<String>;
    async fn save_interests(&self, interests: &[String]) -> ApiResult<String>;
}

pub struct AuthGateway {
    api: ApiClient,
    refresh_lock: Mutex<()>,
}

impl AuthGateway {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            refresh_lock: Mutex::new(()),
        }
    }
}

#[async_trait::async_trait]
impl AuthApi for AuthGateway {
    async fn signup(&self, req: &SignupRequest) -> ApiResult<String> {
        let builder = self.api.post("/api/v1/auth/register").json(req);
        self.api.send_text(builder).await
    }

    async fn login(&self, req: &LoginRequest) -> ApiResult<()> {
        let builder = self.api.post("/api/v1/auth/login").json(req);
        let res: AuthenticationResponse = self.api.send_json(builder).await?;

        let username = res.username.clone();
        self.api
            .session()
            .establish(Session::from(res))
            .await
            .map_err(ApiError::storage)?;

        tracing::info!("Logged in as {}", username);
        Ok(())
    }

    async fn refresh(&self) -> ApiResult<()> {
        // 待っている間に別の呼び出しが更新を終えていたら、それを共有する
        let observed = self.api.session().access_token();
        let _guard = self.refresh_lock.lock().await;

        let session = self
            .api
            .session()
            .session()
            .ok_or(ApiError::NotAuthenticated)?;
        if observed.as_deref() != Some(session.access_token.as_str()) {
            tracing::debug!("Access token was refreshed by a concurrent caller");
            return Ok(());
        }

        let body = RefreshTokenRequest {
            refresh_token: session.refresh_token,
            username: session.username,
        };
        let builder = self.api.post("/api/v1/auth/refresh/token").json(&body);
        let res: AuthenticationResponse = self.api.send_json(builder).await?;

        self.api
            .session()
            .replace_access_token(&res.authentication_token, res.expires_at)
            .await
            .map_err(ApiError::storage)?;

        tracing::info!("Access token refreshed (expires at {})", res.expires_at);
        Ok(())
    }

    async fn logout(&self) {
        if let Some(refresh_token) = self.api.session().refresh_token() {
            let builder = self
                .api
                .post("/api/v1/auth/logout")
                .json(&LogoutRequest { refresh_token });
            match self.api.send_text(builder).await {
                Ok(body) => tracing::info!("Backend logout: {}", body),
                Err(e) => tracing::warn!("Logout failed on the backend: {}", e),
            }
        }

        if let Err(e) = self.api.session().clear().await {
            tracing::error!("Failed to clear stored session: {:#}", e);
        }
    }

    async fn forgot_password(&self, email: &str) -> ApiResult<String> {
        let builder = self
            .api
            .post("/api/v1/auth/forgot-password")
            .header(CONTENT_TYPE, "text/plain")
            .body(email.to_string());
        self.api.send_text(builder).await
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> ApiResult<String> {
        let builder = self
            .api
            .post("/api/v1/auth/reset-password")
            .query(&[("token", token)])
            .header(CONTENT_TYPE, "text/plain")
            .body(new_password.to_string());
        self.api.send_text(builder).await
    }

    async fn save_interests(&self, interests: &[String]) -> ApiResult<String> {
        let builder = self.api.post("/api/v1/auth/interests").json(interests);
        self.api.send_text(builder).await
    }
}
