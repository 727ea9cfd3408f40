//! テスト用のモックと記録係

use crate::ui::{Navigator, Notifier, Toast, ToastKind};
use chrono::{TimeZone, Utc};
use forest_api::{
    ApiResult, AuthApi, ChatApi, FeedApi, PostApi, SubredditApi, SubscriptionApi, VoteApi,
};
use forest_core::{
    LoginRequest, Post, PostRequest, RagQueryResponse, Session, SignupRequest, Subreddit,
    VotePayload,
};
use mockall::mock;
use session::{MemoryStore, SessionStore};
use std::sync::{Arc, Mutex};

mock! {
    pub Posts {}
    #[async_trait::async_trait]
    impl PostApi for Posts {
        async fn get_all(&self) -> ApiResult<Vec<Post>>;
        async fn create(&self, req: &PostRequest) -> ApiResult<Post>;
        async fn get(&self, id: &str) -> ApiResult<Post>;
        async fn by_user(&self, username: &str) -> ApiResult<Vec<Post>>;
        async fn by_subreddit(&self, subreddit_id: &str) -> ApiResult<Vec<Post>>;
        async fn search(&self, query: &str) -> ApiResult<Vec<Post>>;
        async fn delete(&self, id: &str) -> ApiResult<()>;
        async fn update(&self, post: &Post) -> ApiResult<Post>;
        async fn toggle_notifications(&self, id: &str, enabled: bool) -> ApiResult<bool>;
    }
}

mock! {
    pub Votes {}
    #[async_trait::async_trait]
    impl VoteApi for Votes {
        async fn vote(&self, payload: &VotePayload) -> ApiResult<()>;
    }
}

mock! {
    pub Chat {}
    #[async_trait::async_trait]
    impl ChatApi for Chat {
        async fn ask(&self, question: &str) -> ApiResult<RagQueryResponse>;
    }
}

mock! {
    pub Feed {}
    #[async_trait::async_trait]
    impl FeedApi for Feed {
        async fn my_feed(&self) -> ApiResult<Vec<Post>>;
        async fn trending(&self) -> ApiResult<Vec<Post>>;
    }
}

mock! {
    pub Subreddits {}
    #[async_trait::async_trait]
    impl SubredditApi for Subreddits {
        async fn get_all(&self) -> ApiResult<Vec<Subreddit>>;
        async fn get(&self, id: &str) -> ApiResult<Subreddit>;
        async fn create(&self, subreddit: &Subreddit) -> ApiResult<Subreddit>;
    }
}

mock! {
    pub Subscriptions {}
    #[async_trait::async_trait]
    impl SubscriptionApi for Subscriptions {
        async fn subscribe(&self, subreddit_name: &str) -> ApiResult<()>;
        async fn unsubscribe(&self, subreddit_name: &str) -> ApiResult<()>;
        async fn list(&self) -> ApiResult<Vec<String>>;
    }
}

mock! {
    pub Auth {}
    #[async_trait::async_trait]
    impl AuthApi for Auth {
        async fn signup(&self, req: &SignupRequest) -> ApiResult<String>;
        async fn login(&self, req: &LoginRequest) -> ApiResult<()>;
        async fn refresh(&self) -> ApiResult<()>;
        async fn logout(&self);
        async fn forgot_password(&self, email: &str) -> ApiResult<String>;
        async fn reset_password(&self, token: &str, new_password: &str) -> ApiResult<String>;
        async fn save_interests(&self, interests: &[String]) -> ApiResult<String>;
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn messages(&self, kind: ToastKind) -> Vec<String> {
        self.toasts()
            .into_iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    urls: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_by_url(&self, url: &str) {
        self.urls.lock().unwrap().push(url.to_string());
    }
}

pub fn logged_out() -> Arc<SessionStore> {
    Arc::new(SessionStore::empty(Arc::new(MemoryStore::new())))
}

pub async fn logged_in(username: &str) -> Arc<SessionStore> {
    let session = logged_out();
    session
        .establish(Session {
            access_token: format!("token-{}", username),
            username: username.to_string(),
            refresh_token: format!("refresh-{}", username),
            expires_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        })
        .await
        .unwrap();
    session
}

pub fn post(id: &str, author: &str) -> Post {
    Post {
        id: id.to_string(),
        title: format!("Post {}", id),
        author_name: author.to_string(),
        subreddit_name: "rust".to_string(),
        ..Default::default()
    }
}
