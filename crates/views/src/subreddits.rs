use crate::listing::PostActions;
use crate::lock;
use crate::scope::ViewScope;
use crate::ui::{Navigator, Notifier};
use forest_api::{ApiError, ApiResult, PostApi, SubredditApi, SubscriptionApi};
use forest_core::{Post, Subreddit};
use session::SessionStore;
use std::sync::{Arc, Mutex};

/// `/list-subreddits`: 一覧と購読状態
pub struct SubredditList {
    subreddits_api: Arc<dyn SubredditApi>,
    subscriptions_api: Arc<dyn SubscriptionApi>,
    scope: ViewScope,
    subreddits: Mutex<Vec<Subreddit>>,
    subscriptions: Mutex<Vec<String>>,
}

impl SubredditList {
    pub fn new(
        subreddits_api: Arc<dyn SubredditApi>,
        subscriptions_api: Arc<dyn SubscriptionApi>,
    ) -> Self {
        Self {
            subreddits_api,
            subscriptions_api,
            scope: ViewScope::new(),
            subreddits: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn subreddits(&self) -> Vec<Subreddit> {
        lock(&self.subreddits).clone()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        lock(&self.subscriptions).clone()
    }

    pub fn is_subscribed(&self, subreddit_name: &str) -> bool {
        lock(&self.subscriptions).iter().any(|s| s == subreddit_name)
    }

    /// サブレディット一覧と購読一覧を取得する。片方が失敗してももう片方は取りに行き、
    /// 最初のエラーを返す
    pub async fn load(&self) -> ApiResult<()> {
        let subreddits = match self.scope.run(self.subreddits_api.get_all()).await {
            Ok(list) => {
                *lock(&self.subreddits) = list;
                Ok(())
            }
            Err(ApiError::Cancelled) => return Err(ApiError::Cancelled),
            Err(e) => {
                tracing::error!("Error fetching subreddits: {}", e);
                Err(e)
            }
        };
        let subscriptions = self.refresh_subscriptions().await;
        subreddits.and(subscriptions)
    }

    pub async fn refresh_subscriptions(&self) -> ApiResult<()> {
        match self.scope.run(self.subscriptions_api.list()).await {
            Ok(names) => {
                *lock(&self.subscriptions) = names;
                Ok(())
            }
            Err(e) => {
                if !matches!(e, ApiError::Cancelled) {
                    tracing::error!("Error fetching subscriptions: {}", e);
                }
                Err(e)
            }
        }
    }

    /// 購読後はローカルで書き換えず、一覧を取り直す
    pub async fn subscribe(&self, subreddit_name: &str) -> ApiResult<()> {
        self.scope
            .run(self.subscriptions_api.subscribe(subreddit_name))
            .await
            .inspect_err(|e| tracing::error!("Subscribe to {} failed: {}", subreddit_name, e))?;
        self.refresh_subscriptions().await
    }

    pub async fn unsubscribe(&self, subreddit_name: &str) -> ApiResult<()> {
        self.scope
            .run(self.subscriptions_api.unsubscribe(subreddit_name))
            .await
            .inspect_err(|e| tracing::error!("Unsubscribe from {} failed: {}", subreddit_name, e))?;
        self.refresh_subscriptions().await
    }
}

/// `/view-subreddit/:id`: サブレディットとその投稿
pub struct SubredditView {
    subreddits_api: Arc<dyn SubredditApi>,
    actions: PostActions,
    scope: ViewScope,
    subreddit: Mutex<Option<Subreddit>>,
    posts: Mutex<Vec<Post>>,
}

impl SubredditView {
    pub fn new(
        subreddits_api: Arc<dyn SubredditApi>,
        posts: Arc<dyn PostApi>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            subreddits_api,
            actions: PostActions {
                posts,
                session,
                notifier,
                navigator,
            },
            scope: ViewScope::new(),
            subreddit: Mutex::new(None),
            posts: Mutex::new(Vec::new()),
        }
    }

    pub fn subreddit(&self) -> Option<Subreddit> {
        lock(&self.subreddit).clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        lock(&self.posts).clone()
    }

    pub fn current_user(&self) -> Option<String> {
        self.actions.session.username()
    }

    pub async fn open(&self, subreddit_id: &str) {
        let (subreddit, posts) = tokio::join!(
            self.scope.run(self.subreddits_api.get(subreddit_id)),
            self.scope.run(self.actions.posts.by_subreddit(subreddit_id)),
        );

        match subreddit {
            Ok(s) => *lock(&self.subreddit) = Some(s),
            Err(ApiError::Cancelled) => {}
            Err(e) => tracing::error!("Error fetching subreddit {}: {}", subreddit_id, e),
        }
        match posts {
            Ok(list) => *lock(&self.posts) = list,
            Err(ApiError::Cancelled) => {}
            Err(e) => tracing::error!("Error fetching posts for {}: {}", subreddit_id, e),
        }
    }

    /// サーバーが返した状態を該当投稿に反映する
    pub async fn toggle_notifications(&self, post_id: &str, enabled: bool) -> ApiResult<bool> {
        let status = self
            .scope
            .run(self.actions.posts.toggle_notifications(post_id, enabled))
            .await
            .inspect_err(|e| tracing::error!("Error toggling notifications: {}", e))?;

        if let Some(post) = lock(&self.posts).iter_mut().find(|p| p.id == post_id) {
            post.notifications_enabled = status;
        }
        Ok(status)
    }

    pub async fn delete_post(&self, id: &str) -> bool {
        self.actions.delete_from(&self.scope, &self.posts, id).await
    }

    pub fn go_to_post(&self, id: &str) {
        self.actions.read_post(id);
    }

    pub fn edit_post(&self, id: &str) {
        self.actions.edit_post(id);
    }

    pub fn is_author(&self, post: &Post) -> bool {
        self.actions.is_author(post)
    }

    pub fn is_admin(&self) -> bool {
        self.actions.is_admin()
    }
}
