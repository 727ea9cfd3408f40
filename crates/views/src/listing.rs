//! 投稿一覧（マイフィード・トレンド・ユーザー別・全件）

use crate::scope::ViewScope;
use crate::ui::{Navigator, Notifier};
use crate::{lock, message_or};
use forest_api::{ApiError, ApiResult, FeedApi, PostApi};
use forest_core::Post;
use session::SessionStore;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource {
    MyFeed,
    Trending,
    User(String),
    All,
}

/// 一覧系画面で共通の、作者判定と削除後の除去
pub(crate) struct PostActions {
    pub posts: Arc<dyn PostApi>,
    pub session: Arc<SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl PostActions {
    pub fn is_author(&self, post: &Post) -> bool {
        self.session.username().as_deref() == Some(post.author_name.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn read_post(&self, id: &str) {
        self.navigator.navigate_by_url(&format!("/view-post/{}", id));
    }

    pub fn edit_post(&self, id: &str) {
        self.navigator.navigate_by_url(&format!("/edit-post/{}", id));
    }

    /// Deletes on the server and, only once it answers, drops the post from `list`.
    pub async fn delete_from(&self, scope: &ViewScope, list: &Mutex<Vec<Post>>, id: &str) -> bool {
        match scope.run(self.posts.delete(id)).await {
            Ok(()) => {
                lock(list).retain(|p| p.id != id);
                true
            }
            Err(ApiError::Cancelled) => false,
            Err(e) => {
                tracing::error!("Failed to delete post {}: {}", id, e);
                self.notifier
                    .error(&message_or(&e, "Failed to delete post. Please try again."));
                false
            }
        }
    }
}

pub struct PostListing {
    source: ListingSource,
    feed: Arc<dyn FeedApi>,
    actions: PostActions,
    scope: ViewScope,
    posts: Mutex<Vec<Post>>,
    is_loading: Mutex<bool>,
}

impl PostListing {
    pub fn new(
        source: ListingSource,
        feed: Arc<dyn FeedApi>,
        posts: Arc<dyn PostApi>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            source,
            feed,
            actions: PostActions {
                posts,
                session,
                notifier,
                navigator,
            },
            scope: ViewScope::new(),
            posts: Mutex::new(Vec::new()),
            is_loading: Mutex::new(false),
        }
    }

    pub fn source(&self) -> &ListingSource {
        &self.source
    }

    pub fn posts(&self) -> Vec<Post> {
        lock(&self.posts).clone()
    }

    pub fn is_loading(&self) -> bool {
        *lock(&self.is_loading)
    }

    /// 取得結果で一覧を置き換える。失敗時はログのみで一覧はそのまま
    pub async fn load(&self) -> ApiResult<()> {
        *lock(&self.is_loading) = true;
        let res = self.scope.run(self.fetch()).await;
        *lock(&self.is_loading) = false;

        match res {
            Ok(posts) => {
                *lock(&self.posts) = posts;
                Ok(())
            }
            Err(e) => {
                if !matches!(e, ApiError::Cancelled) {
                    tracing::error!("Error fetching {:?} posts: {}", self.source, e);
                }
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> ApiResult<Vec<Post>> {
        match &self.source {
            ListingSource::MyFeed => self.feed.my_feed().await,
            ListingSource::Trending => self.feed.trending().await,
            ListingSource::User(name) => self.actions.posts.by_user(name).await,
            ListingSource::All => self.actions.posts.get_all().await,
        }
    }

    pub async fn delete_post(&self, id: &str) -> bool {
        self.actions.delete_from(&self.scope, &self.posts, id).await
    }

    pub fn is_author(&self, post: &Post) -> bool {
        self.actions.is_author(post)
    }

    pub fn is_admin(&self) -> bool {
        self.actions.is_admin()
    }

    pub fn read_post(&self, id: &str) {
        self.actions.read_post(id);
    }

    pub fn edit_post(&self, id: &str) {
        self.actions.edit_post(id);
    }
}
