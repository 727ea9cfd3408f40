use crate::listing::PostActions;
use crate::lock;
use crate::scope::ViewScope;
use crate::ui::{Navigator, Notifier};
use forest_api::{ApiError, PostApi};
use forest_core::Post;
use session::SessionStore;
use std::sync::{Arc, Mutex};

struct SearchState {
    query: String,
    is_loading: bool,
    has_searched: bool,
}

/// `/search-results/:query` の検索結果
pub struct SearchResults {
    actions: PostActions,
    scope: ViewScope,
    posts: Mutex<Vec<Post>>,
    state: Mutex<SearchState>,
}

impl SearchResults {
    pub fn new(
        posts: Arc<dyn PostApi>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            actions: PostActions {
                posts,
                session,
                notifier,
                navigator,
            },
            scope: ViewScope::new(),
            posts: Mutex::new(Vec::new()),
            state: Mutex::new(SearchState {
                query: String::new(),
                is_loading: true,
                has_searched: false,
            }),
        }
    }

    pub fn posts(&self) -> Vec<Post> {
        lock(&self.posts).clone()
    }

    pub fn query(&self) -> String {
        lock(&self.state).query.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).is_loading
    }

    pub fn has_searched(&self) -> bool {
        lock(&self.state).has_searched
    }

    /// Route parameter changed: decode it and search again.
    pub async fn open(&self, raw_query: &str) {
        let query = match urlencoding::decode(raw_query) {
            Ok(decoded) => decoded.into_owned(),
            Err(e) => {
                tracing::warn!("Malformed search parameter {:?}: {}", raw_query, e);
                raw_query.to_string()
            }
        };
        lock(&self.state).query = query.clone();
        self.fetch(&query).await;
    }

    pub async fn fetch(&self, query: &str) {
        {
            let mut state = lock(&self.state);
            state.is_loading = true;
            state.has_searched = true;
        }
        lock(&self.posts).clear();

        if query.is_empty() {
            lock(&self.state).is_loading = false;
            return;
        }

        let res = self.scope.run(self.actions.posts.search(query)).await;
        match res {
            Ok(found) => *lock(&self.posts) = found,
            Err(ApiError::Cancelled) => return,
            Err(e) => tracing::error!("Error fetching search results: {}", e),
        }
        lock(&self.state).is_loading = false;
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
