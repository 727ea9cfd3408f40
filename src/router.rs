//! ルーティング表とルートガード

use session::SessionStore;
use std::sync::{Arc, Mutex, PoisonError};
use views::Navigator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    MyFeed,
    Trending,
    ViewSubreddit(String),
    ViewPost(String),
    UserProfile(String),
    ListSubreddits,
    CreatePost,
    CreateSubreddit,
    EditPost(String),
    Signup,
    SearchResults(String),
    /// `registered=true` が付いているか
    Login { registered: bool },
    Guidelines,
    ForgotPassword,
    ResetPassword(String),
    Interests,
}

impl Route {
    /// Parses an in-app URL. Leading slash is optional; the empty URL is home.
    pub fn parse(url: &str) -> Option<Self> {
        let (path, query) = match url.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (url, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["my-feed"] => Route::MyFeed,
            ["trending"] => Route::Trending,
            ["view-subreddit", id] => Route::ViewSubreddit(id.to_string()),
            ["view-post", id] => Route::ViewPost(id.to_string()),
            ["user-profile", name] => Route::UserProfile(name.to_string()),
            ["list-subreddits"] => Route::ListSubreddits,
            ["create-post"] => Route::CreatePost,
            ["create-subreddit"] => Route::CreateSubreddit,
            ["edit-post", id] => Route::EditPost(id.to_string()),
            ["signup"] => Route::Signup,
            ["search-results", query] => Route::SearchResults(query.to_string()),
            ["login"] => Route::Login {
                registered: query
                    .map(|q| q.split('&').any(|kv| kv == "registered=true"))
                    .unwrap_or(false),
            },
            ["guidelines"] => Route::Guidelines,
            ["forgot-password"] => Route::ForgotPassword,
            ["reset-password", token] => Route::ResetPassword(token.to_string()),
            ["interests"] => Route::Interests,
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::MyFeed => "/my-feed".to_string(),
            Route::Trending => "/trending".to_string(),
            Route::ViewSubreddit(id) => format!("/view-subreddit/{}", id),
            Route::ViewPost(id) => format!("/view-post/{}", id),
            Route::UserProfile(name) => format!("/user-profile/{}", name),
            Route::ListSubreddits => "/list-subreddits".to_string(),
            Route::CreatePost => "/create-post".to_string(),
            Route::CreateSubreddit => "/create-subreddit".to_string(),
            Route::EditPost(id) => format!("/edit-post/{}", id),
            Route::Signup => "/signup".to_string(),
            Route::SearchResults(q) => format!("/search-results/{}", q),
            Route::Login { registered: true } => "/login?registered=true".to_string(),
            Route::Login { registered: false } => "/login".to_string(),
            Route::Guidelines => "/guidelines".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword(token) => format!("/reset-password/{}", token),
            Route::Interests => "/interests".to_string(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::MyFeed
                | Route::UserProfile(_)
                | Route::CreatePost
                | Route::CreateSubreddit
                | Route::EditPost(_)
                | Route::Interests
        )
    }
}

/// 遷移前にセッションを同期的に確認する
pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Where navigation to `route` actually lands.
    pub fn check(&self, route: Route) -> Route {
        if route.requires_auth() && !self.session.is_logged_in() {
            tracing::info!("{} requires login, redirecting", route.path());
            Route::Login { registered: false }
        } else {
            route
        }
    }
}

/// In-process navigation: resolves URLs, applies the guard, keeps history.
pub struct Router {
    guard: RouteGuard,
    history: Mutex<Vec<Route>>,
}

impl Router {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            guard: RouteGuard::new(session),
            history: Mutex::new(vec![Route::Home]),
        }
    }

    /// Navigates and returns the route that was activated, or `None` for an unknown URL.
    pub fn navigate(&self, url: &str) -> Option<Route> {
        let Some(route) = Route::parse(url) else {
            tracing::warn!("No route matches {:?}", url);
            return None;
        };
        let landed = self.guard.check(route);
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(landed.clone());
        Some(landed)
    }

    pub fn current(&self) -> Route {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or(Route::Home)
    }

    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for Router {
    fn navigate_by_url(&self, url: &str) {
        self.navigate(url);
    }
}
