//! 投票ボタン
//!
//! 押下中は `is_loading` で二重送信を防ぐだけで、票数を先回りして書き換えることはしない。
//! 成功したら投稿をサーバーから取り直して丸ごと差し替える

use crate::scope::ViewScope;
use crate::ui::{Navigator, Notifier};
use crate::{lock, message_or};
use forest_api::{ApiError, PostApi, VoteApi};
use forest_core::{Post, VotePayload, VoteType};
use session::SessionStore;
use std::sync::{Arc, Mutex};

const LOGIN_REQUIRED: &str = "You must be logged in to vote.";
const REFETCH_FAILED: &str = "Error updating vote";
const UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    None,
    Upvoted,
    Downvoted,
}

impl VoteState {
    pub fn of(post: &Post) -> Self {
        if post.up_voted {
            Self::Upvoted
        } else if post.down_voted {
            Self::Downvoted
        } else {
            Self::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteButton {
    Up,
    Down,
}

/// 押したボタンと現在の状態から送る意図を決める。`None` は取り消し
pub fn intent(state: VoteState, button: VoteButton) -> Option<VoteType> {
    match (button, state) {
        (VoteButton::Up, VoteState::Upvoted) => None,
        (VoteButton::Up, _) => Some(VoteType::Upvote),
        (VoteButton::Down, VoteState::Downvoted) => None,
        (VoteButton::Down, _) => Some(VoteType::Downvote),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Not logged in. Nothing was sent.
    LoginRequired,
    /// A request was already in flight, or the post has no id.
    Ignored,
    /// Vote accepted and the post was re-fetched.
    Applied,
    /// Vote accepted but re-fetching the post failed; local copy is stale.
    Stale,
    Failed,
    Cancelled,
}

struct VoteInner {
    post: Post,
    is_loading: bool,
    previous_vote_count: i64,
}

pub struct VoteControl {
    votes: Arc<dyn VoteApi>,
    posts: Arc<dyn PostApi>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    scope: ViewScope,
    inner: Mutex<VoteInner>,
}

impl VoteControl {
    pub fn new(
        post: Post,
        votes: Arc<dyn VoteApi>,
        posts: Arc<dyn PostApi>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let previous_vote_count = post.vote_count;
        Self {
            votes,
            posts,
            session,
            notifier,
            navigator,
            scope: ViewScope::new(),
            inner: Mutex::new(VoteInner {
                post,
                is_loading: false,
                previous_vote_count,
            }),
        }
    }

    pub fn post(&self) -> Post {
        lock(&self.inner).post.clone()
    }

    pub fn state(&self) -> VoteState {
        VoteState::of(&lock(&self.inner).post)
    }

    pub fn vote_count(&self) -> i64 {
        lock(&self.inner).post.vote_count
    }

    /// Count shown before the last successful refresh, for the count animation.
    pub fn previous_vote_count(&self) -> i64 {
        lock(&self.inner).previous_vote_count
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner).is_loading
    }

    /// Replaces the bound post, as when the parent list re-renders.
    pub fn set_post(&self, post: Post) {
        let mut inner = lock(&self.inner);
        inner.previous_vote_count = post.vote_count;
        inner.post = post;
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub async fn upvote(&self) -> VoteOutcome {
        self.click(VoteButton::Up).await
    }

    pub async fn downvote(&self) -> VoteOutcome {
        self.click(VoteButton::Down).await
    }

    pub async fn click(&self, button: VoteButton) -> VoteOutcome {
        if !self.session.is_logged_in() {
            self.notifier.error(LOGIN_REQUIRED);
            self.navigator.navigate_by_url("/login");
            return VoteOutcome::LoginRequired;
        }

        let payload = {
            let mut inner = lock(&self.inner);
            if inner.is_loading {
                tracing::debug!("Vote already in flight, ignoring click");
                return VoteOutcome::Ignored;
            }
            if inner.post.id.is_empty() {
                tracing::error!("Post ID is undefined");
                return VoteOutcome::Ignored;
            }
            inner.is_loading = true;
            VotePayload {
                vote_type: intent(VoteState::of(&inner.post), button),
                post_id: inner.post.id.clone(),
            }
        };

        match self.scope.run(self.votes.vote(&payload)).await {
            Ok(()) => {}
            Err(ApiError::Cancelled) => {
                lock(&self.inner).is_loading = false;
                return VoteOutcome::Cancelled;
            }
            Err(e) => {
                lock(&self.inner).is_loading = false;
                tracing::error!("Vote error: {}", e);
                self.notifier.error(&message_or(&e, UNEXPECTED));
                return VoteOutcome::Failed;
            }
        }

        let refreshed = self.scope.run(self.posts.get(&payload.post_id)).await;
        let mut inner = lock(&self.inner);
        inner.is_loading = false;
        match refreshed {
            Ok(post) => {
                inner.previous_vote_count = inner.post.vote_count;
                inner.post = post;
                VoteOutcome::Applied
            }
            Err(ApiError::Cancelled) => VoteOutcome::Cancelled,
            Err(e) => {
                drop(inner);
                tracing::error!("Error updating vote details: {}", e);
                self.notifier.error(REFETCH_FAILED);
                VoteOutcome::Stale
            }
        }
    }
}
