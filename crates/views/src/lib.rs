//! 画面ごとの状態機械。描画は持たず、通知と遷移は [`Notifier`] / [`Navigator`] に委ねる

pub mod auth_forms;
pub mod chat;
pub mod dropdown;
pub mod header;
pub mod listing;
pub mod posts;
pub mod scope;
pub mod search;
pub mod subreddits;
pub mod ui;
pub mod vote;

#[cfg(test)]
mod testing;

use forest_api::ApiError;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub use auth_forms::{
    ForgotPasswordForm, InterestsForm, LoginForm, ResetPasswordForm, SignupForm,
};
pub use chat::ChatWidget;
pub use dropdown::HoverDropdown;
pub use header::Header;
pub use listing::{ListingSource, PostListing};
pub use posts::{CreatePostForm, CreateSubredditForm, EditPostForm};
pub use scope::ViewScope;
pub use search::SearchResults;
pub use subreddits::{SubredditList, SubredditView};
pub use ui::{Navigator, Notifier, Toast, ToastKind};
pub use vote::{VoteButton, VoteControl, VoteOutcome, VoteState};

/// Result of submitting a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    /// Blocked client-side; nothing was sent.
    Invalid,
    Submitted,
    Failed,
    Cancelled,
}

/// Server-supplied reason, or `fallback` when there is none.
pub(crate) fn message_or(err: &ApiError, fallback: &str) -> String {
    err.user_message().unwrap_or(fallback).to_string()
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
