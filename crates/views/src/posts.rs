//! 投稿・サブレディットの作成／編集フォーム

use crate::scope::ViewScope;
use crate::ui::{Navigator, Notifier};
use crate::{lock, message_or, FormOutcome};
use forest_api::{ApiError, ApiResult, PostApi, SubredditApi};
use forest_core::{Post, PostRequest, Subreddit};
use std::sync::{Arc, Mutex};

const REJECTED_TITLE: &str = "Post Rejected";
const REJECTED_FALLBACK: &str = "Your post violates our guidelines.";
const REQUIRED_FIELDS: &str = "Please fill in all required fields.";

async fn load_subreddits(
    scope: &ViewScope,
    api: &dyn SubredditApi,
    into: &Mutex<Vec<Subreddit>>,
) -> ApiResult<()> {
    let list = scope
        .run(api.get_all())
        .await
        .inspect_err(|e| tracing::error!("Error fetching subreddits: {}", e))?;
    *lock(into) = list;
    Ok(())
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub struct CreatePostForm {
    posts: Arc<dyn PostApi>,
    subreddits_api: Arc<dyn SubredditApi>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    scope: ViewScope,
    subreddits: Mutex<Vec<Subreddit>>,
}

impl CreatePostForm {
    pub fn new(
        posts: Arc<dyn PostApi>,
        subreddits_api: Arc<dyn SubredditApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            posts,
            subreddits_api,
            notifier,
            navigator,
            scope: ViewScope::new(),
            subreddits: Mutex::new(Vec::new()),
        }
    }

    /// Subreddits offered in the picker.
    pub fn subreddits(&self) -> Vec<Subreddit> {
        lock(&self.subreddits).clone()
    }

    pub async fn load(&self) -> ApiResult<()> {
        load_subreddits(&self.scope, self.subreddits_api.as_ref(), &self.subreddits).await
    }

    /// タイトル・サブレディット・本文は必須。URL は空でもよい
    pub async fn submit(&self, draft: &PostRequest) -> FormOutcome {
        if blank(&draft.post_name) || blank(&draft.subreddit_name) || blank(&draft.description) {
            self.notifier.warning(REQUIRED_FIELDS);
            return FormOutcome::Invalid;
        }

        match self.scope.run(self.posts.create(draft)).await {
            Ok(post) => {
                tracing::info!("Created post {}", post.id);
                self.navigator.navigate_by_url("/");
                FormOutcome::Submitted
            }
            Err(ApiError::Cancelled) => FormOutcome::Cancelled,
            Err(e) => {
                tracing::warn!("Post rejected: {}", e);
                self.notifier
                    .rejection(REJECTED_TITLE, &message_or(&e, REJECTED_FALLBACK));
                FormOutcome::Failed
            }
        }
    }

    pub fn discard(&self) {
        self.navigator.navigate_by_url("/");
    }
}

pub struct EditPostForm {
    posts: Arc<dyn PostApi>,
    subreddits_api: Arc<dyn SubredditApi>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    scope: ViewScope,
    post: Mutex<Option<Post>>,
    subreddits: Mutex<Vec<Subreddit>>,
}

impl EditPostForm {
    pub fn new(
        posts: Arc<dyn PostApi>,
        subreddits_api: Arc<dyn SubredditApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            posts,
            subreddits_api,
            notifier,
            navigator,
            scope: ViewScope::new(),
            post: Mutex::new(None),
            subreddits: Mutex::new(Vec::new()),
        }
    }

    pub fn post(&self) -> Option<Post> {
        lock(&self.post).clone()
    }

    pub fn subreddits(&self) -> Vec<Subreddit> {
        lock(&self.subreddits).clone()
    }

    /// Loads the post being edited and the subreddit picker.
    pub async fn load(&self, post_id: &str) -> ApiResult<()> {
        let post = self.scope.run(self.posts.get(post_id)).await?;
        *lock(&self.post) = Some(post);
        if let Err(e) =
            load_subreddits(&self.scope, self.subreddits_api.as_ref(), &self.subreddits).await
        {
            tracing::warn!("Subreddit picker left empty: {}", e);
        }
        Ok(())
    }

    pub async fn submit(
        &self,
        title: &str,
        subreddit_name: &str,
        url: &str,
        description: &str,
    ) -> FormOutcome {
        let Some(mut post) = self.post() else {
            tracing::warn!("Edit submitted before the post was loaded");
            return FormOutcome::Invalid;
        };
        if [title, subreddit_name, url, description].iter().any(|f| blank(f)) {
            self.notifier.error(REQUIRED_FIELDS);
            return FormOutcome::Invalid;
        }

        post.title = title.to_string();
        post.subreddit_name = subreddit_name.to_string();
        post.url = url.to_string();
        post.description = description.to_string();

        match self.scope.run(self.posts.update(&post)).await {
            Ok(_) => {
                self.notifier.success("Post updated successfully!");
                self.navigator
                    .navigate_by_url(&format!("/view-post/{}", post.id));
                *lock(&self.post) = Some(post);
                FormOutcome::Submitted
            }
            Err(ApiError::Cancelled) => FormOutcome::Cancelled,
            Err(e) => {
                tracing::error!("Update Post Error: {}", e);
                self.notifier
                    .error(&message_or(&e, "Error updating post. Please try again."));
                FormOutcome::Failed
            }
        }
    }

    pub fn discard(&self) {
        match self.post() {
            Some(post) => self
                .navigator
                .navigate_by_url(&format!("/view-post/{}", post.id)),
            None => self.navigator.navigate_by_url("/"),
        }
    }
}

/// 作成フォームの検証結果を返す。空なら送信可能
pub fn validate_subreddit(title: &str, description: &str) -> Vec<&'static str> {
    let mut errors = Vec::new();
    match title.chars().count() {
        0 => errors.push("Title is required."),
        n if n < 3 => errors.push("Title must be at least 3 characters."),
        n if n > 50 => errors.push("Title cannot exceed 50 characters."),
        _ => {}
    }
    match description.chars().count() {
        0 => errors.push("Description is required."),
        n if n < 10 => errors.push("Description must be at least 10 characters."),
        n if n > 500 => errors.push("Description cannot exceed 500 characters."),
        _ => {}
    }
    errors
}

pub struct CreateSubredditForm {
    subreddits_api: Arc<dyn SubredditApi>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    scope: ViewScope,
}

impl CreateSubredditForm {
    pub fn new(
        subreddits_api: Arc<dyn SubredditApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            subreddits_api,
            notifier,
            navigator,
            scope: ViewScope::new(),
        }
    }

    pub async fn submit(&self, title: &str, description: &str) -> FormOutcome {
        let errors = validate_subreddit(title, description);
        if !errors.is_empty() {
            self.notifier.warning(&errors.join(" "));
            return FormOutcome::Invalid;
        }

        let subreddit = Subreddit {
            name: title.to_string(),
            description: description.to_string(),
            ..Default::default()
        };
        match self.scope.run(self.subreddits_api.create(&subreddit)).await {
            Ok(created) => {
                tracing::info!("Topic created successfully: {}", created.name);
                self.navigator.navigate_by_url("/list-subreddits");
                FormOutcome::Submitted
            }
            Err(ApiError::Cancelled) => FormOutcome::Cancelled,
            Err(e) => {
                tracing::error!("Error creating topic: {}", e);
                self.notifier.error("Failed to create topic. Please try again.");
                FormOutcome::Failed
            }
        }
    }

    pub fn discard(&self) {
        self.navigator.navigate_by_url("/");
    }
}
