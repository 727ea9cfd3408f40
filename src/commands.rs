//! サブコマンドの実行。画面と同じ状態機械を通して処理する

use crate::cli::{Command, PostsAction, SubredditsAction, UploadMedia, VoteDirection};
use crate::router::Route;
use crate::state::AppState;
use anyhow::{bail, Context, Result};
use forest_api::{ApiError, AuthApi, PostApi};
use forest_core::{Post, PostRequest, Sender, SignupRequest};
use std::path::Path;
use views::{
    ChatWidget, CreatePostForm, CreateSubredditForm, EditPostForm, ForgotPasswordForm,
    FormOutcome, Header, InterestsForm, ListingSource, LoginForm, PostListing, ResetPasswordForm,
    SearchResults, SignupForm, SubredditList, SubredditView, VoteButton, VoteControl, VoteOutcome,
};

const GUIDELINES: &str = "\
Community guidelines
  - Be respectful to other members.
  - Stay on topic for the subreddit you post in.
  - No spam, hate speech or harassment.
Posts are checked by automated moderation before they are published.";

/// Runs a command. If the backend answers 401 the access token is refreshed
/// once and the same command is retried once.
pub async fn run(state: &AppState, command: &Command) -> Result<()> {
    match execute(state, command).await {
        Err(e) if is_unauthorized(&e) && state.session.is_logged_in() => {
            tracing::info!("Access token rejected, refreshing and retrying once");
            state
                .auth
                .refresh()
                .await
                .context("Session expired, please log in again")?;
            execute(state, command).await
        }
        other => other,
    }
}

pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>()
        .is_some_and(|e| e.is_unauthorized())
}

async fn execute(state: &AppState, command: &Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let form = LoginForm::new(
                state.auth.clone(),
                state.notifier.clone(),
                state.router.clone(),
            );
            finish(form.submit(username, password).await)
        }
        Command::Signup {
            email,
            username,
            password,
            interests,
        } => {
            let form = SignupForm::new(
                state.auth.clone(),
                state.notifier.clone(),
                state.router.clone(),
            );
            let req = SignupRequest {
                email: email.clone(),
                username: username.clone(),
                password: password.clone(),
                interests: interests.clone(),
            };
            finish(form.submit(&req).await)?;
            println!("Check your inbox to activate the account, then run `forest login`.");
            Ok(())
        }
        Command::Logout => {
            let header = Header::new(&state.session, state.auth.clone(), state.router.clone());
            header.logout().await;
            println!("Logged out");
            Ok(())
        }
        Command::Status => {
            match state.session.session() {
                Some(s) => println!(
                    "Logged in as {}{} (token expires {})",
                    s.username,
                    if state.session.is_admin() { " [admin]" } else { "" },
                    s.expires_at
                ),
                None => println!("Not logged in"),
            }
            Ok(())
        }
        Command::Refresh => {
            state.auth.refresh().await?;
            if let Some(expires_at) = state.session.expires_at() {
                println!("Token refreshed (expires {})", expires_at);
            }
            Ok(())
        }
        Command::Feed => open(state, "/my-feed").await,
        Command::Trending => open(state, "/trending").await,
        Command::Posts { action } => posts(state, action).await,
        Command::Subreddits { action } => subreddits(state, action).await,
        Command::Vote { direction, post_id } => vote(state, *direction, post_id).await,
        Command::Chat { question } => chat(state, &question.join(" ")).await,
        Command::ForgotPassword { email } => {
            let form = ForgotPasswordForm::new(state.auth.clone(), state.notifier.clone());
            finish(form.submit(email).await)
        }
        Command::ResetPassword {
            token,
            password,
            confirm_password,
        } => {
            let form = ResetPasswordForm::new(
                token,
                state.auth.clone(),
                state.notifier.clone(),
                state.router.clone(),
            );
            finish(form.submit(password, confirm_password).await)
        }
        Command::Interests { interests } => {
            guard(state, Route::Interests)?;
            let form = InterestsForm::new(
                state.auth.clone(),
                state.notifier.clone(),
                state.router.clone(),
            );
            for interest in interests {
                if !form.catalogue().contains(&interest.as_str()) {
                    tracing::warn!("{} is not in the interest catalogue", interest);
                }
                form.toggle(interest);
            }
            finish(form.submit().await)
        }
        Command::Upload { media } => upload(state, media).await,
        Command::Open { path } => open(state, path).await,
    }
}

async fn posts(state: &AppState, action: &PostsAction) -> Result<()> {
    match action {
        PostsAction::List => open(state, "/").await,
        PostsAction::Show { id } => open(state, &format!("/view-post/{}", id)).await,
        PostsAction::User { username } => {
            open(state, &format!("/user-profile/{}", username)).await
        }
        PostsAction::Subreddit { subreddit_id } => {
            open(state, &format!("/view-subreddit/{}", subreddit_id)).await
        }
        PostsAction::Search { query } => {
            let header = Header::new(&state.session, state.auth.clone(), state.router.clone());
            header.set_search_term(query);
            if !header.search() {
                bail!("Search term is empty");
            }
            render(state, state.router.current()).await
        }
        PostsAction::Create {
            title,
            subreddit,
            description,
            url,
        } => {
            guard(state, Route::CreatePost)?;
            let form = CreatePostForm::new(
                state.posts.clone(),
                state.subreddits.clone(),
                state.notifier.clone(),
                state.router.clone(),
            );
            let draft = PostRequest::new(title, subreddit, url, description);
            finish(form.submit(&draft).await)
        }
        PostsAction::Edit {
            id,
            title,
            subreddit,
            description,
            url,
        } => {
            guard(state, Route::EditPost(id.clone()))?;
            let form = EditPostForm::new(
                state.posts.clone(),
                state.subreddits.clone(),
                state.notifier.clone(),
                state.router.clone(),
            );
            form.load(id).await?;
            let current = form
                .post()
                .with_context(|| format!("Post {} could not be loaded", id))?;
            let outcome = form
                .submit(
                    title.as_deref().unwrap_or(&current.title),
                    subreddit.as_deref().unwrap_or(&current.subreddit_name),
                    url.as_deref().unwrap_or(&current.url),
                    description.as_deref().unwrap_or(&current.description),
                )
                .await;
            finish(outcome)
        }
        PostsAction::Delete { id } => {
            state.posts.delete(id).await?;
            println!("Deleted post {}", id);
            Ok(())
        }
        PostsAction::Notify { id, off } => {
            let enabled = state.posts.toggle_notifications(id, !off).await?;
            println!(
                "Notifications for {} are now {}",
                id,
                if enabled { "on" } else { "off" }
            );
            Ok(())
        }
    }
}

async fn subreddits(state: &AppState, action: &SubredditsAction) -> Result<()> {
    match action {
        SubredditsAction::List => open(state, "/list-subreddits").await,
        SubredditsAction::Show { id } => open(state, &format!("/view-subreddit/{}", id)).await,
        SubredditsAction::Create { name, description } => {
            guard(state, Route::CreateSubreddit)?;
            let form = CreateSubredditForm::new(
                state.subreddits.clone(),
                state.notifier.clone(),
                state.router.clone(),
            );
            finish(form.submit(name, description).await)
        }
        SubredditsAction::Subscribe { name } => {
            let list = SubredditList::new(state.subreddits.clone(), state.subscriptions.clone());
            list.subscribe(name).await?;
            println!("Subscribed to r/{}", name);
            println!("Subscriptions: {}", list.subscriptions().join(", "));
            Ok(())
        }
        SubredditsAction::Unsubscribe { name } => {
            let list = SubredditList::new(state.subreddits.clone(), state.subscriptions.clone());
            list.unsubscribe(name).await?;
            println!("Unsubscribed from r/{}", name);
            println!("Subscriptions: {}", list.subscriptions().join(", "));
            Ok(())
        }
    }
}

async fn vote(state: &AppState, direction: VoteDirection, post_id: &str) -> Result<()> {
    let post = if state.session.is_logged_in() {
        state.posts.get(post_id).await?
    } else {
        // 未ログインでは送信しないので、取得も省く
        Post {
            id: post_id.to_string(),
            ..Default::default()
        }
    };

    let control = VoteControl::new(
        post,
        state.votes.clone(),
        state.posts.clone(),
        state.session.clone(),
        state.notifier.clone(),
        state.router.clone(),
    );
    let button = match direction {
        VoteDirection::Up => VoteButton::Up,
        VoteDirection::Down => VoteButton::Down,
    };

    match control.click(button).await {
        VoteOutcome::Applied | VoteOutcome::Stale => {
            println!(
                "{} votes (was {}), your vote: {:?}",
                control.vote_count(),
                control.previous_vote_count(),
                control.state()
            );
            Ok(())
        }
        VoteOutcome::LoginRequired => bail!("Login required"),
        VoteOutcome::Ignored => bail!("Vote was not sent"),
        VoteOutcome::Failed => bail!("Vote failed"),
        VoteOutcome::Cancelled => bail!("Vote cancelled"),
    }
}

async fn chat(state: &AppState, question: &str) -> Result<()> {
    let widget = ChatWidget::new(state.chat.clone());
    if !widget.ask(question).await {
        bail!("Question is empty");
    }

    for message in widget.messages().iter().filter(|m| m.sender == Sender::Bot) {
        println!("{}", message.text);
        for source in message.sources.iter().flatten() {
            println!("  [{}] score {:.2}", source.source_id, source.score);
        }
    }
    Ok(())
}

async fn upload(state: &AppState, media: &UploadMedia) -> Result<()> {
    guard(state, Route::CreatePost)?;

    let res = match media {
        UploadMedia::Photo { path, title } => {
            state
                .media
                .upload_photo(&title_for(path, title.as_deref()), path)
                .await?
        }
        UploadMedia::Video { path, title } => {
            state
                .media
                .upload_video(&title_for(path, title.as_deref()), path)
                .await?
        }
    };
    println!("{} {}", res.id, res.url);
    Ok(())
}

fn title_for(path: &Path, title: Option<&str>) -> String {
    title.map(str::to_string).unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string())
    })
}

/// Navigates through the guard and fails if it redirected to the login page.
fn guard(state: &AppState, route: Route) -> Result<Route> {
    let path = route.path();
    match state.router.navigate(&path) {
        Some(landed) if landed == route => Ok(landed),
        Some(Route::Login { .. }) => bail!("{} requires login, run `forest login` first", path),
        _ => bail!("No page at {}", path),
    }
}

async fn open(state: &AppState, url: &str) -> Result<()> {
    let route = Route::parse(url).with_context(|| format!("No page at {}", url))?;
    let route = guard(state, route)?;
    render(state, route).await
}

async fn render(state: &AppState, route: Route) -> Result<()> {
    match route {
        Route::Home => listing(state, ListingSource::All).await,
        Route::MyFeed => listing(state, ListingSource::MyFeed).await,
        Route::Trending => listing(state, ListingSource::Trending).await,
        Route::UserProfile(name) => listing(state, ListingSource::User(name)).await,
        Route::ViewPost(id) => {
            let post = state.posts.get(&id).await?;
            print_post_detail(&post);
            Ok(())
        }
        Route::ViewSubreddit(id) => {
            let view = SubredditView::new(
                state.subreddits.clone(),
                state.posts.clone(),
                state.session.clone(),
                state.notifier.clone(),
                state.router.clone(),
            );
            view.open(&id).await;
            let Some(subreddit) = view.subreddit() else {
                bail!("Subreddit {} could not be loaded", id);
            };
            println!("r/{}  {}", subreddit.name, subreddit.description);
            print_posts(&view.posts());
            Ok(())
        }
        Route::ListSubreddits => {
            let list = SubredditList::new(state.subreddits.clone(), state.subscriptions.clone());
            match list.load().await {
                // 未ログインでは購読一覧が 401 になるが、一覧の表示は続ける
                Err(e) if e.is_unauthorized() && !state.session.is_logged_in() => {}
                other => other?,
            }
            for s in list.subreddits() {
                let mark = if list.is_subscribed(&s.name) { "*" } else { " " };
                println!(
                    "{} {:>6}  r/{}  {}",
                    mark,
                    s.id.unwrap_or_default(),
                    s.name,
                    s.description
                );
            }
            Ok(())
        }
        Route::SearchResults(query) => {
            let view = SearchResults::new(
                state.posts.clone(),
                state.session.clone(),
                state.notifier.clone(),
                state.router.clone(),
            );
            view.open(&query).await;
            println!("Results for {:?}", view.query());
            let found = view.posts();
            if found.is_empty() {
                println!("No posts found");
            } else {
                print_posts(&found);
            }
            Ok(())
        }
        Route::Login { registered } => {
            let form = LoginForm::new(
                state.auth.clone(),
                state.notifier.clone(),
                state.router.clone(),
            );
            if let Some(banner) = form.open(registered) {
                println!("{}", banner);
            }
            println!("Run `forest login <username> <password>`");
            Ok(())
        }
        Route::Guidelines => {
            println!("{}", GUIDELINES);
            Ok(())
        }
        other => {
            println!(
                "{} is a form, use the matching subcommand (see `forest --help`)",
                other.path()
            );
            Ok(())
        }
    }
}

async fn listing(state: &AppState, source: ListingSource) -> Result<()> {
    let view = PostListing::new(
        source,
        state.feed.clone(),
        state.posts.clone(),
        state.session.clone(),
        state.notifier.clone(),
        state.router.clone(),
    );
    view.load().await?;
    print_posts(&view.posts());
    Ok(())
}

fn finish(outcome: FormOutcome) -> Result<()> {
    match outcome {
        FormOutcome::Submitted => Ok(()),
        FormOutcome::Invalid => bail!("Nothing was sent"),
        FormOutcome::Failed => bail!("Request failed"),
        FormOutcome::Cancelled => bail!("Request cancelled"),
    }
}

fn print_posts(posts: &[Post]) {
    for post in posts {
        println!(
            "{:>6} [{:>4}] {}  (r/{} by u/{}, {}, {} comments)",
            post.id,
            post.vote_count,
            post.title,
            post.subreddit_name,
            post.author_name,
            post.age,
            post.comment_count
        );
    }
}

fn print_post_detail(post: &Post) {
    println!("{}", post.title);
    println!(
        "r/{} by u/{} {}  [{} votes, {} comments]",
        post.subreddit_name, post.author_name, post.age, post.vote_count, post.comment_count
    );
    if !post.url.is_empty() {
        println!("{}", post.url);
    }
    println!();
    println!("{}", post.description);
}
