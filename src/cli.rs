use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "forest")]
#[command(about = "Terminal client for the Forest community platform", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides FOREST_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session database URL (overrides FOREST_SESSION_DB_URL)
    #[arg(long, global = true)]
    pub session_db: Option<String>,

    /// Keep the session in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in and store the session
    Login { username: String, password: String },
    /// Create an account
    Signup {
        email: String,
        username: String,
        password: String,
        /// At least three, e.g. --interest Music --interest Art --interest Food
        #[arg(long = "interest")]
        interests: Vec<String>,
    },
    Logout,
    /// Show who is logged in
    Status,
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Personalised feed
    Feed,
    Trending,
    Posts {
        #[command(subcommand)]
        action: PostsAction,
    },
    Subreddits {
        #[command(subcommand)]
        action: SubredditsAction,
    },
    Vote {
        direction: VoteDirection,
        post_id: String,
    },
    /// Ask the assistant a question
    Chat {
        #[arg(required = true)]
        question: Vec<String>,
    },
    ForgotPassword { email: String },
    ResetPassword {
        token: String,
        password: String,
        confirm_password: String,
    },
    /// Save interests (see INTEREST_CATALOGUE)
    Interests {
        #[arg(required = true)]
        interests: Vec<String>,
    },
    Upload {
        #[command(subcommand)]
        media: UploadMedia,
    },
    /// Open an in-app path such as /trending or /view-post/42
    Open { path: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum PostsAction {
    List,
    Show { id: String },
    User { username: String },
    Subreddit { subreddit_id: String },
    Search { query: String },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        subreddit: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "")]
        url: String,
    },
    /// Fields not given keep their current value
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subreddit: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
    Delete { id: String },
    /// Turn reply notifications for a post on (default) or off
    Notify {
        id: String,
        #[arg(long)]
        off: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SubredditsAction {
    List,
    Show { id: String },
    Create { name: String, description: String },
    Subscribe { name: String },
    Unsubscribe { name: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum UploadMedia {
    Photo {
        path: PathBuf,
        #[arg(long)]
        title: Option<String>,
    },
    Video {
        path: PathBuf,
        #[arg(long)]
        title: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}
