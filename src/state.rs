use crate::config::AppConfig;
use crate::router::Router;
use crate::toast::TerminalToaster;
use anyhow::{Context, Result};
use forest_api::{
    ApiClient, AuthGateway, ChatService, FeedService, MediaService, PostService,
    SubredditService, SubscriptionService, VoteService,
};
use session::{KeyValueStore, MemoryStore, SessionStore, SqliteStore};
use std::sync::Arc;
use views::Notifier;

/// アプリ全体で共有する状態。各画面にはここから必要なものだけを渡す
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub auth: Arc<AuthGateway>,
    pub posts: Arc<PostService>,
    pub subreddits: Arc<SubredditService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub votes: Arc<VoteService>,
    pub feed: Arc<FeedService>,
    pub chat: Arc<ChatService>,
    pub media: Arc<MediaService>,
    pub notifier: Arc<dyn Notifier>,
    pub router: Arc<Router>,
}

impl AppState {
    /// Opens the persisted session (or an in-memory one) and wires the services.
    pub async fn bootstrap(config: AppConfig, ephemeral: bool) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = if ephemeral {
            tracing::info!("Using in-memory session storage");
            Arc::new(MemoryStore::new())
        } else {
            tracing::info!("Connecting to session database: {}", config.session_db_url);
            let pool = session::db::connect(&config.session_db_url).await?;
            session::db::migrate(&pool).await?;
            Arc::new(SqliteStore::new(pool))
        };

        let notifier: Arc<dyn Notifier> = Arc::new(TerminalToaster::stderr());
        Self::with_storage(config, storage, notifier).await
    }

    pub async fn with_storage(
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let session = Arc::new(
            SessionStore::load(storage)
                .await
                .context("Failed to load session")?,
        );

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;
        let api = ApiClient::new(http, &config.api_url, session.clone());

        Ok(Self {
            auth: Arc::new(AuthGateway::new(api.clone())),
            posts: Arc::new(PostService::new(api.clone())),
            subreddits: Arc::new(SubredditService::new(api.clone())),
            subscriptions: Arc::new(SubscriptionService::new(api.clone())),
            votes: Arc::new(VoteService::new(api.clone())),
            feed: Arc::new(FeedService::new(api.clone())),
            chat: Arc::new(ChatService::new(api.clone())),
            media: Arc::new(MediaService::new(api.clone())),
            router: Arc::new(Router::new(session.clone())),
            config,
            session,
            api,
            notifier,
        })
    }
}
