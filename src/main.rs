use clap::Parser;
use forest_client::cli::Cli;
use forest_client::{commands, AppConfig, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()
        .with_overrides(cli.api_url.as_deref(), cli.session_db.as_deref());
    tracing::info!("Using backend {}", config.api_url);

    let state = AppState::bootstrap(config, cli.ephemeral).await?;
    commands::run(&state, &cli.command).await
}
