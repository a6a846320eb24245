use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shopbot_api::{
    api::{create_router, AppState},
    config::Config,
    db::{self, PgInteractionStore},
    services::{scraper::HttpFetcher, CannedResponder},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shopbot_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Database ready");

    let store = Arc::new(PgInteractionStore::new(pool));
    let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout(), &config.user_agent)?);
    let state = AppState::new(&config, store, fetcher, Arc::new(CannedResponder))?;

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
