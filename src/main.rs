use std::sync::Arc;

use furnish_api::{
    config::Config,
    db::{create_pool, PgCatalog},
    routes::{create_router, AppState},
    services::{random, RecommendationEngine},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "furnish_api=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!(max_connections = config.db_max_connections, "Connected to catalog database");

    let engine = RecommendationEngine::new(
        Arc::new(PgCatalog::new(pool)),
        random::from_seed(config.diversity_seed),
        config.engine_settings(),
    );
    if config.diversity_seed.is_some() {
        tracing::warn!("DIVERSITY_SEED is set; rankings are deterministic");
    }

    let app = create_router(AppState::new(
        engine,
        config.history_capacity,
        config.history_max_sessions,
    ));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
