use sustainx::{
    config::{validate_production_config, AppConfig},
    db, routes, services, AppState,
};

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sustainx=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    validate_production_config()?;
    let config = AppConfig::from_env()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    // Database connection
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    let cleanup_interval = config.cleanup_interval;

    let app_state = AppState::new(config, pool, services::create_email_service());

    // Expired links are rejected at redemption anyway; this only bounds the store.
    let magic_link_service = app_state.magic_link_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            if let Err(e) = magic_link_service.cleanup_expired_tokens().await {
                tracing::warn!("Failed to purge expired magic links: {}", e);
            }
        }
    });

    let app = routes::create_router(app_state);

    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
