use roomchat::{
    build_router,
    message::repository::PostgresMessageRepository,
    participant::repository::PostgresParticipantRepository,
    start_reaper_task, AppConfig, AppState, SystemClock,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomchat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!(port = config.port, "Starting chat room server");

    // In-memory stores unless a database is configured
    let app_state = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Using PostgreSQL stores");
            AppState::new(
                Arc::new(PostgresParticipantRepository::new(pool.clone())),
                Arc::new(PostgresMessageRepository::new(pool)),
                Arc::new(SystemClock),
            )
        }
        None => {
            info!("Using in-memory stores");
            AppState::in_memory()
        }
    };

    tokio::spawn(start_reaper_task(
        Arc::clone(&app_state.participant_repository),
        Arc::clone(&app_state.message_repository),
        Arc::clone(&app_state.clock),
        config.reaper.clone(),
    ));

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
