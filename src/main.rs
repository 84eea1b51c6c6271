//! Binary entry point: configuration, database bootstrap, serving.

use garagem::models::car::Car;
use garagem::{ensure_database_exists, ensure_entity_table, AppConfig, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("garagem=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    ensure_database_exists(&config.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    ensure_entity_table::<Car>(&pool).await?;

    let app = garagem::app(AppState { pool });
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!("garagem listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
