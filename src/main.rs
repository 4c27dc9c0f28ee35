//! HBnB server: in-memory storage by default, PostgreSQL when DATABASE_URL is set.

use hbnb::{app, ensure_database_exists, ensure_tables, AppState, Settings};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hbnb=info,hbnb_server=info")),
        )
        .init();
    let settings = Settings::from_env();

    let state = match &settings.database_url {
        Some(database_url) => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(database_url)
                .await?;
            ensure_tables(&pool, &settings.schema).await?;
            tracing::info!(schema = %settings.schema, "using postgres storage");
            AppState::postgres(pool, &settings.schema)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory storage");
            AppState::in_memory()
        }
    };

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state, settings.body_limit)).await?;
    Ok(())
}
