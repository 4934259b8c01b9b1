//! Settings admin server. Configuration comes from the environment (see `ServerConfig`).

use settings_admin::entities::ALL_KINDS;
use settings_admin::{
    app, ensure_database_exists, ensure_settings_tables, AppState, ServerConfig, StaticElementResolver, StoreBackend,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("settings_admin=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let mut state = match (config.backend, config.database_url.as_deref()) {
        (StoreBackend::Postgres, Some(database_url)) => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            ensure_settings_tables(&pool, &config.settings_schema, ALL_KINDS).await?;
            AppState::postgres(pool, &config.settings_schema)
        }
        _ => {
            tracing::warn!("no database configured, settings are kept in memory");
            AppState::in_memory()
        }
    };

    if let Some(path) = &config.element_paths {
        let elements = StaticElementResolver::from_file(path).await?;
        state = state.with_elements(Arc::new(elements));
    }

    let router = app(state, config.body_limit_bytes);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("settings admin listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
