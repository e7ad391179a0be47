//! irbankmock server
//!
//! Serves the mock bank gateways and the buyer-facing payment page.

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use irbankmock_api::{AppState, BankRegistry, create_router};
use irbankmock_db::{Migrator, connect};
use irbankmock_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "irbankmock=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect(&config.database).await?;
    info!(url = %config.database.url, "Connected to database");

    if config.database.auto_migrate {
        Migrator::up(&db, None).await?;
        info!("Migrations applied");
    }

    let registry = BankRegistry::with_default_banks();
    info!(banks = ?registry.names().collect::<Vec<_>>(), "Registered banks");

    let state = AppState {
        db: Arc::new(db),
        gateway: Arc::new(config.gateway.clone()),
    };
    let app = create_router(state, &registry);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(
        public_hostname = %config.gateway.public_hostname,
        "Server listening on {}", addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
