//! Shared setup for repository integration tests.

#![allow(dead_code)]

use irbankmock_core::sep::TokenRequest;
use irbankmock_db::migration::{Migrator, MigratorTrait};
use irbankmock_db::{TerminalRepository, connect};
use irbankmock_shared::DatabaseConfig;
use sea_orm::DatabaseConnection;

/// Connects to a fresh in-memory database with the schema applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = connect(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

/// Registers a terminal and returns its id.
pub async fn create_terminal(db: &DatabaseConnection, name: &str) -> i64 {
    TerminalRepository::new(db.clone())
        .create(name)
        .await
        .expect("Failed to create terminal")
        .id
}

/// A valid token request for `terminal_id`.
pub fn token_request(terminal_id: i64, res_num: &str) -> TokenRequest {
    TokenRequest {
        action: "token".to_string(),
        terminal_id: terminal_id.to_string(),
        amount: 10_000,
        res_num: res_num.to_string(),
        redirect_url: "https://shop.example/done".to_string(),
        token_expiry_in_min: 15,
        ..TokenRequest::default()
    }
}
