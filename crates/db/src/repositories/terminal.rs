//! Terminal registry.
//!
//! Terminals are created once and never mutated; credentials are generated,
//! never supplied by the caller.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use thiserror::Error;
use uuid::Uuid;

use irbankmock_core::sep::ManagementError;
use irbankmock_core::validation::has_insecure_characters;
use irbankmock_shared::AppError;

use crate::entities::bank_sep_terminals;

/// Terminal registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Name rejected.
    #[error(transparent)]
    Invalid(#[from] ManagementError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Invalid(e) => e.into(),
            RegistryError::Database(e) => Self::internal(e.to_string()),
        }
    }
}

/// Checks a terminal display name.
///
/// # Errors
///
/// Returns `EmptyName` for blank names and `InvalidName` for names with a
/// denied character.
pub fn validate_terminal_name(name: &str) -> Result<(), ManagementError> {
    if name.trim().is_empty() {
        return Err(ManagementError::EmptyName);
    }
    if has_insecure_characters(name) {
        return Err(ManagementError::InvalidName);
    }
    Ok(())
}

/// Terminal repository.
#[derive(Debug, Clone)]
pub struct TerminalRepository {
    db: DatabaseConnection,
}

impl TerminalRepository {
    /// Creates a new terminal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a terminal with freshly generated credentials.
    pub async fn create(&self, name: &str) -> Result<bank_sep_terminals::Model, RegistryError> {
        validate_terminal_name(name)?;

        let terminal = bank_sep_terminals::ActiveModel {
            name: Set(name.to_string()),
            username: Set(Uuid::new_v4().to_string()),
            password: Set(Uuid::new_v4().to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(terminal_id = terminal.id, "Terminal created");
        Ok(terminal)
    }

    /// Lists every terminal, oldest first.
    pub async fn list(&self) -> Result<Vec<bank_sep_terminals::Model>, DbErr> {
        bank_sep_terminals::Entity::find()
            .order_by_asc(bank_sep_terminals::Column::Id)
            .all(&self.db)
            .await
    }
}
