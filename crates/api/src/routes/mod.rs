//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod sep;

/// Creates the service routes mounted under `/api`, apart from the banks.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(health::routes())
}
