//! Terminal management and payment page endpoints.

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use irbankmock_core::sep::{CardSubmission, PublicTokenInfo, TokenFinalization};
use irbankmock_db::entities::bank_sep_terminals;
use irbankmock_db::{LifecycleRepository, RegistryError, TerminalRepository};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Endpoints;
use crate::error::ApiError;
use crate::extractors::{FormOrJson, RequestContext};
use crate::{AppState, BankPrefix};

/// Request body for creating a terminal.
#[derive(Debug, Deserialize)]
pub struct CreateTerminalRequest {
    /// Display name.
    #[serde(default, alias = "Name")]
    pub name: String,
}

/// A terminal with its credentials.
#[derive(Debug, Serialize)]
pub struct TerminalResponse {
    /// Terminal id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Generated username.
    pub username: String,
    /// Generated password.
    pub password: String,
}

impl From<bank_sep_terminals::Model> for TerminalResponse {
    fn from(terminal: bank_sep_terminals::Model) -> Self {
        Self {
            id: terminal.id,
            name: terminal.name,
            username: terminal.username,
            password: terminal.password,
        }
    }
}

/// Response for listing terminals.
#[derive(Debug, Serialize)]
pub struct TerminalsResponse {
    /// Every terminal.
    pub terminals: Vec<TerminalResponse>,
    /// Endpoint URLs for merchants.
    pub endpoints: Endpoints,
}

/// Query parameters for the payment page.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    /// Token to look up.
    #[serde(default)]
    pub token: String,
}

/// Request body for cancelling or failing a token.
#[derive(Debug, Deserialize)]
pub struct TokenActionRequest {
    /// Token to close.
    #[serde(default)]
    pub token: String,
}

/// POST `/management/terminal` - Register a terminal.
pub async fn create_terminal(
    State(state): State<AppState>,
    ctx: RequestContext,
    FormOrJson(payload): FormOrJson<CreateTerminalRequest>,
) -> Response {
    let repo = TerminalRepository::new((*state.db).clone());

    match repo.create(&payload.name).await {
        Ok(terminal) => Json(TerminalResponse::from(terminal)).into_response(),
        Err(RegistryError::Invalid(e)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": true,
                "message": e.to_string()
            })),
        )
            .into_response(),
        Err(e) => ctx.error(e).into_response(),
    }
}

/// GET `/management/terminal` - List terminals and endpoint URLs.
pub async fn get_terminals(
    State(state): State<AppState>,
    Extension(prefix): Extension<BankPrefix>,
    ctx: RequestContext,
) -> Result<Json<TerminalsResponse>, ApiError> {
    let repo = TerminalRepository::new((*state.db).clone());
    let terminals = repo.list().await.map_err(|e| ctx.error(RegistryError::from(e)))?;

    Ok(Json(TerminalsResponse {
        terminals: terminals.into_iter().map(TerminalResponse::from).collect(),
        endpoints: Endpoints::new(&state.gateway.public_hostname, prefix.as_str()),
    }))
}

/// GET `/public/token?token=` - What the payment page may show.
pub async fn token_info(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<TokenQuery>,
) -> Result<Json<PublicTokenInfo>, ApiError> {
    let repo = LifecycleRepository::new((*state.db).clone());
    let info = repo
        .public_token_info(&query.token)
        .await
        .map_err(|e| ctx.error(e))?;
    Ok(Json(info))
}

/// POST `/management/token/submit` - Pay with a card.
pub async fn submit_token(
    State(state): State<AppState>,
    ctx: RequestContext,
    FormOrJson(card): FormOrJson<CardSubmission>,
) -> Result<Json<TokenFinalization>, ApiError> {
    let repo = LifecycleRepository::new((*state.db).clone());
    let finalized = repo.submit(&card).await.map_err(|e| ctx.error(e))?;
    Ok(Json(finalized))
}

/// POST `/management/token/cancel` - Buyer cancels the payment.
pub async fn cancel_token(
    State(state): State<AppState>,
    ctx: RequestContext,
    FormOrJson(payload): FormOrJson<TokenActionRequest>,
) -> Result<Json<TokenFinalization>, ApiError> {
    let repo = LifecycleRepository::new((*state.db).clone());
    let finalized = repo.cancel(&payload.token).await.map_err(|e| ctx.error(e))?;
    Ok(Json(finalized))
}

/// POST `/management/token/fail` - Payment failed on the payment page.
pub async fn fail_token(
    State(state): State<AppState>,
    ctx: RequestContext,
    FormOrJson(payload): FormOrJson<TokenActionRequest>,
) -> Result<Json<TokenFinalization>, ApiError> {
    let repo = LifecycleRepository::new((*state.db).clone());
    let finalized = repo.fail(&payload.token).await.map_err(|e| ctx.error(e))?;
    Ok(Json(finalized))
}
