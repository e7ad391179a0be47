//! Merchant-facing gateway endpoints: token, receipt, verify and reverse.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use irbankmock_core::sep::{
    PaymentReceipt, ReceiptLookup, ReceiptQuery, SepError, TokenRequest, TransactionDetail,
};
use irbankmock_db::{LifecycleError, LifecycleRepository, SettlementOutcome};
use irbankmock_shared::AppError;
use serde::{Deserialize, Serialize};

use super::PATH_SEND_TOKEN;
use crate::error::ApiError;
use crate::extractors::{FormOrJson, RequestContext, decode_body, is_form};
use crate::{AppState, BankPrefix};

/// Token request response. `status` is 1 on success and -1 on failure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Success sentinel.
    pub status: i32,
    /// Issued token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Bank error code, as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Bank error name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_desc: Option<String>,
}

impl TransactionResponse {
    fn issued(token: String) -> Self {
        Self {
            status: 1,
            token: Some(token),
            error_code: None,
            error_desc: None,
        }
    }

    fn failed(error: SepError) -> Self {
        Self {
            status: -1,
            token: None,
            error_code: Some(error.code().to_string()),
            error_desc: Some(error.to_string()),
        }
    }
}

/// Buyer redirect request: a `Token` field instead of a token request.
#[derive(Debug, Default, Deserialize)]
struct TokenRedirect {
    #[serde(rename = "Token", default)]
    token: Option<String>,
}

/// Receipt request. Exactly one of `RefNum` and `Token` selects the
/// transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiptRequest {
    /// Terminal id.
    #[serde(default, alias = "terminalNumber")]
    pub terminal_number: i64,
    /// Bank reference number.
    #[serde(default, alias = "refNum")]
    pub ref_num: Option<String>,
    /// Token.
    #[serde(default, alias = "token")]
    pub token: Option<String>,
    /// Must match the key given with the token request.
    #[serde(default, alias = "txnRandomSessionKey")]
    pub txn_random_session_key: Option<i64>,
    /// Must match the transaction's RRN.
    #[serde(default, alias = "rrn")]
    pub rrn: Option<i64>,
}

impl ReceiptRequest {
    /// Converts to a receipt query.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` unless exactly one selector is non-empty.
    pub fn into_query(self) -> Result<ReceiptQuery, SepError> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let lookup = match (present(self.ref_num), present(self.token)) {
            (Some(ref_num), None) => ReceiptLookup::RefNum(ref_num),
            (None, Some(token)) => ReceiptLookup::Token(token),
            _ => return Err(SepError::InvalidRequest),
        };
        Ok(ReceiptQuery {
            terminal_id: self.terminal_number,
            lookup,
            session_key: self.txn_random_session_key,
            rrn: self.rrn,
        })
    }
}

/// A validation error entry. The bank always sends `null` for the list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationError {
    /// Offending field.
    pub field_name: String,
    /// Messages for the field.
    pub error_messages: Vec<String>,
}

/// Receipt response. Always sent with HTTP 200.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiptResponse {
    /// True when the receipt could not be returned.
    pub has_error: bool,
    /// The receipt.
    pub data: Option<PaymentReceipt>,
    /// Field errors.
    pub validation_errors: Option<Vec<ValidationError>>,
    /// Bank error code, zero on success.
    pub error_code: i32,
    /// Bank error name, empty on success.
    pub error_message: String,
}

impl ReceiptResponse {
    fn found(receipt: PaymentReceipt) -> Self {
        Self {
            has_error: false,
            data: Some(receipt),
            validation_errors: None,
            error_code: 0,
            error_message: String::new(),
        }
    }

    fn failed(error: SepError) -> Self {
        Self {
            has_error: true,
            data: None,
            validation_errors: None,
            error_code: error.code(),
            error_message: error.to_string(),
        }
    }
}

/// Verify or reverse request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VerificationRequest {
    /// Bank reference number.
    #[serde(default, alias = "refNum")]
    pub ref_num: String,
    /// Terminal id.
    #[serde(default, alias = "terminalNumber")]
    pub terminal_number: i64,
}

/// Verify or reverse response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VerificationResponse {
    /// Present whenever the transaction was located.
    pub transaction_detail: Option<TransactionDetail>,
    /// Result code.
    pub result_code: i32,
    /// Result description, in Persian.
    pub result_description: String,
    /// True only for result code 0.
    pub success: bool,
}

impl From<SettlementOutcome> for VerificationResponse {
    fn from(outcome: SettlementOutcome) -> Self {
        Self {
            transaction_detail: outcome.detail,
            result_code: outcome.result.code(),
            result_description: outcome.result.description().to_string(),
            success: outcome.result.is_success(),
        }
    }
}

fn gateway_error(error: SepError) -> Response {
    (StatusCode::BAD_REQUEST, Json(TransactionResponse::failed(error))).into_response()
}

/// Finds a non-empty `Token` in the query string or form body.
fn redirect_token(query: Option<&str>, headers: &HeaderMap, body: &[u8]) -> Option<String> {
    let from_query = query
        .and_then(|q| serde_urlencoded::from_str::<TokenRedirect>(q).ok())
        .and_then(|r| r.token);
    let from_form = || {
        is_form(headers)
            .then(|| serde_urlencoded::from_bytes::<TokenRedirect>(body).ok())
            .flatten()
            .and_then(|r| r.token)
    };
    from_query.or_else(from_form).filter(|t| !t.is_empty())
}

/// POST `/OnlinePG/OnlinePG` - Issue a payment token.
///
/// A buyer posting a `Token` here is redirected to the payment page instead.
pub async fn online_payment_gateway(
    State(state): State<AppState>,
    Extension(prefix): Extension<BankPrefix>,
    ctx: RequestContext,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(token) = redirect_token(query.as_deref(), &headers, &body) {
        let target = match serde_urlencoded::to_string(&[("token", token.as_str())]) {
            Ok(query) => format!("{}{PATH_SEND_TOKEN}?{query}", prefix.as_str()),
            Err(e) => return ctx.error(AppError::internal(e.to_string())).into_response(),
        };
        return Redirect::temporary(&target).into_response();
    }

    let request: TokenRequest = match decode_body(&headers, &body) {
        Ok(request) => request,
        Err(e) => return gateway_error(e),
    };

    let repo = LifecycleRepository::new((*state.db).clone());
    match repo.issue_token(&request).await {
        Ok(transaction) => Json(TransactionResponse::issued(transaction.token)).into_response(),
        Err(LifecycleError::Gateway(e)) => gateway_error(e),
        Err(e) => ctx.error(e).into_response(),
    }
}

/// POST receipt endpoint - Look up a payment receipt.
pub async fn receipt(
    State(state): State<AppState>,
    ctx: RequestContext,
    FormOrJson(payload): FormOrJson<ReceiptRequest>,
) -> Result<Json<ReceiptResponse>, ApiError> {
    let repo = LifecycleRepository::new((*state.db).clone());
    let terminal_id = payload.terminal_number;
    let result = match payload.into_query() {
        Ok(query) => repo.receipt(&query).await,
        // An unknown terminal outranks a bad selector
        Err(e) => repo
            .ensure_terminal(terminal_id)
            .await
            .and(Err(LifecycleError::Gateway(e))),
    };

    match result {
        Ok(receipt) => Ok(Json(ReceiptResponse::found(receipt))),
        Err(LifecycleError::Gateway(e)) => Ok(Json(ReceiptResponse::failed(e))),
        Err(e) => Err(ctx.error(e)),
    }
}

/// POST verify endpoint - Confirm a submitted payment.
pub async fn verify_transaction(
    State(state): State<AppState>,
    ctx: RequestContext,
    FormOrJson(payload): FormOrJson<VerificationRequest>,
) -> Result<Json<VerificationResponse>, ApiError> {
    let repo = LifecycleRepository::new((*state.db).clone());
    let outcome = repo
        .verify(payload.terminal_number, &payload.ref_num)
        .await
        .map_err(|e| ctx.error(LifecycleError::from(e)))?;
    Ok(Json(outcome.into()))
}

/// POST reverse endpoint - Reverse a verified payment.
pub async fn reverse_transaction(
    State(state): State<AppState>,
    ctx: RequestContext,
    FormOrJson(payload): FormOrJson<VerificationRequest>,
) -> Result<Json<VerificationResponse>, ApiError> {
    let repo = LifecycleRepository::new((*state.db).clone());
    let outcome = repo
        .reverse(payload.terminal_number, &payload.ref_num)
        .await
        .map_err(|e| ctx.error(LifecycleError::from(e)))?;
    Ok(Json(outcome.into()))
}
