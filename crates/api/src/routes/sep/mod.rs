//! Saman (SEP) bank adapter.
//!
//! Maps the lifecycle repository onto the bank's documented endpoint paths
//! and wire shapes. Mounted by the registry under `/api/banks/saman`.

use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::AppState;

pub mod gateway;
pub mod management;

/// Registry name of this bank.
pub const BANK_NAME: &str = "saman";

/// Token request endpoint.
pub const PATH_ONLINE_PAYMENT_GATEWAY: &str = "/OnlinePG/OnlinePG";
/// Buyer redirect target carrying the token. Served by the web app.
pub const PATH_SEND_TOKEN: &str = "/OnlinePG/SendToken";
/// Receipt endpoint.
pub const PATH_RECEIPT: &str = "/verifyTxnRandomSessionkey/api/v2/ipg/payment/receipt";
/// Verify endpoint.
pub const PATH_VERIFY_TRANSACTION: &str = "/verifyTxnRandomSessionkey/ipg/VerifyTransaction";
/// Reverse endpoint.
pub const PATH_REVERSE_TRANSACTION: &str = "/verifyTxnRandomSessionkey/ipg/ReverseTransaction";

/// Fully-qualified endpoint URLs reported to merchants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    /// Token request URL.
    pub payment_gateway: String,
    /// Buyer redirect URL.
    pub payment_token: String,
    /// Receipt URL.
    pub receipt: String,
    /// Verify URL.
    pub verify_transaction: String,
    /// Reverse URL.
    pub reverse_transaction: String,
}

impl Endpoints {
    /// Builds the endpoint URLs from the public hostname and mount prefix.
    #[must_use]
    pub fn new(public_hostname: &str, prefix: &str) -> Self {
        let url = |path: &str| format!("{public_hostname}{prefix}{path}");
        Self {
            payment_gateway: url(PATH_ONLINE_PAYMENT_GATEWAY),
            payment_token: url(PATH_SEND_TOKEN),
            receipt: url(PATH_RECEIPT),
            verify_transaction: url(PATH_VERIFY_TRANSACTION),
            reverse_transaction: url(PATH_REVERSE_TRANSACTION),
        }
    }
}

/// Adds the Saman routes to `router`.
pub fn configure(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/management/terminal",
            post(management::create_terminal).get(management::get_terminals),
        )
        .route("/public/token", get(management::token_info))
        .route("/management/token/submit", post(management::submit_token))
        .route("/management/token/cancel", post(management::cancel_token))
        .route("/management/token/fail", post(management::fail_token))
        .route(PATH_ONLINE_PAYMENT_GATEWAY, post(gateway::online_payment_gateway))
        .route(PATH_RECEIPT, post(gateway::receipt))
        .route(PATH_VERIFY_TRANSACTION, post(gateway::verify_transaction))
        .route(PATH_REVERSE_TRANSACTION, post(gateway::reverse_transaction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_concatenate_hostname_and_prefix() {
        let endpoints = Endpoints::new("https://bank.test", "/api/banks/saman");
        assert_eq!(
            endpoints.payment_gateway,
            "https://bank.test/api/banks/saman/OnlinePG/OnlinePG"
        );
        assert_eq!(
            endpoints.verify_transaction,
            "https://bank.test/api/banks/saman/verifyTxnRandomSessionkey/ipg/VerifyTransaction"
        );
    }
}
