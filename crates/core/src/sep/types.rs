//! Saman gateway domain types.
//!
//! The request and payload structs here are the bank's own data shapes, so
//! they carry the bank's field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction status as stored and reported by the bank.
///
/// The numeric codes are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Token issued, waiting for the buyer.
    InProgress,
    /// The buyer cancelled on the payment page.
    CanceledByUser,
    /// Card submitted successfully. Verify and reverse start from here.
    Ok,
    /// The payment failed on the payment page.
    Failed,
}

impl TransactionStatus {
    /// Returns the bank's numeric status code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::InProgress => 0,
            Self::CanceledByUser => 1,
            Self::Ok => 2,
            Self::Failed => 3,
        }
    }

    /// Parses a numeric status code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::InProgress),
            1 => Some(Self::CanceledByUser),
            2 => Some(Self::Ok),
            3 => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns the bank's state name for this status.
    #[must_use]
    pub const fn state(self) -> &'static str {
        match self {
            Self::InProgress => "InProgress",
            Self::CanceledByUser => "CanceledByUser",
            Self::Ok => "OK",
            Self::Failed => "Failed",
        }
    }

    /// Returns true while the token may still be paid, cancelled or failed.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.state())
    }
}

/// Payment token request sent by a merchant to `OnlinePG/OnlinePG`.
///
/// Field names follow the documented camelCase spelling; the bank's
/// PascalCase spelling is accepted as an alias.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    /// Must be `"token"`.
    #[serde(default, alias = "Action")]
    pub action: String,
    /// Terminal (merchant) id, as text.
    #[serde(default, alias = "TerminalId")]
    pub terminal_id: String,
    /// Amount in minor currency units (IRR).
    #[serde(default, alias = "Amount")]
    pub amount: i64,
    /// Merchant reservation number, unique per terminal.
    #[serde(default, alias = "ResNum")]
    pub res_num: String,
    /// Optional reporting reservation number.
    #[serde(default, alias = "ResNum1")]
    pub res_num1: Option<String>,
    /// Optional reporting reservation number.
    #[serde(default, alias = "ResNum2")]
    pub res_num2: Option<String>,
    /// Optional reporting reservation number.
    #[serde(default, alias = "ResNum3")]
    pub res_num3: Option<String>,
    /// Optional reporting reservation number.
    #[serde(default, alias = "ResNum4")]
    pub res_num4: Option<String>,
    /// Where the buyer is sent once the payment is finalized.
    #[serde(default, rename = "redirectURL", alias = "RedirectURL", alias = "RedirectUrl", alias = "redirectUrl")]
    pub redirect_url: String,
    /// Optional fee for partnership programs.
    #[serde(default, alias = "Wage")]
    pub wage: Option<i64>,
    /// Amount actually deducted from the card. Informational only.
    #[serde(default, alias = "AffectiveAmount")]
    pub affective_amount: Option<i64>,
    /// Optional buyer mobile number.
    #[serde(default, alias = "CellNumber")]
    pub cell_number: Option<String>,
    /// Requested token lifetime in minutes. Clamped, never rejected.
    #[serde(default, alias = "TokenExpiryInMin")]
    pub token_expiry_in_min: i32,
    /// Up to 10 card hashes separated by `|`, `,` or `;`.
    #[serde(default, alias = "HashedCardNumber")]
    pub hashed_card_number: Option<String>,
    /// Caller-chosen key that must be presented to fetch the receipt.
    #[serde(default, alias = "TxnRandomSessionKey")]
    pub txn_random_session_key: Option<i64>,
}

/// Normalized values derived from a valid [`TokenRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTerms {
    /// Parsed terminal id.
    pub terminal_id: i64,
    /// Token lifetime after clamping.
    pub token_expiry_minutes: i32,
}

/// Deadlines fixed when a token is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDeadlines {
    /// End of the token's validity.
    pub expires_at: DateTime<Utc>,
    /// End of receipt availability.
    pub receipt_expires_at: DateTime<Utc>,
}

/// Deadlines fixed when a card is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionDeadlines {
    /// Last moment the merchant may verify.
    pub verify_deadline: DateTime<Utc>,
    /// Last moment the merchant may reverse.
    pub reverse_deadline: DateTime<Utc>,
}

/// The settlement-related part of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementState {
    /// Current status.
    pub status: TransactionStatus,
    /// Verify deadline, set on submission.
    pub verify_deadline: Option<DateTime<Utc>>,
    /// Reverse deadline, set on submission.
    pub reverse_deadline: Option<DateTime<Utc>>,
    /// When the merchant verified.
    pub verified_at: Option<DateTime<Utc>>,
    /// When the merchant reversed.
    pub reversed_at: Option<DateTime<Utc>>,
}

/// Card details entered on the payment page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSubmission {
    /// Token being paid.
    pub token: String,
    /// Card number (PAN).
    #[serde(default)]
    pub card_number: String,
    /// Card verification value.
    #[serde(default)]
    pub cvv: i32,
    /// Expiry month.
    #[serde(default)]
    pub expiry_month: i32,
    /// Expiry year.
    #[serde(default)]
    pub expiry_year: i32,
    /// Internet payment password.
    #[serde(default)]
    pub card_password: String,
    /// Captcha answer.
    #[serde(default)]
    pub captcha: String,
}

/// Data a buyer-facing payment page may see about a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTokenInfo {
    /// Merchant display name.
    pub terminal_name: String,
    /// Merchant terminal id.
    pub terminal_id: i64,
    /// Merchant website.
    pub website: String,
    /// Amount to pay.
    pub amount: i64,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

/// Payload posted back to the merchant when a token is finalized.
///
/// Every value is a string; fields that do not apply are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackData {
    /// Merchant id.
    #[serde(rename = "MID")]
    pub mid: String,
    /// Terminal id.
    pub terminal_id: String,
    /// State name.
    pub state: String,
    /// Numeric status.
    pub status: String,
    /// Retrieval reference number.
    pub rrn: String,
    /// Bank reference number.
    pub ref_num: String,
    /// Merchant reservation number.
    pub res_num: String,
    /// Trace number.
    pub trace_no: String,
    /// Amount.
    pub amount: String,
    /// Affective amount.
    pub affective_amount: String,
    /// Wage.
    pub wage: String,
    /// Masked card number.
    pub secure_pan: String,
    /// SHA-256 of the card number.
    pub hashed_card_number: String,
    /// Token.
    pub token: String,
}

/// Result of submitting, cancelling or failing a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenFinalization {
    /// Merchant redirect URL with `Token` (and `RefNum`) appended.
    #[serde(rename = "redirectURL")]
    pub redirect_url: String,
    /// Payload for the merchant callback.
    pub callback_data: CallbackData,
}

/// Transaction detail returned by verify and reverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionDetail {
    /// Retrieval reference number.
    #[serde(rename = "RRN")]
    pub rrn: String,
    /// Bank reference number.
    pub ref_num: String,
    /// Masked card number.
    pub masked_pan: String,
    /// SHA-256 of the card number.
    pub hashed_pan: String,
    /// Terminal id.
    pub terminal_number: i64,
    /// Requested amount.
    pub original_amount: i64,
    /// Deducted amount.
    pub affective_amount: i64,
    /// Trace date.
    pub strace_date: DateTime<Utc>,
    /// Trace number.
    pub strace_no: i64,
}

/// Receipt view of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentReceipt {
    /// State name.
    pub state: String,
    /// Numeric status.
    pub status: i32,
    /// Terminal id.
    pub terminal_id: i64,
    /// Token.
    pub token: String,
    /// Bank reference number, empty until submission.
    pub ref_num: String,
    /// Merchant reservation number.
    pub res_num: String,
    /// Trace number, zero until submission.
    pub trace_no: i64,
    /// Requested amount.
    pub amount: i64,
    /// Deducted amount; the requested amount when none was given.
    pub affective_amount: i64,
    /// Retrieval reference number, zero until submission.
    pub rrn: i64,
    /// SHA-256 of the card number, empty until submission.
    pub hashed_card_number: String,
}

/// How a receipt query identifies the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptLookup {
    /// By bank reference number.
    RefNum(String),
    /// By token.
    Token(String),
}

/// Receipt query after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptQuery {
    /// Terminal asking for the receipt.
    pub terminal_id: i64,
    /// Transaction selector.
    pub lookup: ReceiptLookup,
    /// Must match the key given at token issuance, if any.
    pub session_key: Option<i64>,
    /// Must match the transaction's RRN when given.
    pub rrn: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            TransactionStatus::InProgress,
            TransactionStatus::CanceledByUser,
            TransactionStatus::Ok,
            TransactionStatus::Failed,
        ] {
            assert_eq!(TransactionStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(TransactionStatus::from_code(9), None);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(TransactionStatus::Ok.state(), "OK");
        assert_eq!(TransactionStatus::CanceledByUser.to_string(), "CanceledByUser");
        assert!(TransactionStatus::InProgress.is_open());
        assert!(!TransactionStatus::Failed.is_open());
    }

    #[test]
    fn test_token_request_accepts_both_spellings() {
        let camel: TokenRequest = serde_json::from_str(
            r#"{"action":"token","terminalId":"7","amount":10000,"resNum":"R1",
                "redirectURL":"https://shop.example/done","tokenExpiryInMin":15}"#,
        )
        .unwrap();
        let pascal: TokenRequest = serde_json::from_str(
            r#"{"Action":"token","TerminalId":"7","Amount":10000,"ResNum":"R1",
                "RedirectUrl":"https://shop.example/done","TokenExpiryInMin":15}"#,
        )
        .unwrap();

        assert_eq!(camel.terminal_id, "7");
        assert_eq!(pascal.terminal_id, "7");
        assert_eq!(camel.redirect_url, pascal.redirect_url);
        assert_eq!(pascal.token_expiry_in_min, 15);
    }

    #[test]
    fn test_callback_field_names() {
        let value = serde_json::to_value(CallbackData {
            mid: "1".into(),
            ref_num: "abc".into(),
            ..CallbackData::default()
        })
        .unwrap();
        assert_eq!(value["MID"], "1");
        assert_eq!(value["refNum"], "abc");
        assert_eq!(value["securePan"], "");
    }
}
