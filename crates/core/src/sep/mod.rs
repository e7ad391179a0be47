//! Saman (SEP) online payment gateway rules.
//!
//! # Modules
//!
//! - `types` - Wire-compatible domain types (TransactionStatus, TokenRequest, ...)
//! - `error` - Gateway and management error taxonomy with bank error codes
//! - `result_code` - Verify/reverse result codes and descriptions
//! - `card` - Card number masking and hashing
//! - `lifecycle` - Token, submission, verify, reverse and receipt rules

pub mod card;
pub mod error;
pub mod lifecycle;
pub mod result_code;
pub mod types;

#[cfg(test)]
mod lifecycle_props;

pub use card::{hash_card_number, mask_card_number};
pub use error::{ManagementError, SepError};
pub use lifecycle::LifecycleService;
pub use result_code::ResultCode;
pub use types::{
    CallbackData, CardSubmission, PaymentReceipt, PublicTokenInfo, ReceiptLookup, ReceiptQuery,
    SettlementState, SubmissionDeadlines, TokenDeadlines, TokenFinalization, TokenRequest,
    TokenTerms, TransactionDetail, TransactionStatus,
};
