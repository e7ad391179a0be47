//! Saman gateway error taxonomy.
//!
//! [`SepError`] carries the bank's numeric error code for the token and
//! receipt endpoints. [`ManagementError`] covers the buyer-facing payment
//! page and terminal management, which the bank does not number.

use irbankmock_shared::{AppError, ErrorKind};
use thiserror::Error;

/// Errors reported with a bank error code.
///
/// The display text is the bank's error name and is sent verbatim as
/// `errorDesc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SepError {
    /// Body could not be decoded.
    #[error("InvalidRequest")]
    InvalidRequest,
    /// `action` was not `"token"`.
    #[error("InvalidAction")]
    InvalidAction,
    /// Amount was zero or negative.
    #[error("InvalidAmount")]
    InvalidAmount,
    /// Cell number is not a local mobile number.
    #[error("InvalidPhoneNumber")]
    InvalidPhoneNumber,
    /// More than 10 card hashes.
    #[error("InvalidNumberOfCards")]
    InvalidNumberOfCards,
    /// An empty card hash in the list.
    #[error("InvalidCardHash")]
    InvalidCardHash,
    /// Redirect URL is not an absolute URL with a host.
    #[error("InvalidRedirectURL")]
    InvalidRedirectUrl,
    /// Redirect URL scheme is not http or https.
    #[error("InvalidRedirectURLScheme")]
    InvalidRedirectUrlScheme,
    /// Reservation number is blank.
    #[error("EmptyResNum")]
    EmptyResNum,
    /// Reservation number already used on this terminal.
    #[error("DuplicateResNum")]
    DuplicateResNum,
    /// Terminal does not exist.
    #[error("TerminalNotFound")]
    TerminalNotFound,
    /// Receipt not found, expired or not matching the query.
    #[error("ResourceNotFound")]
    ResourceNotFound,
}

impl SepError {
    /// Returns the bank error code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidRequest => -1,
            Self::InvalidAction
            | Self::InvalidAmount
            | Self::InvalidPhoneNumber
            | Self::InvalidNumberOfCards
            | Self::InvalidCardHash
            | Self::InvalidRedirectUrl
            | Self::InvalidRedirectUrlScheme
            | Self::EmptyResNum
            | Self::DuplicateResNum => 5,
            Self::TerminalNotFound => 12,
            Self::ResourceNotFound => 404,
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::InvalidRequest
            | Self::InvalidAction
            | Self::InvalidAmount
            | Self::InvalidPhoneNumber
            | Self::InvalidNumberOfCards
            | Self::InvalidCardHash
            | Self::InvalidRedirectUrl
            | Self::InvalidRedirectUrlScheme
            | Self::EmptyResNum => ErrorKind::Validation,
            Self::DuplicateResNum => ErrorKind::Idempotency,
            Self::TerminalNotFound | Self::ResourceNotFound => ErrorKind::NotFound,
        }
    }
}

impl From<SepError> for AppError {
    fn from(err: SepError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Errors from terminal management and the buyer-facing payment page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ManagementError {
    /// Terminal name is blank.
    #[error("name can't be empty")]
    EmptyName,
    /// Terminal name contains a denied character.
    #[error("name is not valid")]
    InvalidName,
    /// No transaction has this token.
    #[error("token not found")]
    TokenNotFound,
    /// Token lifetime has passed.
    #[error("token expired")]
    TokenExpired,
    /// Token was already submitted, cancelled or failed.
    #[error("token is no longer available")]
    TokenNoLongerAvailable,
    /// No open transaction has this token.
    #[error("transaction not found")]
    TransactionNotFound,
}

impl ManagementError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::EmptyName | Self::InvalidName => ErrorKind::Validation,
            Self::TokenNotFound | Self::TransactionNotFound => ErrorKind::NotFound,
            Self::TokenExpired => ErrorKind::Temporal,
            Self::TokenNoLongerAvailable => ErrorKind::Idempotency,
        }
    }
}

impl From<ManagementError> for AppError {
    fn from(err: ManagementError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SepError::InvalidRequest, -1, "InvalidRequest")]
    #[case(SepError::InvalidAction, 5, "InvalidAction")]
    #[case(SepError::InvalidAmount, 5, "InvalidAmount")]
    #[case(SepError::InvalidPhoneNumber, 5, "InvalidPhoneNumber")]
    #[case(SepError::InvalidNumberOfCards, 5, "InvalidNumberOfCards")]
    #[case(SepError::InvalidCardHash, 5, "InvalidCardHash")]
    #[case(SepError::InvalidRedirectUrl, 5, "InvalidRedirectURL")]
    #[case(SepError::InvalidRedirectUrlScheme, 5, "InvalidRedirectURLScheme")]
    #[case(SepError::EmptyResNum, 5, "EmptyResNum")]
    #[case(SepError::DuplicateResNum, 5, "DuplicateResNum")]
    #[case(SepError::TerminalNotFound, 12, "TerminalNotFound")]
    #[case(SepError::ResourceNotFound, 404, "ResourceNotFound")]
    fn test_sep_error_codes(#[case] err: SepError, #[case] code: i32, #[case] desc: &str) {
        assert_eq!(err.code(), code);
        assert_eq!(err.to_string(), desc);
    }

    #[test]
    fn test_sep_error_kinds() {
        assert_eq!(SepError::InvalidAmount.kind(), ErrorKind::Validation);
        assert_eq!(SepError::DuplicateResNum.kind(), ErrorKind::Idempotency);
        assert_eq!(SepError::TerminalNotFound.kind(), ErrorKind::NotFound);
    }

    #[rstest]
    #[case(ManagementError::EmptyName, ErrorKind::Validation, "name can't be empty")]
    #[case(ManagementError::InvalidName, ErrorKind::Validation, "name is not valid")]
    #[case(ManagementError::TokenNotFound, ErrorKind::NotFound, "token not found")]
    #[case(ManagementError::TokenExpired, ErrorKind::Temporal, "token expired")]
    #[case(ManagementError::TokenNoLongerAvailable, ErrorKind::Idempotency, "token is no longer available")]
    #[case(ManagementError::TransactionNotFound, ErrorKind::NotFound, "transaction not found")]
    fn test_management_error_into_app_error(
        #[case] err: ManagementError,
        #[case] kind: ErrorKind,
        #[case] message: &str,
    ) {
        let app: AppError = err.into();
        assert_eq!(app.kind(), kind);
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.message(), message);
    }
}
