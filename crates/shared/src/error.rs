//! Application-wide error types.
//!
//! An [`AppError`] separates *what* went wrong ([`ErrorKind`] plus a message)
//! from *how* it is surfaced (`status_code`). Business errors raised by the
//! payment engine convert into it; anything unclassified becomes
//! [`ErrorKind::Internal`].

use thiserror::Error;

/// Classification of an application error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or rejected input.
    Validation,
    /// The referenced terminal, token or transaction does not exist.
    NotFound,
    /// A time window (token expiry, verify/reverse deadline) has passed.
    Temporal,
    /// The operation was already performed.
    Idempotency,
    /// Store failures and anything unexpected.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status used when an error of this kind carries none.
    #[must_use]
    pub const fn default_status(self) -> u16 {
        match self {
            Self::Validation | Self::NotFound | Self::Temporal | Self::Idempotency => 400,
            Self::Internal => 500,
        }
    }

    /// Returns true for errors whose message may be shown to the caller.
    #[must_use]
    pub const fn is_business(self) -> bool {
        !matches!(self, Self::Internal)
    }
}

/// Tagged application error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    status_code: u16,
    message: String,
}

impl AppError {
    /// Creates an error whose status is the default for its kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: kind.default_status(),
            message: message.into(),
        }
    }

    /// Creates an unclassified error. Its message is logged, never returned.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if the error may be shown to the caller as-is.
    #[must_use]
    pub const fn is_business(&self) -> bool {
        self.kind.is_business()
    }
}
