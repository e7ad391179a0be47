//! Verify and reverse result codes.
//!
//! These endpoints never fail at the transport level; every outcome is a
//! `ResultCode` in the response body. Descriptions are the bank's Persian
//! texts and must not be altered.

use std::fmt;

/// Outcome of a verify or reverse request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// Operation performed.
    Success,
    /// Already verified.
    Duplicate,
    /// Reverse requested before verification.
    NotConfirmed,
    /// The transaction was reversed.
    Reversed,
    /// No submitted transaction matches. Also covers "never existed" and
    /// "not yet submitted".
    TransactionNotFound,
    /// The verify or reverse window has closed.
    DeadlinePassed,
    /// Terminal does not exist.
    TerminalNotFound,
}

impl ResultCode {
    /// Returns the bank's numeric result code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Duplicate | Self::NotConfirmed => 2,
            Self::Reversed => 5,
            Self::TransactionNotFound => -2,
            Self::DeadlinePassed => -6,
            Self::TerminalNotFound => -105,
        }
    }

    /// Returns the bank's result description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "عملیات با موفقیت انجام شد",
            Self::Duplicate => "درخواست تکراری می باشد",
            Self::NotConfirmed => "تراکنش هنوز تایید نشده است",
            Self::Reversed => "تراکنش برگشت خورده می باشد",
            Self::TransactionNotFound => "تراکنش یافت نشد",
            Self::DeadlinePassed => "بیش از نیم ساعت از زمان اجرای تراکنش گذشته است",
            Self::TerminalNotFound => "ترمینال ارسالی در سیستم موجود نمی باشد",
        }
    }

    /// Returns true only for [`ResultCode::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}
