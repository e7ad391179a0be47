//! Payment lifecycle rules.
//!
//! Transaction lifecycle:
//! - InProgress → OK (card submitted)
//! - InProgress → CanceledByUser (buyer cancelled)
//! - InProgress → Failed (payment failed)
//! - OK: verified-at, then reversed-at, each set at most once
//!
//! The store applies each transition with a conditional write; the checks
//! here decide which result the caller sees.

use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::sep::error::{ManagementError, SepError};
use crate::sep::result_code::ResultCode;
use crate::sep::types::{
    SettlementState, SubmissionDeadlines, TokenDeadlines, TokenRequest, TokenTerms,
    TransactionStatus,
};
use crate::validation::{
    UrlError, clamp_token_expiry_minutes, is_valid_phone_number, split_card_hashes,
    validate_redirect_url,
};

/// Only supported value of `action`.
pub const TOKEN_ACTION: &str = "token";

/// Maximum number of card hashes a token may be restricted to.
pub const MAX_CARD_HASHES: usize = 10;

/// How long a receipt stays retrievable after token issuance, in minutes.
pub const RECEIPT_TTL_MINUTES: i64 = 60;

/// How long after submission the merchant may verify, in minutes.
pub const VERIFY_WINDOW_MINUTES: i64 = 30;

/// How long after submission the merchant may reverse, in minutes.
pub const REVERSE_WINDOW_MINUTES: i64 = 50;

/// Stateless rules for the payment lifecycle.
pub struct LifecycleService;

impl LifecycleService {
    /// Validates a token request, first failing rule wins.
    ///
    /// The token lifetime is clamped rather than rejected. Terminal
    /// existence is checked by the caller against the store.
    pub fn validate_token_request(request: &TokenRequest) -> Result<TokenTerms, SepError> {
        if request.action != TOKEN_ACTION {
            return Err(SepError::InvalidAction);
        }
        if request.amount <= 0 {
            return Err(SepError::InvalidAmount);
        }
        if let Some(cell) = &request.cell_number {
            if !is_valid_phone_number(cell) {
                return Err(SepError::InvalidPhoneNumber);
            }
        }
        if let Some(list) = &request.hashed_card_number {
            let hashes = split_card_hashes(list);
            if hashes.len() > MAX_CARD_HASHES {
                return Err(SepError::InvalidNumberOfCards);
            }
            if hashes.iter().any(|h| h.is_empty()) {
                return Err(SepError::InvalidCardHash);
            }
        }
        validate_redirect_url(&request.redirect_url).map_err(|e| match e {
            UrlError::Malformed => SepError::InvalidRedirectUrl,
            UrlError::UnsupportedScheme => SepError::InvalidRedirectUrlScheme,
        })?;
        if request.res_num.trim().is_empty() {
            return Err(SepError::EmptyResNum);
        }

        let token_expiry_minutes = clamp_token_expiry_minutes(request.token_expiry_in_min);
        let terminal_id = request
            .terminal_id
            .trim()
            .parse::<i64>()
            .map_err(|_| SepError::TerminalNotFound)?;

        Ok(TokenTerms {
            terminal_id,
            token_expiry_minutes,
        })
    }

    /// Deadlines of a token issued at `now`.
    #[must_use]
    pub fn token_deadlines(now: DateTime<Utc>, expiry_minutes: i32) -> TokenDeadlines {
        TokenDeadlines {
            expires_at: now + Duration::minutes(i64::from(expiry_minutes)),
            receipt_expires_at: now + Duration::minutes(RECEIPT_TTL_MINUTES),
        }
    }

    /// Checks that a token can still be shown on the payment page.
    pub fn check_token_available(
        status: TransactionStatus,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), ManagementError> {
        if expires_at < now {
            return Err(ManagementError::TokenExpired);
        }
        if !status.is_open() {
            return Err(ManagementError::TokenNoLongerAvailable);
        }
        Ok(())
    }

    /// Verify and reverse deadlines of a card submitted at `submitted_at`.
    #[must_use]
    pub fn submission_deadlines(submitted_at: DateTime<Utc>) -> SubmissionDeadlines {
        SubmissionDeadlines {
            verify_deadline: submitted_at + Duration::minutes(VERIFY_WINDOW_MINUTES),
            reverse_deadline: submitted_at + Duration::minutes(REVERSE_WINDOW_MINUTES),
        }
    }

    /// Decides whether a transaction may be verified at `now`.
    pub fn check_verify(state: &SettlementState, now: DateTime<Utc>) -> Result<(), ResultCode> {
        if state.status != TransactionStatus::Ok {
            return Err(ResultCode::TransactionNotFound);
        }
        if deadline_passed(state.verify_deadline, now) {
            return Err(ResultCode::DeadlinePassed);
        }
        if state.reversed_at.is_some() {
            return Err(ResultCode::Reversed);
        }
        if state.verified_at.is_some() {
            return Err(ResultCode::Duplicate);
        }
        Ok(())
    }

    /// Decides whether a transaction may be reversed at `now`.
    ///
    /// An unverified transaction is reported as not confirmed whatever its
    /// deadlines.
    pub fn check_reverse(state: &SettlementState, now: DateTime<Utc>) -> Result<(), ResultCode> {
        if state.status != TransactionStatus::Ok {
            return Err(ResultCode::TransactionNotFound);
        }
        if state.verified_at.is_none() {
            return Err(ResultCode::NotConfirmed);
        }
        if deadline_passed(state.reverse_deadline, now) {
            return Err(ResultCode::DeadlinePassed);
        }
        if state.reversed_at.is_some() {
            return Err(ResultCode::Reversed);
        }
        Ok(())
    }

    /// Checks that a receipt is still retrievable. Expired receipts are
    /// indistinguishable from missing ones.
    pub fn check_receipt(
        receipt_expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), SepError> {
        if receipt_expires_at < now {
            return Err(SepError::ResourceNotFound);
        }
        Ok(())
    }

    /// Builds the merchant redirect: `Token`, then `RefNum` when given, are
    /// set as query parameters, replacing any existing values.
    pub fn finalize_redirect(
        redirect_url: &str,
        token: &str,
        ref_num: Option<&str>,
    ) -> Result<String, url::ParseError> {
        let mut url = Url::parse(redirect_url)?;
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "Token" && k != "RefNum")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (k, v) in &kept {
                query.append_pair(k, v);
            }
            query.append_pair("Token", token);
            if let Some(ref_num) = ref_num {
                query.append_pair("RefNum", ref_num);
            }
        }

        Ok(url.into())
    }
}

/// A missing deadline counts as passed.
fn deadline_passed(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    deadline.is_none_or(|d| d < now)
}
