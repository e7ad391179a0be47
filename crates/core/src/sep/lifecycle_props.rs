//! Property-based tests for LifecycleService.
//!
//! Randomized statuses, timestamps and token requests against the
//! lifecycle rules.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use crate::sep::error::SepError;
use crate::sep::lifecycle::LifecycleService;
use crate::sep::result_code::ResultCode;
use crate::sep::types::{SettlementState, TokenRequest, TransactionStatus};

/// Strategy for generating random TransactionStatus values.
fn arb_status() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        Just(TransactionStatus::InProgress),
        Just(TransactionStatus::CanceledByUser),
        Just(TransactionStatus::Ok),
        Just(TransactionStatus::Failed),
    ]
}

/// Strategy for instants within a few years of 2025.
fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (1_700_000_000i64..1_900_000_000i64).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

/// Strategy for statuses other than OK.
fn arb_closed_status() -> impl Strategy<Value = TransactionStatus> {
    arb_status().prop_map(|status| match status {
        TransactionStatus::Ok => TransactionStatus::Failed,
        other => other,
    })
}

/// Settlement state of a card submitted at `submitted_at`.
fn settlement(
    status: TransactionStatus,
    submitted_at: DateTime<Utc>,
    verified: bool,
    reversed: bool,
) -> SettlementState {
    let deadlines = LifecycleService::submission_deadlines(submitted_at);
    SettlementState {
        status,
        verify_deadline: Some(deadlines.verify_deadline),
        reverse_deadline: Some(deadlines.reverse_deadline),
        verified_at: verified.then_some(submitted_at),
        reversed_at: (verified && reversed).then_some(submitted_at),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Only OK transactions can ever be verified or reversed.
    #[test]
    fn prop_non_ok_is_not_found(
        status in arb_closed_status(),
        submitted_at in arb_instant(),
        verified in any::<bool>(),
        reversed in any::<bool>(),
        offset in 0i64..7200,
    ) {
        let state = settlement(status, submitted_at, verified, reversed);
        let now = submitted_at + Duration::seconds(offset);
        prop_assert_eq!(LifecycleService::check_verify(&state, now), Err(ResultCode::TransactionNotFound));
        prop_assert_eq!(LifecycleService::check_reverse(&state, now), Err(ResultCode::TransactionNotFound));
    }

    /// Reverse before verify is "not confirmed" regardless of deadlines.
    #[test]
    fn prop_reverse_requires_verification(
        submitted_at in arb_instant(),
        offset in 0i64..100_000,
    ) {
        let state = settlement(TransactionStatus::Ok, submitted_at, false, false);
        let now = submitted_at + Duration::seconds(offset);
        prop_assert_eq!(LifecycleService::check_reverse(&state, now), Err(ResultCode::NotConfirmed));
    }

    /// A verified transaction is never verifiable again.
    #[test]
    fn prop_verify_is_one_shot(
        submitted_at in arb_instant(),
        reversed in any::<bool>(),
        offset in 0i64..1800,
    ) {
        let state = settlement(TransactionStatus::Ok, submitted_at, true, reversed);
        let now = submitted_at + Duration::seconds(offset);
        let expected = if reversed { ResultCode::Reversed } else { ResultCode::Duplicate };
        prop_assert_eq!(LifecycleService::check_verify(&state, now), Err(expected));
    }

    /// Verify succeeds exactly inside the 30 minute window of a fresh submission.
    #[test]
    fn prop_verify_window(submitted_at in arb_instant(), offset in 0i64..3600) {
        let state = settlement(TransactionStatus::Ok, submitted_at, false, false);
        let now = submitted_at + Duration::seconds(offset);
        let result = LifecycleService::check_verify(&state, now);
        if offset <= 30 * 60 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(ResultCode::DeadlinePassed));
        }
    }

    /// Stored token lifetime is always inside [20, 3600] minutes.
    #[test]
    fn prop_token_expiry_clamped(minutes in any::<i32>(), now in arb_instant()) {
        let request = TokenRequest {
            action: "token".into(),
            terminal_id: "1".into(),
            amount: 1,
            res_num: "R".into(),
            redirect_url: "https://shop.example/".into(),
            token_expiry_in_min: minutes,
            ..TokenRequest::default()
        };
        let terms = LifecycleService::validate_token_request(&request).unwrap();
        prop_assert!((20..=3600).contains(&terms.token_expiry_minutes));

        let deadlines = LifecycleService::token_deadlines(now, terms.token_expiry_minutes);
        prop_assert!(deadlines.expires_at >= now + Duration::minutes(20));
        prop_assert!(deadlines.expires_at <= now + Duration::minutes(3600));
    }

    /// Non-positive amounts are always rejected as InvalidAmount.
    #[test]
    fn prop_non_positive_amount_rejected(amount in i64::MIN..=0) {
        let request = TokenRequest {
            action: "token".into(),
            amount,
            ..TokenRequest::default()
        };
        prop_assert_eq!(
            LifecycleService::validate_token_request(&request).unwrap_err(),
            SepError::InvalidAmount
        );
    }
}
