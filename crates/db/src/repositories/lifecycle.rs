//! Payment lifecycle store.
//!
//! Every state change is a single conditional `UPDATE` whose `WHERE` clause
//! restates the precondition. Zero affected rows means the transaction was
//! not in the expected state when the write ran, whoever got there first.

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use thiserror::Error;
use uuid::Uuid;

use irbankmock_core::sep::{
    CallbackData, CardSubmission, LifecycleService, ManagementError, PaymentReceipt,
    PublicTokenInfo, ReceiptLookup, ReceiptQuery, ResultCode, SepError, SettlementState,
    TokenFinalization, TokenRequest, TransactionDetail, TransactionStatus, hash_card_number,
    mask_card_number,
};
use irbankmock_shared::AppError;

use crate::entities::{
    bank_sep_terminals, bank_sep_transactions, sea_orm_active_enums::PaymentStatus,
};

/// Website reported to the payment page for every terminal.
pub const MOCK_WEBSITE: &str = "mock.example.com";

const REF_NUM_LENGTH: usize = 21;
const MAX_TRACE_NO: i64 = 1_000_000;

/// Lifecycle operation errors.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Error with a bank error code.
    #[error(transparent)]
    Gateway(#[from] SepError),

    /// Payment page error.
    #[error(transparent)]
    Management(#[from] ManagementError),

    /// A stored redirect URL no longer parses.
    #[error("Invalid stored redirect URL: {0}")]
    RedirectUrl(#[from] url::ParseError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Gateway(e) => e.into(),
            LifecycleError::Management(e) => e.into(),
            LifecycleError::RedirectUrl(e) => Self::internal(e.to_string()),
            LifecycleError::Database(e) => Self::internal(e.to_string()),
        }
    }
}

/// Outcome of a verify or reverse request.
///
/// `detail` is present whenever a submitted transaction was located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOutcome {
    /// Result code.
    pub result: ResultCode,
    /// Transaction detail.
    pub detail: Option<TransactionDetail>,
}

impl SettlementOutcome {
    const fn rejected(result: ResultCode) -> Self {
        Self {
            result,
            detail: None,
        }
    }
}

/// Bank-generated identifiers assigned on submission.
struct BankReferences {
    ref_num: String,
    rrn: i64,
    trace_no: i64,
}

impl BankReferences {
    fn generate() -> Self {
        let mut rng = rand::rng();
        let ref_num = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(REF_NUM_LENGTH)
            .map(char::from)
            .collect();
        Self {
            ref_num,
            rrn: rng.random_range(0..i64::MAX),
            trace_no: rng.random_range(0..MAX_TRACE_NO),
        }
    }
}

/// Payment lifecycle repository.
#[derive(Debug, Clone)]
pub struct LifecycleRepository {
    db: DatabaseConnection,
}

impl LifecycleRepository {
    /// Creates a new lifecycle repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues a payment token.
    ///
    /// Nothing is written unless every rule passes and the terminal exists.
    pub async fn issue_token(
        &self,
        request: &TokenRequest,
    ) -> Result<bank_sep_transactions::Model, LifecycleError> {
        let terms = LifecycleService::validate_token_request(request).inspect_err(|e| {
            tracing::debug!(error = %e, terminal_id = %request.terminal_id, "Token request rejected");
        })?;

        if self.find_terminal(terms.terminal_id).await?.is_none() {
            tracing::debug!(terminal_id = terms.terminal_id, "Token request for unknown terminal");
            return Err(SepError::TerminalNotFound.into());
        }

        let now = Utc::now();
        let deadlines = LifecycleService::token_deadlines(now, terms.token_expiry_minutes);

        let transaction = bank_sep_transactions::ActiveModel {
            terminal_id: Set(terms.terminal_id),
            token: Set(Uuid::new_v4().to_string()),
            amount: Set(request.amount),
            wage: Set(request.wage),
            affective_amount: Set(request.affective_amount),
            res_num: Set(request.res_num.clone()),
            res_num1: Set(request.res_num1.clone()),
            res_num2: Set(request.res_num2.clone()),
            res_num3: Set(request.res_num3.clone()),
            res_num4: Set(request.res_num4.clone()),
            redirect_url: Set(request.redirect_url.clone()),
            cell_number: Set(request.cell_number.clone()),
            token_expiry_in_min: Set(terms.token_expiry_minutes),
            allowed_card_hashes: Set(request.hashed_card_number.clone()),
            txn_random_session_key: Set(request.txn_random_session_key),
            status: Set(PaymentStatus::InProgress),
            created_at: Set(now),
            token_expires_at: Set(deadlines.expires_at),
            receipt_expires_at: Set(deadlines.receipt_expires_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => SepError::DuplicateResNum.into(),
            _ => LifecycleError::Database(e),
        })?;

        tracing::info!(
            terminal_id = transaction.terminal_id,
            transaction_id = transaction.id,
            expiry_minutes = transaction.token_expiry_in_min,
            "Token issued"
        );
        Ok(transaction)
    }

    /// Returns what the payment page may show about a token.
    pub async fn public_token_info(&self, token: &str) -> Result<PublicTokenInfo, LifecycleError> {
        let (transaction, terminal) = bank_sep_transactions::Entity::find()
            .filter(bank_sep_transactions::Column::Token.eq(token))
            .find_also_related(bank_sep_terminals::Entity)
            .one(&self.db)
            .await?
            .ok_or(ManagementError::TokenNotFound)?;

        LifecycleService::check_token_available(
            transaction.status.into(),
            transaction.token_expires_at,
            Utc::now(),
        )?;
        let terminal = terminal.ok_or(ManagementError::TokenNotFound)?;

        Ok(PublicTokenInfo {
            terminal_name: terminal.name,
            terminal_id: terminal.id,
            website: MOCK_WEBSITE.to_string(),
            amount: transaction.amount,
            expires_at: transaction.token_expires_at,
        })
    }

    /// Records a card submission and moves the transaction to OK.
    ///
    /// Only the masked card number and its hash are stored.
    pub async fn submit(&self, card: &CardSubmission) -> Result<TokenFinalization, LifecycleError> {
        let now = Utc::now();
        let deadlines = LifecycleService::submission_deadlines(now);
        let references = BankReferences::generate();

        let result = bank_sep_transactions::Entity::update_many()
            .col_expr(
                bank_sep_transactions::Column::Status,
                Expr::value(PaymentStatus::Ok),
            )
            .col_expr(bank_sep_transactions::Column::SubmittedAt, Expr::value(now))
            .col_expr(
                bank_sep_transactions::Column::VerifyDeadline,
                Expr::value(deadlines.verify_deadline),
            )
            .col_expr(
                bank_sep_transactions::Column::ReverseDeadline,
                Expr::value(deadlines.reverse_deadline),
            )
            .col_expr(
                bank_sep_transactions::Column::PaidCardNumber,
                Expr::value(mask_card_number(&card.card_number)),
            )
            .col_expr(
                bank_sep_transactions::Column::HashedCardNumber,
                Expr::value(hash_card_number(&card.card_number)),
            )
            .col_expr(bank_sep_transactions::Column::TraceNo, Expr::value(references.trace_no))
            .col_expr(bank_sep_transactions::Column::TraceDate, Expr::value(now))
            .col_expr(
                bank_sep_transactions::Column::RefNum,
                Expr::value(references.ref_num.clone()),
            )
            .col_expr(bank_sep_transactions::Column::Rrn, Expr::value(references.rrn))
            .filter(bank_sep_transactions::Column::Token.eq(card.token.as_str()))
            .filter(bank_sep_transactions::Column::Status.eq(PaymentStatus::InProgress))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            tracing::debug!("Card submission for a missing or finalized token");
            return Err(ManagementError::TransactionNotFound.into());
        }

        let transaction = self
            .find_by_token(&card.token)
            .await?
            .ok_or(ManagementError::TransactionNotFound)?;

        tracing::info!(
            terminal_id = transaction.terminal_id,
            transaction_id = transaction.id,
            "Card submitted"
        );
        Ok(finalization(&transaction, Some(&references.ref_num))?)
    }

    /// Marks an open transaction as cancelled by the buyer.
    pub async fn cancel(&self, token: &str) -> Result<TokenFinalization, LifecycleError> {
        self.close(
            token,
            PaymentStatus::CanceledByUser,
            bank_sep_transactions::Column::CancelledAt,
        )
        .await
    }

    /// Marks an open transaction as failed.
    pub async fn fail(&self, token: &str) -> Result<TokenFinalization, LifecycleError> {
        self.close(
            token,
            PaymentStatus::Failed,
            bank_sep_transactions::Column::FailedAt,
        )
        .await
    }

    async fn close(
        &self,
        token: &str,
        status: PaymentStatus,
        stamp: bank_sep_transactions::Column,
    ) -> Result<TokenFinalization, LifecycleError> {
        let result = bank_sep_transactions::Entity::update_many()
            .col_expr(bank_sep_transactions::Column::Status, Expr::value(status))
            .col_expr(stamp, Expr::value(Utc::now()))
            .filter(bank_sep_transactions::Column::Token.eq(token))
            .filter(bank_sep_transactions::Column::Status.eq(PaymentStatus::InProgress))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            tracing::debug!(?status, "Close requested for a missing or finalized token");
            return Err(ManagementError::TransactionNotFound.into());
        }

        let transaction = self
            .find_by_token(token)
            .await?
            .ok_or(ManagementError::TransactionNotFound)?;

        tracing::info!(
            terminal_id = transaction.terminal_id,
            transaction_id = transaction.id,
            ?status,
            "Transaction closed"
        );
        Ok(finalization(&transaction, None)?)
    }

    /// Verifies a submitted transaction.
    ///
    /// Business outcomes are result codes, so only database failures are
    /// errors here.
    pub async fn verify(&self, terminal_id: i64, ref_num: &str) -> Result<SettlementOutcome, DbErr> {
        if self.find_terminal(terminal_id).await?.is_none() {
            return Ok(SettlementOutcome::rejected(ResultCode::TerminalNotFound));
        }
        let Some(transaction) = self.find_by_ref_num(terminal_id, ref_num).await? else {
            return Ok(SettlementOutcome::rejected(ResultCode::TransactionNotFound));
        };

        if let Err(result) = LifecycleService::check_verify(&settlement_state(&transaction), Utc::now()) {
            tracing::debug!(transaction_id = transaction.id, %result, "Verify rejected");
            return Ok(located(result, &transaction));
        }

        let update = bank_sep_transactions::Entity::update_many()
            .col_expr(bank_sep_transactions::Column::VerifiedAt, Expr::value(Utc::now()))
            .filter(bank_sep_transactions::Column::Id.eq(transaction.id))
            .filter(bank_sep_transactions::Column::VerifiedAt.is_null())
            .exec(&self.db)
            .await?;

        // Lost to a concurrent verify
        if update.rows_affected == 0 {
            return Ok(located(ResultCode::Duplicate, &transaction));
        }

        tracing::info!(terminal_id, transaction_id = transaction.id, "Transaction verified");
        Ok(located(ResultCode::Success, &transaction))
    }

    /// Reverses a verified transaction.
    pub async fn reverse(
        &self,
        terminal_id: i64,
        ref_num: &str,
    ) -> Result<SettlementOutcome, DbErr> {
        if self.find_terminal(terminal_id).await?.is_none() {
            return Ok(SettlementOutcome::rejected(ResultCode::TerminalNotFound));
        }
        let Some(transaction) = self.find_by_ref_num(terminal_id, ref_num).await? else {
            return Ok(SettlementOutcome::rejected(ResultCode::TransactionNotFound));
        };

        if let Err(result) = LifecycleService::check_reverse(&settlement_state(&transaction), Utc::now()) {
            tracing::debug!(transaction_id = transaction.id, %result, "Reverse rejected");
            return Ok(located(result, &transaction));
        }

        let update = bank_sep_transactions::Entity::update_many()
            .col_expr(bank_sep_transactions::Column::ReversedAt, Expr::value(Utc::now()))
            .filter(bank_sep_transactions::Column::Id.eq(transaction.id))
            .filter(bank_sep_transactions::Column::VerifiedAt.is_not_null())
            .filter(bank_sep_transactions::Column::ReversedAt.is_null())
            .exec(&self.db)
            .await?;

        // Lost to a concurrent reverse
        if update.rows_affected == 0 {
            return Ok(located(ResultCode::Reversed, &transaction));
        }

        tracing::info!(terminal_id, transaction_id = transaction.id, "Transaction reversed");
        Ok(located(ResultCode::Success, &transaction))
    }

    /// Looks up a receipt.
    ///
    /// The session key must match the one given at issuance, and must be
    /// absent when none was given. An RRN in the query must match the
    /// stored value. An expired receipt is reported exactly like a missing
    /// one.
    pub async fn receipt(&self, query: &ReceiptQuery) -> Result<PaymentReceipt, LifecycleError> {
        self.ensure_terminal(query.terminal_id).await?;

        let mut select = bank_sep_transactions::Entity::find()
            .filter(bank_sep_transactions::Column::TerminalId.eq(query.terminal_id));
        select = match &query.lookup {
            ReceiptLookup::RefNum(ref_num) => {
                select.filter(bank_sep_transactions::Column::RefNum.eq(ref_num.as_str()))
            }
            ReceiptLookup::Token(token) => {
                select.filter(bank_sep_transactions::Column::Token.eq(token.as_str()))
            }
        };
        // A keyed transaction is only readable with its key
        select = match query.session_key {
            Some(key) => select.filter(bank_sep_transactions::Column::TxnRandomSessionKey.eq(key)),
            None => select.filter(bank_sep_transactions::Column::TxnRandomSessionKey.is_null()),
        };
        if let Some(rrn) = query.rrn {
            select = select.filter(bank_sep_transactions::Column::Rrn.eq(rrn));
        }

        let transaction = select
            .one(&self.db)
            .await?
            .ok_or(SepError::ResourceNotFound)?;
        LifecycleService::check_receipt(transaction.receipt_expires_at, Utc::now())?;

        Ok(payment_receipt(&transaction))
    }

    /// Fails with `TerminalNotFound` unless the terminal exists.
    pub async fn ensure_terminal(&self, terminal_id: i64) -> Result<(), LifecycleError> {
        match self.find_terminal(terminal_id).await? {
            Some(_) => Ok(()),
            None => Err(SepError::TerminalNotFound.into()),
        }
    }

    /// Finds a transaction by token.
    pub async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<bank_sep_transactions::Model>, DbErr> {
        bank_sep_transactions::Entity::find()
            .filter(bank_sep_transactions::Column::Token.eq(token))
            .one(&self.db)
            .await
    }

    async fn find_by_ref_num(
        &self,
        terminal_id: i64,
        ref_num: &str,
    ) -> Result<Option<bank_sep_transactions::Model>, DbErr> {
        bank_sep_transactions::Entity::find()
            .filter(bank_sep_transactions::Column::TerminalId.eq(terminal_id))
            .filter(bank_sep_transactions::Column::RefNum.eq(ref_num))
            .one(&self.db)
            .await
    }

    async fn find_terminal(&self, id: i64) -> Result<Option<bank_sep_terminals::Model>, DbErr> {
        bank_sep_terminals::Entity::find_by_id(id).one(&self.db).await
    }
}

/// Outcome for a located transaction. "Not found" never carries detail.
fn located(result: ResultCode, transaction: &bank_sep_transactions::Model) -> SettlementOutcome {
    SettlementOutcome {
        result,
        detail: (result != ResultCode::TransactionNotFound)
            .then(|| transaction_detail(transaction)),
    }
}

fn settlement_state(transaction: &bank_sep_transactions::Model) -> SettlementState {
    SettlementState {
        status: transaction.status.into(),
        verify_deadline: transaction.verify_deadline,
        reverse_deadline: transaction.reverse_deadline,
        verified_at: transaction.verified_at,
        reversed_at: transaction.reversed_at,
    }
}

fn text(value: Option<i64>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

fn finalization(
    transaction: &bank_sep_transactions::Model,
    ref_num: Option<&str>,
) -> Result<TokenFinalization, url::ParseError> {
    let redirect_url =
        LifecycleService::finalize_redirect(&transaction.redirect_url, &transaction.token, ref_num)?;
    Ok(TokenFinalization {
        redirect_url,
        callback_data: callback_data(transaction),
    })
}

fn callback_data(transaction: &bank_sep_transactions::Model) -> CallbackData {
    let status = TransactionStatus::from(transaction.status);
    CallbackData {
        mid: transaction.terminal_id.to_string(),
        terminal_id: transaction.terminal_id.to_string(),
        state: status.state().to_string(),
        status: status.code().to_string(),
        rrn: text(transaction.rrn),
        ref_num: transaction.ref_num.clone().unwrap_or_default(),
        res_num: transaction.res_num.clone(),
        trace_no: text(transaction.trace_no),
        amount: transaction.amount.to_string(),
        affective_amount: text(transaction.affective_amount),
        wage: text(transaction.wage),
        secure_pan: transaction.paid_card_number.clone().unwrap_or_default(),
        hashed_card_number: transaction.hashed_card_number.clone().unwrap_or_default(),
        token: transaction.token.clone(),
    }
}

fn transaction_detail(transaction: &bank_sep_transactions::Model) -> TransactionDetail {
    TransactionDetail {
        rrn: text(transaction.rrn),
        ref_num: transaction.ref_num.clone().unwrap_or_default(),
        masked_pan: transaction.paid_card_number.clone().unwrap_or_default(),
        hashed_pan: transaction.hashed_card_number.clone().unwrap_or_default(),
        terminal_number: transaction.terminal_id,
        original_amount: transaction.amount,
        affective_amount: transaction.affective_amount.unwrap_or(transaction.amount),
        strace_date: transaction.trace_date.unwrap_or(transaction.created_at),
        strace_no: transaction.trace_no.unwrap_or_default(),
    }
}

fn payment_receipt(transaction: &bank_sep_transactions::Model) -> PaymentReceipt {
    let status = TransactionStatus::from(transaction.status);
    PaymentReceipt {
        state: status.state().to_string(),
        status: status.code(),
        terminal_id: transaction.terminal_id,
        token: transaction.token.clone(),
        ref_num: transaction.ref_num.clone().unwrap_or_default(),
        res_num: transaction.res_num.clone(),
        trace_no: transaction.trace_no.unwrap_or_default(),
        amount: transaction.amount,
        affective_amount: transaction.affective_amount.unwrap_or(transaction.amount),
        rrn: transaction.rrn.unwrap_or_default(),
        hashed_card_number: transaction.hashed_card_number.clone().unwrap_or_default(),
    }
}
