//! Saman gateway tables.
//!
//! Creates the terminal and transaction tables with the uniqueness and
//! token-lifetime constraints the lifecycle engine relies on.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BankSepTerminals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankSepTerminals::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BankSepTerminals::Name).string().not_null())
                    .col(
                        ColumnDef::new(BankSepTerminals::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(BankSepTerminals::Password).string().not_null())
                    .col(
                        ColumnDef::new(BankSepTerminals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BankSepTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankSepTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BankSepTransactions::TerminalId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankSepTransactions::Token).string().not_null())
                    .col(ColumnDef::new(BankSepTransactions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(BankSepTransactions::Wage).big_integer().null())
                    .col(
                        ColumnDef::new(BankSepTransactions::AffectiveAmount)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(BankSepTransactions::ResNum).string().not_null())
                    .col(ColumnDef::new(BankSepTransactions::ResNum1).string().null())
                    .col(ColumnDef::new(BankSepTransactions::ResNum2).string().null())
                    .col(ColumnDef::new(BankSepTransactions::ResNum3).string().null())
                    .col(ColumnDef::new(BankSepTransactions::ResNum4).string().null())
                    .col(ColumnDef::new(BankSepTransactions::RedirectUrl).text().not_null())
                    .col(ColumnDef::new(BankSepTransactions::CellNumber).string().null())
                    .col(
                        ColumnDef::new(BankSepTransactions::TokenExpiryInMin)
                            .integer()
                            .not_null()
                            .check(Expr::col(BankSepTransactions::TokenExpiryInMin).between(20, 3600)),
                    )
                    .col(ColumnDef::new(BankSepTransactions::AllowedCardHashes).text().null())
                    .col(
                        ColumnDef::new(BankSepTransactions::TxnRandomSessionKey)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(BankSepTransactions::Status).integer().not_null())
                    .col(ColumnDef::new(BankSepTransactions::PaidCardNumber).string().null())
                    .col(ColumnDef::new(BankSepTransactions::HashedCardNumber).string().null())
                    .col(ColumnDef::new(BankSepTransactions::TraceNo).big_integer().null())
                    .col(timestamp_null(BankSepTransactions::TraceDate))
                    .col(ColumnDef::new(BankSepTransactions::RefNum).string().null())
                    .col(ColumnDef::new(BankSepTransactions::Rrn).big_integer().null())
                    .col(timestamp_not_null(BankSepTransactions::CreatedAt))
                    .col(timestamp_not_null(BankSepTransactions::TokenExpiresAt))
                    .col(timestamp_not_null(BankSepTransactions::ReceiptExpiresAt))
                    .col(timestamp_null(BankSepTransactions::SubmittedAt))
                    .col(timestamp_null(BankSepTransactions::VerifyDeadline))
                    .col(timestamp_null(BankSepTransactions::ReverseDeadline))
                    .col(timestamp_null(BankSepTransactions::CancelledAt))
                    .col(timestamp_null(BankSepTransactions::FailedAt))
                    .col(timestamp_null(BankSepTransactions::VerifiedAt))
                    .col(timestamp_null(BankSepTransactions::ReversedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bank_sep_transactions_terminal")
                            .from(BankSepTransactions::Table, BankSepTransactions::TerminalId)
                            .to(BankSepTerminals::Table, BankSepTerminals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Token lookup (payment page, submit, cancel, fail)
        manager
            .create_index(
                Index::create()
                    .name("idx_bank_sep_transactions_token")
                    .table(BankSepTransactions::Table)
                    .col(BankSepTransactions::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // RefNum lookup (verify, reverse, receipt)
        manager
            .create_index(
                Index::create()
                    .name("idx_bank_sep_transactions_ref_num")
                    .table(BankSepTransactions::Table)
                    .col(BankSepTransactions::RefNum)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One merchant order per terminal
        manager
            .create_index(
                Index::create()
                    .name("idx_bank_sep_transactions_terminal_res_num")
                    .table(BankSepTransactions::Table)
                    .col(BankSepTransactions::TerminalId)
                    .col(BankSepTransactions::ResNum)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(BankSepTransactions::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(BankSepTerminals::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

fn timestamp_not_null(column: BankSepTransactions) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn timestamp_null(column: BankSepTransactions) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .null()
        .to_owned()
}

#[derive(DeriveIden)]
enum BankSepTerminals {
    Table,
    Id,
    Name,
    Username,
    Password,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BankSepTransactions {
    Table,
    Id,
    TerminalId,
    Token,
    Amount,
    Wage,
    AffectiveAmount,
    ResNum,
    #[sea_orm(iden = "res_num1")]
    ResNum1,
    #[sea_orm(iden = "res_num2")]
    ResNum2,
    #[sea_orm(iden = "res_num3")]
    ResNum3,
    #[sea_orm(iden = "res_num4")]
    ResNum4,
    RedirectUrl,
    CellNumber,
    TokenExpiryInMin,
    AllowedCardHashes,
    TxnRandomSessionKey,
    Status,
    PaidCardNumber,
    HashedCardNumber,
    TraceNo,
    TraceDate,
    RefNum,
    Rrn,
    CreatedAt,
    TokenExpiresAt,
    ReceiptExpiresAt,
    SubmittedAt,
    VerifyDeadline,
    ReverseDeadline,
    CancelledAt,
    FailedAt,
    VerifiedAt,
    ReversedAt,
}
