//! `SeaORM` Entity for bank_sep_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_sep_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub terminal_id: i64,
    #[sea_orm(unique)]
    pub token: String,
    pub amount: i64,
    pub wage: Option<i64>,
    pub affective_amount: Option<i64>,
    pub res_num: String,
    pub res_num1: Option<String>,
    pub res_num2: Option<String>,
    pub res_num3: Option<String>,
    pub res_num4: Option<String>,
    pub redirect_url: String,
    pub cell_number: Option<String>,
    pub token_expiry_in_min: i32,
    pub allowed_card_hashes: Option<String>,
    pub txn_random_session_key: Option<i64>,
    pub status: PaymentStatus,
    /// Masked PAN; the raw card number is never stored.
    pub paid_card_number: Option<String>,
    pub hashed_card_number: Option<String>,
    pub trace_no: Option<i64>,
    pub trace_date: Option<DateTimeUtc>,
    #[sea_orm(unique)]
    pub ref_num: Option<String>,
    pub rrn: Option<i64>,
    pub created_at: DateTimeUtc,
    pub token_expires_at: DateTimeUtc,
    pub receipt_expires_at: DateTimeUtc,
    pub submitted_at: Option<DateTimeUtc>,
    pub verify_deadline: Option<DateTimeUtc>,
    pub reverse_deadline: Option<DateTimeUtc>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub failed_at: Option<DateTimeUtc>,
    pub verified_at: Option<DateTimeUtc>,
    pub reversed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_sep_terminals::Entity",
        from = "Column::TerminalId",
        to = "super::bank_sep_terminals::Column::Id"
    )]
    BankSepTerminals,
}

impl Related<super::bank_sep_terminals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankSepTerminals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
