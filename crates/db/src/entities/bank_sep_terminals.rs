//! `SeaORM` Entity for bank_sep_terminals table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_sep_terminals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bank_sep_transactions::Entity")]
    BankSepTransactions,
}

impl Related<super::bank_sep_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankSepTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
