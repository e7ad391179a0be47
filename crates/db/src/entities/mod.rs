//! `SeaORM` entities.

pub mod prelude;

pub mod bank_sep_terminals;
pub mod bank_sep_transactions;
pub mod sea_orm_active_enums;
