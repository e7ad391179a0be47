//! Entity re-exports.

pub use super::bank_sep_terminals::Entity as BankSepTerminals;
pub use super::bank_sep_transactions::Entity as BankSepTransactions;
