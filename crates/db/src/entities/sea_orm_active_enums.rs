//! `SeaORM` active enums.

use irbankmock_core::sep::TransactionStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored transaction status. The integer values are the bank's status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum PaymentStatus {
    #[sea_orm(num_value = 0)]
    InProgress,
    #[sea_orm(num_value = 1)]
    CanceledByUser,
    #[sea_orm(num_value = 2)]
    Ok,
    #[sea_orm(num_value = 3)]
    Failed,
}

impl From<PaymentStatus> for TransactionStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::InProgress => Self::InProgress,
            PaymentStatus::CanceledByUser => Self::CanceledByUser,
            PaymentStatus::Ok => Self::Ok,
            PaymentStatus::Failed => Self::Failed,
        }
    }
}

impl From<TransactionStatus> for PaymentStatus {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::InProgress => Self::InProgress,
            TransactionStatus::CanceledByUser => Self::CanceledByUser,
            TransactionStatus::Ok => Self::Ok,
            TransactionStatus::Failed => Self::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ActiveEnum, Iterable};

    #[test]
    fn test_stored_values_match_bank_codes() {
        for status in PaymentStatus::iter() {
            assert_eq!(status.to_value(), TransactionStatus::from(status).code());
        }
    }
}
