//! Earn account transaction record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Earning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    pub currency: String,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// A freshly submitted transaction, as recorded before the server settles it.
    pub fn pending(kind: TransactionType, amount: f64, currency: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            amount,
            currency: currency.to_string(),
            status: TransactionStatus::Pending,
            timestamp: Utc::now(),
        }
    }
}
