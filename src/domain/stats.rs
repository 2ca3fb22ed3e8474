use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::balance::Balance;
use super::transaction::{Transaction, TransactionStatus, TransactionType};

/// Headline numbers for one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnStats {
    pub total_balance: f64,
    pub total_earnings: f64,
    pub daily_earnings: f64,
    pub currency: String,
}

impl EarnStats {
    pub fn summarize(
        currency: &str,
        balances: &[Balance],
        transactions: &[Transaction],
        now: DateTime<Utc>,
    ) -> Self {
        let total_balance = balances
            .iter()
            .filter(|b| b.currency == currency)
            .map(|b| b.total)
            .sum();

        let earnings: Vec<&Transaction> = transactions
            .iter()
            .filter(|tx| {
                tx.currency == currency
                    && tx.kind == TransactionType::Earning
                    && tx.status == TransactionStatus::Completed
            })
            .collect();

        let day_start = now - Duration::hours(24);
        let daily_earnings = earnings
            .iter()
            .filter(|tx| tx.timestamp > day_start && tx.timestamp <= now)
            .map(|tx| tx.amount)
            .sum();

        Self {
            total_balance,
            total_earnings: earnings.iter().map(|tx| tx.amount).sum(),
            daily_earnings,
            currency: currency.to_string(),
        }
    }
}
