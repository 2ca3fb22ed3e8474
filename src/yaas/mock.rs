//! Deterministic dataset served in mock mode.

use chrono::{Duration, Utc};

use crate::domain::{
    Balance, CanonicalProduct, RiskLevel, Transaction, TransactionStatus, TransactionType,
};

pub fn products() -> Vec<CanonicalProduct> {
    vec![CanonicalProduct {
        id: "1".to_string(),
        name: "USDC Earn".to_string(),
        currency: "USDC".to_string(),
        apy: 8.5,
        min_deposit: 100.0,
        max_deposit: 100_000.0,
        description: "Earn yield on your USDC holdings".to_string(),
        risk_level: RiskLevel::Low,
    }]
}

pub fn balances() -> Vec<Balance> {
    vec![Balance {
        currency: "USDC".to_string(),
        total: 2500.0,
        available: 2300.0,
        earning: 200.0,
    }]
}

/// Timestamps are relative to the moment of the call.
pub fn transactions() -> Vec<Transaction> {
    let now = Utc::now();
    vec![
        Transaction {
            id: "1".to_string(),
            kind: TransactionType::Deposit,
            amount: 1000.0,
            currency: "USDC".to_string(),
            status: TransactionStatus::Completed,
            timestamp: now - Duration::days(1),
        },
        Transaction {
            id: "2".to_string(),
            kind: TransactionType::Earning,
            amount: 5.25,
            currency: "USDC".to_string(),
            status: TransactionStatus::Completed,
            timestamp: now - Duration::hours(12),
        },
        Transaction {
            id: "3".to_string(),
            kind: TransactionType::Withdrawal,
            amount: 200.0,
            currency: "USDC".to_string(),
            status: TransactionStatus::Pending,
            timestamp: now,
        },
    ]
}
