use serde::{Deserialize, Serialize};
use std::fmt;

const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub currency: String,
    pub total: f64,
    pub available: f64,
    pub earning: f64,
}

/// `available + earning` disagrees with `total`.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceMismatch {
    pub currency: String,
    pub total: f64,
    pub available: f64,
    pub earning: f64,
}

impl fmt::Display for BalanceMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} balance: available {} + earning {} != total {}",
            self.currency, self.available, self.earning, self.total
        )
    }
}

impl std::error::Error for BalanceMismatch {}

impl Balance {
    pub fn check_consistency(&self) -> Result<(), BalanceMismatch> {
        let sum = self.available + self.earning;
        let scale = self.total.abs().max(sum.abs()).max(1.0);
        if (sum - self.total).abs() <= TOLERANCE * scale {
            return Ok(());
        }

        Err(BalanceMismatch {
            currency: self.currency.clone(),
            total: self.total,
            available: self.available,
            earning: self.earning,
        })
    }
}
