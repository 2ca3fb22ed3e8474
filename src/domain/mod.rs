//! Earn domain records, independent of transport and presentation.

pub mod balance;
pub mod partner;
pub mod product;
pub mod stats;
pub mod transaction;

pub use balance::{Balance, BalanceMismatch};
pub use partner::{FeatureMap, PartnerConfig, PartnerConfigPayload};
pub use product::{adapt, adapt_all, CanonicalProduct, RawProduct, RiskLevel};
pub use stats::EarnStats;
pub use transaction::{Transaction, TransactionStatus, TransactionType};
