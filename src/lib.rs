pub mod config;
pub mod domain;
pub mod embed;
pub mod error;
pub mod services;
pub mod validation;
pub mod yaas;

pub use config::Config;
pub use error::{EarnError, EarnResult};
pub use services::{EarnSession, FeatureGate, PartnerConfigResolver};
pub use yaas::{ClientOptions, EarnClient};
