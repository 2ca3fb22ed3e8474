pub mod feature_flags;
pub mod partner_config;
pub mod session;

pub use feature_flags::{FeatureFlag, FeatureGate, FlagSource};
pub use partner_config::{fetch_partner_config, PartnerConfigResolver};
pub use session::{EarnSession, EarnSnapshot, SessionError};
