//! Partners known without a network round trip (mock mode).

use std::collections::HashMap;

use super::{base_url_or_default, Config, FEATURE_EARNINGS, FEATURE_TRANSACTIONS};
use crate::domain::{FeatureMap, PartnerConfig};

/// Static partner registry consulted in mock mode.
#[derive(Debug, Clone, Default)]
pub struct PartnerRegistry {
    partners: HashMap<String, PartnerConfig>,
}

impl PartnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The demo partners shipped with the widget.
    pub fn builtin(defaults: &Config) -> Self {
        let mut registry = Self::new();

        registry.register(PartnerConfig {
            partner_id: "demo-partner".to_string(),
            api_key: "demo-api-key".to_string(),
            base_url: base_url_or_default(&defaults.base_url),
            features: FeatureMap::from([
                (FEATURE_EARNINGS.to_string(), true),
                (FEATURE_TRANSACTIONS.to_string(), true),
            ]),
            theme: Some(HashMap::from([
                ("primaryColor".to_string(), "#1e3a8a".to_string()),
                ("accentColor".to_string(), "#059669".to_string()),
            ])),
        });

        registry.register(PartnerConfig {
            partner_id: "partner-123".to_string(),
            api_key: "partner-123-key".to_string(),
            base_url: base_url_or_default(&defaults.base_url),
            features: FeatureMap::from([
                (FEATURE_EARNINGS.to_string(), true),
                (FEATURE_TRANSACTIONS.to_string(), false),
            ]),
            theme: Some(HashMap::from([("mode".to_string(), "dark".to_string())])),
        });

        registry
    }

    pub fn register(&mut self, config: PartnerConfig) {
        self.partners.insert(config.partner_id.clone(), config);
    }

    pub fn get(&self, partner_id: &str) -> Option<PartnerConfig> {
        self.partners.get(partner_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

/// Default config for a partner nobody registered.
pub fn synthesize_default(defaults: &Config, partner_id: &str) -> PartnerConfig {
    PartnerConfig {
        partner_id: partner_id.to_string(),
        api_key: defaults.api_key.clone(),
        base_url: base_url_or_default(&defaults.base_url),
        features: defaults.features.clone(),
        theme: None,
    }
}
