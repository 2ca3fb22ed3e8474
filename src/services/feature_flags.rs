use serde::{Deserialize, Serialize};

use crate::domain::{FeatureMap, PartnerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSource {
    Default,
    Partner,
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub name: String,
    pub enabled: bool,
    pub source: FlagSource,
}

/// Layered feature flags: process defaults, then partner flags, then runtime
/// overrides. Later layers win per key; no layer replaces a whole map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureGate {
    defaults: FeatureMap,
    partner: FeatureMap,
    runtime: FeatureMap,
}

impl FeatureGate {
    pub fn new(defaults: FeatureMap) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn with_partner(mut self, config: &PartnerConfig) -> Self {
        self.partner.extend(config.features.clone());
        self
    }

    pub fn with_overrides(mut self, overrides: FeatureMap) -> Self {
        self.set_overrides(overrides);
        self
    }

    pub fn set_overrides(&mut self, overrides: FeatureMap) {
        self.runtime.extend(overrides);
    }

    pub fn effective(&self) -> FeatureMap {
        let mut flags = self.defaults.clone();
        flags.extend(self.partner.clone());
        flags.extend(self.runtime.clone());
        flags
    }

    /// Unknown flags are off.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.lookup(name).map(|(enabled, _)| enabled).unwrap_or(false)
    }

    /// Every known flag with the layer that decided it, sorted by name.
    pub fn get_all(&self) -> Vec<FeatureFlag> {
        let mut flags: Vec<FeatureFlag> = self
            .effective()
            .into_keys()
            .filter_map(|name| {
                self.lookup(&name).map(|(enabled, source)| FeatureFlag {
                    name,
                    enabled,
                    source,
                })
            })
            .collect();
        flags.sort_by(|a, b| a.name.cmp(&b.name));
        flags
    }

    fn lookup(&self, name: &str) -> Option<(bool, FlagSource)> {
        if let Some(enabled) = self.runtime.get(name) {
            return Some((*enabled, FlagSource::Runtime));
        }
        if let Some(enabled) = self.partner.get(name) {
            return Some((*enabled, FlagSource::Partner));
        }
        self.defaults
            .get(name)
            .map(|enabled| (*enabled, FlagSource::Default))
    }
}
