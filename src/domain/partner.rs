use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

pub type FeatureMap = HashMap<String, bool>;

/// Connection settings for one partner. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerConfig {
    pub partner_id: String,
    pub api_key: String,
    pub base_url: String,
    pub features: FeatureMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<HashMap<String, String>>,
}

/// Partner config exactly as the lookup endpoint returns it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerConfigPayload {
    #[serde(default)]
    pub partner_id: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default, deserialize_with = "boolean_flags")]
    pub features: FeatureMap,
    #[serde(default)]
    pub theme: Option<HashMap<String, String>>,
}

/// Keeps only strictly boolean flag values; anything else is treated as absent.
fn boolean_flags<'de, D>(deserializer: D) -> Result<FeatureMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, value)| value.as_bool().map(|enabled| (name, enabled)))
        .collect())
}

impl PartnerConfigPayload {
    /// Fills absent or empty fields from the synthesized fallback.
    pub fn into_config(self, fallback: PartnerConfig) -> PartnerConfig {
        PartnerConfig {
            partner_id: non_empty(self.partner_id).unwrap_or(fallback.partner_id),
            api_key: self.api_key.unwrap_or(fallback.api_key),
            base_url: non_empty(self.base_url).unwrap_or(fallback.base_url),
            features: self.features,
            theme: self.theme.or(fallback.theme),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
