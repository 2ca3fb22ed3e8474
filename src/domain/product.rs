//! Earn product shapes and their normalization.
//!
//! The API has served two product shapes over time: the canonical one
//! (`currency` + deposit limits) and a legacy/embed one keyed by
//! `currencyCode` with most fields optional. [`RawProduct`] is the tagged
//! boundary type for both and [`adapt`] is the single place that turns either
//! into a [`CanonicalProduct`].

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Case-insensitive mapping; anything that is not `low` or `high` is `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "high" => RiskLevel::High,
            _ => RiskLevel::Medium,
        }
    }
}

/// The single normalized product representation used after adaptation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProduct {
    pub id: String,
    pub name: String,
    pub currency: String,
    /// Plain percentage, 8.5 means 8.5%.
    pub apy: f64,
    pub min_deposit: f64,
    pub max_deposit: f64,
    pub description: String,
    pub risk_level: RiskLevel,
}

/// Product as served in the canonical shape. Only the detection fields are required.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalPayload {
    pub id: String,
    pub currency: String,
    pub apy: f64,
    pub min_deposit: f64,
    pub name: Option<String>,
    pub max_deposit: Option<f64>,
    pub description: Option<String>,
    pub risk_level: Option<String>,
}

/// Product as served in the legacy/embed shape.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyPayload {
    pub id: String,
    pub currency_code: String,
    pub apy: f64,
    pub name: Option<String>,
    pub min_deposit: Option<f64>,
    pub max_deposit: Option<f64>,
    pub description: Option<String>,
    pub risk_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ProductFields")]
pub enum RawProduct {
    Canonical(CanonicalPayload),
    Legacy(LegacyPayload),
}

/// Loose wire view of a product used only to classify it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductFields {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    apy: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    currency_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    min_deposit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    max_deposit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    risk_level: Option<String>,
}

impl TryFrom<ProductFields> for RawProduct {
    type Error = String;

    fn try_from(fields: ProductFields) -> Result<Self, Self::Error> {
        match (fields.currency, fields.min_deposit) {
            (Some(currency), Some(min_deposit)) => Ok(RawProduct::Canonical(CanonicalPayload {
                id: fields.id,
                currency,
                apy: fields.apy,
                min_deposit,
                name: fields.name,
                max_deposit: fields.max_deposit,
                description: fields.description,
                risk_level: fields.risk_level,
            })),
            (currency, min_deposit) => {
                let currency_code = currency.or(fields.currency_code).ok_or_else(|| {
                    format!("product '{}' has neither currency nor currencyCode", fields.id)
                })?;
                Ok(RawProduct::Legacy(LegacyPayload {
                    id: fields.id,
                    currency_code,
                    apy: fields.apy,
                    name: fields.name,
                    min_deposit,
                    max_deposit: fields.max_deposit,
                    description: fields.description,
                    risk_level: fields.risk_level,
                }))
            }
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// Optional text field; any non-string value counts as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.as_str().map(str::to_string)))
}

/// Optional numeric field; any non-number value counts as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.as_f64()))
}

/// Normalizes either product shape. Total over [`RawProduct`].
pub fn adapt(raw: RawProduct) -> CanonicalProduct {
    match raw {
        RawProduct::Canonical(p) => CanonicalProduct {
            name: p.name.unwrap_or_else(|| p.currency.clone()),
            id: p.id,
            apy: p.apy,
            min_deposit: p.min_deposit,
            max_deposit: p.max_deposit.unwrap_or(0.0),
            description: p.description.unwrap_or_default(),
            risk_level: risk_level_of(p.risk_level.as_deref()),
            currency: p.currency,
        },
        RawProduct::Legacy(p) => CanonicalProduct {
            name: p.name.unwrap_or_else(|| p.currency_code.clone()),
            id: p.id,
            apy: p.apy,
            min_deposit: p.min_deposit.unwrap_or(0.0),
            max_deposit: p.max_deposit.unwrap_or(0.0),
            description: p.description.unwrap_or_default(),
            risk_level: risk_level_of(p.risk_level.as_deref()),
            currency: p.currency_code,
        },
    }
}

fn risk_level_of(label: Option<&str>) -> RiskLevel {
    label.map(RiskLevel::from_label).unwrap_or(RiskLevel::Medium)
}

/// Decodes and normalizes a JSON product list.
pub fn adapt_all(value: serde_json::Value) -> Result<Vec<CanonicalProduct>, serde_json::Error> {
    let raw: Vec<RawProduct> = serde_json::from_value(value)?;
    Ok(raw.into_iter().map(adapt).collect())
}
