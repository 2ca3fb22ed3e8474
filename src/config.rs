use anyhow::Context;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::domain::FeatureMap;

pub mod partners;

pub const DEFAULT_BASE_URL: &str = "https://api-sandbox.coinchange.io";
pub const DEFAULT_PARTNER_ID: &str = "default";

pub const FEATURE_EARNINGS: &str = "earnings";
pub const FEATURE_TRANSACTIONS: &str = "transactions";

/// Flags every client starts from. Unlisted flags are off.
pub fn default_features() -> FeatureMap {
    FeatureMap::from([
        (FEATURE_EARNINGS.to_string(), true),
        (FEATURE_TRANSACTIONS.to_string(), true),
    ])
}

/// Process-wide defaults. Handed explicitly to clients and resolvers.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    pub partner_id: String,
    pub use_mock_data: bool,
    pub features: FeatureMap,
    pub http_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            partner_id: DEFAULT_PARTNER_ID.to_string(),
            use_mock_data: true,
            features: default_features(),
            http_timeout: None,
        }
    }
}

/// `base_url` unless it is blank, in which case the built-in default.
pub fn base_url_or_default(base_url: &str) -> String {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let base_url = lookup("EARN_API_BASE_URL")
            .map(|v| base_url_or_default(&v))
            .unwrap_or(defaults.base_url);
        url::Url::parse(&base_url).context("EARN_API_BASE_URL is not a valid URL")?;

        let use_mock_data = match lookup("EARN_USE_MOCK_DATA") {
            Some(raw) => parse_bool(&raw).context("EARN_USE_MOCK_DATA must be true or false")?,
            None => defaults.use_mock_data,
        };

        let mut features = defaults.features;
        if let Some(raw) = lookup("EARN_FEATURES") {
            features.extend(parse_features(&raw)?);
        }

        let http_timeout = lookup("EARN_HTTP_TIMEOUT_SECS")
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .context("EARN_HTTP_TIMEOUT_SECS must be a whole number of seconds")?
            .map(Duration::from_secs);

        Ok(Config {
            base_url,
            api_key: lookup("EARN_API_KEY").unwrap_or(defaults.api_key),
            partner_id: lookup("EARN_PARTNER_ID")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.partner_id),
            use_mock_data,
            features,
            http_timeout,
        })
    }
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => anyhow::bail!("invalid boolean '{}'", other),
    }
}

/// Parses `name=bool` pairs separated by commas.
pub fn parse_features(raw: &str) -> anyhow::Result<FeatureMap> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_feature)
        .collect()
}

pub fn parse_feature(entry: &str) -> anyhow::Result<(String, bool)> {
    let (name, value) = entry
        .split_once('=')
        .with_context(|| format!("feature '{}' must look like name=true", entry))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("feature '{}' has an empty name", entry);
    }
    let enabled = parse_bool(value).with_context(|| format!("feature '{}'", name))?;
    Ok((name.to_string(), enabled))
}

/// Keeps only the last four characters of a secret for display.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
