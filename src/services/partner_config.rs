use std::sync::Arc;
use url::Url;

use crate::config::partners::{synthesize_default, PartnerRegistry};
use crate::config::{base_url_or_default, Config};
use crate::domain::{PartnerConfig, PartnerConfigPayload};
use crate::error::{EarnError, EarnResult};
use crate::yaas::{HttpRequest, HttpTransport, ReqwestTransport};

/// Maps a partner id to its connection settings.
///
/// Mock mode answers from the static registry. Live mode asks
/// `GET {base_url}/partner-config/{partner_id}` and falls back to a
/// synthesized default on any failure, so `resolve` never errors.
pub struct PartnerConfigResolver {
    defaults: Config,
    registry: PartnerRegistry,
    use_mock_data: bool,
    transport: Arc<dyn HttpTransport>,
}

impl PartnerConfigResolver {
    pub fn new(defaults: Config) -> Self {
        let transport = Arc::new(ReqwestTransport::new(defaults.http_timeout));
        Self::with_transport(defaults, transport)
    }

    /// A blank `defaults.base_url` is replaced by the built-in default.
    pub fn with_transport(mut defaults: Config, transport: Arc<dyn HttpTransport>) -> Self {
        defaults.base_url = base_url_or_default(&defaults.base_url);
        Self {
            registry: PartnerRegistry::builtin(&defaults),
            use_mock_data: defaults.use_mock_data,
            defaults,
            transport,
        }
    }

    pub fn with_registry(mut self, registry: PartnerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_mock_data(mut self, use_mock_data: bool) -> Self {
        self.use_mock_data = use_mock_data;
        self
    }

    pub fn defaults(&self) -> &Config {
        &self.defaults
    }

    pub fn uses_mock_data(&self) -> bool {
        self.use_mock_data
    }

    pub async fn resolve(&self, partner_id: &str) -> PartnerConfig {
        if self.use_mock_data {
            return self
                .registry
                .get(partner_id)
                .unwrap_or_else(|| synthesize_default(&self.defaults, partner_id));
        }

        match self.fetch_live(partner_id).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    partner_id,
                    error = %e,
                    "Partner config lookup failed, using defaults"
                );
                synthesize_default(&self.defaults, partner_id)
            }
        }
    }

    /// Live lookup without the fallback.
    pub async fn fetch_live(&self, partner_id: &str) -> EarnResult<PartnerConfig> {
        fetch_partner_config(
            self.transport.as_ref(),
            &self.defaults.base_url,
            partner_id,
            synthesize_default(&self.defaults, partner_id),
        )
        .await
    }
}

/// `GET {base_url}/partner-config/{partner_id}`, unauthenticated.
/// Absent fields in the answer are taken from `fallback`.
pub async fn fetch_partner_config(
    transport: &dyn HttpTransport,
    base_url: &str,
    partner_id: &str,
    fallback: PartnerConfig,
) -> EarnResult<PartnerConfig> {
    let failed = |reason: String| EarnError::PartnerConfig {
        partner_id: partner_id.to_string(),
        reason,
    };

    let url = partner_config_url(base_url, partner_id).map_err(failed)?;
    let response = transport
        .execute(HttpRequest::get(url))
        .await
        .map_err(|e| failed(e.to_string()))?;

    if !response.is_success() {
        return Err(failed(format!("status {}: {}", response.status, response.body)));
    }

    let payload: PartnerConfigPayload =
        serde_json::from_str(&response.body).map_err(|e| failed(e.to_string()))?;
    Ok(payload.into_config(fallback))
}

fn partner_config_url(base_url: &str, partner_id: &str) -> Result<String, String> {
    let mut url = Url::parse(base_url).map_err(|e| format!("invalid base URL: {}", e))?;
    url.path_segments_mut()
        .map_err(|_| format!("base URL '{}' cannot carry a path", base_url))?
        .pop_if_empty()
        .extend(["partner-config", partner_id]);
    Ok(url.to_string())
}
