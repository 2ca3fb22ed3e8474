use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::mock;
use super::transport::{HttpRequest, HttpTransport, ReqwestTransport, TransportFailure};
use crate::config::{base_url_or_default, mask_secret, Config};
use crate::domain::{
    adapt_all, Balance, CanonicalProduct, FeatureMap, Transaction, TransactionType,
};
use crate::error::{EarnError, EarnResult};

pub const PRODUCTS_PATH: &str = "/api/yaas/v1/products/";
pub const BALANCES_PATH: &str = "/api/yaas/v1/earn_clients/balances/";
pub const TRANSACTIONS_PATH: &str = "/api/yaas/v1/earn_clients/transactions/";
pub const DEPOSIT_PATH: &str = "/api/yaas/v1/earn_clients/deposit/notify/";
// Not symmetric with DEPOSIT_PATH; this is the path the API serves.
pub const WITHDRAW_PATH: &str = "/api/yaas/v1/earn_clients/transactions/withdraw/";

/// Runtime configuration owned by one [`EarnClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_key: String,
    pub use_mock_data: bool,
    pub features: FeatureMap,
    pub partner_id: String,
}

/// Optional overrides, used both at construction and for [`EarnClient::update_config`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientOptions {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub use_mock_data: Option<bool>,
    pub features: Option<FeatureMap>,
    pub partner_id: Option<String>,
}

impl ClientOptions {
    pub fn is_empty(&self) -> bool {
        *self == ClientOptions::default()
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn use_mock_data(mut self, use_mock_data: bool) -> Self {
        self.use_mock_data = Some(use_mock_data);
        self
    }

    pub fn features(mut self, features: FeatureMap) -> Self {
        self.features = Some(features);
        self
    }

    pub fn partner_id(mut self, partner_id: impl Into<String>) -> Self {
        self.partner_id = Some(partner_id.into());
        self
    }
}

impl ClientSettings {
    /// Process defaults with `options` layered on top.
    pub fn resolve(defaults: &Config, options: &ClientOptions) -> Self {
        let mut settings = ClientSettings {
            base_url: base_url_or_default(&defaults.base_url),
            api_key: defaults.api_key.clone(),
            use_mock_data: defaults.use_mock_data,
            features: defaults.features.clone(),
            partner_id: defaults.partner_id.clone(),
        };
        settings.apply(options);
        settings
    }

    /// Scalar fields are replaced; `features` merge key by key.
    fn apply(&mut self, update: &ClientOptions) {
        if let Some(base_url) = update.base_url.as_ref().filter(|url| !url.trim().is_empty()) {
            self.base_url = base_url.clone();
        }
        if let Some(api_key) = &update.api_key {
            self.api_key = api_key.clone();
        }
        if let Some(use_mock_data) = update.use_mock_data {
            self.use_mock_data = use_mock_data;
        }
        if let Some(features) = &update.features {
            self.features
                .extend(features.iter().map(|(name, enabled)| (name.clone(), *enabled)));
        }
        if let Some(partner_id) = &update.partner_id {
            self.partner_id = partner_id.clone();
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Data-access client for the Earn API, switchable between mock data and live HTTP.
///
/// Every call takes a snapshot of the settings when it starts, so
/// [`update_config`](Self::update_config) and
/// [`set_use_mock_data`](Self::set_use_mock_data) only affect calls started
/// afterwards. Amounts and currencies are forwarded as given; validating them
/// is the caller's job (see [`crate::validation`]).
pub struct EarnClient {
    settings: ArcSwap<ClientSettings>,
    transport: Arc<dyn HttpTransport>,
}

impl EarnClient {
    pub fn new(defaults: &Config, options: ClientOptions) -> Self {
        Self::with_transport(
            defaults,
            options,
            Arc::new(ReqwestTransport::new(defaults.http_timeout)),
        )
    }

    pub fn with_transport(
        defaults: &Config,
        options: ClientOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let settings = ClientSettings::resolve(defaults, &options);
        tracing::debug!(
            base_url = %settings.base_url,
            partner_id = %settings.partner_id,
            use_mock_data = settings.use_mock_data,
            "Earn client created"
        );

        EarnClient {
            settings: ArcSwap::from_pointee(settings),
            transport,
        }
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> Arc<ClientSettings> {
        self.settings.load_full()
    }

    pub fn update_config(&self, update: ClientOptions) {
        if update.is_empty() {
            return;
        }

        self.settings.rcu(|current| {
            let mut next = ClientSettings::clone(current);
            next.apply(&update);
            next
        });
        let next = self.settings.load();
        tracing::info!(
            base_url = %next.base_url,
            api_key = %mask_secret(&next.api_key),
            use_mock_data = next.use_mock_data,
            "Earn client configuration updated"
        );
    }

    pub fn set_use_mock_data(&self, use_mock_data: bool) {
        self.update_config(ClientOptions::default().use_mock_data(use_mock_data));
    }

    /// True only for flags explicitly set to `true`.
    pub fn is_feature_enabled(&self, name: &str) -> bool {
        self.settings.load().features.get(name).copied().unwrap_or(false)
    }

    pub async fn get_products(&self) -> EarnResult<Vec<CanonicalProduct>> {
        let settings = self.settings.load_full();
        if settings.use_mock_data {
            return Ok(mock::products());
        }

        let raw: serde_json::Value = self
            .fetch(&settings, self.get(&settings, PRODUCTS_PATH), PRODUCTS_PATH)
            .await?;
        adapt_all(raw).map_err(|e| EarnError::Decode {
            endpoint: PRODUCTS_PATH.to_string(),
            message: e.to_string(),
        })
    }

    /// Balances are trusted as served; inconsistent ones are only logged.
    pub async fn get_balances(&self) -> EarnResult<Vec<Balance>> {
        let settings = self.settings.load_full();
        if settings.use_mock_data {
            return Ok(mock::balances());
        }

        let balances: Vec<Balance> = self
            .fetch(&settings, self.get(&settings, BALANCES_PATH), BALANCES_PATH)
            .await?;
        for mismatch in balances.iter().filter_map(|b| b.check_consistency().err()) {
            tracing::warn!(currency = %mismatch.currency, "Inconsistent balance: {}", mismatch);
        }
        Ok(balances)
    }

    pub async fn get_transactions(&self) -> EarnResult<Vec<Transaction>> {
        let settings = self.settings.load_full();
        if settings.use_mock_data {
            return Ok(mock::transactions());
        }

        self.fetch(&settings, self.get(&settings, TRANSACTIONS_PATH), TRANSACTIONS_PATH)
            .await
    }

    pub async fn deposit(&self, amount: f64, currency: &str) -> EarnResult<Transaction> {
        self.submit(TransactionType::Deposit, DEPOSIT_PATH, amount, currency)
            .await
    }

    pub async fn withdraw(&self, amount: f64, currency: &str) -> EarnResult<Transaction> {
        self.submit(TransactionType::Withdrawal, WITHDRAW_PATH, amount, currency)
            .await
    }

    async fn submit(
        &self,
        kind: TransactionType,
        path: &'static str,
        amount: f64,
        currency: &str,
    ) -> EarnResult<Transaction> {
        let settings = self.settings.load_full();
        if settings.use_mock_data {
            tracing::debug!(?kind, amount, currency, "Mock transaction accepted");
            return Ok(Transaction::pending(kind, amount, currency));
        }

        let mut body = json!({ "amount": amount, "currency": currency });
        if !settings.partner_id.is_empty() {
            body["partnerId"] = json!(settings.partner_id);
        }
        let request = authorize(&settings, HttpRequest::post(settings.url(path), body));
        self.fetch(&settings, request, path).await
    }

    fn get(&self, settings: &ClientSettings, path: &str) -> HttpRequest {
        authorize(settings, HttpRequest::get(settings.url(path)))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        settings: &ClientSettings,
        request: HttpRequest,
        endpoint: &str,
    ) -> EarnResult<T> {
        let request_id = Uuid::new_v4();
        tracing::debug!(
            %request_id,
            method = %request.method,
            endpoint,
            partner_id = %settings.partner_id,
            "Earn API request"
        );

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(TransportFailure::CircuitOpen) => {
                tracing::error!(%request_id, endpoint, "Earn API circuit breaker is open");
                return Err(EarnError::CircuitOpen {
                    endpoint: endpoint.to_string(),
                });
            }
            Err(TransportFailure::Network(message)) => {
                return Err(transport_error(request_id, endpoint, None, message));
            }
        };

        if !response.is_success() {
            return Err(transport_error(
                request_id,
                endpoint,
                Some(response.status),
                response.body,
            ));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            tracing::error!(%request_id, endpoint, error = %e, "Earn API returned unexpected JSON");
            EarnError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            }
        })
    }
}

fn authorize(settings: &ClientSettings, request: HttpRequest) -> HttpRequest {
    request
        .header("Authorization", format!("Bearer {}", settings.api_key))
        .header("X-Partner-ID", settings.partner_id.clone())
}

fn transport_error(request_id: Uuid, endpoint: &str, status: Option<u16>, body: String) -> EarnError {
    tracing::error!(%request_id, endpoint, status, body = %body, "Earn API request failed");
    EarnError::Transport {
        endpoint: endpoint.to_string(),
        status,
        body,
    }
}
