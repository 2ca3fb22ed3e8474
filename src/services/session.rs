//! One partner's view of the Earn API: resolve once, then read and transact.

use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::feature_flags::FeatureGate;
use super::partner_config::PartnerConfigResolver;
use crate::config::{FEATURE_EARNINGS, FEATURE_TRANSACTIONS};
use crate::domain::{Balance, CanonicalProduct, FeatureMap, PartnerConfig, Transaction};
use crate::error::EarnResult;
use crate::yaas::{ClientOptions, EarnClient, HttpTransport};

/// Data loaded by [`EarnSession::refresh`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EarnSnapshot {
    pub products: Vec<CanonicalProduct>,
    pub balances: Vec<Balance>,
    pub transactions: Vec<Transaction>,
}

/// What the session remembers about its last failed call.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionError {
    pub action: &'static str,
    pub message: String,
    pub status: Option<u16>,
}

pub struct EarnSession {
    config: PartnerConfig,
    client: Arc<EarnClient>,
    last_error: Mutex<Option<SessionError>>,
}

impl EarnSession {
    /// Resolves the partner once and builds a client from
    /// process defaults, partner flags and `overrides`, in that order.
    pub async fn connect(
        resolver: &PartnerConfigResolver,
        partner_id: &str,
        overrides: FeatureMap,
    ) -> Self {
        let config = resolver.resolve(partner_id).await;
        let client = EarnClient::new(
            resolver.defaults(),
            Self::options(resolver, &config, overrides),
        );
        Self::from_parts(config, client)
    }

    /// Same as [`connect`](Self::connect) with an explicit transport for the data client.
    pub async fn connect_with_transport(
        resolver: &PartnerConfigResolver,
        partner_id: &str,
        overrides: FeatureMap,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let config = resolver.resolve(partner_id).await;
        let client = EarnClient::with_transport(
            resolver.defaults(),
            Self::options(resolver, &config, overrides),
            transport,
        );
        Self::from_parts(config, client)
    }

    fn options(
        resolver: &PartnerConfigResolver,
        config: &PartnerConfig,
        overrides: FeatureMap,
    ) -> ClientOptions {
        let features = FeatureGate::new(resolver.defaults().features.clone())
            .with_partner(config)
            .with_overrides(overrides)
            .effective();

        ClientOptions::default()
            .use_mock_data(resolver.uses_mock_data())
            .base_url(config.base_url.clone())
            .api_key(config.api_key.clone())
            .partner_id(config.partner_id.clone())
            .features(features)
    }

    fn from_parts(config: PartnerConfig, client: EarnClient) -> Self {
        tracing::info!(
            partner_id = %config.partner_id,
            base_url = %config.base_url,
            "Earn session ready"
        );
        Self {
            config,
            client: Arc::new(client),
            last_error: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PartnerConfig {
        &self.config
    }

    pub fn client(&self) -> Arc<EarnClient> {
        Arc::clone(&self.client)
    }

    pub fn last_error(&self) -> Option<SessionError> {
        self.last_error
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }

    /// Loads products, balances and transactions concurrently. Balances are
    /// skipped when `earnings` is off and transactions when `transactions` is off.
    pub async fn refresh(&self) -> EarnResult<EarnSnapshot> {
        let client = &self.client;
        let balances = async {
            if client.is_feature_enabled(FEATURE_EARNINGS) {
                client.get_balances().await
            } else {
                Ok(Vec::new())
            }
        };
        let transactions = async {
            if client.is_feature_enabled(FEATURE_TRANSACTIONS) {
                client.get_transactions().await
            } else {
                Ok(Vec::new())
            }
        };

        let (products, balances, transactions) =
            tokio::join!(client.get_products(), balances, transactions);

        let snapshot = EarnSnapshot {
            products: self.record("refresh products", products)?,
            balances: self.record("refresh balances", balances)?,
            transactions: self.record("refresh transactions", transactions)?,
        };
        self.clear_error();
        Ok(snapshot)
    }

    pub async fn get_products(&self) -> Option<Vec<CanonicalProduct>> {
        self.guarded("Failed to fetch products", self.client.get_products())
            .await
    }

    pub async fn get_balances(&self) -> Option<Vec<Balance>> {
        self.guarded("Failed to fetch balances", self.client.get_balances())
            .await
    }

    pub async fn get_transactions(&self) -> Option<Vec<Transaction>> {
        self.guarded("Failed to fetch transactions", self.client.get_transactions())
            .await
    }

    pub async fn deposit(&self, amount: f64, currency: &str) -> Option<Transaction> {
        self.guarded("Deposit failed", self.client.deposit(amount, currency))
            .await
    }

    pub async fn withdraw(&self, amount: f64, currency: &str) -> Option<Transaction> {
        self.guarded("Withdrawal failed", self.client.withdraw(amount, currency))
            .await
    }

    /// Runs `operation`, clearing the last error first and recording a new one on failure.
    async fn guarded<T, F>(&self, action: &'static str, operation: F) -> Option<T>
    where
        F: Future<Output = EarnResult<T>>,
    {
        self.clear_error();
        self.record(action, operation.await).ok()
    }

    fn record<T>(&self, action: &'static str, result: EarnResult<T>) -> EarnResult<T> {
        if let Err(e) = &result {
            tracing::error!(partner_id = %self.config.partner_id, "Earn API Error: {}: {}", action, e);
            self.set_error(Some(SessionError {
                action,
                message: e.to_string(),
                status: e.status(),
            }));
        }
        result
    }

    fn clear_error(&self) {
        self.set_error(None);
    }

    fn set_error(&self, error: Option<SessionError>) {
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = error;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_mock_session_refresh() {
        let resolver = PartnerConfigResolver::new(Config::default());
        let session = EarnSession::connect(&resolver, "demo-partner", FeatureMap::new()).await;

        let snapshot = session.refresh().await.unwrap();
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.balances.len(), 1);
        assert_eq!(snapshot.transactions.len(), 3);
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_partner_flag_disables_transactions() {
        let resolver = PartnerConfigResolver::new(Config::default());
        let session = EarnSession::connect(&resolver, "partner-123", FeatureMap::new()).await;

        assert!(!session.client().is_feature_enabled("transactions"));
        let snapshot = session.refresh().await.unwrap();
        assert!(snapshot.transactions.is_empty());
        assert_eq!(snapshot.balances.len(), 1);
    }

    #[tokio::test]
    async fn test_overrides_beat_partner_flags() {
        let resolver = PartnerConfigResolver::new(Config::default());
        let overrides = FeatureMap::from([("transactions".to_string(), true)]);
        let session = EarnSession::connect(&resolver, "partner-123", overrides).await;

        assert!(session.client().is_feature_enabled("transactions"));
    }

    #[tokio::test]
    async fn test_session_uses_partner_connection_settings() {
        let resolver = PartnerConfigResolver::new(Config::default());
        let session = EarnSession::connect(&resolver, "demo-partner", FeatureMap::new()).await;

        let settings = session.client().settings();
        assert_eq!(settings.api_key, "demo-api-key");
        assert_eq!(settings.partner_id, "demo-partner");
        assert_eq!(session.config().partner_id, "demo-partner");
    }
}
