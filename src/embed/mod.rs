//! Script-tag embedding of the product list.
//!
//! [`EmbedBootstrap::run`] drives one mount point through
//! `Loading -> Rendered | Error`. Both outcomes are terminal: there is no
//! retry short of running a new bootstrap, and nothing is deduplicated.

pub mod attributes;
pub mod host;
pub mod view;

use serde_json::json;
use std::sync::Arc;

pub use attributes::ScriptAttributes;
pub use host::{EmbedHost, MountId};
pub use view::{theme_class, Frame, WidgetView};

use crate::config::Config;
use crate::domain::{CanonicalProduct, FeatureMap, PartnerConfig};
use crate::error::{EarnError, EarnResult};
use crate::services::fetch_partner_config;
use crate::yaas::{ClientOptions, EarnClient, HttpTransport, ReqwestTransport};

pub const PRODUCT_SELECTED_EVENT: &str = "earnProductSelected";

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetState {
    Loading,
    Rendered(Vec<CanonicalProduct>),
    Error(String),
}

impl WidgetState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WidgetState::Loading)
    }

    /// Moves out of `Loading`. Terminal states never change again.
    fn settle(&mut self, outcome: EarnResult<Vec<CanonicalProduct>>) -> bool {
        if self.is_terminal() {
            tracing::warn!(state = ?self, "Ignoring transition out of terminal widget state");
            return false;
        }
        *self = match outcome {
            Ok(products) => WidgetState::Rendered(products),
            Err(e) => WidgetState::Error(e.to_string()),
        };
        true
    }

    fn view(&self) -> WidgetView {
        match self {
            WidgetState::Loading => WidgetView::Loading,
            WidgetState::Rendered(products) if products.is_empty() => WidgetView::Empty,
            WidgetState::Rendered(products) => WidgetView::Products(products.clone()),
            WidgetState::Error(_) => WidgetView::Error,
        }
    }
}

pub struct EmbedBootstrap {
    attributes: ScriptAttributes,
    host: Arc<dyn EmbedHost>,
    transport: Arc<dyn HttpTransport>,
}

impl EmbedBootstrap {
    pub fn new(attributes: ScriptAttributes, host: Arc<dyn EmbedHost>) -> Self {
        Self {
            attributes,
            host,
            transport: Arc::new(ReqwestTransport::default()),
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Fails only when an explicit container id does not exist; load
    /// failures end in the `Error` state instead.
    pub async fn run(self) -> EarnResult<EmbedWidget> {
        let EmbedBootstrap {
            attributes,
            host,
            transport,
        } = self;

        if !host.has_element(view::STYLE_ELEMENT_ID) {
            host.inject_style(view::STYLE_ELEMENT_ID, view::WIDGET_STYLES);
        }

        let mount = match &attributes.container_id {
            Some(id) => host.find_container(id).ok_or_else(|| {
                tracing::error!("Container with ID \"{}\" not found", id);
                EarnError::ContainerNotFound(id.clone())
            })?,
            None => host.create_mount_before_script(view::MOUNT_CLASS),
        };

        let mut widget = EmbedWidget {
            state: WidgetState::Loading,
            theme_class: theme_class(&attributes.theme),
            attributes,
            host,
            mount,
        };
        widget.paint();

        let outcome = load_products(&widget.attributes, transport).await;
        if let Err(e) = &outcome {
            tracing::error!(partner_id = %widget.attributes.partner_id, "Earn Widget Error: {}", e);
        }
        widget.state.settle(outcome);
        tracing::info!(
            partner_id = %widget.attributes.partner_id,
            state = ?widget.state,
            "Earn widget settled"
        );
        widget.paint();

        Ok(widget)
    }
}

/// Partner config (strict, no fallback) and then products from the partner's base URL.
async fn load_products(
    attributes: &ScriptAttributes,
    transport: Arc<dyn HttpTransport>,
) -> EarnResult<Vec<CanonicalProduct>> {
    let fallback = PartnerConfig {
        partner_id: attributes.partner_id.clone(),
        api_key: String::new(),
        base_url: attributes.api_url.clone(),
        features: FeatureMap::new(),
        theme: None,
    };
    let config = fetch_partner_config(
        transport.as_ref(),
        &attributes.api_url,
        &attributes.partner_id,
        fallback,
    )
    .await?;

    let client = EarnClient::with_transport(
        &Config::default(),
        ClientOptions::default()
            .use_mock_data(false)
            .base_url(config.base_url)
            .api_key(config.api_key)
            .partner_id(attributes.partner_id.clone()),
        transport,
    );
    client.get_products().await
}

/// A mounted widget after bootstrap.
pub struct EmbedWidget {
    state: WidgetState,
    theme_class: Option<String>,
    attributes: ScriptAttributes,
    host: Arc<dyn EmbedHost>,
    mount: MountId,
}

impl EmbedWidget {
    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn mount(&self) -> &MountId {
        &self.mount
    }

    /// Click on a product's "Earn Now" button. Returns false if nothing was dispatched.
    pub fn select(&self, product_id: &str) -> bool {
        let WidgetState::Rendered(products) = &self.state else {
            tracing::warn!(product_id, "Product selected while widget is not rendered");
            return false;
        };
        let Some(product) = products.iter().find(|p| p.id == product_id) else {
            tracing::warn!(product_id, "Selected product is not in the rendered list");
            return false;
        };

        self.host.dispatch_event(
            PRODUCT_SELECTED_EVENT,
            json!({ "product": product, "partnerId": self.attributes.partner_id }),
        );
        if let Some(redirect) = &self.attributes.redirect {
            self.host.navigate(redirect);
        }
        true
    }

    fn paint(&self) {
        self.host.render(
            &self.mount,
            &Frame {
                theme_class: self.theme_class.clone(),
                view: self.state.view(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLevel;

    fn product(id: &str) -> CanonicalProduct {
        CanonicalProduct {
            id: id.to_string(),
            name: "USDC".to_string(),
            currency: "USDC".to_string(),
            apy: 8.5,
            min_deposit: 0.0,
            max_deposit: 0.0,
            description: String::new(),
            risk_level: RiskLevel::Medium,
        }
    }

    #[test]
    fn test_loading_settles_once() {
        let mut state = WidgetState::Loading;
        assert!(state.settle(Ok(vec![product("1")])));
        assert!(state.is_terminal());

        assert!(!state.settle(Err(EarnError::Cancelled)));
        assert!(matches!(state, WidgetState::Rendered(_)));
    }

    #[test]
    fn test_empty_list_renders_empty_view() {
        let mut state = WidgetState::Loading;
        state.settle(Ok(Vec::new()));
        assert_eq!(state.view(), WidgetView::Empty);
    }

    #[test]
    fn test_error_view() {
        let mut state = WidgetState::Loading;
        state.settle(Err(EarnError::Transport {
            endpoint: "/api/yaas/v1/products/".to_string(),
            status: Some(503),
            body: String::new(),
        }));
        assert_eq!(state.view(), WidgetView::Error);
    }
}
