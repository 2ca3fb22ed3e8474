mod common;

use common::{HostCall, RecordingHost, RecordingTransport};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use earn_core::embed::view::{MOUNT_CLASS, STYLE_ELEMENT_ID};
use earn_core::embed::{
    EmbedBootstrap, MountId, ScriptAttributes, WidgetState, WidgetView, PRODUCT_SELECTED_EVENT,
};
use earn_core::yaas::client::PRODUCTS_PATH;
use earn_core::EarnError;

const API: &str = "https://earn.test";

fn attributes(extra: &[(&str, &str)]) -> ScriptAttributes {
    let mut map = HashMap::from([
        ("data-partner-id".to_string(), "acme".to_string()),
        ("data-api-url".to_string(), API.to_string()),
    ]);
    for (name, value) in extra {
        map.insert(name.to_string(), value.to_string());
    }
    ScriptAttributes::from_map(&map)
}

fn partner_answer() -> String {
    json!({ "partnerId": "acme", "apiKey": "acme-key", "baseUrl": API }).to_string()
}

fn products_answer() -> String {
    json!([
        { "id": "p1", "currencyCode": "USDC", "apy": 8.5, "name": "USDC Earn" },
        { "id": "p2", "currency": "ETH", "apy": 3.1, "minDeposit": 0.1 }
    ])
    .to_string()
}

#[tokio::test]
async fn test_bootstrap_renders_products() {
    let host = Arc::new(RecordingHost::new());
    let transport = Arc::new(
        RecordingTransport::new()
            .respond("/partner-config/acme", 200, partner_answer())
            .respond(PRODUCTS_PATH, 200, products_answer()),
    );

    let widget = EmbedBootstrap::new(attributes(&[("data-theme", "dark")]), host.clone())
        .with_transport(transport.clone())
        .run()
        .await
        .unwrap();

    let WidgetState::Rendered(products) = widget.state() else {
        panic!("expected rendered state, got {:?}", widget.state());
    };
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].currency, "USDC");

    let frames = host.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].view, WidgetView::Loading);
    assert!(matches!(frames[1].view, WidgetView::Products(_)));
    assert_eq!(frames[1].theme_class.as_deref(), Some("theme-dark"));

    let requests = transport.requests();
    assert_eq!(requests[0].url, format!("{}/partner-config/acme", API));
    assert_eq!(requests[1].header_value("Authorization"), Some("Bearer acme-key"));
    assert_eq!(requests[1].header_value("X-Partner-ID"), Some("acme"));
}

#[tokio::test]
async fn test_empty_product_list_renders_empty_view() {
    let host = Arc::new(RecordingHost::new());
    let transport = Arc::new(
        RecordingTransport::new()
            .respond("/partner-config/acme", 200, partner_answer())
            .respond(PRODUCTS_PATH, 200, "[]"),
    );

    let widget = EmbedBootstrap::new(attributes(&[]), host.clone())
        .with_transport(transport)
        .run()
        .await
        .unwrap();

    assert_eq!(widget.state(), &WidgetState::Rendered(Vec::new()));
    let last = host.frames().pop().unwrap();
    assert_eq!(last.view, WidgetView::Empty);
    assert_eq!(last.view.message(), Some("No products available"));
}

#[tokio::test]
async fn test_partner_config_failure_ends_in_error() {
    let host = Arc::new(RecordingHost::new());
    let transport = Arc::new(
        RecordingTransport::new()
            .respond("/partner-config/acme", 404, "unknown partner")
            .respond(PRODUCTS_PATH, 200, products_answer()),
    );

    let widget = EmbedBootstrap::new(attributes(&[]), host.clone())
        .with_transport(transport.clone())
        .run()
        .await
        .unwrap();

    assert!(matches!(widget.state(), WidgetState::Error(_)));
    assert_eq!(host.frames().pop().unwrap().view, WidgetView::Error);
    assert_eq!(transport.request_count(), 1, "products are not fetched without a partner config");
}

#[tokio::test]
async fn test_product_failure_ends_in_error() {
    let host = Arc::new(RecordingHost::new());
    let transport = Arc::new(
        RecordingTransport::new()
            .respond("/partner-config/acme", 200, partner_answer())
            .respond(PRODUCTS_PATH, 503, "maintenance"),
    );

    let widget = EmbedBootstrap::new(attributes(&[]), host.clone())
        .with_transport(transport)
        .run()
        .await
        .unwrap();

    let WidgetState::Error(message) = widget.state() else {
        panic!("expected error state");
    };
    assert!(message.contains("503"));
    assert!(!widget.select("p1"));
}

#[tokio::test]
async fn test_missing_container_aborts() {
    let host = Arc::new(RecordingHost::new());
    let transport = Arc::new(RecordingTransport::new());

    let result = EmbedBootstrap::new(attributes(&[("data-container-id", "earn-here")]), host.clone())
        .with_transport(transport.clone())
        .run()
        .await;

    assert!(matches!(result, Err(EarnError::ContainerNotFound(id)) if id == "earn-here"));
    assert!(host.frames().is_empty());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_existing_container_and_styles_are_reused() {
    let host = Arc::new(RecordingHost::new().with_element("earn-here"));
    let transport = Arc::new(
        RecordingTransport::new()
            .respond("/partner-config/acme", 200, partner_answer())
            .respond(PRODUCTS_PATH, 200, "[]"),
    );

    for _ in 0..2 {
        let widget =
            EmbedBootstrap::new(attributes(&[("data-container-id", "earn-here")]), host.clone())
                .with_transport(transport.clone())
                .run()
                .await
                .unwrap();
        assert_eq!(widget.mount(), &MountId("earn-here".to_string()));
    }

    assert_eq!(host.style_injections(), 1);
    assert!(host.calls().contains(&HostCall::InjectStyle(STYLE_ELEMENT_ID.to_string())));
    assert!(!host
        .calls()
        .iter()
        .any(|call| matches!(call, HostCall::CreateMount(_))));
}

#[tokio::test]
async fn test_mount_created_before_script_without_container() {
    let host = Arc::new(RecordingHost::new());
    let transport = Arc::new(
        RecordingTransport::new()
            .respond("/partner-config/acme", 200, partner_answer())
            .respond(PRODUCTS_PATH, 200, "[]"),
    );

    EmbedBootstrap::new(attributes(&[]), host.clone())
        .with_transport(transport)
        .run()
        .await
        .unwrap();

    assert!(host
        .calls()
        .contains(&HostCall::CreateMount(MOUNT_CLASS.to_string())));
}

#[tokio::test]
async fn test_select_dispatches_event_and_redirects() {
    let host = Arc::new(RecordingHost::new());
    let transport = Arc::new(
        RecordingTransport::new()
            .respond("/partner-config/acme", 200, partner_answer())
            .respond(PRODUCTS_PATH, 200, products_answer()),
    );

    let widget = EmbedBootstrap::new(
        attributes(&[("data-redirect", "https://partner.test/earn")]),
        host.clone(),
    )
    .with_transport(transport)
    .run()
    .await
    .unwrap();

    assert!(widget.select("p2"));
    assert!(!widget.select("missing"));

    let calls = host.calls();
    let dispatched: Vec<_> = calls
        .iter()
        .filter_map(|call| match call {
            HostCall::Dispatch(name, detail) => Some((name.clone(), detail.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].0, PRODUCT_SELECTED_EVENT);
    assert_eq!(dispatched[0].1["partnerId"], "acme");
    assert_eq!(dispatched[0].1["product"]["id"], "p2");
    assert_eq!(dispatched[0].1["product"]["minDeposit"], 0.1);

    assert_eq!(
        calls.last(),
        Some(&HostCall::Navigate("https://partner.test/earn".to_string()))
    );
}
