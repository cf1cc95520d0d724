mod e2e_utils;

use std::sync::Arc;

use e2e_utils::{unescape, ScriptedServer};
use serde_json::{json, Value};
use shipping_manager::adapters::{ConfiguredProxyChain, DebugRecorder, HtmlPresenter, ReqwestHttpClient};
use shipping_manager::domain::{
    DestinationInput, Dispatcher, PlatformEndpoints, PlatformId, ShippingError, ShippingSession,
};

fn session(api: &ScriptedServer, presenter: Arc<HtmlPresenter>) -> ShippingSession {
    let dispatcher = Dispatcher::new(
        PlatformEndpoints {
            easyship: format!("{}/2024-09", api.url()),
            veeqo: api.url(),
        },
        Arc::new(ConfiguredProxyChain::new(vec![]).expect("relays")),
        Arc::new(ReqwestHttpClient::new(None).expect("client")),
        Arc::new(DebugRecorder::new()),
    );
    ShippingSession::new(dispatcher, presenter)
}

#[tokio::test]
async fn test_veeqo_order_workflow() {
    let api = ScriptedServer::start(vec![
        (200, r#"{"id": 1, "login": "ops"}"#),
        (200, r#"[{"id": 55, "name": "Main <WH>", "city": "Leeds"}]"#),
        (200, r#"[{"id": 7, "title": "Mug", "sku_code": "MUG-1"}]"#),
        (201, r#"{"id": 900, "email": "jane@example.com"}"#),
        (201, r#"{"id": 4242}"#),
    ])
    .await
    .expect("api server");
    let presenter = Arc::new(HtmlPresenter::new());
    let mut session = session(&api, presenter.clone());

    session.select_platform(PlatformId::Veeqo);
    session.connect("veeqo-api-key-1").await.expect("connect");
    session.load_warehouses().await.expect("warehouses");
    session.select_warehouse("55").expect("warehouse");
    session.load_products().await.expect("products");
    session.toggle_product("7").expect("product");

    let preview = session.preview_customer_paste("\nJane Roe\n\njane@example.com\n555-0100\n1 High St\n");
    assert!(preview.is_valid());
    session
        .save_customer(&preview.draft.expect("draft"))
        .await
        .expect("customer");

    let gates = session.set_destination(&DestinationInput {
        address1: "1 Main St".into(),
        address2: "".into(),
        city: "York".into(),
        state: "YK".into(),
        postal_code: "YO1".into(),
        country: "GB".into(),
    });
    assert!(!gates.rates_enabled);
    assert!(gates.order_enabled);

    assert!(matches!(session.get_rates().await, Err(ShippingError::Unsupported(_))));

    let order = session.create_order().await.expect("order");
    assert_eq!(order.id.as_deref(), Some("4242"));
    assert_eq!(order.status, "Created");

    let seen = api.seen();
    let paths: Vec<&str> = seen.iter().map(|r| r.uri.as_str()).collect();
    assert_eq!(paths, ["/current_user", "/warehouses", "/products", "/customers", "/orders"]);

    let customer: Value = serde_json::from_str(&seen[3].body).unwrap();
    assert_eq!(customer["customer"]["name"], "Jane Roe");
    assert_eq!(customer["customer"]["phone"], "555-0100");

    let order_payload: Value = serde_json::from_str(&seen[4].body).unwrap();
    assert_eq!(order_payload["customer_id"], "900");
    assert_eq!(order_payload["order_items"], json!([{"sellable_id": "7", "quantity": 1}]));
    assert_eq!(order_payload["deliver_to"]["country_alpha2"], "GB");
    assert_eq!(order_payload["deliver_to"]["line_2"], "");

    let warehouses = presenter.fragment("warehouses").expect("rendered");
    assert!(!warehouses.contains("<WH>"));
    assert!(unescape(&warehouses).contains(r#"<option value="55">Main <WH> - Leeds</option>"#));
    assert!(presenter.fragment("results").expect("rendered").contains("Order ID: 4242"));
    assert!(presenter
        .fragment("error")
        .expect("rendered")
        .contains("Rates are only available"));
}

#[tokio::test]
async fn test_failed_connection_keeps_session_disconnected() {
    let api = ScriptedServer::start(vec![(401, r#"{"message":"Invalid API key"}"#)])
        .await
        .expect("api server");
    let presenter = Arc::new(HtmlPresenter::new());
    let mut session = session(&api, presenter.clone());

    session.select_platform(PlatformId::Easyship);
    let err = session.connect("easyship-bad-key").await.expect_err("rejected");

    assert_eq!(
        err.to_string(),
        "Failed to connect to easyship: API Error: 401 - Invalid API key"
    );
    assert!(!session.state().connected);
    assert!(presenter
        .fragment("connection")
        .expect("rendered")
        .contains("disconnected"));
    assert_eq!(api.seen()[0].uri, "/2024-09/reference/couriers");
}
