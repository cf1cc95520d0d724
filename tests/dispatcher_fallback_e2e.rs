mod e2e_utils;

use std::sync::Arc;
use std::time::Duration;

use e2e_utils::ScriptedServer;
use serde_json::json;
use shipping_manager::adapters::{ConfiguredProxyChain, DebugRecorder, ReqwestHttpClient};
use shipping_manager::domain::{
    Credentials, Dispatcher, PlatformEndpoints, PlatformId, ProxyEndpoint, RecordedResponse, RequestDescriptor,
    ShippingError, TransportAttempt, UrlComposition,
};
use shipping_manager::ports::SnapshotPort;

fn dispatcher(api: &ScriptedServer, relays: Vec<ProxyEndpoint>, recorder: Arc<DebugRecorder>) -> Dispatcher {
    Dispatcher::new(
        PlatformEndpoints {
            easyship: format!("{}/2024-09", api.url()),
            veeqo: api.url(),
        },
        Arc::new(ConfiguredProxyChain::new(relays).expect("relays")),
        Arc::new(ReqwestHttpClient::new(Some(Duration::from_secs(5))).expect("client")),
        recorder,
    )
}

#[tokio::test]
async fn test_direct_failure_falls_back_through_relays() {
    let api = ScriptedServer::start(vec![(500, r#"{"message":"Server error"}"#)])
        .await
        .expect("api server");
    let first_relay = ScriptedServer::start(vec![(429, r#"{"message":"Too many requests"}"#)])
        .await
        .expect("first relay");
    let second_relay = ScriptedServer::start(vec![(200, r#"{"warehouses":[{"id":1}]}"#)])
        .await
        .expect("second relay");

    let recorder = Arc::new(DebugRecorder::new());
    let dispatcher = dispatcher(
        &api,
        vec![
            ProxyEndpoint::new(format!("{}/raw?url=", first_relay.url()), UrlComposition::EncodedSuffix),
            ProxyEndpoint::new(format!("{}/", second_relay.url()), UrlComposition::PathPrefix),
        ],
        recorder.clone(),
    );
    let credentials = Credentials::new(PlatformId::Easyship, "es-test-key-123");

    let body = dispatcher
        .dispatch(&credentials, &RequestDescriptor::get("/reference/warehouses"))
        .await
        .expect("third attempt succeeds");

    assert_eq!(body, json!({"warehouses": [{"id": 1}]}));

    let direct = api.seen();
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].uri, "/2024-09/reference/warehouses");
    assert_eq!(direct[0].header("authorization"), Some("Bearer es-test-key-123"));
    assert_eq!(direct[0].header("x-requested-with"), None);

    let target = format!("{}/2024-09/reference/warehouses", api.url());
    let relayed = first_relay.seen();
    assert_eq!(relayed.len(), 1);
    assert_eq!(relayed[0].uri, format!("/raw?url={}", urlencoding::encode(&target)));
    assert_eq!(relayed[0].header("x-requested-with"), Some("XMLHttpRequest"));

    let prefixed = second_relay.seen();
    assert_eq!(prefixed.len(), 1);
    assert_eq!(prefixed[0].uri, format!("/{}", target));

    let snapshot = recorder.snapshot().await;
    let last_request = snapshot.last_request.expect("request recorded");
    assert_eq!(last_request.attempt, TransportAttempt::Proxied(1));
    assert_eq!(last_request.headers["Authorization"], "Bearer ***");
    assert_eq!(snapshot.last_response.and_then(|r| r.status()), Some(200));
}

#[tokio::test]
async fn test_exhaustion_reports_last_relay_error() {
    let api = ScriptedServer::start(vec![(401, r#"{"message":"Invalid token"}"#)])
        .await
        .expect("api server");
    let relay = ScriptedServer::start(vec![(403, r#"{"message":"Forbidden by relay"}"#)])
        .await
        .expect("relay");

    let recorder = Arc::new(DebugRecorder::new());
    let dispatcher = dispatcher(
        &api,
        vec![ProxyEndpoint::new(format!("{}/", relay.url()), UrlComposition::PathPrefix)],
        recorder.clone(),
    );
    let credentials = Credentials::new(PlatformId::Veeqo, "veeqo-test-key");

    let err = dispatcher
        .dispatch(
            &credentials,
            &RequestDescriptor::post("/customers", json!({"customer": {"name": "Ann"}})),
        )
        .await
        .expect_err("every attempt fails");

    assert!(matches!(err, ShippingError::ApiCallFailed(_)));
    assert_eq!(err.to_string(), "Proxy Error: 403 - Forbidden by relay");
    assert!(err.is_rate_limited());

    let direct = api.seen();
    assert_eq!(direct[0].method, "POST");
    assert_eq!(direct[0].body, r#"{"customer":{"name":"Ann"}}"#);
    assert_eq!(relay.seen()[0].body, direct[0].body);

    let snapshot = recorder.snapshot().await;
    assert_eq!(
        snapshot.last_response,
        Some(RecordedResponse::Received {
            status: 403,
            data: json!({"message": "Forbidden by relay"}),
        })
    );
}

#[tokio::test]
async fn test_unreachable_relay_is_recorded_as_failure() {
    let api = ScriptedServer::start(vec![(502, "<html>bad gateway</html>")])
        .await
        .expect("api server");
    let closed = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let closed_addr = closed.local_addr().expect("addr");
    drop(closed);

    let recorder = Arc::new(DebugRecorder::new());
    let dispatcher = dispatcher(
        &api,
        vec![ProxyEndpoint::new(format!("http://{}/", closed_addr), UrlComposition::PathPrefix)],
        recorder.clone(),
    );
    let credentials = Credentials::new(PlatformId::Veeqo, "veeqo-test-key");

    let err = dispatcher
        .dispatch(&credentials, &RequestDescriptor::get("/current_user"))
        .await
        .expect_err("relay is down");

    assert!(err.to_string().starts_with("Proxy Error: "));
    assert_eq!(err.attempt(), Some(TransportAttempt::Proxied(0)));
    assert!(matches!(
        recorder.snapshot().await.last_response,
        Some(RecordedResponse::Failed { .. })
    ));
}
