use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

use crate::fixtures::seed::job_payload;
use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn ping_gets_pong() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("pingco");

    let ws_url = format!("ws://{}/ws?token={}", app.addr, tenant.token);
    let (mut ws, _) = tokio_tungstenite::connect_async(&ws_url)
        .await
        .expect("WS connect failed");

    // Read the "connected" greeting.
    let greeting = ws.next().await.unwrap().unwrap();
    let parsed: Value = serde_json::from_str(greeting.to_text().unwrap()).unwrap();
    assert_eq!(parsed["event"], "connected");
    assert_eq!(
        parsed["data"]["tenant_id"].as_str().unwrap(),
        tenant.tenant_id.to_hex()
    );

    ws.send(Message::text(json!({ "event": "ping" }).to_string()))
        .await
        .unwrap();

    let msg = tokio::time::timeout(std::time::Duration::from_secs(5), ws.next())
        .await
        .expect("Timeout waiting for pong")
        .unwrap()
        .unwrap();
    let parsed: Value = serde_json::from_str(msg.to_text().unwrap()).unwrap();
    assert_eq!(parsed["event"], "pong");

    ws.close(None).await.ok();
}

#[tokio::test]
async fn unknown_events_get_error_responses() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("oddco");
    let client = app.connect(&tenant).await;

    // Unknown entity
    let response = client.request("widget:list", json!({})).await.unwrap();
    assert!(!response.done);
    assert_eq!(response.error.as_deref(), Some("unknown event"));

    // Known entity, unknown operation
    let response = client.request("job:frobnicate", json!({})).await.unwrap();
    assert!(!response.done);
    assert_eq!(response.error.as_deref(), Some("unknown operation"));

    // No namespace at all
    let response = client.request("hello", json!({})).await.unwrap();
    assert!(!response.done);

    client.close().await.ok();
}

#[tokio::test]
async fn malformed_ids_are_reported_not_fatal() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("robustco");
    let client = app.connect(&tenant).await;

    let response = client
        .request("job:get", json!({ "id": "not-an-object-id" }))
        .await
        .unwrap();
    assert!(!response.done);
    assert_eq!(response.error.as_deref(), Some("invalid id"));

    let response = client.request("job:update", json!({})).await.unwrap();
    assert!(!response.done);
    assert_eq!(response.error.as_deref(), Some("missing id"));

    // The connection survives bad requests.
    client
        .request_ok("job:create", job_payload("Survivor", "Active", 50_000.0))
        .await
        .unwrap();

    client.close().await.ok();
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = TestApp::spawn().await;
    let response = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}
