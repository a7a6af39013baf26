use hireflow_client::GatewayClient;
use serde_json::json;

use crate::fixtures::seed::job_payload;
use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn tenants_cannot_see_each_others_data() {
    let app = TestApp::spawn().await;
    let acme = app.seed_tenant("acme");
    let globex = app.seed_tenant("globex");

    let acme_client = app.connect(&acme).await;
    let globex_client = app.connect(&globex).await;

    let created = acme_client
        .request_ok("job:create", job_payload("Backend Engineer", "Active", 90_000.0))
        .await
        .unwrap();
    let id = created.data["_id"]["$oid"].as_str().unwrap().to_string();

    // The other tenant sees an empty collection.
    let listed = globex_client
        .request_ok("job:list", json!({}))
        .await
        .unwrap();
    assert!(listed.data.as_array().unwrap().is_empty());

    // Knowing the id does not help.
    let fetched = globex_client
        .request("job:get", json!({ "id": id }))
        .await
        .unwrap();
    assert!(!fetched.done);

    let patched = globex_client
        .request("job:update", json!({ "id": id, "patch": { "title": "Hijacked" } }))
        .await
        .unwrap();
    assert!(!patched.done);

    let deleted = globex_client
        .request("job:delete", json!({ "id": id }))
        .await
        .unwrap();
    assert!(!deleted.done);

    // The document is untouched for its owner.
    let fetched = acme_client
        .request_ok("job:get", json!({ "id": id }))
        .await
        .unwrap();
    assert_eq!(fetched.data["title"], "Backend Engineer");

    acme_client.close().await.ok();
    globex_client.close().await.ok();
}

#[tokio::test]
async fn broadcasts_stay_within_the_tenant() {
    let app = TestApp::spawn().await;
    let acme = app.seed_tenant("acme");
    let globex = app.seed_tenant("globex");

    // Two connections for acme (different tabs), one for globex.
    let acme_writer = app.connect(&acme).await;
    let acme_watcher = app.connect(&acme).await;
    let globex_watcher = app.connect(&globex).await;

    acme_writer
        .request_ok("job:create", job_payload("Backend Engineer", "Active", 90_000.0))
        .await
        .unwrap();

    // The sibling connection gets the event.
    let event = acme_watcher.next_notification().await.unwrap();
    assert_eq!(event["event"], "job-created");
    assert_eq!(event["data"]["title"], "Backend Engineer");

    // The foreign tenant hears nothing.
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    assert!(globex_watcher.take_notifications().await.is_empty());

    acme_writer.close().await.ok();
    acme_watcher.close().await.ok();
    globex_watcher.close().await.ok();
}

#[tokio::test]
async fn stats_are_tenant_scoped() {
    let app = TestApp::spawn().await;
    let acme = app.seed_tenant("acme");
    let globex = app.seed_tenant("globex");

    let acme_client = app.connect(&acme).await;
    let globex_client = app.connect(&globex).await;

    for title in ["A", "B"] {
        acme_client
            .request_ok("job:create", job_payload(title, "Active", 60_000.0))
            .await
            .unwrap();
    }
    globex_client
        .request_ok("job:create", job_payload("C", "Active", 60_000.0))
        .await
        .unwrap();

    let acme_stats = acme_client.request_ok("job:stats", json!({})).await.unwrap();
    let globex_stats = globex_client
        .request_ok("job:stats", json!({}))
        .await
        .unwrap();
    assert_eq!(acme_stats.data["total"], 2);
    assert_eq!(globex_stats.data["total"], 1);

    acme_client.close().await.ok();
    globex_client.close().await.ok();
}

#[tokio::test]
async fn token_without_tenant_is_rejected_at_upgrade() {
    let app = TestApp::spawn().await;

    let token = app
        .auth
        .generate_token(bson::oid::ObjectId::new(), "Drifter", "drifter@example.test", None)
        .unwrap();

    let result = GatewayClient::connect(&app.addr.to_string(), &token).await;
    assert!(result.is_err(), "upgrade must be refused without a tenant claim");
}

#[tokio::test]
async fn garbage_token_is_rejected_at_upgrade() {
    let app = TestApp::spawn().await;
    let result = GatewayClient::connect(&app.addr.to_string(), "not-a-jwt").await;
    assert!(result.is_err());
}
