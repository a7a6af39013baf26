use hireflow_client::EntityHook;
use hireflow_db::models::Job;
use hireflow_services::ListQuery;
use serde_json::json;

use crate::fixtures::seed::{job_payload, ticket_payload};
use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn excel_export_artifact_is_served() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("xlsco");
    let client = app.connect(&tenant).await;

    for title in ["Backend Engineer", "Frontend Engineer"] {
        client
            .request_ok("job:create", job_payload(title, "Active", 80_000.0))
            .await
            .unwrap();
    }

    let exported = client
        .request_ok("job:export", json!({ "format": "excel" }))
        .await
        .unwrap();
    assert_eq!(exported.data["count"], 2);

    // The link is absolute: configured base URL plus the static route.
    let url = exported.data["url"].as_str().unwrap();
    assert!(url.starts_with(&app.base_url));
    assert!(url.contains("/temp/"));
    let file_name = exported.data["file_name"].as_str().unwrap();
    assert!(file_name.starts_with("job_"));
    assert!(file_name.contains(&tenant.tenant_id.to_hex()));
    assert!(file_name.ends_with(".xlsx"));

    // The artifact is downloadable from the static route.
    let response = app.client.get(url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let bytes = response.bytes().await.unwrap();
    // XLSX is a ZIP container.
    assert_eq!(&bytes[..2], b"PK");

    client.close().await.ok();
}

#[tokio::test]
async fn pdf_export_honors_the_filter() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("pdfco");
    let client = app.connect(&tenant).await;

    for (title, status) in [
        ("Backend Engineer", "Active"),
        ("Frontend Engineer", "Active"),
        ("Office Manager", "Inactive"),
    ] {
        client
            .request_ok("job:create", job_payload(title, status, 70_000.0))
            .await
            .unwrap();
    }

    let exported = client
        .request_ok("job:export", json!({ "format": "pdf", "status": "Active" }))
        .await
        .unwrap();
    assert_eq!(exported.data["count"], 2);

    let url = exported.data["url"].as_str().unwrap();
    assert!(url.ends_with(".pdf"));

    let response = app.client.get(url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let bytes = response.bytes().await.unwrap();
    assert_eq!(&bytes[..8], b"%PDF-1.4");

    client.close().await.ok();
}

#[tokio::test]
async fn every_entity_kind_exports() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("omnico");
    let client = app.connect(&tenant).await;

    client
        .request_ok("ticket:create", ticket_payload("Broken lamp", "Low"))
        .await
        .unwrap();

    let exported = client
        .request_ok("ticket:export", json!({ "format": "pdf" }))
        .await
        .unwrap();
    assert_eq!(exported.data["count"], 1);
    assert!(exported.data["file_name"].as_str().unwrap().starts_with("ticket_"));

    // An empty result set still yields a valid artifact.
    let exported = client
        .request_ok("deal:export", json!({ "format": "excel" }))
        .await
        .unwrap();
    assert_eq!(exported.data["count"], 0);
    let response = app
        .client
        .get(exported.data["url"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    client.close().await.ok();
}

#[tokio::test]
async fn hook_exports_with_its_own_query() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("hookxco");
    let client = app.connect(&tenant).await;

    for (title, status) in [("Kept", "Active"), ("Dropped", "Inactive")] {
        client
            .request_ok("job:create", job_payload(title, status, 65_000.0))
            .await
            .unwrap();
    }

    let hook: EntityHook<Job> = EntityHook::new().with_query(ListQuery {
        status: Some("Active".to_string()),
        ..Default::default()
    });

    let artifact = hook.export_pdf(&client).await.unwrap();
    assert_eq!(artifact["count"], 1);
    assert!(artifact["url"].as_str().unwrap().ends_with(".pdf"));

    let artifact = hook.export_excel(&client).await.unwrap();
    assert!(artifact["file_name"].as_str().unwrap().ends_with(".xlsx"));

    client.close().await.ok();
}

#[tokio::test]
async fn unknown_format_is_rejected() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("fmtco");
    let client = app.connect(&tenant).await;

    let response = client
        .request("job:export", json!({ "format": "csv" }))
        .await
        .unwrap();
    assert!(!response.done);
    assert!(response.error.unwrap().contains("invalid export request"));

    client.close().await.ok();
}
