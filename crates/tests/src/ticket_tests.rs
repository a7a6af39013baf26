use serde_json::json;

use crate::fixtures::seed::ticket_payload;
use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn tickets_get_generated_readable_ids() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("deskco");
    let client = app.connect(&tenant).await;

    let first = client
        .request_ok("ticket:create", ticket_payload("Login broken", "High"))
        .await
        .unwrap();
    let second = client
        .request_ok("ticket:create", ticket_payload("Slow dashboard", "Low"))
        .await
        .unwrap();

    let first_id = first.data["ticket_id"].as_str().unwrap();
    let second_id = second.data["ticket_id"].as_str().unwrap();
    assert!(first_id.starts_with("TKT-"));
    assert_eq!(first_id.len(), 12);
    assert_ne!(first_id, second_id);

    // Generated ids are searchable.
    let found = client
        .request_ok("ticket:list", json!({ "search": first_id }))
        .await
        .unwrap();
    assert_eq!(found.data.as_array().unwrap().len(), 1);

    client.close().await.ok();
}

#[tokio::test]
async fn defaults_and_status_flow() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("flowco");
    let client = app.connect(&tenant).await;

    // A ticket without a description is refused outright.
    let refused = client
        .request(
            "ticket:create",
            json!({ "title": "Printer on fire", "category": "Hardware" }),
        )
        .await
        .unwrap();
    assert!(!refused.done);

    let created = client
        .request_ok(
            "ticket:create",
            json!({
                "title": "Printer on fire",
                "category": "Hardware",
                "description": "Smoke coming out of the tray",
            }),
        )
        .await
        .unwrap();
    let id = created.data["_id"]["$oid"].as_str().unwrap().to_string();
    assert_eq!(created.data["priority"], "Medium");
    assert_eq!(created.data["status"], "Open");

    for status in ["In Progress", "Resolved", "Closed"] {
        let updated = client
            .request_ok("ticket:update", json!({ "id": id, "patch": { "status": status } }))
            .await
            .unwrap();
        assert_eq!(updated.data["status"], status);
    }

    client.close().await.ok();
}

#[tokio::test]
async fn comments_grow_through_updates() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("commentco");
    let client = app.connect(&tenant).await;

    let created = client
        .request_ok("ticket:create", ticket_payload("Weird noise", "Medium"))
        .await
        .unwrap();
    let id = created.data["_id"]["$oid"].as_str().unwrap().to_string();
    assert!(created.data["comments"].as_array().unwrap().is_empty());

    // Comments are patched as the whole array.
    let comment = json!({
        "author": "Sam Support",
        "text": "Can you attach a recording?",
        "created_at": "2026-08-27T10:00:00Z",
    });
    let updated = client
        .request_ok(
            "ticket:update",
            json!({ "id": id, "patch": { "comments": [comment] } }),
        )
        .await
        .unwrap();
    assert_eq!(updated.changed, Some(true));
    assert_eq!(updated.data["comments"].as_array().unwrap().len(), 1);

    // Appending reuses the current array plus the new entry.
    let mut comments = updated.data["comments"].as_array().unwrap().clone();
    comments.push(json!({
        "author": "Riley Reporter",
        "text": "Recording attached.",
        "created_at": "2026-08-27T10:05:00Z",
        "attachments": ["recording.mp4"],
    }));
    let updated = client
        .request_ok(
            "ticket:update",
            json!({ "id": id, "patch": { "comments": comments } }),
        )
        .await
        .unwrap();
    assert_eq!(updated.data["comments"].as_array().unwrap().len(), 2);
    assert_eq!(updated.data["comments"][0]["author"], "Sam Support");

    client.close().await.ok();
}

#[tokio::test]
async fn priority_buckets_in_stats() {
    let app = TestApp::spawn().await;
    let tenant = app.seed_tenant("prioco");
    let client = app.connect(&tenant).await;

    for (title, priority) in [
        ("A", "Urgent"),
        ("B", "Urgent"),
        ("C", "Low"),
    ] {
        client
            .request_ok("ticket:create", ticket_payload(title, priority))
            .await
            .unwrap();
    }

    let stats = client.request_ok("ticket:stats", json!({})).await.unwrap();
    let by_priority = stats.data["by"]["priority"].as_array().unwrap();
    assert_eq!(by_priority[0]["value"], "Urgent");
    assert_eq!(by_priority[0]["count"], 2);

    client.close().await.ok();
}
