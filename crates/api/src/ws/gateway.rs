use bson::oid::ObjectId;
use hireflow_services::export::{ExportFormat, export_entities};
use hireflow_services::{Entity, ListQuery, Repository, to_wire_json};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::state::AppState;

use super::storage::WsSender;

/// Inbound events are `"<entity>:<op>"` with a JSON `data` payload. Every
/// event gets exactly one `"<event>-response"` back on the same connection;
/// successful mutations additionally broadcast a change event to the whole
/// tenant.
pub async fn handle_event(
    state: &AppState,
    tenant_id: ObjectId,
    connection_id: &str,
    sender: &WsSender,
    text: &str,
) {
    let parsed: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => return,
    };

    let event = parsed.get("event").and_then(|e| e.as_str()).unwrap_or("");
    let data = parsed.get("data").cloned().unwrap_or(Value::Null);

    debug!(?tenant_id, %connection_id, event, "WS event received");

    if event == "ping" {
        super::dispatcher::send(sender, &json!({ "event": "pong" })).await;
        return;
    }

    let Some((kind, op)) = event.split_once(':') else {
        warn!(?tenant_id, event, "Unknown WS event");
        respond_error(sender, event, "unknown event").await;
        return;
    };

    match kind {
        "job" => dispatch(state, state.jobs.as_ref(), tenant_id, event, op, data, sender).await,
        "candidate" => {
            dispatch(state, state.candidates.as_ref(), tenant_id, event, op, data, sender).await
        }
        "deal" => dispatch(state, state.deals.as_ref(), tenant_id, event, op, data, sender).await,
        "ticket" => {
            dispatch(state, state.tickets.as_ref(), tenant_id, event, op, data, sender).await
        }
        _ => {
            warn!(?tenant_id, event, "Unknown WS event");
            respond_error(sender, event, "unknown event").await;
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExportRequest {
    format: ExportFormat,
    #[serde(flatten)]
    query: ListQuery,
}

async fn dispatch<T: Entity>(
    state: &AppState,
    repo: &Repository<T>,
    tenant_id: ObjectId,
    event: &str,
    op: &str,
    data: Value,
    sender: &WsSender,
) {
    let result = match op {
        "create" => create(state, repo, tenant_id, data).await,
        "list" => list(repo, tenant_id, data).await,
        "get" => get(repo, tenant_id, data).await,
        "update" => update(state, repo, tenant_id, data).await,
        "delete" => delete(state, repo, tenant_id, data).await,
        "stats" => stats(repo, tenant_id).await,
        "export" => export(state, repo, tenant_id, data).await,
        _ => Err("unknown operation".to_string()),
    };

    match result {
        Ok(Reply { data, changed }) => {
            let mut response = json!({
                "event": format!("{event}-response"),
                "done": true,
                "data": data,
            });
            if let Some(changed) = changed {
                response["changed"] = json!(changed);
            }
            super::dispatcher::send(sender, &response).await;
        }
        Err(error) => {
            warn!(?tenant_id, event, %error, "WS operation failed");
            respond_error(sender, event, &error).await;
        }
    }
}

struct Reply {
    data: Value,
    changed: Option<bool>,
}

impl Reply {
    fn new(data: Value) -> Self {
        Self {
            data,
            changed: None,
        }
    }
}

async fn respond_error(sender: &WsSender, event: &str, error: &str) {
    let response = json!({
        "event": format!("{event}-response"),
        "done": false,
        "error": error,
    });
    super::dispatcher::send(sender, &response).await;
}

async fn create<T: Entity>(
    state: &AppState,
    repo: &Repository<T>,
    tenant_id: ObjectId,
    data: Value,
) -> Result<Reply, String> {
    let entity = repo
        .create(tenant_id, data)
        .await
        .map_err(|e| e.to_string())?;
    let wire = to_wire_json(&entity).map_err(|e| e.to_string())?;

    let event = json!({
        "event": format!("{}-created", T::KIND),
        "data": wire,
    });
    super::dispatcher::broadcast_to_tenant(&state.ws_storage, &tenant_id, &event).await;

    Ok(Reply::new(wire))
}

async fn list<T: Entity>(
    repo: &Repository<T>,
    tenant_id: ObjectId,
    data: Value,
) -> Result<Reply, String> {
    let query = parse_query(data)?;
    let entities = repo
        .list(tenant_id, &query)
        .await
        .map_err(|e| e.to_string())?;
    let items: Result<Vec<Value>, _> = entities.iter().map(to_wire_json).collect();
    Ok(Reply::new(Value::Array(items.map_err(|e| e.to_string())?)))
}

async fn get<T: Entity>(
    repo: &Repository<T>,
    tenant_id: ObjectId,
    data: Value,
) -> Result<Reply, String> {
    let id = parse_id(&data)?;
    let entity = repo.get(tenant_id, id).await.map_err(|e| e.to_string())?;
    Ok(Reply::new(to_wire_json(&entity).map_err(|e| e.to_string())?))
}

async fn update<T: Entity>(
    state: &AppState,
    repo: &Repository<T>,
    tenant_id: ObjectId,
    data: Value,
) -> Result<Reply, String> {
    let id = parse_id(&data)?;
    let patch = data
        .get("patch")
        .cloned()
        .ok_or_else(|| "missing patch".to_string())?;

    let outcome = repo
        .update(tenant_id, id, patch)
        .await
        .map_err(|e| e.to_string())?;
    let wire = to_wire_json(outcome.entity()).map_err(|e| e.to_string())?;

    // A no-op patch performs no write and notifies nobody.
    if outcome.changed() {
        let event = json!({
            "event": format!("{}-updated", T::KIND),
            "data": wire,
        });
        super::dispatcher::broadcast_to_tenant(&state.ws_storage, &tenant_id, &event).await;
    }

    Ok(Reply {
        data: wire,
        changed: Some(outcome.changed()),
    })
}

async fn delete<T: Entity>(
    state: &AppState,
    repo: &Repository<T>,
    tenant_id: ObjectId,
    data: Value,
) -> Result<Reply, String> {
    let id = parse_id(&data)?;
    repo.soft_delete(tenant_id, id)
        .await
        .map_err(|e| e.to_string())?;

    let payload = json!({ "id": id.to_hex() });
    let event = json!({
        "event": format!("{}-deleted", T::KIND),
        "data": payload,
    });
    super::dispatcher::broadcast_to_tenant(&state.ws_storage, &tenant_id, &event).await;

    Ok(Reply::new(payload))
}

async fn stats<T: Entity>(repo: &Repository<T>, tenant_id: ObjectId) -> Result<Reply, String> {
    let stats = repo.stats(tenant_id).await.map_err(|e| e.to_string())?;
    Ok(Reply::new(
        serde_json::to_value(stats).map_err(|e| e.to_string())?,
    ))
}

async fn export<T: Entity>(
    state: &AppState,
    repo: &Repository<T>,
    tenant_id: ObjectId,
    data: Value,
) -> Result<Reply, String> {
    let request: ExportRequest =
        serde_json::from_value(data).map_err(|e| format!("invalid export request: {e}"))?;

    let entities = repo
        .export_page(tenant_id, &request.query)
        .await
        .map_err(|e| e.to_string())?;

    let artifact =
        export_entities(tenant_id, &entities, request.format).map_err(|e| e.to_string())?;

    let path = std::path::Path::new(&state.settings.export.dir).join(&artifact.file_name);
    tokio::fs::write(&path, &artifact.bytes)
        .await
        .map_err(|e| format!("failed to write artifact: {e}"))?;

    let base = state.settings.app.base_url.trim_end_matches('/');
    Ok(Reply::new(json!({
        "file_name": artifact.file_name,
        "url": format!("{}/temp/{}", base, artifact.file_name),
        "count": entities.len(),
    })))
}

fn parse_query(data: Value) -> Result<ListQuery, String> {
    if data.is_null() {
        return Ok(ListQuery::default());
    }
    serde_json::from_value(data).map_err(|e| format!("invalid query: {e}"))
}

/// Accepts `"id"` as a plain hex string or relaxed extended JSON
/// (`{"$oid": hex}`), matching what clients echo back from the wire form.
fn parse_id(data: &Value) -> Result<ObjectId, String> {
    let id = data.get("id").ok_or_else(|| "missing id".to_string())?;
    let raw = match id {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("$oid")
            .and_then(Value::as_str)
            .ok_or_else(|| "invalid id".to_string())?,
        _ => return Err("invalid id".to_string()),
    };
    ObjectId::parse_str(raw).map_err(|_| "invalid id".to_string())
}
