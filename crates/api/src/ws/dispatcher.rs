use axum::extract::ws::Message;
use bson::oid::ObjectId;
use futures::SinkExt;
use tracing::{debug, warn};

use super::storage::{WsSender, WsStorage};

/// Sends a JSON message down one connection.
pub async fn send(sender: &WsSender, message: &serde_json::Value) {
    let mut guard = sender.lock().await;
    if let Err(e) = guard.send(Message::text(message.to_string())).await {
        warn!(%e, "Failed to send WS message");
    }
}

/// Broadcasts a JSON message to every connection of a tenant, the
/// originating connection included.
pub async fn broadcast_to_tenant(
    ws_storage: &WsStorage,
    tenant_id: &ObjectId,
    message: &serde_json::Value,
) {
    let connections = ws_storage.tenant_connections(tenant_id);
    debug!(?tenant_id, count = connections.len(), "Broadcasting to tenant");
    for connection in connections {
        send(&connection.sender, message).await;
    }
}
