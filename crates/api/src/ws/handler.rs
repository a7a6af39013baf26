use axum::{
    extract::{Query, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bson::oid::ObjectId;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

use super::storage::WsConnection;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    // Verify JWT and resolve the tenant before accepting the WebSocket
    let claims = match state.auth.verify_token(&params.token) {
        Ok(c) => c,
        Err(_) => return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
    };

    let tenant_id = match state.auth.resolve_tenant(&claims) {
        Ok(t) => t,
        Err(_) => return (StatusCode::FORBIDDEN, "No tenant context").into_response(),
    };

    let user_id = match ObjectId::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid user ID").into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, tenant_id, user_id))
}

async fn handle_socket(
    socket: WebSocket,
    state: AppState,
    tenant_id: ObjectId,
    user_id: ObjectId,
) {
    let connection_id = Uuid::new_v4().to_string();
    info!(?tenant_id, ?user_id, %connection_id, "WebSocket connected");

    let (sender, mut receiver) = socket.split();
    let sender = Arc::new(Mutex::new(sender));

    state.ws_storage.add(
        tenant_id,
        WsConnection {
            connection_id: connection_id.clone(),
            user_id,
            sender: sender.clone(),
        },
    );

    let connected = serde_json::json!({
        "event": "connected",
        "data": {
            "connection_id": connection_id,
            "user_id": user_id.to_hex(),
            "tenant_id": tenant_id.to_hex(),
        }
    });
    super::dispatcher::send(&sender, &connected).await;

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                super::gateway::handle_event(&state, tenant_id, &connection_id, &sender, &text)
                    .await;
            }
            Ok(Message::Ping(data)) => {
                use futures::SinkExt;
                let mut guard = sender.lock().await;
                let _ = guard.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => {
                break;
            }
            Err(e) => {
                warn!(?user_id, %connection_id, %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    state.ws_storage.remove(&tenant_id, &connection_id);
    info!(?tenant_id, ?user_id, %connection_id, "WebSocket disconnected");
}
