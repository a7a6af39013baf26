use axum::extract::ws::{Message, WebSocket};
use bson::oid::ObjectId;
use dashmap::DashMap;
use futures::stream::SplitSink;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// One live socket belonging to a tenant member.
#[derive(Clone)]
pub struct WsConnection {
    pub connection_id: String,
    pub user_id: ObjectId,
    pub sender: WsSender,
}

/// Tracks all active WebSocket connections, grouped by tenant. A tenant can
/// have many connections (several users, several tabs each); entity change
/// events fan out to all of them.
pub struct WsStorage {
    connections: DashMap<ObjectId, Vec<WsConnection>>,
}

impl WsStorage {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    pub fn add(&self, tenant_id: ObjectId, connection: WsConnection) {
        self.connections
            .entry(tenant_id)
            .or_default()
            .push(connection);
    }

    pub fn remove(&self, tenant_id: &ObjectId, connection_id: &str) {
        if let Some(mut connections) = self.connections.get_mut(tenant_id) {
            connections.retain(|c| c.connection_id != connection_id);
            if connections.is_empty() {
                drop(connections);
                self.connections.remove(tenant_id);
            }
        }
    }

    pub fn tenant_connections(&self, tenant_id: &ObjectId) -> Vec<WsConnection> {
        self.connections
            .get(tenant_id)
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(|r| r.value().len()).sum()
    }
}

impl Default for WsStorage {
    fn default() -> Self {
        Self::new()
    }
}
