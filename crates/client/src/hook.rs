use std::collections::BTreeMap;
use std::marker::PhantomData;

use hireflow_services::dao::query::lookup;
use hireflow_services::{Entity, EntityStats, ListQuery};
use serde_json::Value;

use crate::gateway::{ClientError, GatewayClient, GatewayResponse};

/// A cached, tenant-scoped view over one entity collection, mirroring the
/// data hooks a dashboard front end keeps per entity: fetch once, filter
/// and group locally, refetch after every successful mutation.
pub struct EntityHook<T: Entity> {
    query: ListQuery,
    items: Vec<Value>,
    stats: Option<EntityStats>,
    _entity: PhantomData<T>,
}

impl<T: Entity> Default for EntityHook<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityHook<T> {
    pub fn new() -> Self {
        Self {
            query: ListQuery::default(),
            items: Vec::new(),
            stats: None,
            _entity: PhantomData,
        }
    }

    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.query = query;
        self
    }

    /// The raw wire documents from the last fetch.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn stats(&self) -> Option<&EntityStats> {
        self.stats.as_ref()
    }

    /// Decode the cached documents into typed entities.
    pub fn typed(&self) -> Result<Vec<T>, ClientError> {
        self.items
            .iter()
            .map(|item| serde_json::from_value(item.clone()).map_err(ClientError::from))
            .collect()
    }

    /// Re-run the list operation with the hook's query.
    pub async fn fetch(&mut self, client: &GatewayClient) -> Result<&[Value], ClientError> {
        let response = client
            .request_ok(&event(T::KIND, "list"), serde_json::to_value(&self.query)?)
            .await?;
        self.items = match response.data {
            Value::Array(items) => items,
            other => return Err(ClientError::Gateway(format!("expected array, got {other}"))),
        };
        Ok(&self.items)
    }

    pub async fn fetch_stats(&mut self, client: &GatewayClient) -> Result<&EntityStats, ClientError> {
        let response = client
            .request_ok(&event(T::KIND, "stats"), Value::Null)
            .await?;
        let stats = serde_json::from_value(response.data)?;
        Ok(self.stats.insert(stats))
    }

    pub async fn create(
        &mut self,
        client: &GatewayClient,
        payload: Value,
    ) -> Result<Value, ClientError> {
        let response = client.request_ok(&event(T::KIND, "create"), payload).await?;
        self.fetch(client).await?;
        Ok(response.data)
    }

    pub async fn update(
        &mut self,
        client: &GatewayClient,
        id: &str,
        patch: Value,
    ) -> Result<GatewayResponse, ClientError> {
        let data = serde_json::json!({ "id": id, "patch": patch });
        let response = client.request_ok(&event(T::KIND, "update"), data).await?;
        self.fetch(client).await?;
        Ok(response)
    }

    pub async fn delete(&mut self, client: &GatewayClient, id: &str) -> Result<(), ClientError> {
        client
            .request_ok(&event(T::KIND, "delete"), serde_json::json!({ "id": id }))
            .await?;
        self.fetch(client).await?;
        Ok(())
    }

    /// Export the hook's current query as a PDF; the response carries the
    /// artifact's file name and download URL.
    pub async fn export_pdf(&self, client: &GatewayClient) -> Result<Value, ClientError> {
        self.export(client, "pdf").await
    }

    pub async fn export_excel(&self, client: &GatewayClient) -> Result<Value, ClientError> {
        self.export(client, "excel").await
    }

    async fn export(&self, client: &GatewayClient, format: &str) -> Result<Value, ClientError> {
        let mut data = serde_json::to_value(&self.query)?;
        data["format"] = Value::String(format.to_string());
        let response = client.request_ok(&event(T::KIND, "export"), data).await?;
        Ok(response.data)
    }

    /// Filter and sort the cache locally with the same predicates the
    /// server applies, without another round trip.
    pub fn filter(&self, query: &ListQuery) -> Vec<Value> {
        let fields = T::query_fields();
        let mut matched: Vec<Value> = self
            .items
            .iter()
            .filter(|item| query.matches(item, fields))
            .cloned()
            .collect();
        query.sort_values(&mut matched, fields);
        matched
    }

    /// Bucket cached documents by a (dotted) field path. Documents missing
    /// the field land under "Unknown".
    pub fn group_by(&self, field: &str) -> BTreeMap<String, Vec<Value>> {
        let mut groups: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for item in &self.items {
            let key = lookup(item, field)
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string();
            groups.entry(key).or_default().push(item.clone());
        }
        groups
    }
}

fn event(kind: &str, op: &str) -> String {
    format!("{kind}:{op}")
}
