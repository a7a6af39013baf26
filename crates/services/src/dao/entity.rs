use std::collections::BTreeMap;

use bson::{Document, doc, oid::ObjectId};
use chrono::{Duration, Utc};
use mongodb::Database;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;
use validator::Validate;

use super::base::{BaseDao, DaoError, DaoResult, PaginationParams};
use super::query::{ListQuery, QueryFields};

/// Server-managed fields a client patch may never touch. Silently dropped
/// from incoming patches.
const MANAGED_FIELDS: &[&str] = &[
    "_id",
    "id",
    "tenant_id",
    "is_deleted",
    "created_at",
    "updated_at",
    "deleted_at",
];

const RECENT_WINDOW_DAYS: i64 = 30;

/// Exporter fetches go through the pagination boundary with a hard cap
/// rather than an unbounded cursor drain.
const EXPORT_PAGE_SIZE: u64 = 10_000;

/// An entity the generic repository and gateway can manage. One impl per
/// collection; everything entity-specific lives behind this trait.
pub trait Entity:
    Serialize + DeserializeOwned + Clone + Unpin + Send + Sync + 'static
{
    const COLLECTION: &'static str;
    /// Event namespace on the wire ("job" yields "job:create", "job-created").
    const KIND: &'static str;

    /// Strictly-typed creation payload; unknown fields are rejected.
    type Create: DeserializeOwned + Validate + Send;

    fn from_create(tenant_id: ObjectId, create: Self::Create) -> Self;
    fn id(&self) -> Option<ObjectId>;
    /// Invariants the field types alone cannot express, re-checked after a
    /// patch is merged.
    fn check_invariants(&self) -> Result<(), String> {
        Ok(())
    }
    fn query_fields() -> QueryFields;
    /// Top-level fields a patch may modify.
    fn update_fields() -> &'static [&'static str];
    /// Fields the stats operation groups by.
    fn stat_fields() -> &'static [&'static str];
    /// Column headers with sheet widths, in export order.
    fn export_columns() -> &'static [(&'static str, f64)];
    fn export_row(&self) -> Vec<String>;
}

/// Distinguishes a real write from a no-op patch. A no-op performs no write
/// at all, so `updated_at` stays put.
#[derive(Debug)]
pub enum UpdateOutcome<T> {
    Updated(T),
    Unchanged(T),
}

impl<T> UpdateOutcome<T> {
    pub fn entity(&self) -> &T {
        match self {
            UpdateOutcome::Updated(e) | UpdateOutcome::Unchanged(e) => e,
        }
    }

    pub fn changed(&self) -> bool {
        matches!(self, UpdateOutcome::Updated(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatBucket {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStats {
    pub total: u64,
    /// Documents created within the last 30 days.
    pub recent: u64,
    pub by: BTreeMap<String, Vec<StatBucket>>,
}

/// Relaxed extended JSON is the wire form: dates as `{"$date": rfc3339}`,
/// ids as `{"$oid": hex}`. `bson`'s Deserialize accepts it back unchanged.
pub fn to_wire_json<T: Serialize>(entity: &T) -> DaoResult<Value> {
    Ok(bson::to_bson(entity)?.into_relaxed_extjson())
}

/// Generic tenant-scoped repository over one entity collection.
pub struct Repository<T: Entity> {
    dao: BaseDao<T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(db: &Database) -> Self {
        Self {
            dao: BaseDao::new(db, T::COLLECTION),
        }
    }

    /// Decode and validate the payload, insert, then re-read so the caller
    /// sees exactly what the database holds.
    pub async fn create(&self, tenant_id: ObjectId, payload: Value) -> DaoResult<T> {
        let create: T::Create = serde_json::from_value(payload)
            .map_err(|e| DaoError::Validation(e.to_string()))?;
        create
            .validate()
            .map_err(|e| DaoError::Validation(e.to_string()))?;

        let entity = T::from_create(tenant_id, create);
        entity.check_invariants().map_err(DaoError::Validation)?;
        let id = self.dao.insert_one(&entity).await?;
        self.dao.find_by_id_in_tenant(tenant_id, id).await
    }

    pub async fn list(&self, tenant_id: ObjectId, query: &ListQuery) -> DaoResult<Vec<T>> {
        let fields = T::query_fields();
        self.dao
            .find_many(query.to_filter(tenant_id, fields), Some(query.to_sort(fields)))
            .await
    }

    pub async fn get(&self, tenant_id: ObjectId, id: ObjectId) -> DaoResult<T> {
        self.dao.find_by_id_in_tenant(tenant_id, id).await
    }

    /// Partial update. The patch is merged over the current document, the
    /// merged result is re-decoded against the schema, and only then
    /// written. A patch that changes nothing writes nothing.
    pub async fn update(
        &self,
        tenant_id: ObjectId,
        id: ObjectId,
        patch: Value,
    ) -> DaoResult<UpdateOutcome<T>> {
        let current = self.dao.find_by_id_in_tenant(tenant_id, id).await?;
        let current_wire = to_wire_json(&current)?;

        let patch = sanitize_patch(patch, T::update_fields())?;

        let changed_keys: Vec<String> = patch
            .iter()
            .filter(|(key, value)| !json_eq(value, current_wire.get(key.as_str())))
            .map(|(key, _)| key.clone())
            .collect();

        if changed_keys.is_empty() {
            return Ok(UpdateOutcome::Unchanged(current));
        }

        let mut merged = current_wire;
        if let Some(map) = merged.as_object_mut() {
            for (key, value) in &patch {
                map.insert(key.clone(), value.clone());
            }
        }
        let merged_entity: T = serde_json::from_value(merged)
            .map_err(|e| DaoError::Validation(e.to_string()))?;
        merged_entity
            .check_invariants()
            .map_err(DaoError::Validation)?;

        // Typed round-trip gives the changed fields their proper BSON shape.
        let merged_doc = bson::to_document(&merged_entity)?;
        let mut set_doc = Document::new();
        for key in &changed_keys {
            if let Some(value) = merged_doc.get(key) {
                set_doc.insert(key.clone(), value.clone());
            }
        }

        let matched = self
            .dao
            .update_one(
                doc! { "_id": id, "tenant_id": tenant_id, "is_deleted": false },
                set_doc,
            )
            .await?;
        if !matched {
            // Deleted between the read and the write.
            return Err(DaoError::NotFound);
        }

        let fresh = self.dao.find_by_id_in_tenant(tenant_id, id).await?;
        Ok(UpdateOutcome::Updated(fresh))
    }

    pub async fn soft_delete(&self, tenant_id: ObjectId, id: ObjectId) -> DaoResult<()> {
        if self.dao.soft_delete_in_tenant(tenant_id, id).await? {
            Ok(())
        } else {
            Err(DaoError::NotFound)
        }
    }

    pub async fn stats(&self, tenant_id: ObjectId) -> DaoResult<EntityStats> {
        let live = doc! { "tenant_id": tenant_id, "is_deleted": false };
        let total = self.dao.count(live.clone()).await?;

        let window_start = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
        let mut recent_filter = live.clone();
        recent_filter.insert(
            "created_at",
            doc! { "$gte": bson::DateTime::from_chrono(window_start) },
        );
        let recent = self.dao.count(recent_filter).await?;

        let mut by = BTreeMap::new();
        for field in T::stat_fields() {
            let pipeline = vec![
                doc! { "$match": live.clone() },
                doc! { "$group": { "_id": format!("${}", field), "count": { "$sum": 1 } } },
                doc! { "$sort": { "count": -1, "_id": 1 } },
            ];
            let mut buckets = Vec::new();
            for group in self.dao.aggregate(pipeline).await? {
                let value = match group.get("_id") {
                    None | Some(bson::Bson::Null) => continue,
                    Some(bson::Bson::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                };
                let count = match group.get("count") {
                    Some(bson::Bson::Int32(n)) => *n as u64,
                    Some(bson::Bson::Int64(n)) => *n as u64,
                    other => {
                        warn!(?other, field, "Unexpected count shape in stats group");
                        continue;
                    }
                };
                buckets.push(StatBucket { value, count });
            }
            by.insert(field.to_string(), buckets);
        }

        Ok(EntityStats { total, recent, by })
    }

    /// Filtered fetch for the exporter, bounded by the pagination boundary.
    pub async fn export_page(
        &self,
        tenant_id: ObjectId,
        query: &ListQuery,
    ) -> DaoResult<Vec<T>> {
        let fields = T::query_fields();
        let params = PaginationParams {
            page: 1,
            per_page: EXPORT_PAGE_SIZE,
        };
        let page = self
            .dao
            .find_paginated(
                query.to_filter(tenant_id, fields),
                Some(query.to_sort(fields)),
                &params,
            )
            .await?;
        Ok(page.items)
    }
}

/// Drop server-managed keys, then reject anything outside the entity's
/// updatable surface.
fn sanitize_patch(
    patch: Value,
    allowed: &[&str],
) -> DaoResult<serde_json::Map<String, Value>> {
    let Value::Object(mut map) = patch else {
        return Err(DaoError::Validation("patch must be an object".to_string()));
    };
    for key in MANAGED_FIELDS {
        map.remove(*key);
    }
    if let Some(unknown) = map.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(DaoError::Validation(format!(
            "field `{}` is not updatable",
            unknown
        )));
    }
    Ok(map)
}

/// Structural equality with numeric tolerance, so a patch sending `100`
/// against a stored `100.0` is still a no-op.
fn json_eq(a: &Value, b: Option<&Value>) -> bool {
    let Some(b) = b else {
        return a.is_null();
    };
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len()
                && xs.iter().zip(ys).all(|(x, y)| json_eq(x, Some(y)))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|(k, x)| json_eq(x, ys.get(k)))
        }
        _ => a == b,
    }
}
