use bson::{Document, doc, oid::ObjectId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filter values meaning "no constraint on this dimension".
const SENTINELS: &[&str] = &["", "All", "Select"];

/// Per-entity knobs the query builder needs: which fields free-text search
/// spans, where the location block lives, which paths numeric bounds apply
/// to, and which fields are legal sort keys.
#[derive(Debug, Clone, Copy)]
pub struct QueryFields {
    pub search: &'static [&'static str],
    pub location: Option<&'static str>,
    /// (min bound path, max bound path)
    pub range: Option<(&'static str, &'static str)>,
    pub sortable: &'static [&'static str],
}

/// The flat filter/sort vocabulary list operations accept. Also evaluated
/// in memory by the client data hook, so server and client predicates
/// cannot drift.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    /// Numeric bounds arrive as number or string; anything non-numeric is
    /// treated as absent.
    pub min_salary: Option<Value>,
    pub max_salary: Option<Value>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListQuery {
    /// Compose the MongoDB filter: tenant scope, live documents only, then
    /// every recognized dimension AND-ed together.
    pub fn to_filter(&self, tenant_id: ObjectId, fields: QueryFields) -> Document {
        let mut filter = doc! { "tenant_id": tenant_id, "is_deleted": false };

        if let Some(status) = constraint(&self.status) {
            filter.insert("status", status);
        }
        if let Some(category) = constraint(&self.category) {
            filter.insert("category", category);
        }
        if let Some(kind) = constraint(&self.kind) {
            filter.insert("type", kind);
        }

        if let Some(prefix) = fields.location {
            for (key, value) in [
                ("country", &self.country),
                ("state", &self.state),
                ("city", &self.city),
            ] {
                if let Some(value) = constraint(value) {
                    filter.insert(format!("{}.{}", prefix, key), value);
                }
            }
        }

        if let Some((min_path, max_path)) = fields.range {
            let min = parse_bound(&self.min_salary);
            let max = parse_bound(&self.max_salary);
            if min_path == max_path {
                // Both bounds constrain the same field.
                let mut bounds = Document::new();
                if let Some(min) = min {
                    bounds.insert("$gte", min);
                }
                if let Some(max) = max {
                    bounds.insert("$lte", max);
                }
                if !bounds.is_empty() {
                    filter.insert(min_path, bounds);
                }
            } else {
                if let Some(min) = min {
                    filter.insert(min_path, doc! { "$gte": min });
                }
                if let Some(max) = max {
                    filter.insert(max_path, doc! { "$lte": max });
                }
            }
        }

        if let Some(search) = constraint(&self.search) {
            let escaped = escape_regex(search);
            let clauses: Vec<Document> = fields
                .search
                .iter()
                .map(|f| doc! { *f: { "$regex": &escaped, "$options": "i" } })
                .collect();
            filter.insert("$or", clauses);
        }

        let mut created = Document::new();
        if let Some(start) = self.start_date.as_deref().and_then(|s| parse_date(s, false)) {
            created.insert("$gte", bson::DateTime::from_chrono(start));
        }
        if let Some(end) = self.end_date.as_deref().and_then(|s| parse_date(s, true)) {
            created.insert("$lte", bson::DateTime::from_chrono(end));
        }
        if !created.is_empty() {
            filter.insert("created_at", created);
        }

        filter
    }

    /// Sort document; unrecognized `sortBy` falls back to recency.
    pub fn to_sort(&self, fields: QueryFields) -> Document {
        let field = self.sort_field(fields);
        let order = if self.ascending() { 1 } else { -1 };
        doc! { field: order }
    }

    fn sort_field(&self, fields: QueryFields) -> &str {
        match self.sort_by.as_deref() {
            Some(f) if fields.sortable.contains(&f) => f,
            _ => "created_at",
        }
    }

    fn ascending(&self) -> bool {
        matches!(self.sort_order.as_deref(), Some("asc"))
    }

    /// In-memory equivalent of `to_filter` over a wire-JSON document
    /// (relaxed extended JSON, as emitted by the gateway).
    pub fn matches(&self, doc: &Value, fields: QueryFields) -> bool {
        if let Some(status) = constraint(&self.status) {
            if !value_eq_str(lookup(doc, "status"), status) {
                return false;
            }
        }
        if let Some(category) = constraint(&self.category) {
            if !value_eq_str(lookup(doc, "category"), category) {
                return false;
            }
        }
        if let Some(kind) = constraint(&self.kind) {
            if !value_eq_str(lookup(doc, "type"), kind) {
                return false;
            }
        }

        if let Some(prefix) = fields.location {
            for (key, value) in [
                ("country", &self.country),
                ("state", &self.state),
                ("city", &self.city),
            ] {
                if let Some(value) = constraint(value) {
                    let path = format!("{}.{}", prefix, key);
                    if !value_eq_str(lookup(doc, &path), value) {
                        return false;
                    }
                }
            }
        }

        if let Some((min_path, max_path)) = fields.range {
            if let Some(min) = parse_bound(&self.min_salary) {
                match lookup(doc, min_path).and_then(Value::as_f64) {
                    Some(v) if v >= min => {}
                    _ => return false,
                }
            }
            if let Some(max) = parse_bound(&self.max_salary) {
                match lookup(doc, max_path).and_then(Value::as_f64) {
                    Some(v) if v <= max => {}
                    _ => return false,
                }
            }
        }

        if let Some(search) = constraint(&self.search) {
            let needle = search.to_lowercase();
            let hit = fields
                .search
                .iter()
                .any(|f| value_contains(lookup(doc, f), &needle));
            if !hit {
                return false;
            }
        }

        if let Some(start) = self.start_date.as_deref().and_then(|s| parse_date(s, false)) {
            match doc_date(doc, "created_at") {
                Some(created) if created >= start => {}
                _ => return false,
            }
        }
        if let Some(end) = self.end_date.as_deref().and_then(|s| parse_date(s, true)) {
            match doc_date(doc, "created_at") {
                Some(created) if created <= end => {}
                _ => return false,
            }
        }

        true
    }

    /// In-memory equivalent of `to_sort`.
    pub fn sort_values(&self, items: &mut [Value], fields: QueryFields) {
        let field = self.sort_field(fields).to_string();
        let ascending = self.ascending();
        items.sort_by(|a, b| {
            let ord = compare_values(lookup(a, &field), lookup(b, &field));
            if ascending { ord } else { ord.reverse() }
        });
    }
}

/// A meaningful constraint value, with sentinels treated as absent.
fn constraint(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !SENTINELS.contains(v))
}

/// Defensive numeric parse: JSON number, or a string that parses as one.
fn parse_bound(value: &Option<Value>) -> Option<f64> {
    match value.as_ref()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Accepts RFC3339 or a bare date. A bare end date covers the whole day.
fn parse_date(raw: &str, end: bool) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let time = if end {
        date.and_hms_milli_opt(23, 59, 59, 999)?
    } else {
        date.and_hms_opt(0, 0, 0)?
    };
    Some(time.and_utc())
}

/// Escape regex metacharacters for safe `$regex` usage.
fn escape_regex(query: &str) -> String {
    query
        .chars()
        .flat_map(|c| {
            if ".*+?^${}()|[]\\".contains(c) {
                vec!['\\', c]
            } else {
                vec![c]
            }
        })
        .collect()
}

/// Dotted-path lookup into a JSON document.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Extract a timestamp field in relaxed extended JSON form
/// (`{"$date": "..."}`) or a plain RFC3339 string.
pub fn doc_date(doc: &Value, field: &str) -> Option<DateTime<Utc>> {
    let value = lookup(doc, field)?;
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("$date")?.as_str()?,
        _ => return None,
    };
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn value_eq_str(value: Option<&Value>, expected: &str) -> bool {
    value.and_then(Value::as_str) == Some(expected)
}

/// Case-insensitive substring match against a string field or any element
/// of a string array.
fn value_contains(value: Option<&Value>, needle: &str) -> bool {
    match value {
        Some(Value::String(s)) => s.to_lowercase().contains(needle),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.to_lowercase().contains(needle)),
        _ => false,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Object(x)), Some(Value::Object(y))) => {
            // Relaxed extended JSON dates sort lexicographically.
            match (
                x.get("$date").and_then(Value::as_str),
                y.get("$date").and_then(Value::as_str),
            ) {
                (Some(dx), Some(dy)) => dx.cmp(dy),
                _ => Ordering::Equal,
            }
        }
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
