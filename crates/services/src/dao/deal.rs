use bson::oid::ObjectId;
use serde::Deserialize;
use validator::Validate;

use hireflow_db::models::{Deal, DealContact, DealOwner, DealStatus};

use super::entity::Entity;
use super::query::QueryFields;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DealCreate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub status: DealStatus,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub deal_value: f64,
    #[serde(default)]
    #[validate(range(max = 100))]
    pub probability: u8,
    #[serde(default)]
    pub owner: DealOwner,
    #[serde(default)]
    pub contact: DealContact,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub expected_close_date: Option<String>,
}

impl Entity for Deal {
    const COLLECTION: &'static str = Deal::COLLECTION;
    const KIND: &'static str = "deal";

    type Create = DealCreate;

    fn from_create(tenant_id: ObjectId, create: DealCreate) -> Self {
        let now = bson::DateTime::now();
        Deal {
            id: None,
            tenant_id,
            name: create.name,
            stage: create.stage,
            status: create.status,
            deal_value: create.deal_value,
            probability: create.probability,
            owner: create.owner,
            contact: create.contact,
            tags: create.tags,
            expected_close_date: create.expected_close_date,
            is_deleted: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn check_invariants(&self) -> Result<(), String> {
        if self.probability > 100 {
            return Err("probability must be between 0 and 100".to_string());
        }
        Ok(())
    }

    fn query_fields() -> QueryFields {
        QueryFields {
            search: &["name", "stage", "owner.name", "contact.email", "tags"],
            location: None,
            // Single value field; both bounds constrain it.
            range: Some(("deal_value", "deal_value")),
            sortable: &["created_at", "name", "deal_value", "probability"],
        }
    }

    fn update_fields() -> &'static [&'static str] {
        &[
            "name",
            "stage",
            "status",
            "deal_value",
            "probability",
            "owner",
            "contact",
            "tags",
            "expected_close_date",
        ]
    }

    fn stat_fields() -> &'static [&'static str] {
        &["status", "stage"]
    }

    fn export_columns() -> &'static [(&'static str, f64)] {
        &[
            ("Name", 28.0),
            ("Stage", 16.0),
            ("Status", 10.0),
            ("Value", 14.0),
            ("Probability", 12.0),
            ("Owner", 20.0),
            ("Contact Email", 28.0),
            ("Expected Close", 16.0),
            ("Created", 22.0),
        ]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.stage.clone(),
            status_label(&self.status).to_string(),
            format!("{:.2}", self.deal_value),
            format!("{}%", self.probability),
            self.owner.name.clone(),
            self.contact.email.clone(),
            self.expected_close_date.clone().unwrap_or_default(),
            self.created_at.try_to_rfc3339_string().unwrap_or_default(),
        ]
    }
}

fn status_label(status: &DealStatus) -> &'static str {
    match status {
        DealStatus::Open => "Open",
        DealStatus::Won => "Won",
        DealStatus::Lost => "Lost",
    }
}
