use bson::oid::ObjectId;
use serde::Deserialize;
use validator::Validate;

use hireflow_db::models::{Job, JobStatus, Location, SalaryRange};

use super::entity::Entity;
use super::query::QueryFields;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct JobCreate {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub job_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    #[validate(nested)]
    pub salary_range: SalaryRangeCreate,
    #[serde(default = "default_positions")]
    #[validate(range(min = 1))]
    pub number_of_positions: u32,
    #[serde(default)]
    pub status: JobStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SalaryRangeCreate {
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub min: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub max: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for SalaryRangeCreate {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_positions() -> u32 {
    1
}

impl Entity for Job {
    const COLLECTION: &'static str = Job::COLLECTION;
    const KIND: &'static str = "job";

    type Create = JobCreate;

    fn from_create(tenant_id: ObjectId, create: JobCreate) -> Self {
        let now = bson::DateTime::now();
        Job {
            id: None,
            tenant_id,
            title: create.title,
            category: create.category,
            job_type: create.job_type,
            description: create.description,
            requirements: create.requirements,
            skills: create.skills,
            tags: create.tags,
            location: create.location,
            salary_range: SalaryRange {
                min: create.salary_range.min,
                max: create.salary_range.max,
                currency: create.salary_range.currency,
            },
            number_of_positions: create.number_of_positions,
            status: create.status,
            applied_count: 0,
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
        if self.number_of_positions == 0 {
            return Err("number_of_positions must be at least 1".to_string());
        }
        if self.salary_range.max > 0.0 && self.salary_range.min > self.salary_range.max {
            return Err("salary_range.min cannot exceed salary_range.max".to_string());
        }
        Ok(())
    }

    fn query_fields() -> QueryFields {
        QueryFields {
            search: &["title", "description", "skills", "tags"],
            location: Some("location"),
            range: Some(("salary_range.min", "salary_range.max")),
            sortable: &[
                "created_at",
                "title",
                "salary_range.min",
                "salary_range.max",
                "applied_count",
            ],
        }
    }

    fn update_fields() -> &'static [&'static str] {
        &[
            "title",
            "category",
            "type",
            "description",
            "requirements",
            "skills",
            "tags",
            "location",
            "salary_range",
            "number_of_positions",
            "status",
            "applied_count",
        ]
    }

    fn stat_fields() -> &'static [&'static str] {
        &["status", "category", "type"]
    }

    fn export_columns() -> &'static [(&'static str, f64)] {
        &[
            ("Title", 32.0),
            ("Category", 18.0),
            ("Type", 14.0),
            ("Status", 12.0),
            ("Location", 26.0),
            ("Salary Min", 12.0),
            ("Salary Max", 12.0),
            ("Positions", 10.0),
            ("Applied", 10.0),
            ("Created", 22.0),
        ]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.category.clone(),
            self.job_type.clone(),
            status_label(&self.status).to_string(),
            format_location(&self.location),
            format!("{:.0}", self.salary_range.min),
            format!("{:.0}", self.salary_range.max),
            self.number_of_positions.to_string(),
            self.applied_count.to_string(),
            self.created_at.try_to_rfc3339_string().unwrap_or_default(),
        ]
    }
}

fn status_label(status: &JobStatus) -> &'static str {
    match status {
        JobStatus::Active => "Active",
        JobStatus::Inactive => "Inactive",
    }
}

fn format_location(location: &Location) -> String {
    [&location.city, &location.state, &location.country]
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
