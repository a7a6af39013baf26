use bson::oid::ObjectId;
use serde::Deserialize;
use validator::Validate;

use hireflow_db::models::{Person, Ticket, TicketComment, TicketPriority, TicketStatus};

use super::entity::Entity;
use super::query::QueryFields;

/// Unambiguous uppercase alphabet (no I/O/0/1) for human-readable ids.
const TICKET_ALPHABET: [char; 32] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T',
    'U', 'V', 'W', 'X', 'Y', 'Z', '2', '3', '4', '5', '6', '7', '8', '9',
];

fn generate_ticket_id() -> String {
    format!("TKT-{}", nanoid::nanoid!(8, &TICKET_ALPHABET))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TicketCreate {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub assigned_to: Option<Person>,
    #[serde(default)]
    pub created_by: Option<Person>,
    #[serde(default)]
    pub comments: Vec<TicketComment>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Entity for Ticket {
    const COLLECTION: &'static str = Ticket::COLLECTION;
    const KIND: &'static str = "ticket";

    type Create = TicketCreate;

    fn from_create(tenant_id: ObjectId, create: TicketCreate) -> Self {
        let now = bson::DateTime::now();
        Ticket {
            id: None,
            tenant_id,
            ticket_id: generate_ticket_id(),
            title: create.title,
            category: create.category,
            description: create.description,
            priority: create.priority,
            status: create.status,
            assigned_to: create.assigned_to,
            created_by: create.created_by,
            comments: create.comments,
            tags: create.tags,
            is_deleted: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn query_fields() -> QueryFields {
        QueryFields {
            search: &["ticket_id", "title", "description", "tags"],
            location: None,
            range: None,
            sortable: &["created_at", "title", "ticket_id"],
        }
    }

    fn update_fields() -> &'static [&'static str] {
        &[
            "title",
            "category",
            "description",
            "priority",
            "status",
            "assigned_to",
            "created_by",
            "comments",
            "tags",
        ]
    }

    fn stat_fields() -> &'static [&'static str] {
        &["status", "priority", "category"]
    }

    fn export_columns() -> &'static [(&'static str, f64)] {
        &[
            ("Ticket", 14.0),
            ("Title", 32.0),
            ("Category", 18.0),
            ("Priority", 10.0),
            ("Status", 14.0),
            ("Assignee", 20.0),
            ("Comments", 10.0),
            ("Created", 22.0),
        ]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.ticket_id.clone(),
            self.title.clone(),
            self.category.clone(),
            priority_label(&self.priority).to_string(),
            status_label(&self.status).to_string(),
            self.assigned_to
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            self.comments.len().to_string(),
            self.created_at.try_to_rfc3339_string().unwrap_or_default(),
        ]
    }
}

fn priority_label(priority: &TicketPriority) -> &'static str {
    match priority {
        TicketPriority::Low => "Low",
        TicketPriority::Medium => "Medium",
        TicketPriority::High => "High",
        TicketPriority::Urgent => "Urgent",
    }
}

fn status_label(status: &TicketStatus) -> &'static str {
    match status {
        TicketStatus::Open => "Open",
        TicketStatus::InProgress => "In Progress",
        TicketStatus::Resolved => "Resolved",
        TicketStatus::Closed => "Closed",
    }
}
