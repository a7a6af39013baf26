use bson::oid::ObjectId;
use serde::Deserialize;
use validator::Validate;

use hireflow_db::models::{
    ApplicationInfo, Candidate, CandidateDocuments, CandidateStatus, PersonalInfo,
    ProfessionalInfo,
};

use super::entity::Entity;
use super::query::QueryFields;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CandidateCreate {
    #[validate(nested)]
    pub personal_info: PersonalInfoCreate,
    #[serde(default)]
    pub professional_info: ProfessionalInfo,
    #[serde(default)]
    pub application_info: ApplicationInfo,
    #[serde(default)]
    pub documents: CandidateDocuments,
    #[serde(default)]
    pub status: CandidateStatus,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PersonalInfoCreate {
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl Entity for Candidate {
    const COLLECTION: &'static str = Candidate::COLLECTION;
    const KIND: &'static str = "candidate";

    type Create = CandidateCreate;

    fn from_create(tenant_id: ObjectId, create: CandidateCreate) -> Self {
        let now = bson::DateTime::now();
        Candidate {
            id: None,
            tenant_id,
            personal_info: PersonalInfo {
                first_name: create.personal_info.first_name,
                last_name: create.personal_info.last_name,
                email: create.personal_info.email,
                phone: create.personal_info.phone,
            },
            professional_info: create.professional_info,
            application_info: create.application_info,
            documents: create.documents,
            status: create.status,
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
            search: &[
                "personal_info.first_name",
                "personal_info.last_name",
                "personal_info.email",
                "professional_info.current_role",
                "professional_info.skills",
                "application_info.applied_role",
            ],
            location: None,
            range: None,
            sortable: &[
                "created_at",
                "personal_info.first_name",
                "personal_info.last_name",
                "professional_info.experience_years",
            ],
        }
    }

    fn update_fields() -> &'static [&'static str] {
        &[
            "personal_info",
            "professional_info",
            "application_info",
            "documents",
            "status",
            "tags",
        ]
    }

    fn stat_fields() -> &'static [&'static str] {
        &["status", "application_info.source", "application_info.recruiter_name"]
    }

    fn export_columns() -> &'static [(&'static str, f64)] {
        &[
            ("Name", 26.0),
            ("Email", 30.0),
            ("Phone", 16.0),
            ("Current Role", 24.0),
            ("Experience (yrs)", 16.0),
            ("Applied Role", 24.0),
            ("Status", 18.0),
            ("Source", 16.0),
            ("Created", 22.0),
        ]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            format!(
                "{} {}",
                self.personal_info.first_name, self.personal_info.last_name
            ),
            self.personal_info.email.clone(),
            self.personal_info.phone.clone(),
            self.professional_info.current_role.clone(),
            format!("{:.1}", self.professional_info.experience_years),
            self.application_info.applied_role.clone(),
            status_label(&self.status).to_string(),
            self.application_info.source.clone(),
            self.created_at.try_to_rfc3339_string().unwrap_or_default(),
        ]
    }
}

fn status_label(status: &CandidateStatus) -> &'static str {
    match status {
        CandidateStatus::NewApplication => "New Application",
        CandidateStatus::Screening => "Screening",
        CandidateStatus::Interview => "Interview",
        CandidateStatus::TechnicalTest => "Technical Test",
        CandidateStatus::OfferStage => "Offer Stage",
        CandidateStatus::Hired => "Hired",
        CandidateStatus::Rejected => "Rejected",
    }
}
