use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub tenant_id: ObjectId,
    pub personal_info: PersonalInfo,
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
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

/// Ordered pipeline stages; wire names keep the spaced form the dashboard shows.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub enum CandidateStatus {
    #[default]
    #[serde(rename = "New Application")]
    NewApplication,
    Screening,
    Interview,
    #[serde(rename = "Technical Test")]
    TechnicalTest,
    #[serde(rename = "Offer Stage")]
    OfferStage,
    Hired,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfessionalInfo {
    #[serde(default)]
    pub current_role: String,
    #[serde(default)]
    pub experience_years: f64,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplicationInfo {
    #[serde(default)]
    pub applied_role: String,
    #[serde(default)]
    pub applied_date: String,
    #[serde(default)]
    pub recruiter_name: String,
    #[serde(default)]
    pub source: String,
}

/// Externally hosted document URLs (upload CDN is out of scope).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CandidateDocuments {
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub portfolio: Option<String>,
}

impl Candidate {
    pub const COLLECTION: &'static str = "candidates";
}
