use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub tenant_id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub status: DealStatus,
    #[serde(default)]
    pub deal_value: f64,
    /// 0..=100
    #[serde(default)]
    pub probability: u8,
    #[serde(default)]
    pub owner: DealOwner,
    #[serde(default)]
    pub contact: DealContact,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub expected_close_date: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub enum DealStatus {
    #[default]
    Open,
    Won,
    Lost,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DealOwner {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DealContact {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl Deal {
    pub const COLLECTION: &'static str = "deals";
}
