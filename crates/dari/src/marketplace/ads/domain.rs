use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::marketplace::accounts::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdId(pub String);

impl fmt::Display for AdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// General ads (banners, promotions) and service ads (movers, notaries, ...)
/// share one record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdKind {
    General,
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdStatus {
    Active,
    Archived,
}

impl AdStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AdStatus::Active => "active",
            AdStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for AdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,
    pub owner_id: UserId,
    pub kind: AdKind,
    pub title: String,
    pub body: String,
    pub service_category: Option<String>,
    pub wilaya: Option<u8>,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
    pub status: AdStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdDraft {
    pub kind: AdKind,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub service_category: Option<String>,
    #[serde(default)]
    pub wilaya: Option<u8>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}
