use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::wilaya::Wilaya;
use crate::marketplace::accounts::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId(pub String);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication state of a listing. Every state has a path back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Active,
    Pending,
    Archived,
    Deleted,
}

impl PropertyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyStatus::Active => "active",
            PropertyStatus::Pending => "pending",
            PropertyStatus::Archived => "archived",
            PropertyStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Rent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Apartment,
    House,
    Villa,
    Land,
    Commercial,
    Office,
}

/// Listing document as persisted in the `properties` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub wilaya: u8,
    pub commune: Option<String>,
    pub transaction: TransactionKind,
    pub kind: PropertyKind,
    /// Asking price in Algerian dinars.
    pub price: u64,
    pub surface_m2: Option<u32>,
    pub rooms: Option<u8>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub video_url: Option<String>,
    pub status: PropertyStatus,
    pub archival_reason: Option<String>,
    pub deletion_reason: Option<String>,
    /// Set while an admin decision or pre-publication review keeps the owner
    /// from reactivating the listing on their own.
    #[serde(default)]
    pub moderation_hold: bool,
    #[serde(default)]
    pub view_count: u64,
    /// Bumped on every write; stores reject writes carrying a stale value.
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn wilaya_name(&self) -> Option<&'static str> {
        Wilaya::from_code(self.wilaya).map(|wilaya| wilaya.name)
    }

    /// `archival_reason` iff archived, `deletion_reason` iff deleted.
    pub fn reasons_consistent(&self) -> bool {
        let archived = self.status == PropertyStatus::Archived;
        let deleted = self.status == PropertyStatus::Deleted;
        self.archival_reason.is_some() == archived && self.deletion_reason.is_some() == deleted
    }
}

/// Owner supplied fields for a new listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub wilaya: u8,
    #[serde(default)]
    pub commune: Option<String>,
    pub transaction: TransactionKind,
    pub kind: PropertyKind,
    pub price: u64,
    #[serde(default)]
    pub surface_m2: Option<u32>,
    #[serde(default)]
    pub rooms: Option<u8>,
}

impl PropertyDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("listing title is required".to_string());
        }
        if Wilaya::from_code(self.wilaya).is_none() {
            return Err(format!("unknown wilaya code {}", self.wilaya));
        }
        if self.price == 0 {
            return Err("listing price must be greater than zero".to_string());
        }
        Ok(())
    }
}
