use serde::{Deserialize, Serialize};

use super::domain::{Property, PropertyKind, TransactionKind};
use super::wilaya::Wilaya;

/// Structured query over active listings, either hand-built or produced by the assistant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub wilaya: Option<u8>,
    #[serde(default)]
    pub transaction: Option<TransactionKind>,
    #[serde(default)]
    pub kind: Option<PropertyKind>,
    #[serde(default)]
    pub min_price: Option<u64>,
    #[serde(default)]
    pub max_price: Option<u64>,
    #[serde(default)]
    pub min_rooms: Option<u8>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchFilterError {
    #[error("unknown wilaya code {0}")]
    UnknownWilaya(u8),
    #[error("min_price {min} exceeds max_price {max}")]
    InvertedPriceRange { min: u64, max: u64 },
}

impl SearchFilters {
    pub fn validate(&self) -> Result<(), SearchFilterError> {
        if let Some(code) = self.wilaya {
            if Wilaya::from_code(code).is_none() {
                return Err(SearchFilterError::UnknownWilaya(code));
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(SearchFilterError::InvertedPriceRange { min, max });
            }
        }
        Ok(())
    }

    pub fn matches(&self, property: &Property) -> bool {
        if self.wilaya.is_some_and(|code| code != property.wilaya) {
            return false;
        }
        if self
            .transaction
            .is_some_and(|transaction| transaction != property.transaction)
        {
            return false;
        }
        if self.kind.is_some_and(|kind| kind != property.kind) {
            return false;
        }
        if self.min_price.is_some_and(|min| property.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }
        if let Some(min_rooms) = self.min_rooms {
            if property.rooms.map_or(true, |rooms| rooms < min_rooms) {
                return false;
            }
        }

        let haystack = format!(
            "{} {} {}",
            property.title,
            property.description,
            property.commune.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        self.keywords
            .iter()
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .all(|keyword| haystack.contains(&keyword))
    }
}
