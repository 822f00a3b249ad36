//! Property listings: data model, status lifecycle, search, and owner operations.

pub mod domain;
pub mod lifecycle;
pub mod router;
pub mod search;
pub mod service;
pub mod wilaya;

#[cfg(test)]
mod tests;

pub use domain::{
    Property, PropertyDraft, PropertyId, PropertyKind, PropertyStatus, TransactionKind,
};
pub use lifecycle::{Actor, StatusAction, Transition, TransitionError};
pub use router::listing_router;
pub use search::{SearchFilterError, SearchFilters};
pub use service::{ListingService, ListingServiceError};
pub use wilaya::Wilaya;
