//! Storage seams for the marketplace collections.
//!
//! Each collection gets a repository trait; admin decisions that touch several
//! collections go through [`ModerationRepository::commit`] so they land
//! together or not at all.

mod memory;

pub use memory::MemoryStore;

use super::accounts::{UserAccount, UserId};
use super::ads::{Ad, AdId};
use super::listings::{Property, PropertyId, PropertyStatus};
use super::moderation::domain::{
    AppealId, AppealStatus, IssueId, PropertyAppeal, Report, ReportId, ReportStatus, UserIssue,
};

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record was modified concurrently (expected version {expected}, found {found})")]
    StaleVersion { expected: u64, found: u64 },
    #[error("record was changed by another writer")]
    Superseded,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub trait AccountRepository: Send + Sync {
    fn insert_user(&self, user: UserAccount) -> Result<UserAccount, RepositoryError>;
    fn fetch_user(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError>;
    fn update_user(&self, user: UserAccount) -> Result<(), RepositoryError>;
}

pub trait ListingRepository: Send + Sync {
    fn insert_property(&self, property: Property) -> Result<Property, RepositoryError>;
    fn fetch_property(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError>;
    /// Writes `property` only if the stored copy still carries `expected_version`.
    /// The stored view count is kept.
    fn update_property(
        &self,
        property: Property,
        expected_version: u64,
    ) -> Result<(), RepositoryError>;
    fn properties_by_owner(&self, owner: &UserId) -> Result<Vec<Property>, RepositoryError>;
    fn properties_with_status(
        &self,
        status: PropertyStatus,
    ) -> Result<Vec<Property>, RepositoryError>;
    /// Increments the view counter and returns the new total.
    fn record_view(&self, id: &PropertyId) -> Result<u64, RepositoryError>;
}

/// Property write guarded by the version the caller read.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyWrite {
    pub property: Property,
    pub expected_version: u64,
}

/// Report write that only lands while the stored report is still in
/// `expected_status`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportWrite {
    pub report: Report,
    pub expected_status: ReportStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppealWrite {
    pub appeal: PropertyAppeal,
    pub expected_status: AppealStatus,
}

/// Documents touched by a single admin decision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModerationChangeSet {
    pub property: Option<PropertyWrite>,
    pub report: Option<ReportWrite>,
    pub appeal: Option<AppealWrite>,
    pub user: Option<UserAccount>,
}

pub trait ModerationRepository: Send + Sync {
    fn insert_report(&self, report: Report) -> Result<Report, RepositoryError>;
    fn fetch_report(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError>;
    fn reports(&self) -> Result<Vec<Report>, RepositoryError>;

    fn insert_appeal(&self, appeal: PropertyAppeal) -> Result<PropertyAppeal, RepositoryError>;
    fn fetch_appeal(&self, id: &AppealId) -> Result<Option<PropertyAppeal>, RepositoryError>;
    fn appeals(&self) -> Result<Vec<PropertyAppeal>, RepositoryError>;
    fn appeals_for_property(
        &self,
        property: &PropertyId,
    ) -> Result<Vec<PropertyAppeal>, RepositoryError>;

    fn insert_issue(&self, issue: UserIssue) -> Result<UserIssue, RepositoryError>;
    fn fetch_issue(&self, id: &IssueId) -> Result<Option<UserIssue>, RepositoryError>;
    fn update_issue(&self, issue: UserIssue) -> Result<(), RepositoryError>;
    fn issues(&self) -> Result<Vec<UserIssue>, RepositoryError>;

    /// Applies every document in `changes` atomically. Nothing is written if any
    /// target is missing, the property version is stale, or a report or appeal
    /// has left its expected status.
    fn commit(&self, changes: ModerationChangeSet) -> Result<(), RepositoryError>;
}

pub trait AdRepository: Send + Sync {
    fn insert_ad(&self, ad: Ad) -> Result<Ad, RepositoryError>;
    fn fetch_ad(&self, id: &AdId) -> Result<Option<Ad>, RepositoryError>;
    fn update_ad(&self, ad: Ad) -> Result<(), RepositoryError>;
    /// Hard delete; returns the removed record.
    fn delete_ad(&self, id: &AdId) -> Result<Ad, RepositoryError>;
    fn ads_by_owner(&self, owner: &UserId) -> Result<Vec<Ad>, RepositoryError>;
    fn ads(&self) -> Result<Vec<Ad>, RepositoryError>;
}

/// Everything the services need from the document store.
pub trait MarketplaceStore:
    AccountRepository + ListingRepository + ModerationRepository + AdRepository
{
}

impl<T> MarketplaceStore for T where
    T: AccountRepository + ListingRepository + ModerationRepository + AdRepository
{
}
