use std::sync::Arc;

use axum::Router;
use chrono::Duration;

use crate::marketplace::accounts::{UserAccount, UserId};
use crate::marketplace::ads::{Ad, AdId};
pub(super) use crate::marketplace::fixtures::{harness, json_request, read_json_body, Harness};
use crate::marketplace::listings::{Property, PropertyId, PropertyStatus};
use crate::marketplace::moderation::domain::{
    AppealId, IssueId, PropertyAppeal, Report, ReportDecision, ReportId, ReportStatus, UserIssue,
};
use crate::marketplace::moderation::{moderation_router, AppealCooldown, ModerationService};
use crate::marketplace::store::{
    AccountRepository, AdRepository, ListingRepository, MemoryStore, ModerationChangeSet,
    ModerationRepository, ReportWrite, RepositoryError,
};

pub(super) fn service(harness: &Harness) -> ModerationService<MemoryStore> {
    ModerationService::new(
        harness.store.clone(),
        harness.clock(),
        AppealCooldown::new(Duration::hours(24)),
    )
}

pub(super) fn router(harness: &Harness) -> Router {
    moderation_router(Arc::new(service(harness)))
}

/// Active listing owned by a fresh user, plus a reporter and an admin.
pub(super) struct Scene {
    pub owner: UserId,
    pub reporter: UserId,
    pub admin: UserId,
    pub property: PropertyId,
}

pub(super) fn scene(harness: &Harness, status: PropertyStatus) -> Scene {
    let owner = harness.user("owner", Default::default());
    let reporter = harness.user("reporter", Default::default());
    let admin = harness.admin("admin");
    let property = harness.listing("p-1", &owner, status);
    Scene {
        owner,
        reporter,
        admin,
        property,
    }
}

/// Write another admin lands between our read and our commit.
#[derive(Debug, Clone, Copy, Default)]
pub(super) enum Rival {
    /// Edits the listing, bumping its version.
    #[default]
    EditListing,
    /// Upholds the report being decided with a delete.
    UpholdReport,
}

#[derive(Default)]
pub(super) struct RacingStore {
    pub inner: MemoryStore,
    pub rival: Rival,
}

impl RacingStore {
    fn interfere(&self, changes: &ModerationChangeSet) -> Result<(), RepositoryError> {
        match self.rival {
            Rival::EditListing => {
                if let Some(write) = &changes.property {
                    let mut current = self
                        .inner
                        .fetch_property(&write.property.id)?
                        .ok_or(RepositoryError::NotFound)?;
                    let version = current.version;
                    current.version += 1;
                    current.title.push_str(" (edited)");
                    self.inner.update_property(current, version)?;
                }
            }
            Rival::UpholdReport => {
                if let Some(write) = &changes.report {
                    let mut current = self
                        .inner
                        .fetch_report(&write.report.id)?
                        .ok_or(RepositoryError::NotFound)?;
                    let expected_status = current.status;
                    current.status = ReportStatus::Resolved;
                    current.decision = Some(ReportDecision::Delete);
                    self.inner.commit(ModerationChangeSet {
                        report: Some(ReportWrite {
                            report: current,
                            expected_status,
                        }),
                        ..ModerationChangeSet::default()
                    })?;
                }
            }
        }
        Ok(())
    }
}

impl AccountRepository for RacingStore {
    fn insert_user(&self, user: UserAccount) -> Result<UserAccount, RepositoryError> {
        self.inner.insert_user(user)
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        self.inner.fetch_user(id)
    }

    fn update_user(&self, user: UserAccount) -> Result<(), RepositoryError> {
        self.inner.update_user(user)
    }
}

impl ListingRepository for RacingStore {
    fn insert_property(&self, property: Property) -> Result<Property, RepositoryError> {
        self.inner.insert_property(property)
    }

    fn fetch_property(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        self.inner.fetch_property(id)
    }

    fn update_property(
        &self,
        property: Property,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        self.inner.update_property(property, expected_version)
    }

    fn properties_by_owner(&self, owner: &UserId) -> Result<Vec<Property>, RepositoryError> {
        self.inner.properties_by_owner(owner)
    }

    fn properties_with_status(
        &self,
        status: PropertyStatus,
    ) -> Result<Vec<Property>, RepositoryError> {
        self.inner.properties_with_status(status)
    }

    fn record_view(&self, id: &PropertyId) -> Result<u64, RepositoryError> {
        self.inner.record_view(id)
    }
}

impl ModerationRepository for RacingStore {
    fn insert_report(&self, report: Report) -> Result<Report, RepositoryError> {
        self.inner.insert_report(report)
    }

    fn fetch_report(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError> {
        self.inner.fetch_report(id)
    }

    fn reports(&self) -> Result<Vec<Report>, RepositoryError> {
        self.inner.reports()
    }

    fn insert_appeal(&self, appeal: PropertyAppeal) -> Result<PropertyAppeal, RepositoryError> {
        self.inner.insert_appeal(appeal)
    }

    fn fetch_appeal(&self, id: &AppealId) -> Result<Option<PropertyAppeal>, RepositoryError> {
        self.inner.fetch_appeal(id)
    }

    fn appeals(&self) -> Result<Vec<PropertyAppeal>, RepositoryError> {
        self.inner.appeals()
    }

    fn appeals_for_property(
        &self,
        property: &PropertyId,
    ) -> Result<Vec<PropertyAppeal>, RepositoryError> {
        self.inner.appeals_for_property(property)
    }

    fn insert_issue(&self, issue: UserIssue) -> Result<UserIssue, RepositoryError> {
        self.inner.insert_issue(issue)
    }

    fn fetch_issue(&self, id: &IssueId) -> Result<Option<UserIssue>, RepositoryError> {
        self.inner.fetch_issue(id)
    }

    fn update_issue(&self, issue: UserIssue) -> Result<(), RepositoryError> {
        self.inner.update_issue(issue)
    }

    fn issues(&self) -> Result<Vec<UserIssue>, RepositoryError> {
        self.inner.issues()
    }

    fn commit(&self, changes: ModerationChangeSet) -> Result<(), RepositoryError> {
        self.interfere(&changes)?;
        self.inner.commit(changes)
    }
}

impl AdRepository for RacingStore {
    fn insert_ad(&self, ad: Ad) -> Result<Ad, RepositoryError> {
        self.inner.insert_ad(ad)
    }

    fn fetch_ad(&self, id: &AdId) -> Result<Option<Ad>, RepositoryError> {
        self.inner.fetch_ad(id)
    }

    fn update_ad(&self, ad: Ad) -> Result<(), RepositoryError> {
        self.inner.update_ad(ad)
    }

    fn delete_ad(&self, id: &AdId) -> Result<Ad, RepositoryError> {
        self.inner.delete_ad(id)
    }

    fn ads_by_owner(&self, owner: &UserId) -> Result<Vec<Ad>, RepositoryError> {
        self.inner.ads_by_owner(owner)
    }

    fn ads(&self) -> Result<Vec<Ad>, RepositoryError> {
        self.inner.ads()
    }
}
