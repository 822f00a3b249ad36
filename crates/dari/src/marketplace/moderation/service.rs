use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::cooldown::AppealCooldown;
use super::domain::{
    AppealDecision, AppealId, AppealResolution, AppealStatus, AppealSubmission, IssueId,
    IssueStatus, IssueSubmission, IssueUpdate, ModerationStats, PropertyAppeal, Report,
    ReportDecision, ReportId, ReportResolution, ReportStatus, ReportSubmission, UserIssue,
};
use super::export::{reports_to_csv, ExportError};
use super::trust::{after_appeal_decision, after_report_decision};
use crate::marketplace::accounts::{
    load_account, require_admin, AccessError, TrustLevel, UserAccount, UserId,
};
use crate::marketplace::clock::Clock;
use crate::marketplace::listings::lifecycle::{
    self, Actor, StatusAction, Transition, TransitionError,
};
use crate::marketplace::listings::{Property, PropertyId, PropertyStatus};
use crate::marketplace::respond::{json_error, repository_status, transition_status};
use crate::marketplace::store::{
    AppealWrite, MarketplaceStore, ModerationChangeSet, PropertyWrite, RepositoryError,
    ReportWrite,
};

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPEAL_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ISSUE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("rpt-{id:06}"))
}

fn next_appeal_id() -> AppealId {
    let id = APPEAL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AppealId(format!("apl-{id:06}"))
}

fn next_issue_id() -> IssueId {
    let id = ISSUE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    IssueId(format!("iss-{id:06}"))
}

/// Result of an admin decision: the documents as committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutcome {
    pub report: Report,
    pub property: Option<Property>,
    pub owner_trust: Option<TrustLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppealOutcome {
    pub appeal: PropertyAppeal,
    pub property: Property,
    pub owner_trust: TrustLevel,
}

/// Reports, appeals, user issues, trust levels, and admin listing moderation.
pub struct ModerationService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    cooldown: AppealCooldown,
}

impl<S> ModerationService<S>
where
    S: MarketplaceStore + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, cooldown: AppealCooldown) -> Self {
        Self {
            store,
            clock,
            cooldown,
        }
    }

    /// File a report against someone else's active listing.
    pub fn submit_report(
        &self,
        reporter: &UserId,
        submission: ReportSubmission,
    ) -> Result<Report, ModerationServiceError> {
        load_account(self.store.as_ref(), reporter)?;
        let property = self.property(&submission.property_id)?;

        if &property.owner_id == reporter {
            return Err(ModerationServiceError::SelfReport);
        }
        if property.status != PropertyStatus::Active {
            return Err(ModerationServiceError::NotReportable {
                status: property.status,
            });
        }
        let duplicate = self.store.reports()?.into_iter().any(|report| {
            report.status.is_open()
                && &report.reporter_id == reporter
                && report.property_id == property.id
        });
        if duplicate {
            return Err(ModerationServiceError::DuplicateReport);
        }

        let now = self.clock.now();
        let report = Report {
            id: next_report_id(),
            property_id: property.id,
            reporter_id: reporter.clone(),
            reason: submission.reason,
            comments: submission.comments.trim().to_string(),
            status: ReportStatus::New,
            admin_notes: None,
            decision: None,
            handled_by: None,
            created_at: now,
            updated_at: now,
        };
        let stored = self.store.insert_report(report)?;
        info!(
            report = %stored.id,
            property = %stored.property_id,
            reason = stored.reason.code(),
            "report submitted"
        );
        Ok(stored)
    }

    pub fn start_report_review(
        &self,
        admin: &UserId,
        id: &ReportId,
    ) -> Result<Report, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        let mut report = self.report(id)?;
        match report.status {
            ReportStatus::New => {
                report.status = ReportStatus::UnderReview;
                report.handled_by = Some(admin.clone());
                report.updated_at = self.clock.now();
                self.commit(ModerationChangeSet {
                    report: Some(ReportWrite {
                        report: report.clone(),
                        expected_status: ReportStatus::New,
                    }),
                    ..ModerationChangeSet::default()
                })?;
                Ok(report)
            }
            ReportStatus::UnderReview => Ok(report),
            status => Err(ModerationServiceError::ReportClosed { status }),
        }
    }

    /// Closes an open report. Delete and archive act on the listing using the
    /// notes as the reason and mark the owner untrusted, all in one commit.
    pub fn resolve_report(
        &self,
        admin: &UserId,
        id: &ReportId,
        resolution: ReportResolution,
    ) -> Result<ReportOutcome, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        let mut report = self.report(id)?;
        if !report.status.is_open() {
            return Err(ModerationServiceError::ReportClosed {
                status: report.status,
            });
        }

        let expected_status = report.status;
        let now = self.clock.now();
        let notes = resolution.notes.trim().to_string();
        report.decision = Some(resolution.decision);
        report.admin_notes = (!notes.is_empty()).then(|| notes.clone());
        report.handled_by = Some(admin.clone());
        report.updated_at = now;

        let action = match resolution.decision {
            ReportDecision::Dismiss => {
                report.status = ReportStatus::Dismissed;
                self.commit(ModerationChangeSet {
                    report: Some(ReportWrite {
                        report: report.clone(),
                        expected_status,
                    }),
                    ..ModerationChangeSet::default()
                })?;
                info!(report = %id, %admin, "report dismissed");
                return Ok(ReportOutcome {
                    report,
                    property: None,
                    owner_trust: None,
                });
            }
            ReportDecision::Delete => StatusAction::Delete { reason: notes },
            ReportDecision::Archive => StatusAction::Archive { reason: notes },
        };

        let mut property = self.property(&report.property_id)?;
        let expected_version = property.version;
        let transition = lifecycle::apply(&mut property, &action, Actor::Admin, now)?;

        let mut owner = self.owner_of(&property)?;
        owner.trust_level = after_report_decision(owner.trust_level, resolution.decision);
        report.status = ReportStatus::Resolved;

        self.commit(ModerationChangeSet {
            property: Some(PropertyWrite {
                property: property.clone(),
                expected_version,
            }),
            report: Some(ReportWrite {
                report: report.clone(),
                expected_status,
            }),
            appeal: None,
            user: Some(owner.clone()),
        })?;

        info!(
            report = %id,
            property = %property.id,
            %admin,
            decision = resolution.decision.label(),
            from = %transition.from,
            to = %transition.to,
            owner = %owner.id,
            trust = %owner.trust_level,
            "report resolved"
        );
        Ok(ReportOutcome {
            report,
            property: Some(property),
            owner_trust: Some(owner.trust_level),
        })
    }

    /// Owner asks for an archived or deleted listing to be reconsidered.
    pub fn submit_appeal(
        &self,
        owner: &UserId,
        submission: AppealSubmission,
    ) -> Result<PropertyAppeal, ModerationServiceError> {
        load_account(self.store.as_ref(), owner)?;
        let message = submission.message.trim();
        if message.is_empty() {
            return Err(ModerationServiceError::Invalid(
                "appeal message is required".to_string(),
            ));
        }

        let property = self.property(&submission.property_id)?;
        if &property.owner_id != owner {
            return Err(ModerationServiceError::NotOwner);
        }
        if !matches!(
            property.status,
            PropertyStatus::Archived | PropertyStatus::Deleted
        ) {
            return Err(ModerationServiceError::NotAppealable {
                status: property.status,
            });
        }

        let history = self.store.appeals_for_property(&property.id)?;
        if history.iter().any(|appeal| appeal.status.is_open()) {
            return Err(ModerationServiceError::DuplicateAppeal);
        }

        let now = self.clock.now();
        let last = history
            .iter()
            .filter(|appeal| &appeal.owner_id == owner)
            .map(|appeal| appeal.created_at)
            .max();
        if let Err(retry_at) = self.cooldown.check(last, now) {
            warn!(property = %property.id, %owner, %retry_at, "appeal throttled");
            return Err(ModerationServiceError::CooldownActive { retry_at });
        }

        let appeal = PropertyAppeal {
            id: next_appeal_id(),
            property_id: property.id,
            owner_id: owner.clone(),
            message: message.to_string(),
            status: AppealStatus::New,
            decision: None,
            admin_notes: None,
            handled_by: None,
            created_at: now,
            updated_at: now,
        };
        let stored = self.store.insert_appeal(appeal)?;
        info!(appeal = %stored.id, property = %stored.property_id, "appeal submitted");
        Ok(stored)
    }

    pub fn start_appeal_review(
        &self,
        admin: &UserId,
        id: &AppealId,
    ) -> Result<PropertyAppeal, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        let mut appeal = self.appeal(id)?;
        match appeal.status {
            AppealStatus::New => {
                appeal.status = AppealStatus::UnderReview;
                appeal.handled_by = Some(admin.clone());
                appeal.updated_at = self.clock.now();
                self.commit(ModerationChangeSet {
                    appeal: Some(AppealWrite {
                        appeal: appeal.clone(),
                        expected_status: AppealStatus::New,
                    }),
                    ..ModerationChangeSet::default()
                })?;
                Ok(appeal)
            }
            AppealStatus::UnderReview => Ok(appeal),
            status => Err(ModerationServiceError::AppealClosed { status }),
        }
    }

    /// Closes an open appeal:
    ///
    /// | decision | listing  | appeal                   | owner trust |
    /// |----------|----------|--------------------------|-------------|
    /// | delete   | deleted  | `resolved_deleted`       | unchanged   |
    /// | archive  | archived | `resolved_kept_archived` | unchanged   |
    /// | publish  | active   | `resolved_published`     | normal      |
    ///
    /// Blank notes on delete/archive keep the listing's current reason. Publishing
    /// a listing its owner already reactivated only closes the appeal.
    pub fn resolve_appeal(
        &self,
        admin: &UserId,
        id: &AppealId,
        resolution: AppealResolution,
    ) -> Result<AppealOutcome, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        let mut appeal = self.appeal(id)?;
        if !appeal.status.is_open() {
            return Err(ModerationServiceError::AppealClosed {
                status: appeal.status,
            });
        }

        let expected_status = appeal.status;
        let now = self.clock.now();
        let mut property = self.property(&appeal.property_id)?;
        let notes = resolution.notes.trim().to_string();
        let reason = if notes.is_empty() {
            property
                .deletion_reason
                .clone()
                .or_else(|| property.archival_reason.clone())
                .unwrap_or_default()
        } else {
            notes.clone()
        };

        let action = match resolution.decision {
            AppealDecision::Delete => StatusAction::Delete { reason },
            AppealDecision::Archive => StatusAction::Archive { reason },
            AppealDecision::Publish if property.status == PropertyStatus::Pending => {
                StatusAction::Approve
            }
            AppealDecision::Publish => StatusAction::Reactivate,
        };

        let expected_version = property.version;
        let already_live = resolution.decision == AppealDecision::Publish
            && property.status == PropertyStatus::Active;
        let transition = if already_live {
            // reactivated by the owner while the appeal was open
            Transition {
                from: property.status,
                to: property.status,
            }
        } else {
            lifecycle::apply(&mut property, &action, Actor::Admin, now)?
        };

        let mut owner = self.owner_of(&property)?;
        owner.trust_level = after_appeal_decision(owner.trust_level, resolution.decision);

        appeal.status = resolution.decision.resolved_status();
        appeal.decision = Some(resolution.decision);
        appeal.admin_notes = (!notes.is_empty()).then_some(notes);
        appeal.handled_by = Some(admin.clone());
        appeal.updated_at = now;

        self.commit(ModerationChangeSet {
            property: Some(PropertyWrite {
                property: property.clone(),
                expected_version,
            }),
            report: None,
            appeal: Some(AppealWrite {
                appeal: appeal.clone(),
                expected_status,
            }),
            user: Some(owner.clone()),
        })?;

        info!(
            appeal = %id,
            property = %property.id,
            %admin,
            decision = resolution.decision.label(),
            from = %transition.from,
            to = %transition.to,
            trust = %owner.trust_level,
            "appeal resolved"
        );
        Ok(AppealOutcome {
            appeal,
            property,
            owner_trust: owner.trust_level,
        })
    }

    pub fn submit_issue(
        &self,
        user: &UserId,
        submission: IssueSubmission,
    ) -> Result<UserIssue, ModerationServiceError> {
        load_account(self.store.as_ref(), user)?;
        let subject = submission.subject.trim();
        let message = submission.message.trim();
        if subject.is_empty() || message.is_empty() {
            return Err(ModerationServiceError::Invalid(
                "issue subject and message are required".to_string(),
            ));
        }

        let now = self.clock.now();
        let issue = UserIssue {
            id: next_issue_id(),
            user_id: user.clone(),
            subject: subject.to_string(),
            message: message.to_string(),
            status: IssueStatus::New,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        };
        let stored = self.store.insert_issue(issue)?;
        info!(issue = %stored.id, %user, "user issue opened");
        Ok(stored)
    }

    pub fn update_issue(
        &self,
        admin: &UserId,
        id: &IssueId,
        update: IssueUpdate,
    ) -> Result<UserIssue, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        let mut issue = self
            .store
            .fetch_issue(id)?
            .ok_or(RepositoryError::NotFound)?;
        if !issue.status.can_move_to(update.status) {
            return Err(ModerationServiceError::IssueTransition {
                from: issue.status,
                to: update.status,
            });
        }

        issue.status = update.status;
        if let Some(notes) = update
            .notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty())
        {
            issue.admin_notes = Some(notes);
        }
        issue.updated_at = self.clock.now();
        self.store.update_issue(issue.clone())?;
        info!(issue = %id, status = %issue.status, "user issue updated");
        Ok(issue)
    }

    pub fn set_trust_level(
        &self,
        admin: &UserId,
        user: &UserId,
        level: TrustLevel,
    ) -> Result<UserAccount, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        let mut account = self
            .store
            .fetch_user(user)?
            .ok_or(RepositoryError::NotFound)?;
        let previous = account.trust_level;
        account.trust_level = level;
        self.store.commit(ModerationChangeSet {
            user: Some(account.clone()),
            ..ModerationChangeSet::default()
        })?;
        info!(%admin, %user, from = %previous, to = %level, "trust level set");
        Ok(account)
    }

    /// Admin approve, archive, delete, or reactivate of any listing.
    pub fn moderate_listing(
        &self,
        admin: &UserId,
        id: &PropertyId,
        action: StatusAction,
    ) -> Result<Property, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        let mut property = self.property(id)?;
        let expected_version = property.version;
        let transition = lifecycle::apply(&mut property, &action, Actor::Admin, self.clock.now())?;
        self.commit(ModerationChangeSet {
            property: Some(PropertyWrite {
                property: property.clone(),
                expected_version,
            }),
            ..ModerationChangeSet::default()
        })?;
        info!(
            property = %id,
            %admin,
            action = action.name(),
            from = %transition.from,
            to = %transition.to,
            "listing moderated"
        );
        Ok(property)
    }

    pub fn reports(
        &self,
        admin: &UserId,
        status: Option<ReportStatus>,
    ) -> Result<Vec<Report>, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        Ok(self
            .store
            .reports()?
            .into_iter()
            .filter(|report| status.map_or(true, |status| report.status == status))
            .collect())
    }

    pub fn appeals(
        &self,
        admin: &UserId,
        status: Option<AppealStatus>,
    ) -> Result<Vec<PropertyAppeal>, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        Ok(self
            .store
            .appeals()?
            .into_iter()
            .filter(|appeal| status.map_or(true, |status| appeal.status == status))
            .collect())
    }

    pub fn issues(
        &self,
        admin: &UserId,
        status: Option<IssueStatus>,
    ) -> Result<Vec<UserIssue>, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        Ok(self
            .store
            .issues()?
            .into_iter()
            .filter(|issue| status.map_or(true, |status| issue.status == status))
            .collect())
    }

    /// Listings waiting for pre-publication review, newest first.
    pub fn pending_listings(&self, admin: &UserId) -> Result<Vec<Property>, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        Ok(self.store.properties_with_status(PropertyStatus::Pending)?)
    }

    pub fn stats(&self, admin: &UserId) -> Result<ModerationStats, ModerationServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        Ok(ModerationStats {
            open_reports: count_open(self.store.reports()?, |report| report.status.is_open()),
            open_appeals: count_open(self.store.appeals()?, |appeal| appeal.status.is_open()),
            open_issues: count_open(self.store.issues()?, |issue| {
                issue.status != IssueStatus::Resolved
            }),
            pending_listings: self
                .store
                .properties_with_status(PropertyStatus::Pending)?
                .len(),
        })
    }

    /// CSV of reports, optionally restricted to one status.
    pub fn export_reports_csv(
        &self,
        admin: &UserId,
        status: Option<ReportStatus>,
    ) -> Result<String, ModerationServiceError> {
        let reports = self.reports(admin, status)?;
        Ok(reports_to_csv(&reports)?)
    }

    fn property(&self, id: &PropertyId) -> Result<Property, RepositoryError> {
        self.store.fetch_property(id)?.ok_or(RepositoryError::NotFound)
    }

    fn report(&self, id: &ReportId) -> Result<Report, RepositoryError> {
        self.store.fetch_report(id)?.ok_or(RepositoryError::NotFound)
    }

    fn appeal(&self, id: &AppealId) -> Result<PropertyAppeal, RepositoryError> {
        self.store.fetch_appeal(id)?.ok_or(RepositoryError::NotFound)
    }

    fn owner_of(&self, property: &Property) -> Result<UserAccount, RepositoryError> {
        self.store
            .fetch_user(&property.owner_id)?
            .ok_or(RepositoryError::NotFound)
    }

    fn commit(&self, changes: ModerationChangeSet) -> Result<(), RepositoryError> {
        let property = changes
            .property
            .as_ref()
            .map(|write| write.property.id.to_string());
        let report = changes.report.as_ref().map(|write| write.report.id.to_string());
        let appeal = changes.appeal.as_ref().map(|write| write.appeal.id.to_string());
        self.store.commit(changes).map_err(|error| {
            warn!(?property, ?report, ?appeal, %error, "moderation decision not committed");
            error
        })
    }
}

fn count_open<T>(items: Vec<T>, open: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|&item| open(item)).count()
}

#[derive(Debug, thiserror::Error)]
pub enum ModerationServiceError {
    #[error("{0}")]
    Invalid(String),
    #[error("you cannot report your own listing")]
    SelfReport,
    #[error("only active listings can be reported (listing is {status})")]
    NotReportable { status: PropertyStatus },
    #[error("you already have an open report on this listing")]
    DuplicateReport,
    #[error("report is already {status}")]
    ReportClosed { status: ReportStatus },
    #[error("only the owner may appeal this listing")]
    NotOwner,
    #[error("only archived or deleted listings can be appealed (listing is {status})")]
    NotAppealable { status: PropertyStatus },
    #[error("an appeal for this listing is already open")]
    DuplicateAppeal,
    #[error("another appeal can be submitted after {retry_at}")]
    CooldownActive { retry_at: DateTime<Utc> },
    #[error("appeal is already {status}")]
    AppealClosed { status: AppealStatus },
    #[error("issue cannot move from {from} to {to}")]
    IssueTransition { from: IssueStatus, to: IssueStatus },
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ModerationServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ModerationServiceError::Invalid(_) | ModerationServiceError::SelfReport => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ModerationServiceError::NotOwner => StatusCode::FORBIDDEN,
            ModerationServiceError::NotReportable { .. }
            | ModerationServiceError::DuplicateReport
            | ModerationServiceError::ReportClosed { .. }
            | ModerationServiceError::NotAppealable { .. }
            | ModerationServiceError::DuplicateAppeal
            | ModerationServiceError::AppealClosed { .. }
            | ModerationServiceError::IssueTransition { .. } => StatusCode::CONFLICT,
            ModerationServiceError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            ModerationServiceError::Transition(error) => transition_status(error),
            ModerationServiceError::Access(error) => error.status(),
            ModerationServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ModerationServiceError::Repository(error) => repository_status(error),
        }
    }
}

impl IntoResponse for ModerationServiceError {
    fn into_response(self) -> Response {
        json_error(self.status(), self)
    }
}
