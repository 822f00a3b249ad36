//! Reports, appeals, user issues, and the trust-level rules they drive.
//!
//! Every admin decision that touches more than one document (listing, report or
//! appeal, owner account) is committed as a single change set, and listing
//! writes are guarded by the version the admin read.

pub mod cooldown;
pub mod domain;
pub mod export;
pub mod router;
pub mod service;
pub mod trust;

#[cfg(test)]
mod tests;

pub use cooldown::{AppealCooldown, DEFAULT_APPEAL_COOLDOWN_HOURS, MAX_APPEAL_COOLDOWN_HOURS};
pub use domain::{
    AppealDecision, AppealId, AppealResolution, AppealStatus, AppealSubmission, IssueId,
    IssueStatus, IssueSubmission, IssueUpdate, ModerationStats, PropertyAppeal, Report,
    ReportDecision, ReportId, ReportReason, ReportResolution, ReportStatus, ReportSubmission,
    UserIssue,
};
pub use export::{reports_to_csv, ExportError};
pub use router::moderation_router;
pub use service::{AppealOutcome, ModerationService, ModerationServiceError, ReportOutcome};
