use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::marketplace::accounts::UserId;
use crate::marketplace::listings::PropertyId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppealId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IssueId(pub String);

macro_rules! display_id {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })*
    };
}

display_id!(ReportId, AppealId, IssueId);

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_label!(ReportStatus, ReportDecision, AppealStatus, AppealDecision);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportReason {
    ScamFraud,
    WrongInformation,
    InappropriateContent,
    DuplicateListing,
    AlreadySold,
    Other,
}

impl ReportReason {
    pub const fn code(self) -> &'static str {
        match self {
            ReportReason::ScamFraud => "SCAM_FRAUD",
            ReportReason::WrongInformation => "WRONG_INFORMATION",
            ReportReason::InappropriateContent => "INAPPROPRIATE_CONTENT",
            ReportReason::DuplicateListing => "DUPLICATE_LISTING",
            ReportReason::AlreadySold => "ALREADY_SOLD",
            ReportReason::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    New,
    UnderReview,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::New => "new",
            ReportStatus::UnderReview => "under_review",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, ReportStatus::New | ReportStatus::UnderReview)
    }
}

/// Admin action closing a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportDecision {
    Delete,
    Archive,
    Dismiss,
}

impl ReportDecision {
    pub const fn label(self) -> &'static str {
        match self {
            ReportDecision::Delete => "delete",
            ReportDecision::Archive => "archive",
            ReportDecision::Dismiss => "dismiss",
        }
    }
}

/// Complaint raised by a user against someone else's listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub property_id: PropertyId,
    pub reporter_id: UserId,
    pub reason: ReportReason,
    #[serde(default)]
    pub comments: String,
    pub status: ReportStatus,
    pub admin_notes: Option<String>,
    pub decision: Option<ReportDecision>,
    pub handled_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub property_id: PropertyId,
    pub reason: ReportReason,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResolution {
    pub decision: ReportDecision,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealStatus {
    New,
    UnderReview,
    ResolvedDeleted,
    ResolvedKeptArchived,
    ResolvedPublished,
}

impl AppealStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AppealStatus::New => "new",
            AppealStatus::UnderReview => "under_review",
            AppealStatus::ResolvedDeleted => "resolved_deleted",
            AppealStatus::ResolvedKeptArchived => "resolved_kept_archived",
            AppealStatus::ResolvedPublished => "resolved_published",
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, AppealStatus::New | AppealStatus::UnderReview)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppealDecision {
    Delete,
    Archive,
    Publish,
}

impl AppealDecision {
    pub const fn label(self) -> &'static str {
        match self {
            AppealDecision::Delete => "delete",
            AppealDecision::Archive => "archive",
            AppealDecision::Publish => "publish",
        }
    }

    pub const fn resolved_status(self) -> AppealStatus {
        match self {
            AppealDecision::Delete => AppealStatus::ResolvedDeleted,
            AppealDecision::Archive => AppealStatus::ResolvedKeptArchived,
            AppealDecision::Publish => AppealStatus::ResolvedPublished,
        }
    }
}

/// Owner request to reverse an archival or deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAppeal {
    pub id: AppealId,
    pub property_id: PropertyId,
    pub owner_id: UserId,
    pub message: String,
    pub status: AppealStatus,
    pub decision: Option<AppealDecision>,
    pub admin_notes: Option<String>,
    pub handled_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealSubmission {
    pub property_id: PropertyId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealResolution {
    pub decision: AppealDecision,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    New,
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub const fn label(self) -> &'static str {
        match self {
            IssueStatus::New => "new",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Resolved => "resolved",
        }
    }

    /// Issues only move forward; re-applying the current status is a no-op.
    pub const fn can_move_to(self, next: IssueStatus) -> bool {
        matches!(
            (self, next),
            (IssueStatus::New, _)
                | (IssueStatus::InProgress, IssueStatus::InProgress)
                | (IssueStatus::InProgress, IssueStatus::Resolved)
                | (IssueStatus::Resolved, IssueStatus::Resolved)
        )
    }
}

display_label!(IssueStatus);

/// Free-form message from a user to the moderation team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIssue {
    pub id: IssueId,
    pub user_id: UserId,
    pub subject: String,
    pub message: String,
    pub status: IssueStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSubmission {
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueUpdate {
    pub status: IssueStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModerationStats {
    pub open_reports: usize,
    pub open_appeals: usize,
    pub open_issues: usize,
    pub pending_listings: usize,
}
