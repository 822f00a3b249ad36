//! Trust-level rules. Levels only change through explicit admin decisions:
//! there is no offense counting, decay, or automatic promotion.

use crate::marketplace::accounts::TrustLevel;
use crate::marketplace::listings::PropertyStatus;

use super::domain::{AppealDecision, ReportDecision};

/// Status a new listing starts in for an owner at `level`; `None` means creation is refused.
pub const fn initial_listing_status(level: TrustLevel) -> Option<PropertyStatus> {
    match level {
        TrustLevel::Normal => Some(PropertyStatus::Active),
        TrustLevel::Untrusted => Some(PropertyStatus::Pending),
        TrustLevel::Blacklisted => None,
    }
}

/// Upholding a report against a listing marks its owner untrusted, whatever they were before.
pub const fn after_report_decision(current: TrustLevel, decision: ReportDecision) -> TrustLevel {
    match decision {
        ReportDecision::Delete | ReportDecision::Archive => TrustLevel::Untrusted,
        ReportDecision::Dismiss => current,
    }
}

/// Publishing a listing on appeal restores the owner to normal.
pub const fn after_appeal_decision(current: TrustLevel, decision: AppealDecision) -> TrustLevel {
    match decision {
        AppealDecision::Publish => TrustLevel::Normal,
        AppealDecision::Delete | AppealDecision::Archive => current,
    }
}
