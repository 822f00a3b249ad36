//! Listing status state machine.
//!
//! | from \ action | approve | archive | delete | reactivate |
//! |---------------|---------|---------|--------|------------|
//! | pending       | active (admin) | archived | deleted | - |
//! | active        | -       | archived | deleted | - |
//! | archived      | -       | archived | deleted | active |
//! | deleted       | -       | archived | deleted | active |
//!
//! Archiving or deleting an already archived/deleted listing refreshes the
//! stored reason. Owners cannot reactivate while `moderation_hold` is set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::{Property, PropertyStatus};

/// Who is driving a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Owner,
    Admin,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Owner => f.write_str("owner"),
            Actor::Admin => f.write_str("admin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StatusAction {
    Approve,
    Archive { reason: String },
    Delete { reason: String },
    Reactivate,
}

impl StatusAction {
    pub const fn name(&self) -> &'static str {
        match self {
            StatusAction::Approve => "approve",
            StatusAction::Archive { .. } => "archive",
            StatusAction::Delete { .. } => "delete",
            StatusAction::Reactivate => "reactivate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot {action} a listing that is {from}")]
    Invalid {
        from: PropertyStatus,
        action: &'static str,
    },
    #[error("a reason is required to {action} a listing")]
    MissingReason { action: &'static str },
    #[error("{actor} may not {action} this listing")]
    NotPermitted { actor: Actor, action: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: PropertyStatus,
    pub to: PropertyStatus,
}

/// Status the listing would land in, without touching it.
pub fn target_status(
    property: &Property,
    action: &StatusAction,
    actor: Actor,
) -> Result<PropertyStatus, TransitionError> {
    let from = property.status;
    let name = action.name();

    match action {
        StatusAction::Approve => match (from, actor) {
            (PropertyStatus::Pending, Actor::Admin) => Ok(PropertyStatus::Active),
            (PropertyStatus::Pending, Actor::Owner) => Err(TransitionError::NotPermitted {
                actor,
                action: name,
            }),
            _ => Err(TransitionError::Invalid { from, action: name }),
        },
        StatusAction::Archive { reason } => {
            require_reason(reason, name)?;
            Ok(PropertyStatus::Archived)
        }
        StatusAction::Delete { reason } => {
            require_reason(reason, name)?;
            Ok(PropertyStatus::Deleted)
        }
        StatusAction::Reactivate => match from {
            PropertyStatus::Archived | PropertyStatus::Deleted => {
                if actor == Actor::Owner && property.moderation_hold {
                    Err(TransitionError::NotPermitted {
                        actor,
                        action: name,
                    })
                } else {
                    Ok(PropertyStatus::Active)
                }
            }
            PropertyStatus::Active | PropertyStatus::Pending => {
                Err(TransitionError::Invalid { from, action: name })
            }
        },
    }
}

/// Applies `action` in place, keeping the reason fields mutually exclusive and
/// bumping `version`/`updated_at`.
pub fn apply(
    property: &mut Property,
    action: &StatusAction,
    actor: Actor,
    at: DateTime<Utc>,
) -> Result<Transition, TransitionError> {
    let to = target_status(property, action, actor)?;
    let from = property.status;

    match action {
        StatusAction::Archive { reason } => {
            property.archival_reason = Some(reason.trim().to_string());
            property.deletion_reason = None;
        }
        StatusAction::Delete { reason } => {
            property.deletion_reason = Some(reason.trim().to_string());
            property.archival_reason = None;
        }
        StatusAction::Approve | StatusAction::Reactivate => {
            property.archival_reason = None;
            property.deletion_reason = None;
        }
    }

    if actor == Actor::Admin {
        property.moderation_hold = matches!(
            action,
            StatusAction::Archive { .. } | StatusAction::Delete { .. }
        );
    }

    property.status = to;
    property.version += 1;
    property.updated_at = at;

    Ok(Transition { from, to })
}

fn require_reason(reason: &str, action: &'static str) -> Result<(), TransitionError> {
    if reason.trim().is_empty() {
        Err(TransitionError::MissingReason { action })
    } else {
        Ok(())
    }
}
