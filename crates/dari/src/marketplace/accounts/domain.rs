use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier issued by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Advertiser,
    Admin,
}

/// Admin-assigned reputation tier. Gates pre-publication review of new listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    #[default]
    Normal,
    Untrusted,
    Blacklisted,
}

impl TrustLevel {
    pub const fn label(self) -> &'static str {
        match self {
            TrustLevel::Normal => "normal",
            TrustLevel::Untrusted => "untrusted",
            TrustLevel::Blacklisted => "blacklisted",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Marketplace profile stored alongside the identity-provider account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    pub plan_id: PlanId,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub trust_level: TrustLevel,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn is_administrator(&self) -> bool {
        self.is_admin || self.roles.contains(&Role::Admin)
    }

    pub fn is_advertiser(&self) -> bool {
        self.roles.contains(&Role::Advertiser) || self.is_administrator()
    }
}

/// Self-service profile creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub advertiser: bool,
}
