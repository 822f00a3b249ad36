//! User profiles, roles, trust levels, and subscription plans.

pub mod access;
pub mod domain;
pub mod plans;
pub mod router;
pub mod service;

pub use access::{load_account, require_admin, require_advertiser, AccessError};
pub use domain::{PlanId, Registration, Role, TrustLevel, UserAccount, UserId};
pub use plans::{SubscriptionPlan, AGENCY_PLAN, FREE_PLAN, PREMIUM_PLAN};
pub use router::account_router;
pub use service::{AccountService, AccountServiceError};
