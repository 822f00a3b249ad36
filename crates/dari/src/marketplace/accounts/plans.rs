use serde::Serialize;

use super::domain::PlanId;

/// Subscription tier limits applied to listings and media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubscriptionPlan {
    pub id: &'static str,
    pub name: &'static str,
    /// `None` means unlimited.
    pub max_listings: Option<usize>,
    pub max_images_per_listing: usize,
    pub video_allowed: bool,
}

pub const FREE_PLAN: SubscriptionPlan = SubscriptionPlan {
    id: "free",
    name: "Free",
    max_listings: Some(3),
    max_images_per_listing: 5,
    video_allowed: false,
};

pub const PREMIUM_PLAN: SubscriptionPlan = SubscriptionPlan {
    id: "premium",
    name: "Premium",
    max_listings: Some(25),
    max_images_per_listing: 15,
    video_allowed: true,
};

pub const AGENCY_PLAN: SubscriptionPlan = SubscriptionPlan {
    id: "agency",
    name: "Agency",
    max_listings: None,
    max_images_per_listing: 30,
    video_allowed: true,
};

impl SubscriptionPlan {
    pub const fn catalog() -> [Self; 3] {
        [FREE_PLAN, PREMIUM_PLAN, AGENCY_PLAN]
    }

    pub fn find(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::catalog()
            .into_iter()
            .find(|plan| plan.id.eq_ignore_ascii_case(id))
    }

    /// Unknown or retired plan ids fall back to the free tier.
    pub fn resolve(id: &PlanId) -> Self {
        Self::find(&id.0).unwrap_or(FREE_PLAN)
    }

    pub fn plan_id(&self) -> PlanId {
        PlanId(self.id.to_string())
    }

    pub fn allows_listing_count(&self, current: usize) -> bool {
        match self.max_listings {
            Some(limit) => current < limit,
            None => true,
        }
    }
}
