use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use super::domain::{Property, PropertyDraft, PropertyId, PropertyStatus};
use super::lifecycle::{self, Actor, StatusAction, TransitionError};
use super::search::{SearchFilterError, SearchFilters};
use crate::marketplace::accounts::{load_account, AccessError, SubscriptionPlan, UserId};
use crate::marketplace::clock::Clock;
use crate::marketplace::moderation::trust::initial_listing_status;
use crate::marketplace::respond::{json_error, repository_status, transition_status};
use crate::marketplace::store::{AccountRepository, ListingRepository, RepositoryError};

static PROPERTY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_property_id() -> PropertyId {
    let id = PROPERTY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PropertyId(format!("prop-{id:06}"))
}

/// Owner-facing listing operations and public browsing.
pub struct ListingService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> ListingService<S>
where
    S: AccountRepository + ListingRepository + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Creates a listing. The owner's trust level decides whether it goes live
    /// immediately, waits for review, or is refused.
    pub fn create(
        &self,
        owner: &UserId,
        draft: PropertyDraft,
    ) -> Result<Property, ListingServiceError> {
        let account = load_account(self.store.as_ref(), owner)?;
        draft.validate().map_err(ListingServiceError::Invalid)?;

        let status = initial_listing_status(account.trust_level).ok_or_else(|| {
            warn!(%owner, "blacklisted owner attempted to publish");
            ListingServiceError::Blacklisted
        })?;

        let plan = SubscriptionPlan::resolve(&account.plan_id);
        let live = self
            .store
            .properties_by_owner(owner)?
            .into_iter()
            .filter(|property| property.status != PropertyStatus::Deleted)
            .count();
        if !plan.allows_listing_count(live) {
            return Err(ListingServiceError::QuotaExceeded {
                plan: plan.name,
                limit: plan.max_listings.unwrap_or(live),
            });
        }

        let now = self.clock.now();
        let property = Property {
            id: next_property_id(),
            owner_id: owner.clone(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            wilaya: draft.wilaya,
            commune: draft
                .commune
                .map(|commune| commune.trim().to_string())
                .filter(|commune| !commune.is_empty()),
            transaction: draft.transaction,
            kind: draft.kind,
            price: draft.price,
            surface_m2: draft.surface_m2,
            rooms: draft.rooms,
            image_urls: Vec::new(),
            video_url: None,
            status,
            archival_reason: None,
            deletion_reason: None,
            moderation_hold: status == PropertyStatus::Pending,
            view_count: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.insert_property(property)?;
        info!(property = %stored.id, %owner, status = %stored.status, "listing created");
        Ok(stored)
    }

    /// Fetches a listing for display. Inactive listings are only visible to
    /// their owner and administrators; other viewers bump the view counter.
    pub fn view(
        &self,
        viewer: Option<&UserId>,
        id: &PropertyId,
    ) -> Result<Property, ListingServiceError> {
        let mut property = self
            .store
            .fetch_property(id)?
            .ok_or(RepositoryError::NotFound)?;

        let is_owner = viewer.is_some_and(|viewer| viewer == &property.owner_id);
        if property.status != PropertyStatus::Active {
            if is_owner || self.is_admin(viewer)? {
                return Ok(property);
            }
            return Err(RepositoryError::NotFound.into());
        }

        if !is_owner {
            property.view_count = self.store.record_view(id)?;
        }
        Ok(property)
    }

    /// Listings of `owner`, newest first. Other viewers only see active ones.
    pub fn owner_listings(
        &self,
        viewer: Option<&UserId>,
        owner: &UserId,
    ) -> Result<Vec<Property>, ListingServiceError> {
        let listings = self.store.properties_by_owner(owner)?;
        if viewer == Some(owner) || self.is_admin(viewer)? {
            return Ok(listings);
        }
        Ok(listings
            .into_iter()
            .filter(|property| property.status == PropertyStatus::Active)
            .collect())
    }

    /// Active listings matching `filters`, newest first.
    pub fn search(&self, filters: &SearchFilters) -> Result<Vec<Property>, ListingServiceError> {
        filters.validate()?;
        Ok(self
            .store
            .properties_with_status(PropertyStatus::Active)?
            .into_iter()
            .filter(|property| filters.matches(property))
            .collect())
    }

    /// Owner-driven archive, delete, or reactivate.
    pub fn change_status(
        &self,
        owner: &UserId,
        id: &PropertyId,
        action: StatusAction,
    ) -> Result<Property, ListingServiceError> {
        let mut property = self
            .store
            .fetch_property(id)?
            .ok_or(RepositoryError::NotFound)?;
        if &property.owner_id != owner {
            return Err(ListingServiceError::NotOwner);
        }

        let expected = property.version;
        let transition = lifecycle::apply(&mut property, &action, Actor::Owner, self.clock.now())?;
        self.store
            .update_property(property.clone(), expected)
            .map_err(|error| {
                warn!(property = %id, %error, "owner status change rejected by store");
                error
            })?;

        info!(
            property = %id,
            %owner,
            from = %transition.from,
            to = %transition.to,
            "owner changed listing status"
        );
        Ok(property)
    }

    fn is_admin(&self, viewer: Option<&UserId>) -> Result<bool, RepositoryError> {
        let Some(viewer) = viewer else {
            return Ok(false);
        };
        Ok(self
            .store
            .fetch_user(viewer)?
            .is_some_and(|account| account.is_administrator()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListingServiceError {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Search(#[from] SearchFilterError),
    #[error("blacklisted accounts cannot publish listings")]
    Blacklisted,
    #[error("the {plan} plan allows at most {limit} listings")]
    QuotaExceeded { plan: &'static str, limit: usize },
    #[error("only the owner may change this listing")]
    NotOwner,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ListingServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ListingServiceError::Invalid(_) | ListingServiceError::Search(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ListingServiceError::Blacklisted
            | ListingServiceError::QuotaExceeded { .. }
            | ListingServiceError::NotOwner => StatusCode::FORBIDDEN,
            ListingServiceError::Transition(error) => transition_status(error),
            ListingServiceError::Access(error) => error.status(),
            ListingServiceError::Repository(error) => repository_status(error),
        }
    }
}

impl IntoResponse for ListingServiceError {
    fn into_response(self) -> Response {
        json_error(self.status(), self)
    }
}
