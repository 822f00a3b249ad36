use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::info;

use super::domain::{Ad, AdDraft, AdId, AdKind, AdStatus};
use crate::marketplace::accounts::{load_account, require_advertiser, AccessError, UserId};
use crate::marketplace::clock::Clock;
use crate::marketplace::listings::Wilaya;
use crate::marketplace::respond::{json_error, repository_status};
use crate::marketplace::store::{AccountRepository, AdRepository, RepositoryError};

static AD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_ad_id() -> AdId {
    let id = AD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AdId(format!("ad-{id:06}"))
}

/// Advertiser-managed general and service ads.
pub struct AdService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> AdService<S>
where
    S: AccountRepository + AdRepository + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn create(&self, owner: &UserId, draft: AdDraft) -> Result<Ad, AdServiceError> {
        require_advertiser(self.store.as_ref(), owner)?;

        let title = draft.title.trim();
        if title.is_empty() {
            return Err(AdServiceError::Invalid("ad title is required".to_string()));
        }
        let service_category = draft
            .service_category
            .map(|category| category.trim().to_string())
            .filter(|category| !category.is_empty());
        if draft.kind == AdKind::Service && service_category.is_none() {
            return Err(AdServiceError::Invalid(
                "service ads need a service category".to_string(),
            ));
        }
        if let Some(code) = draft.wilaya {
            if Wilaya::from_code(code).is_none() {
                return Err(AdServiceError::Invalid(format!("unknown wilaya code {code}")));
            }
        }

        let now = self.clock.now();
        let ad = Ad {
            id: next_ad_id(),
            owner_id: owner.clone(),
            kind: draft.kind,
            title: title.to_string(),
            body: draft.body.trim().to_string(),
            service_category,
            wilaya: draft.wilaya,
            contact_phone: draft.contact_phone,
            image_url: draft.image_url,
            status: AdStatus::Active,
            created_at: now,
            updated_at: now,
        };
        let stored = self.store.insert_ad(ad)?;
        info!(ad = %stored.id, %owner, "ad created");
        Ok(stored)
    }

    /// Ads of one advertiser. Other viewers only see active ones.
    pub fn owner_ads(
        &self,
        viewer: Option<&UserId>,
        owner: &UserId,
    ) -> Result<Vec<Ad>, AdServiceError> {
        let ads = self.store.ads_by_owner(owner)?;
        if viewer == Some(owner) {
            return Ok(ads);
        }
        Ok(ads
            .into_iter()
            .filter(|ad| ad.status == AdStatus::Active)
            .collect())
    }

    /// Public browse over active ads.
    pub fn browse(
        &self,
        kind: Option<AdKind>,
        wilaya: Option<u8>,
    ) -> Result<Vec<Ad>, AdServiceError> {
        Ok(self
            .store
            .ads()?
            .into_iter()
            .filter(|ad| ad.status == AdStatus::Active)
            .filter(|ad| kind.map_or(true, |kind| ad.kind == kind))
            .filter(|ad| wilaya.map_or(true, |code| ad.wilaya == Some(code)))
            .collect())
    }

    pub fn set_status(
        &self,
        caller: &UserId,
        id: &AdId,
        status: AdStatus,
    ) -> Result<Ad, AdServiceError> {
        let mut ad = self.owned_ad(caller, id)?;
        if ad.status == status {
            return Err(AdServiceError::AlreadyInStatus(status));
        }
        ad.status = status;
        ad.updated_at = self.clock.now();
        self.store.update_ad(ad.clone())?;
        info!(ad = %id, status = %status, "ad status changed");
        Ok(ad)
    }

    /// Ads are the only records that are removed outright.
    pub fn delete(&self, caller: &UserId, id: &AdId) -> Result<Ad, AdServiceError> {
        self.owned_ad(caller, id)?;
        let removed = self.store.delete_ad(id)?;
        info!(ad = %id, %caller, "ad deleted");
        Ok(removed)
    }

    fn owned_ad(&self, caller: &UserId, id: &AdId) -> Result<Ad, AdServiceError> {
        let ad = self.store.fetch_ad(id)?.ok_or(RepositoryError::NotFound)?;
        if &ad.owner_id == caller {
            return Ok(ad);
        }
        if load_account(self.store.as_ref(), caller)?.is_administrator() {
            return Ok(ad);
        }
        Err(AdServiceError::NotOwner)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdServiceError {
    #[error("{0}")]
    Invalid(String),
    #[error("ad is already {0}")]
    AlreadyInStatus(AdStatus),
    #[error("only the advertiser may change this ad")]
    NotOwner,
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AdServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdServiceError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdServiceError::AlreadyInStatus(_) => StatusCode::CONFLICT,
            AdServiceError::NotOwner => StatusCode::FORBIDDEN,
            AdServiceError::Access(error) => error.status(),
            AdServiceError::Repository(error) => repository_status(error),
        }
    }
}

impl IntoResponse for AdServiceError {
    fn into_response(self) -> Response {
        json_error(self.status(), self)
    }
}
