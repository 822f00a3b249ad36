use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use super::storage::{ImageStore, MediaError, MediaFile, VideoArchive};
use crate::marketplace::accounts::{load_account, AccessError, SubscriptionPlan, UserId};
use crate::marketplace::clock::Clock;
use crate::marketplace::listings::{Property, PropertyId, PropertyStatus};
use crate::marketplace::respond::{json_error, repository_status};
use crate::marketplace::store::{AccountRepository, ListingRepository, RepositoryError};

static UPLOAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Distinguishes object keys of concurrent uploads to the same listing.
fn next_upload_batch() -> u64 {
    UPLOAD_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Attaches photos and videos to listings within the owner's plan limits.
pub struct MediaService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    images: Arc<dyn ImageStore>,
    videos: Arc<dyn VideoArchive>,
}

impl<S> MediaService<S>
where
    S: AccountRepository + ListingRepository + 'static,
{
    pub fn new(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        images: Arc<dyn ImageStore>,
        videos: Arc<dyn VideoArchive>,
    ) -> Self {
        Self {
            store,
            clock,
            images,
            videos,
        }
    }

    /// Uploads `files` and appends their public URLs to the listing. Nothing
    /// is uploaded unless every file is an image and the plan has room.
    pub fn attach_images(
        &self,
        owner: &UserId,
        id: &PropertyId,
        files: Vec<MediaFile>,
    ) -> Result<Property, MediaServiceError> {
        let (mut property, plan) = self.editable(owner, id)?;
        if files.is_empty() {
            return Err(MediaServiceError::Invalid("no image files provided".to_string()));
        }
        for file in &files {
            if file.bytes.is_empty() {
                return Err(MediaServiceError::Invalid(format!(
                    "{} is empty",
                    file.file_name
                )));
            }
            if !file.is_image() {
                return Err(MediaServiceError::UnsupportedType {
                    file_name: file.file_name.clone(),
                });
            }
        }
        let total = property.image_urls.len() + files.len();
        if total > plan.max_images_per_listing {
            return Err(MediaServiceError::ImageLimit {
                plan: plan.name,
                limit: plan.max_images_per_listing,
            });
        }

        let offset = property.image_urls.len();
        let batch = next_upload_batch();
        let mut uploaded = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            let key = format!(
                "properties/{}/{batch:06}-{:02}-{}",
                property.id,
                offset + index + 1,
                file.safe_name()
            );
            match self.images.store_image(&key, file) {
                Ok(url) => {
                    property.image_urls.push(url);
                    uploaded.push(key);
                }
                Err(error) => {
                    self.discard_images(&uploaded);
                    return Err(error.into());
                }
            }
        }

        let added = files.len();
        match self.save(property, "images") {
            Ok(saved) => {
                info!(property = %saved.id, added, "listing images attached");
                Ok(saved)
            }
            Err(error) => {
                self.discard_images(&uploaded);
                Err(error)
            }
        }
    }

    /// Archives a walkthrough video and points the listing at its download
    /// URL. Replaces any earlier video.
    pub fn attach_video(
        &self,
        owner: &UserId,
        id: &PropertyId,
        file: MediaFile,
    ) -> Result<Property, MediaServiceError> {
        let (mut property, plan) = self.editable(owner, id)?;
        if !plan.video_allowed {
            return Err(MediaServiceError::VideoNotAllowed { plan: plan.name });
        }
        if file.bytes.is_empty() {
            return Err(MediaServiceError::Invalid(format!(
                "{} is empty",
                file.file_name
            )));
        }
        if !file.is_video() {
            return Err(MediaServiceError::UnsupportedType {
                file_name: file.file_name,
            });
        }

        let identifier = format!("dari-{}", property.id);
        let url = self.videos.put_video(&identifier, &file)?;
        property.video_url = Some(url);
        self.save(property, "video")
            .inspect(|saved| info!(property = %saved.id, "listing video attached"))
    }

    fn editable(
        &self,
        owner: &UserId,
        id: &PropertyId,
    ) -> Result<(Property, SubscriptionPlan), MediaServiceError> {
        let account = load_account(self.store.as_ref(), owner)?;
        let property = self
            .store
            .fetch_property(id)?
            .ok_or(RepositoryError::NotFound)?;
        if property.owner_id != account.id {
            return Err(MediaServiceError::NotOwner);
        }
        if property.status == PropertyStatus::Deleted {
            return Err(MediaServiceError::ListingDeleted);
        }
        Ok((property, SubscriptionPlan::resolve(&account.plan_id)))
    }

    fn discard_images(&self, keys: &[String]) {
        for key in keys {
            if let Err(error) = self.images.remove_image(key) {
                warn!(%key, %error, "orphaned listing image left in storage");
            }
        }
    }

    fn save(&self, mut property: Property, what: &str) -> Result<Property, MediaServiceError> {
        let expected = property.version;
        property.version += 1;
        property.updated_at = self.clock.now();
        self.store
            .update_property(property.clone(), expected)
            .map_err(|error| {
                warn!(property = %property.id, %error, media = what, "media update rejected by store");
                error
            })?;
        Ok(property)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaServiceError {
    #[error("{0}")]
    Invalid(String),
    #[error("{file_name} is not a supported media type")]
    UnsupportedType { file_name: String },
    #[error("the {plan} plan allows at most {limit} images per listing")]
    ImageLimit { plan: &'static str, limit: usize },
    #[error("the {plan} plan does not include video")]
    VideoNotAllowed { plan: &'static str },
    #[error("only the owner may attach media to this listing")]
    NotOwner,
    #[error("deleted listings cannot take new media")]
    ListingDeleted,
    #[error(transparent)]
    Storage(#[from] MediaError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl MediaServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            MediaServiceError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MediaServiceError::UnsupportedType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            MediaServiceError::ImageLimit { .. }
            | MediaServiceError::VideoNotAllowed { .. }
            | MediaServiceError::NotOwner => StatusCode::FORBIDDEN,
            MediaServiceError::ListingDeleted => StatusCode::CONFLICT,
            MediaServiceError::Storage(MediaError::Rejected { .. }) => StatusCode::BAD_GATEWAY,
            MediaServiceError::Storage(MediaError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            MediaServiceError::Access(error) => error.status(),
            MediaServiceError::Repository(error) => repository_status(error),
        }
    }
}

impl IntoResponse for MediaServiceError {
    fn into_response(self) -> Response {
        json_error(self.status(), self)
    }
}
