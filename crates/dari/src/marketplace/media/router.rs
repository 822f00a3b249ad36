use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::debug;

use super::service::{MediaService, MediaServiceError};
use super::storage::MediaFile;
use crate::marketplace::caller::Caller;
use crate::marketplace::listings::PropertyId;
use crate::marketplace::store::{AccountRepository, ListingRepository};

const UPLOAD_LIMIT_BYTES: usize = 64 * 1024 * 1024;

pub fn media_router<S>(service: Arc<MediaService<S>>) -> Router
where
    S: AccountRepository + ListingRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings/:property_id/images",
            post(images_handler::<S>),
        )
        .route(
            "/api/v1/listings/:property_id/video",
            post(video_handler::<S>),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .with_state(service)
}

async fn read_files(mut multipart: Multipart) -> Result<Vec<MediaFile>, MediaServiceError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| MediaServiceError::Invalid(format!("malformed upload: {error}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!(field = ?field.name(), "skipping non-file form field");
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|error| MediaServiceError::Invalid(format!("failed to read {file_name}: {error}")))?;
        files.push(MediaFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Ok(files)
}

pub(crate) async fn images_handler<S>(
    State(service): State<Arc<MediaService<S>>>,
    Caller(owner): Caller,
    Path(property_id): Path<String>,
    multipart: Multipart,
) -> Response
where
    S: AccountRepository + ListingRepository + 'static,
{
    let result = read_files(multipart)
        .await
        .and_then(|files| service.attach_images(&owner, &PropertyId(property_id), files));
    match result {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn video_handler<S>(
    State(service): State<Arc<MediaService<S>>>,
    Caller(owner): Caller,
    Path(property_id): Path<String>,
    multipart: Multipart,
) -> Response
where
    S: AccountRepository + ListingRepository + 'static,
{
    let result = read_files(multipart).await.and_then(|files| {
        let mut files = files.into_iter();
        match (files.next(), files.next()) {
            (Some(file), None) => service.attach_video(&owner, &PropertyId(property_id), file),
            (None, _) => Err(MediaServiceError::Invalid("no video file provided".to_string())),
            (Some(_), Some(_)) => Err(MediaServiceError::Invalid(
                "upload exactly one video file".to_string(),
            )),
        }
    });
    match result {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error.into_response(),
    }
}
