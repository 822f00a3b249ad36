use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::domain::{PropertyDraft, PropertyId};
use super::lifecycle::StatusAction;
use super::search::SearchFilters;
use super::service::ListingService;
use crate::marketplace::accounts::UserId;
use crate::marketplace::caller::Caller;
use crate::marketplace::store::{AccountRepository, ListingRepository};

/// Listing creation, browsing, search, and owner status changes.
pub fn listing_router<S>(service: Arc<ListingService<S>>) -> Router
where
    S: AccountRepository + ListingRepository + 'static,
{
    Router::new()
        .route("/api/v1/listings", post(create_handler::<S>))
        .route("/api/v1/listings/:property_id", get(view_handler::<S>))
        .route(
            "/api/v1/listings/:property_id/status",
            post(status_handler::<S>),
        )
        .route("/api/v1/search", post(search_handler::<S>))
        .route(
            "/api/v1/users/:user_id/listings",
            get(owner_listings_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    Caller(owner): Caller,
    Json(draft): Json<PropertyDraft>,
) -> Response
where
    S: AccountRepository + ListingRepository + 'static,
{
    match service.create(&owner, draft) {
        Ok(property) => (StatusCode::CREATED, Json(property)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn view_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    viewer: Option<Caller>,
    Path(property_id): Path<String>,
) -> Response
where
    S: AccountRepository + ListingRepository + 'static,
{
    let viewer = viewer.map(|Caller(id)| id);
    match service.view(viewer.as_ref(), &PropertyId(property_id)) {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    Caller(owner): Caller,
    Path(property_id): Path<String>,
    Json(action): Json<StatusAction>,
) -> Response
where
    S: AccountRepository + ListingRepository + 'static,
{
    match service.change_status(&owner, &PropertyId(property_id), action) {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn search_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    Json(filters): Json<SearchFilters>,
) -> Response
where
    S: AccountRepository + ListingRepository + 'static,
{
    match service.search(&filters) {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn owner_listings_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    viewer: Option<Caller>,
    Path(user_id): Path<String>,
) -> Response
where
    S: AccountRepository + ListingRepository + 'static,
{
    let viewer = viewer.map(|Caller(id)| id);
    match service.owner_listings(viewer.as_ref(), &UserId(user_id)) {
        Ok(listings) => (StatusCode::OK, Json(listings)).into_response(),
        Err(error) => error.into_response(),
    }
}
