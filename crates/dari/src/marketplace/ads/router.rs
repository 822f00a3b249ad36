use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{AdDraft, AdId, AdKind, AdStatus};
use super::service::AdService;
use crate::marketplace::accounts::UserId;
use crate::marketplace::caller::Caller;
use crate::marketplace::store::{AccountRepository, AdRepository};

#[derive(Debug, Deserialize)]
pub(crate) struct BrowseQuery {
    #[serde(default)]
    kind: Option<AdKind>,
    #[serde(default)]
    wilaya: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    status: AdStatus,
}

pub fn ad_router<S>(service: Arc<AdService<S>>) -> Router
where
    S: AccountRepository + AdRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/ads",
            post(create_handler::<S>).get(browse_handler::<S>),
        )
        .route("/api/v1/ads/:ad_id", axum::routing::delete(delete_handler::<S>))
        .route("/api/v1/ads/:ad_id/status", post(status_handler::<S>))
        .route("/api/v1/users/:user_id/ads", get(owner_ads_handler::<S>))
        .with_state(service)
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<AdService<S>>>,
    Caller(owner): Caller,
    Json(draft): Json<AdDraft>,
) -> Response
where
    S: AccountRepository + AdRepository + 'static,
{
    match service.create(&owner, draft) {
        Ok(ad) => (StatusCode::CREATED, Json(ad)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn browse_handler<S>(
    State(service): State<Arc<AdService<S>>>,
    Query(query): Query<BrowseQuery>,
) -> Response
where
    S: AccountRepository + AdRepository + 'static,
{
    match service.browse(query.kind, query.wilaya) {
        Ok(ads) => (StatusCode::OK, Json(ads)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<AdService<S>>>,
    Caller(caller): Caller,
    Path(ad_id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Response
where
    S: AccountRepository + AdRepository + 'static,
{
    match service.set_status(&caller, &AdId(ad_id), change.status) {
        Ok(ad) => (StatusCode::OK, Json(ad)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<AdService<S>>>,
    Caller(caller): Caller,
    Path(ad_id): Path<String>,
) -> Response
where
    S: AccountRepository + AdRepository + 'static,
{
    match service.delete(&caller, &AdId(ad_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn owner_ads_handler<S>(
    State(service): State<Arc<AdService<S>>>,
    viewer: Option<Caller>,
    Path(user_id): Path<String>,
) -> Response
where
    S: AccountRepository + AdRepository + 'static,
{
    let viewer = viewer.map(|Caller(id)| id);
    match service.owner_ads(viewer.as_ref(), &UserId(user_id)) {
        Ok(ads) => (StatusCode::OK, Json(ads)).into_response(),
        Err(error) => error.into_response(),
    }
}
