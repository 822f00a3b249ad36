use crate::infra::{AppState, Services};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use dari::marketplace::accounts::account_router;
use dari::marketplace::ads::ad_router;
use dari::marketplace::assistant::assistant_router;
use dari::marketplace::listings::listing_router;
use dari::marketplace::media::media_router;
use dari::marketplace::moderation::moderation_router;
use dari::marketplace::MarketplaceStore;
use serde_json::json;

pub(crate) fn with_marketplace_routes<S>(services: Services<S>) -> Router
where
    S: MarketplaceStore + 'static,
{
    let Services {
        accounts,
        listings,
        moderation,
        ads,
        media,
        assistant,
    } = services;

    Router::new()
        .merge(account_router(accounts))
        .merge(listing_router(listings))
        .merge(media_router(media))
        .merge(moderation_router(moderation))
        .merge(ad_router(ads))
        .merge(assistant_router(assistant))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
