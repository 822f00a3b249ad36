use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{
    AppealId, AppealResolution, AppealStatus, AppealSubmission, IssueId, IssueStatus,
    IssueSubmission, IssueUpdate, ReportId, ReportResolution, ReportStatus, ReportSubmission,
};
use super::service::ModerationService;
use crate::marketplace::accounts::{TrustLevel, UserId};
use crate::marketplace::caller::Caller;
use crate::marketplace::listings::{PropertyId, StatusAction};
use crate::marketplace::store::MarketplaceStore;

#[derive(Debug, Deserialize)]
pub(crate) struct StatusQuery<T> {
    status: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrustUpdate {
    trust_level: TrustLevel,
}

/// User submissions plus the admin moderation console.
pub fn moderation_router<S>(service: Arc<ModerationService<S>>) -> Router
where
    S: MarketplaceStore + 'static,
{
    Router::new()
        .route("/api/v1/reports", post(submit_report_handler::<S>))
        .route("/api/v1/appeals", post(submit_appeal_handler::<S>))
        .route("/api/v1/issues", post(submit_issue_handler::<S>))
        .route("/api/v1/admin/reports", get(reports_handler::<S>))
        .route(
            "/api/v1/admin/reports/:report_id/review",
            post(review_report_handler::<S>),
        )
        .route(
            "/api/v1/admin/reports/:report_id/resolve",
            post(resolve_report_handler::<S>),
        )
        .route("/api/v1/admin/exports/reports", get(export_handler::<S>))
        .route("/api/v1/admin/appeals", get(appeals_handler::<S>))
        .route(
            "/api/v1/admin/appeals/:appeal_id/review",
            post(review_appeal_handler::<S>),
        )
        .route(
            "/api/v1/admin/appeals/:appeal_id/resolve",
            post(resolve_appeal_handler::<S>),
        )
        .route("/api/v1/admin/issues", get(issues_handler::<S>))
        .route(
            "/api/v1/admin/issues/:issue_id/status",
            post(issue_status_handler::<S>),
        )
        .route(
            "/api/v1/admin/users/:user_id/trust",
            put(trust_handler::<S>),
        )
        .route(
            "/api/v1/admin/pending-listings",
            get(pending_listings_handler::<S>),
        )
        .route(
            "/api/v1/admin/listings/:property_id/status",
            post(moderate_listing_handler::<S>),
        )
        .route("/api/v1/admin/stats", get(stats_handler::<S>))
        .with_state(service)
}

type Service<S> = State<Arc<ModerationService<S>>>;

pub(crate) async fn submit_report_handler<S>(
    State(service): Service<S>,
    Caller(reporter): Caller,
    Json(submission): Json<ReportSubmission>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.submit_report(&reporter, submission) {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn submit_appeal_handler<S>(
    State(service): Service<S>,
    Caller(owner): Caller,
    Json(submission): Json<AppealSubmission>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.submit_appeal(&owner, submission) {
        Ok(appeal) => (StatusCode::CREATED, Json(appeal)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn submit_issue_handler<S>(
    State(service): Service<S>,
    Caller(user): Caller,
    Json(submission): Json<IssueSubmission>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.submit_issue(&user, submission) {
        Ok(issue) => (StatusCode::CREATED, Json(issue)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn reports_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
    Query(query): Query<StatusQuery<ReportStatus>>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.reports(&admin, query.status) {
        Ok(reports) => (StatusCode::OK, Json(reports)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn review_report_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
    Path(report_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.start_report_review(&admin, &ReportId(report_id)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn resolve_report_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
    Path(report_id): Path<String>,
    Json(resolution): Json<ReportResolution>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.resolve_report(&admin, &ReportId(report_id), resolution) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn export_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
    Query(query): Query<StatusQuery<ReportStatus>>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.export_reports_csv(&admin, query.status) {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"reports.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn appeals_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
    Query(query): Query<StatusQuery<AppealStatus>>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.appeals(&admin, query.status) {
        Ok(appeals) => (StatusCode::OK, Json(appeals)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn review_appeal_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
    Path(appeal_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.start_appeal_review(&admin, &AppealId(appeal_id)) {
        Ok(appeal) => (StatusCode::OK, Json(appeal)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn resolve_appeal_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
    Path(appeal_id): Path<String>,
    Json(resolution): Json<AppealResolution>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.resolve_appeal(&admin, &AppealId(appeal_id), resolution) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn issues_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
    Query(query): Query<StatusQuery<IssueStatus>>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.issues(&admin, query.status) {
        Ok(issues) => (StatusCode::OK, Json(issues)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn issue_status_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
    Path(issue_id): Path<String>,
    Json(update): Json<IssueUpdate>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.update_issue(&admin, &IssueId(issue_id), update) {
        Ok(issue) => (StatusCode::OK, Json(issue)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn trust_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
    Path(user_id): Path<String>,
    Json(update): Json<TrustUpdate>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.set_trust_level(&admin, &UserId(user_id), update.trust_level) {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn pending_listings_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.pending_listings(&admin) {
        Ok(listings) => (StatusCode::OK, Json(listings)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn moderate_listing_handler<S>(
    State(service): Service<S>,
    Caller(admin): Caller,
    Path(property_id): Path<String>,
    Json(action): Json<StatusAction>,
) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.moderate_listing(&admin, &PropertyId(property_id), action) {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn stats_handler<S>(State(service): Service<S>, Caller(admin): Caller) -> Response
where
    S: MarketplaceStore + 'static,
{
    match service.stats(&admin) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => error.into_response(),
    }
}
