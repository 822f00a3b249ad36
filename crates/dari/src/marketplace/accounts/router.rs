use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{Registration, UserId};
use super::service::AccountService;
use crate::marketplace::caller::Caller;
use crate::marketplace::store::AccountRepository;

#[derive(Debug, Deserialize)]
pub(crate) struct PlanAssignment {
    plan_id: String,
}

/// Profile and subscription endpoints.
pub fn account_router<S>(service: Arc<AccountService<S>>) -> Router
where
    S: AccountRepository + 'static,
{
    Router::new()
        .route("/api/v1/users", post(register_handler::<S>))
        .route("/api/v1/users/:user_id", get(profile_handler::<S>))
        .route("/api/v1/plans", get(plans_handler::<S>))
        .route(
            "/api/v1/admin/users/:user_id/plan",
            put(assign_plan_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn register_handler<S>(
    State(service): State<Arc<AccountService<S>>>,
    Caller(caller): Caller,
    Json(registration): Json<Registration>,
) -> Response
where
    S: AccountRepository + 'static,
{
    match service.register(&caller, registration) {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn profile_handler<S>(
    State(service): State<Arc<AccountService<S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: AccountRepository + 'static,
{
    match service.get(&UserId(user_id)) {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn plans_handler<S>(State(service): State<Arc<AccountService<S>>>) -> Response
where
    S: AccountRepository + 'static,
{
    (StatusCode::OK, Json(service.plans())).into_response()
}

pub(crate) async fn assign_plan_handler<S>(
    State(service): State<Arc<AccountService<S>>>,
    Caller(admin): Caller,
    Path(user_id): Path<String>,
    Json(body): Json<PlanAssignment>,
) -> Response
where
    S: AccountRepository + 'static,
{
    match service.assign_plan(&admin, &UserId(user_id), &body.plan_id) {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(error) => error.into_response(),
    }
}
