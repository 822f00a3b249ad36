use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::service::AssistantService;
use crate::marketplace::caller::Caller;
use crate::marketplace::listings::PropertyId;
use crate::marketplace::store::{AccountRepository, ListingRepository};

#[derive(Debug, Deserialize)]
pub(crate) struct SearchPrompt {
    query: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescriptionOptions {
    #[serde(default)]
    apply: bool,
}

pub fn assistant_router<S>(service: Arc<AssistantService<S>>) -> Router
where
    S: AccountRepository + ListingRepository + 'static,
{
    Router::new()
        .route("/api/v1/assistant/search", post(search_handler::<S>))
        .route(
            "/api/v1/assistant/listings/:property_id/description",
            post(description_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn search_handler<S>(
    State(service): State<Arc<AssistantService<S>>>,
    Json(prompt): Json<SearchPrompt>,
) -> Response
where
    S: AccountRepository + ListingRepository + 'static,
{
    match service.search(&prompt.query).await {
        Ok(found) => (StatusCode::OK, Json(found)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn description_handler<S>(
    State(service): State<Arc<AssistantService<S>>>,
    Caller(owner): Caller,
    Path(property_id): Path<String>,
    options: Option<Json<DescriptionOptions>>,
) -> Response
where
    S: AccountRepository + ListingRepository + 'static,
{
    let apply = options.is_some_and(|Json(options)| options.apply);
    match service
        .improve_description(&owner, &PropertyId(property_id), apply)
        .await
    {
        Ok(suggestion) => (StatusCode::OK, Json(suggestion)).into_response(),
        Err(error) => error.into_response(),
    }
}
