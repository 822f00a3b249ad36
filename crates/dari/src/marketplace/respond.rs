use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::listings::TransitionError;
use super::store::RepositoryError;

/// `{"error": ...}` body shared by every marketplace router.
pub(crate) fn json_error(status: StatusCode, message: impl Display) -> Response {
    let payload = json!({
        "error": message.to_string(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) fn repository_status(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict
        | RepositoryError::StaleVersion { .. }
        | RepositoryError::Superseded => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn transition_status(error: &TransitionError) -> StatusCode {
    match error {
        TransitionError::Invalid { .. } => StatusCode::CONFLICT,
        TransitionError::MissingReason { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TransitionError::NotPermitted { .. } => StatusCode::FORBIDDEN,
    }
}
