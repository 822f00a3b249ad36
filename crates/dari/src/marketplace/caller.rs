use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use super::accounts::UserId;
use super::respond::json_error;

/// Header set by the upstream authentication gateway for every signed-in request.
pub const CALLER_HEADER: &str = "x-user-id";

/// Request arrived without an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request is missing the authenticated caller")]
pub struct MissingCaller;

impl IntoResponse for MissingCaller {
    fn into_response(self) -> Response {
        json_error(StatusCode::UNAUTHORIZED, self)
    }
}

pub fn caller_id(headers: &HeaderMap) -> Result<UserId, MissingCaller> {
    headers
        .get(CALLER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| UserId(value.to_string()))
        .ok_or(MissingCaller)
}

/// Extractor for the signed-in user; rejects with 401 when the header is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = MissingCaller;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_id(&parts.headers).map(Caller)
    }
}
