use async_trait::async_trait;
use axum::http::StatusCode;
use serde::Serialize;

use crate::marketplace::listings::SearchFilterError;

/// One prompt sent to the generative model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    /// Images the model may look at alongside the prompt.
    pub image_urls: Vec<String>,
    pub max_tokens: u32,
}

/// Text generation backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AssistantError>;
}

/// Client used when no model is configured. Every call reports the assistant
/// as unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCompletionClient;

#[async_trait]
impl CompletionClient for DisabledCompletionClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, AssistantError> {
        Err(AssistantError::Unavailable(
            "no completion backend configured".to_string(),
        ))
    }
}

/// Replies with the same canned text to every prompt.
#[derive(Debug, Clone)]
pub struct FixedCompletionClient {
    reply: String,
}

impl FixedCompletionClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for FixedCompletionClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, AssistantError> {
        Ok(self.reply.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("assistant unavailable: {0}")]
    Unavailable(String),
    #[error("the assistant returned an empty answer")]
    EmptyCompletion,
    #[error("could not read the assistant's filters: {0}")]
    Unparseable(String),
    #[error("unknown wilaya {0:?}")]
    UnknownWilayaName(String),
    #[error(transparent)]
    InvalidFilters(#[from] SearchFilterError),
}

impl AssistantError {
    pub fn status(&self) -> StatusCode {
        match self {
            AssistantError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AssistantError::EmptyCompletion | AssistantError::Unparseable(_) => {
                StatusCode::BAD_GATEWAY
            }
            AssistantError::UnknownWilayaName(_) | AssistantError::InvalidFilters(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }
}
