use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{info, warn};

use super::completion::{AssistantError, CompletionClient};
use super::description::DescriptionWriter;
use super::search::SearchTranslator;
use crate::marketplace::accounts::{load_account, AccessError, UserId};
use crate::marketplace::clock::Clock;
use crate::marketplace::listings::{Property, PropertyId, PropertyStatus, SearchFilters};
use crate::marketplace::respond::{json_error, repository_status};
use crate::marketplace::store::{AccountRepository, ListingRepository, RepositoryError};

#[derive(Debug, Clone, Serialize)]
pub struct AssistedSearch {
    pub filters: SearchFilters,
    pub results: Vec<Property>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DescriptionSuggestion {
    pub property_id: PropertyId,
    pub description: String,
    /// Whether the suggestion replaced the stored description.
    pub applied: bool,
}

/// Completion-backed search and listing copywriting.
pub struct AssistantService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    translator: SearchTranslator,
    writer: DescriptionWriter,
}

impl<S> AssistantService<S>
where
    S: AccountRepository + ListingRepository + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            store,
            clock,
            translator: SearchTranslator::new(client.clone()),
            writer: DescriptionWriter::new(client),
        }
    }

    pub async fn search(&self, query: &str) -> Result<AssistedSearch, AssistantServiceError> {
        if query.trim().is_empty() {
            return Err(AssistantServiceError::Invalid(
                "search query is required".to_string(),
            ));
        }
        let filters = self.translator.translate(query).await?;
        let results = self
            .store
            .properties_with_status(PropertyStatus::Active)?
            .into_iter()
            .filter(|property| filters.matches(property))
            .collect::<Vec<_>>();
        info!(matches = results.len(), "assistant search answered");
        Ok(AssistedSearch { filters, results })
    }

    /// Suggests a new description for the owner's listing; `apply` stores it.
    pub async fn improve_description(
        &self,
        owner: &UserId,
        id: &PropertyId,
        apply: bool,
    ) -> Result<DescriptionSuggestion, AssistantServiceError> {
        load_account(self.store.as_ref(), owner)?;
        let property = self
            .store
            .fetch_property(id)?
            .ok_or(RepositoryError::NotFound)?;
        if &property.owner_id != owner {
            return Err(AssistantServiceError::NotOwner);
        }

        let description = self.writer.improve(&property).await?;
        if apply {
            let expected = property.version;
            let mut updated = property;
            updated.description = description.clone();
            updated.version += 1;
            updated.updated_at = self.clock.now();
            self.store
                .update_property(updated, expected)
                .map_err(|error| {
                    warn!(property = %id, %error, "generated description not stored");
                    error
                })?;
            info!(property = %id, "generated description applied");
        }

        Ok(DescriptionSuggestion {
            property_id: id.clone(),
            description,
            applied: apply,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantServiceError {
    #[error("{0}")]
    Invalid(String),
    #[error("only the owner may rewrite this listing")]
    NotOwner,
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AssistantServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            AssistantServiceError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AssistantServiceError::NotOwner => StatusCode::FORBIDDEN,
            AssistantServiceError::Assistant(error) => error.status(),
            AssistantServiceError::Access(error) => error.status(),
            AssistantServiceError::Repository(error) => repository_status(error),
        }
    }
}

impl IntoResponse for AssistantServiceError {
    fn into_response(self) -> Response {
        json_error(self.status(), self)
    }
}
