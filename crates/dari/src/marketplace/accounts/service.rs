use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::info;

use super::access::{require_admin, AccessError};
use super::domain::{Registration, Role, TrustLevel, UserAccount, UserId};
use super::plans::{SubscriptionPlan, FREE_PLAN};
use crate::marketplace::clock::Clock;
use crate::marketplace::respond::{json_error, repository_status};
use crate::marketplace::store::{AccountRepository, RepositoryError};

/// Profile registration, lookup, and plan assignment.
pub struct AccountService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> AccountService<S>
where
    S: AccountRepository + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Creates the marketplace profile for a freshly authenticated user on the free plan.
    pub fn register(
        &self,
        caller: &UserId,
        registration: Registration,
    ) -> Result<UserAccount, AccountServiceError> {
        let display_name = registration.display_name.trim();
        if display_name.is_empty() {
            return Err(AccountServiceError::Invalid(
                "display name is required".to_string(),
            ));
        }
        let email = registration.email.trim();
        if !email.contains('@') {
            return Err(AccountServiceError::Invalid(format!(
                "`{email}` is not an email address"
            )));
        }

        let roles = if registration.advertiser {
            vec![Role::Advertiser]
        } else {
            Vec::new()
        };

        let account = UserAccount {
            id: caller.clone(),
            display_name: display_name.to_string(),
            email: email.to_ascii_lowercase(),
            plan_id: FREE_PLAN.plan_id(),
            is_admin: false,
            roles,
            trust_level: TrustLevel::Normal,
            created_at: self.clock.now(),
        };

        let stored = self.store.insert_user(account)?;
        info!(user = %stored.id, "registered marketplace profile");
        Ok(stored)
    }

    pub fn get(&self, id: &UserId) -> Result<UserAccount, AccountServiceError> {
        let account = self
            .store
            .fetch_user(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(account)
    }

    pub fn plans(&self) -> [SubscriptionPlan; 3] {
        SubscriptionPlan::catalog()
    }

    pub fn assign_plan(
        &self,
        admin: &UserId,
        user: &UserId,
        plan: &str,
    ) -> Result<UserAccount, AccountServiceError> {
        require_admin(self.store.as_ref(), admin)?;
        let plan = SubscriptionPlan::find(plan)
            .ok_or_else(|| AccountServiceError::UnknownPlan(plan.trim().to_string()))?;

        let mut account = self.get(user)?;
        account.plan_id = plan.plan_id();
        self.store.update_user(account.clone())?;

        info!(%admin, %user, plan = plan.id, "assigned subscription plan");
        Ok(account)
    }

    /// Ensures `id` exists and carries the admin flag. Used at start-up to seed the first operator.
    pub fn bootstrap_admin(&self, id: &UserId) -> Result<UserAccount, AccountServiceError> {
        let account = match self.store.fetch_user(id)? {
            Some(mut existing) => {
                if !existing.is_admin {
                    existing.is_admin = true;
                    self.store.update_user(existing.clone())?;
                }
                existing
            }
            None => self.store.insert_user(UserAccount {
                id: id.clone(),
                display_name: "Administrator".to_string(),
                email: format!("{id}@admin.local"),
                plan_id: FREE_PLAN.plan_id(),
                is_admin: true,
                roles: vec![Role::Admin],
                trust_level: TrustLevel::Normal,
                created_at: self.clock.now(),
            })?,
        };

        info!(admin = %account.id, "administrator account ready");
        Ok(account)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccountServiceError {
    #[error("{0}")]
    Invalid(String),
    #[error("unknown subscription plan `{0}`")]
    UnknownPlan(String),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AccountServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccountServiceError::Invalid(_) | AccountServiceError::UnknownPlan(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AccountServiceError::Access(error) => error.status(),
            AccountServiceError::Repository(error) => repository_status(error),
        }
    }
}

impl IntoResponse for AccountServiceError {
    fn into_response(self) -> Response {
        json_error(self.status(), self)
    }
}
