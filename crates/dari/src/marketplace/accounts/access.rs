use axum::http::StatusCode;

use super::domain::{UserAccount, UserId};
use crate::marketplace::respond::repository_status;
use crate::marketplace::store::{AccountRepository, RepositoryError};

/// Caller could not be authorised for the requested operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("user {0} has no marketplace profile")]
    UnknownUser(UserId),
    #[error("administrator access required")]
    AdminRequired,
    #[error("advertiser access required")]
    AdvertiserRequired,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AccessError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::UnknownUser(_)
            | AccessError::AdminRequired
            | AccessError::AdvertiserRequired => StatusCode::FORBIDDEN,
            AccessError::Repository(error) => repository_status(error),
        }
    }
}

pub fn load_account<S>(store: &S, id: &UserId) -> Result<UserAccount, AccessError>
where
    S: AccountRepository + ?Sized,
{
    store
        .fetch_user(id)?
        .ok_or_else(|| AccessError::UnknownUser(id.clone()))
}

pub fn require_admin<S>(store: &S, id: &UserId) -> Result<UserAccount, AccessError>
where
    S: AccountRepository + ?Sized,
{
    let account = load_account(store, id)?;
    if account.is_administrator() {
        Ok(account)
    } else {
        Err(AccessError::AdminRequired)
    }
}

pub fn require_advertiser<S>(store: &S, id: &UserId) -> Result<UserAccount, AccessError>
where
    S: AccountRepository + ?Sized,
{
    let account = load_account(store, id)?;
    if account.is_advertiser() {
        Ok(account)
    } else {
        Err(AccessError::AdvertiserRequired)
    }
}
