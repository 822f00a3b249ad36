//! Marketplace domain: listings, accounts, moderation, ads, media, and the assistant.

pub mod accounts;
pub mod ads;
pub mod assistant;
pub mod caller;
pub mod clock;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod listings;
pub mod media;
pub mod moderation;
mod respond;
pub mod store;

pub use caller::{caller_id, Caller, MissingCaller, CALLER_HEADER};
pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{MarketplaceStore, MemoryStore, RepositoryError};
