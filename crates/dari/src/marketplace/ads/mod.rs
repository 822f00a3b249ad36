//! General and service ads published by advertisers.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{Ad, AdDraft, AdId, AdKind, AdStatus};
pub use router::ad_router;
pub use service::{AdService, AdServiceError};
