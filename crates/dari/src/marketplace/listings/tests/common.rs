use std::sync::Arc;

use axum::Router;

pub(super) use crate::marketplace::fixtures::{
    draft, harness, json_request, read_json_body, Harness,
};
use crate::marketplace::listings::{listing_router, ListingService};
use crate::marketplace::store::MemoryStore;

pub(super) fn service(harness: &Harness) -> ListingService<MemoryStore> {
    ListingService::new(harness.store.clone(), harness.clock())
}

pub(super) fn router(harness: &Harness) -> Router {
    listing_router(Arc::new(service(harness)))
}
