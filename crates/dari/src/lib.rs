//! Core library for the Dari real-estate marketplace: listing lifecycle,
//! moderation workflows, advertiser ads, media attachment, and the
//! completion-backed assistant.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
