//! Completion-backed natural-language search and description writing.
//!
//! The model sits behind [`CompletionClient`]. Servers without a configured
//! backend use [`DisabledCompletionClient`], which answers 503 on every call.

pub mod completion;
pub mod description;
pub mod router;
pub mod search;
pub mod service;


pub use completion::{
    AssistantError, CompletionClient, CompletionRequest, DisabledCompletionClient,
    FixedCompletionClient,
};
pub use description::DescriptionWriter;
pub use router::assistant_router;
pub use search::{parse_filters, SearchTranslator};
pub use service::{AssistantService, AssistantServiceError, AssistedSearch, DescriptionSuggestion};
