use std::fmt::Write as _;
use std::sync::Arc;

use super::completion::{AssistantError, CompletionClient, CompletionRequest};
use crate::marketplace::listings::Property;

const DESCRIPTION_SYSTEM_PROMPT: &str = "You write listing descriptions for an Algerian \
real-estate marketplace. Use the facts and photos provided, keep the owner's details, \
and answer with the description text only.";

/// Rewrites a listing description from its facts and photos.
pub struct DescriptionWriter {
    client: Arc<dyn CompletionClient>,
}

impl DescriptionWriter {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn improve(&self, property: &Property) -> Result<String, AssistantError> {
        let request = CompletionRequest {
            system: DESCRIPTION_SYSTEM_PROMPT.to_string(),
            prompt: describe(property),
            image_urls: property.image_urls.clone(),
            max_tokens: 600,
        };
        let reply = self.client.complete(request).await?;
        clean_reply(&reply).ok_or(AssistantError::EmptyCompletion)
    }
}

fn describe(property: &Property) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Title: {}", property.title);
    let _ = writeln!(prompt, "Type: {:?} for {:?}", property.kind, property.transaction);
    match property.wilaya_name() {
        Some(name) => {
            let _ = writeln!(prompt, "Wilaya: {name} ({:02})", property.wilaya);
        }
        None => {
            let _ = writeln!(prompt, "Wilaya: {:02}", property.wilaya);
        }
    }
    if let Some(commune) = &property.commune {
        let _ = writeln!(prompt, "Commune: {commune}");
    }
    let _ = writeln!(prompt, "Price: {} DZD", property.price);
    if let Some(surface) = property.surface_m2 {
        let _ = writeln!(prompt, "Surface: {surface} m2");
    }
    if let Some(rooms) = property.rooms {
        let _ = writeln!(prompt, "Rooms: {rooms}");
    }
    let _ = writeln!(prompt, "Photos attached: {}", property.image_urls.len());
    let _ = write!(prompt, "Current description:\n{}", property.description);
    prompt
}

fn clean_reply(reply: &str) -> Option<String> {
    let text = reply
        .trim()
        .trim_matches(|c| c == '"' || c == '\u{201c}' || c == '\u{201d}')
        .trim();
    (!text.is_empty()).then(|| text.to_string())
}
