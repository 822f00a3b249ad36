use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::completion::{AssistantError, CompletionClient, CompletionRequest};
use crate::marketplace::listings::{PropertyKind, SearchFilters, TransactionKind, Wilaya};

const SEARCH_SYSTEM_PROMPT: &str = "You translate real-estate searches for Algeria into JSON. \
Reply with a single JSON object and nothing else. Allowed keys: \
wilaya (code 1-58 or name), transaction (sale|rent), \
kind (apartment|house|villa|land|commercial|office), min_price, max_price (DZD), \
min_rooms, keywords (array of strings). Omit keys the user did not mention.";

/// Wilaya as the model tends to return it: a code or a province name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WilayaHint {
    Code(u8),
    Name(String),
}

#[derive(Debug, Default, Deserialize)]
struct RawFilters {
    #[serde(default)]
    wilaya: Option<WilayaHint>,
    #[serde(default)]
    transaction: Option<TransactionKind>,
    #[serde(default)]
    kind: Option<PropertyKind>,
    #[serde(default)]
    min_price: Option<u64>,
    #[serde(default)]
    max_price: Option<u64>,
    #[serde(default)]
    min_rooms: Option<u8>,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Turns a free-text query into validated [`SearchFilters`].
pub struct SearchTranslator {
    client: Arc<dyn CompletionClient>,
}

impl SearchTranslator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn translate(&self, query: &str) -> Result<SearchFilters, AssistantError> {
        let request = CompletionRequest {
            system: SEARCH_SYSTEM_PROMPT.to_string(),
            prompt: query.trim().to_string(),
            image_urls: Vec::new(),
            max_tokens: 256,
        };
        let reply = self.client.complete(request).await?;
        debug!(reply = %reply, "search completion received");
        parse_filters(&reply)
    }
}

/// Parses a model reply, tolerating markdown code fences and chatter around
/// the JSON object.
pub fn parse_filters(reply: &str) -> Result<SearchFilters, AssistantError> {
    if reply.trim().is_empty() {
        return Err(AssistantError::EmptyCompletion);
    }
    let body = json_object(reply)
        .ok_or_else(|| AssistantError::Unparseable("no JSON object in reply".to_string()))?;
    let raw: RawFilters = serde_json::from_str(body)
        .map_err(|error| AssistantError::Unparseable(error.to_string()))?;

    let wilaya = match raw.wilaya {
        None => None,
        Some(WilayaHint::Code(code)) => Some(code),
        Some(WilayaHint::Name(name)) => match name.trim().parse::<u8>() {
            Ok(code) => Some(code),
            Err(_) => Some(
                Wilaya::find_by_name(&name)
                    .ok_or(AssistantError::UnknownWilayaName(name))?
                    .code,
            ),
        },
    };

    let filters = SearchFilters {
        wilaya,
        transaction: raw.transaction,
        kind: raw.kind,
        min_price: raw.min_price,
        max_price: raw.max_price,
        min_rooms: raw.min_rooms,
        keywords: raw
            .keywords
            .into_iter()
            .map(|keyword| keyword.trim().to_string())
            .filter(|keyword| !keyword.is_empty())
            .collect(),
    };
    filters.validate()?;
    Ok(filters)
}

fn json_object(reply: &str) -> Option<&str> {
    let trimmed = strip_fence(reply.trim());
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (start < end).then(|| &trimmed[start..=end])
}

fn strip_fence(reply: &str) -> &str {
    let Some(rest) = reply.strip_prefix("```") else {
        return reply;
    };
    // the language tag ends at the newline, or at the body on one-line fences
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    }
    .trim();
    body.strip_suffix("```").unwrap_or(body).trim()
}
