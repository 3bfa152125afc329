// src/delivery/payload.rs

use serde::Serialize;
use tracing::warn;

use crate::logging::truncate_for_log;
use crate::types::RelayEvent;

/// JSON body POSTed for every event.
///
/// ```json
/// {"steamid64": "...", "type": "player", "event": "add-dino-data", "data": "{...}"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPayload {
    #[serde(rename = "steamid64")]
    pub subject: String,
    #[serde(rename = "type")]
    pub category: String,
    pub event: &'static str,
    /// Always a syntactically valid JSON document, carried as a string.
    pub data: String,
}

impl EventPayload {
    pub fn from_event(event: &RelayEvent, category: &str) -> Self {
        Self {
            subject: event.subject.clone(),
            category: category.to_string(),
            event: event.kind.wire_name(),
            data: normalize_data(&event.content),
        }
    }
}

/// Make `content` safe to ship as the `data` field.
///
/// - empty or whitespace-only content becomes `{}`
/// - valid JSON is passed through untouched
/// - anything else is encoded as a JSON string literal
///
/// The result always parses as JSON, and normalizing it again is a no-op.
pub fn normalize_data(content: &str) -> String {
    if content.trim().is_empty() {
        return "{}".to_string();
    }

    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(_) => content.to_string(),
        Err(e) => {
            warn!(
                error = %e,
                data = %truncate_for_log(content),
                "data is not valid JSON, wrapping as string"
            );
            // Serializing a &str cannot fail.
            serde_json::to_string(content).unwrap_or_else(|_| "{}".to_string())
        }
    }
}
