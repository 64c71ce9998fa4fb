//! Live-reload message protocol.
//!
//! Each message is one WebSocket text frame carrying a JSON object:
//!
//! ```json
//! {"type":"connected"}
//! {"type":"reload","reason":"shop/invoice"}
//! ```

use serde::{Deserialize, Serialize};

/// Message sent to browser clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Connection established
    Connected,

    /// Reload the preview
    Reload { reason: String },
}

impl ReloadMessage {
    pub fn reload(reason: &str) -> Self {
        Self::Reload {
            reason: reason.to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}
