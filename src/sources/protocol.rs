//! Wire protocol spoken to source unit processes
//!
//! Units are external executables. The service talks to them over
//! stdin/stdout with one JSON object per line: a request line down, a reply
//! line back. Three operations exist; `capabilities` is the load handshake,
//! the other two map one-to-one onto the capability interface.
//!
//! Request examples:
//!
//! ```text
//! {"op":"capabilities"}
//! {"op":"initialize","config":"{\"site\":\"...\"}"}
//! {"op":"fetchContent","channelId":null}
//! ```
//!
//! Reply shape: `{"ok":true,...}` on success, `{"ok":false,"error":"..."}`
//! on failure.

use serde::{Deserialize, Serialize};

/// A request line sent to a unit process
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum UnitRequest<'a> {
    /// Load handshake: ask the unit which operations it implements
    Capabilities,
    /// Forward the serialized extra configuration
    Initialize { config: &'a str },
    /// Ask for playlist content
    FetchContent {
        #[serde(rename = "channelId")]
        channel_id: Option<&'a str>,
    },
}

/// A reply line received from a unit process
#[derive(Debug, Deserialize)]
pub struct UnitReply {
    /// Whether the operation succeeded
    pub ok: bool,
    /// Failure cause when `ok` is false
    #[serde(default)]
    pub error: Option<String>,
    /// Operations the unit implements (capabilities reply only)
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Playlist text (fetchContent reply only); absent means no content
    #[serde(default)]
    pub content: Option<String>,
}

impl UnitReply {
    /// Failure cause, with a fallback for replies that omit one
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "unit reported failure without a cause".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_serialize_with_camel_case_ops() {
        let line = serde_json::to_string(&UnitRequest::Capabilities).unwrap();
        assert_eq!(line, r#"{"op":"capabilities"}"#);

        let line = serde_json::to_string(&UnitRequest::FetchContent { channel_id: None }).unwrap();
        assert_eq!(line, r#"{"op":"fetchContent","channelId":null}"#);
    }

    #[test]
    fn replies_tolerate_missing_optional_fields() {
        let reply: UnitReply = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(reply.ok);
        assert!(reply.capabilities.is_empty());
        assert!(reply.content.is_none());

        let reply: UnitReply = serde_json::from_str(r#"{"ok":false}"#).unwrap();
        assert!(reply.error_message().contains("without a cause"));
    }
}
