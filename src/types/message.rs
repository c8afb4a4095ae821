use serde::{Deserialize, Serialize};

/// A single inbound or outbound message unit, classified by event name.
///
/// Payload shapes are opaque to the link; only routing by name matters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }

    /// A frame with an empty object payload (liveness probes).
    pub fn empty(event: impl Into<String>) -> Self {
        Self::new(event, serde_json::json!({}))
    }
}
