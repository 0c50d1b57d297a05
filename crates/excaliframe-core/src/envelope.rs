//! Drawing envelopes and stored playground records.
//!
//! The envelope is the only shape hosts ever see. Its `data` payload belongs to
//! the tool named in `tool`; nothing in this crate parses it.

use crate::tool::ToolKind;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current envelope schema version.
pub const ENVELOPE_VERSION: u32 = 1;

/// Title given to drawings that have not been named yet.
pub const DEFAULT_TITLE: &str = "Untitled Drawing";

/// Current time as an ISO-8601 string with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Generate a fresh drawing identifier.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Tool-agnostic container for one drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingEnvelope {
    /// Tool identifier, e.g. `"excalidraw"` or `"mermaid"`.
    pub tool: String,
    /// Envelope schema version.
    pub version: u32,
    /// Opaque tool-specific payload.
    pub data: String,
    /// Base64 PNG or a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl DrawingEnvelope {
    /// An envelope with an empty payload and no timestamps.
    pub fn empty(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            version: ENVELOPE_VERSION,
            data: String::new(),
            preview: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// An empty envelope stamped as created now.
    pub fn new(tool: impl Into<String>) -> Self {
        let now = now_iso();
        Self {
            created_at: Some(now.clone()),
            updated_at: Some(now),
            ..Self::empty(tool)
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_preview(mut self, preview: Option<String>) -> Self {
        self.preview = preview;
        self
    }

    /// Mark the envelope as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Some(now_iso());
    }

    /// Fill `created_at` from an earlier version of the same drawing.
    ///
    /// An explicit `created_at` on `self` always wins.
    pub fn inherit_created_at(&mut self, previous: &DrawingEnvelope) {
        if self.created_at.is_none() {
            self.created_at = previous.created_at.clone();
        }
    }

    /// The editor implementation this envelope should be opened with.
    pub fn tool_kind(&self) -> ToolKind {
        ToolKind::resolve(Some(&self.tool))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A playground record: an envelope plus list-page metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDrawing {
    /// Primary key. Never changes once assigned.
    pub id: String,
    pub title: String,
    pub envelope: DrawingEnvelope,
}

impl StoredDrawing {
    /// Create a new drawing for `tool` with a fresh id and the default title.
    pub fn create(tool: ToolKind) -> Self {
        Self {
            id: generate_id(),
            title: DEFAULT_TITLE.to_string(),
            envelope: DrawingEnvelope::new(tool.id()),
        }
    }

    /// Wrap an existing envelope under a fresh id and the default title.
    pub fn wrap(envelope: DrawingEnvelope) -> Self {
        Self {
            id: generate_id(),
            title: DEFAULT_TITLE.to_string(),
            envelope,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_json_shape() {
        let envelope = DrawingEnvelope {
            tool: "excalidraw".to_string(),
            version: 1,
            data: "{}".to_string(),
            preview: None,
            created_at: Some("2024-01-01T00:00:00.000Z".to_string()),
            updated_at: None,
        };

        let value: serde_json::Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(value["tool"], "excalidraw");
        assert_eq!(value["version"], 1);
        assert_eq!(value["createdAt"], "2024-01-01T00:00:00.000Z");
        assert!(value.get("preview").is_none());
        assert!(value.get("updatedAt").is_none());
    }

    #[test]
    fn test_envelope_parses_minimal_legacy_json() {
        let envelope =
            DrawingEnvelope::from_json(r#"{"tool":"mermaid","version":1,"data":"graph TD"}"#)
                .unwrap();
        assert_eq!(envelope.tool_kind(), ToolKind::Text);
        assert_eq!(envelope.data, "graph TD");
        assert!(envelope.created_at.is_none());
    }

    #[test]
    fn test_new_envelope_is_stamped() {
        let envelope = DrawingEnvelope::new("excalidraw");
        assert!(envelope.created_at.is_some());
        assert_eq!(envelope.created_at, envelope.updated_at);
        assert!(envelope.data.is_empty());
        assert!(envelope.created_at.unwrap().ends_with('Z'));
    }

    #[test]
    fn test_inherit_created_at() {
        let mut previous = DrawingEnvelope::empty("excalidraw");
        previous.created_at = Some("T0".to_string());

        let mut next = DrawingEnvelope::empty("excalidraw");
        next.inherit_created_at(&previous);
        assert_eq!(next.created_at.as_deref(), Some("T0"));

        let mut explicit = DrawingEnvelope::empty("excalidraw");
        explicit.created_at = Some("T5".to_string());
        explicit.inherit_created_at(&previous);
        assert_eq!(explicit.created_at.as_deref(), Some("T5"));
    }

    #[test]
    fn test_stored_drawing_defaults() {
        let a = StoredDrawing::create(ToolKind::Text);
        let b = StoredDrawing::create(ToolKind::Text);
        assert_ne!(a.id, b.id);
        assert_eq!(a.title, DEFAULT_TITLE);
        assert_eq!(a.envelope.tool, "mermaid");

        let parsed = StoredDrawing::from_json(&a.to_json().unwrap()).unwrap();
        assert_eq!(parsed, a);
    }
}
