//! Drawing tool selection.

use crate::envelope::DrawingEnvelope;
use serde::{Deserialize, Serialize};

/// Starter diagram for a fresh Mermaid drawing.
const MERMAID_TEMPLATE: &str = "graph TD\n    A[Start] --> B{Decision}\n    B -->|Yes| C[Do something]\n    B -->|No| D[Do something else]\n    C --> E[End]\n    D --> E\n";

/// The two editor implementations a drawing can be opened with.
///
/// Resolved once before the editor mounts. The two tools keep disjoint state
/// and are never swapped on a live drawing.
///
/// Serialized as the envelope tool id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    /// Excalidraw vector editor.
    #[default]
    #[serde(rename = "excalidraw")]
    Vector,
    /// Mermaid text-diagram editor.
    #[serde(rename = "mermaid")]
    Text,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::Vector, ToolKind::Text];

    /// Resolve a tool identifier. Unknown or missing identifiers open the
    /// vector editor.
    pub fn resolve(tool: Option<&str>) -> Self {
        match tool {
            Some("mermaid") => ToolKind::Text,
            _ => ToolKind::Vector,
        }
    }

    pub fn from_envelope(envelope: Option<&DrawingEnvelope>) -> Self {
        Self::resolve(envelope.map(|e| e.tool.as_str()))
    }

    /// Identifier written into envelopes.
    pub fn id(&self) -> &'static str {
        match self {
            ToolKind::Vector => "excalidraw",
            ToolKind::Text => "mermaid",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Vector => "Excalidraw",
            ToolKind::Text => "Mermaid",
        }
    }

    /// Payload an editor starts from when the host has nothing stored.
    pub fn default_payload(&self) -> &'static str {
        match self {
            ToolKind::Vector => "",
            ToolKind::Text => MERMAID_TEMPLATE,
        }
    }

    /// Whether previews come from rendered markup rather than a raster export.
    pub fn uses_markup_preview(&self) -> bool {
        matches!(self, ToolKind::Text)
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(ToolKind::resolve(Some("mermaid")), ToolKind::Text);
        assert_eq!(ToolKind::resolve(Some("excalidraw")), ToolKind::Vector);
        assert_eq!(ToolKind::resolve(Some("plantuml")), ToolKind::Vector);
        assert_eq!(ToolKind::resolve(Some("")), ToolKind::Vector);
        assert_eq!(ToolKind::resolve(None), ToolKind::Vector);
    }

    #[test]
    fn test_from_envelope() {
        assert_eq!(ToolKind::from_envelope(None), ToolKind::Vector);
        let envelope = DrawingEnvelope::empty("mermaid");
        assert_eq!(ToolKind::from_envelope(Some(&envelope)), ToolKind::Text);
    }

    #[test]
    fn test_ids_round_trip_through_resolve() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::resolve(Some(kind.id())), kind);
        }
    }

    #[test]
    fn test_serializes_as_envelope_id() {
        for kind in ToolKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.id()));
        }
    }

    #[test]
    fn test_preview_kind() {
        assert!(ToolKind::Text.uses_markup_preview());
        assert!(!ToolKind::Vector.uses_markup_preview());
    }

    #[test]
    fn test_default_payloads() {
        assert!(ToolKind::Vector.default_payload().is_empty());
        assert!(ToolKind::Text.default_payload().starts_with("graph TD"));
    }
}
