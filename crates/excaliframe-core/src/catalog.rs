//! Data behind the playground list and detail pages.

use crate::envelope::{DEFAULT_TITLE, StoredDrawing};
use crate::preview;
use crate::tool::ToolKind;
use chrono::DateTime;
use serde::Serialize;
use std::cmp::Ordering;

/// Trimmed title, or the default title when nothing is left.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Most recently modified first. Drawings without a timestamp go last.
pub fn sort_by_recent(drawings: &mut [StoredDrawing]) {
    drawings.sort_by(|a, b| {
        match (&a.envelope.updated_at, &b.envelope.updated_at) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// `<img src>` for a drawing's preview, if it has one.
pub fn preview_src(drawing: &StoredDrawing) -> Option<String> {
    drawing.envelope.preview.as_deref().and_then(preview::to_data_uri)
}

pub fn view_url(id: &str) -> String {
    format!("/playground/{}/", id)
}

pub fn edit_url(id: &str) -> String {
    format!("/playground/{}/edit", id)
}

/// `YYYY-MM-DD` for an ISO timestamp, empty when it doesn't parse.
pub fn format_date(iso: &str) -> String {
    DateTime::parse_from_rfc3339(iso)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// One row of the drawing list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingSummary {
    pub id: String,
    pub title: String,
    pub tool: ToolKind,
    pub updated: String,
    /// `<img src>` for the thumbnail.
    pub preview: Option<String>,
    pub view_url: String,
    pub edit_url: String,
}

impl DrawingSummary {
    pub fn from_drawing(drawing: &StoredDrawing) -> Self {
        let title = if drawing.title.is_empty() {
            "Untitled".to_string()
        } else {
            drawing.title.clone()
        };
        Self {
            id: drawing.id.clone(),
            title,
            tool: drawing.envelope.tool_kind(),
            updated: drawing
                .envelope
                .updated_at
                .as_deref()
                .map(format_date)
                .unwrap_or_default(),
            preview: preview_src(drawing),
            view_url: view_url(&drawing.id),
            edit_url: edit_url(&drawing.id),
        }
    }
}

/// Sorted summaries for the list page.
pub fn summarize(mut drawings: Vec<StoredDrawing>) -> Vec<DrawingSummary> {
    sort_by_recent(&mut drawings);
    drawings.iter().map(DrawingSummary::from_drawing).collect()
}
