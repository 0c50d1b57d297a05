//! Preview images stored next to the payload.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const PNG_PREFIX: &str = "data:image/png;base64,";
const SVG_PREFIX: &str = "data:image/svg+xml;base64,";

/// What an editor produced as a snapshot at save time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewSource {
    /// Raster export from the vector editor.
    Png(Vec<u8>),
    /// Rendered markup from the text-diagram editor. Its output cannot be
    /// rasterised reliably, so the markup itself is embedded.
    Svg(String),
    None,
}

impl PreviewSource {
    /// Encode as a data URI. Empty sources produce no preview.
    pub fn into_data_uri(self) -> Option<String> {
        match self {
            PreviewSource::Png(bytes) if !bytes.is_empty() => Some(png_data_uri(&bytes)),
            PreviewSource::Svg(markup) if !markup.is_empty() => Some(svg_data_uri(&markup)),
            _ => None,
        }
    }
}

pub fn png_data_uri(bytes: &[u8]) -> String {
    format!("{}{}", PNG_PREFIX, STANDARD.encode(bytes))
}

pub fn svg_data_uri(markup: &str) -> String {
    format!("{}{}", SVG_PREFIX, STANDARD.encode(markup.as_bytes()))
}

/// Normalize a stored preview into something an `<img src>` accepts.
///
/// Older records hold bare base64 PNG data.
pub fn to_data_uri(preview: &str) -> Option<String> {
    if preview.is_empty() {
        None
    } else if preview.starts_with("data:") {
        Some(preview.to_string())
    } else {
        Some(format!("{}{}", PNG_PREFIX, preview))
    }
}

/// Decode a preview back into its media type and raw bytes.
pub fn decode(preview: &str) -> Option<(String, Vec<u8>)> {
    let uri = to_data_uri(preview)?;
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let media_type = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((media_type.to_string(), bytes))
}
