//! Source type detection.
//!
//! Classifies a source string (file path or URL) into a [`ContentKind`] by
//! pure string inspection — no I/O. An explicit override always wins; a URL
//! scheme yields `web`; otherwise the file extension is looked up in a fixed
//! table and unmapped extensions degrade to `text` rather than erroring.

use std::path::Path;

use crate::models::ContentKind;

/// Resolve the [`ContentKind`] for a source. Never fails.
pub fn detect_kind(source: &str, explicit: Option<ContentKind>) -> ContentKind {
    if let Some(kind) = explicit {
        return kind;
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        return ContentKind::Web;
    }

    let extension = Path::new(source)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => ContentKind::Pdf,
        Some("docx") | Some("doc") => ContentKind::Docx,
        Some("csv") => ContentKind::Csv,
        Some("txt") | Some("md") | Some("py") | Some("json") => ContentKind::Text,
        Some("png") | Some("jpg") | Some("jpeg") => ContentKind::Image,
        _ => ContentKind::Text,
    }
}
