//! Fixed extension → content-type table for the serving layer.
//!
//! The table covers exactly the extensions the resolver allow-lists; anything
//! else falls back to `application/octet-stream`. Matching is
//! case-insensitive, consistent with enumeration.

use std::path::Path;

/// Content type for an image path, derived from its extension.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
