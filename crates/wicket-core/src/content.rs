//! Window content: what `show` was given, and how asset requests resolve.
//!
//! The bridge does not serve HTTP itself. Whatever server sits in front of
//! it calls `Bridge::resolve_asset(window, path)`, which tries in order:
//! the inline index HTML, the custom file handler, then the window's root
//! folder on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Custom file handler: request path (always starting with `/`) in, file
/// bytes out.
pub type FileHandler = dyn Fn(&str) -> Option<Vec<u8>> + Send + Sync;

/// Content handed to `show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowContent {
    Html(String),
    Url(String),
    File(PathBuf),
}

impl ShowContent {
    /// Inline HTML starts with `<`; `http://`, `https://` and `file://` are
    /// URLs; anything else is a file path.
    pub fn classify(content: &str) -> Self {
        let trimmed = content.trim_start();
        if trimmed.starts_with('<') {
            Self::Html(content.to_string())
        } else if ["http://", "https://", "file://"]
            .iter()
            .any(|scheme| trimmed.starts_with(scheme))
        {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

/// A resolved asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub mime: &'static str,
    pub data: Vec<u8>,
}

/// Per-window asset lookup, rebuilt from the window snapshot on each show.
#[derive(Clone, Default)]
pub(crate) struct AssetResolver {
    pub root: Option<PathBuf>,
    pub index: Option<String>,
    pub handler: Option<Arc<FileHandler>>,
}

impl AssetResolver {
    pub fn resolve(&self, path: &str) -> Option<Asset> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let clean = path.trim_start_matches('/');

        if let Some(html) = &self.index {
            if clean.is_empty() || clean == "index.html" {
                return Some(Asset {
                    mime: "text/html",
                    data: html.clone().into_bytes(),
                });
            }
        }

        if let Some(handler) = &self.handler {
            if let Some(data) = handler(&format!("/{clean}")) {
                return Some(Asset {
                    mime: mime_from_extension(Path::new(clean)),
                    data,
                });
            }
        }

        let root = self.root.as_ref()?;
        let clean = if clean.is_empty() { "index.html" } else { clean };
        let file_path = root.join(clean);

        // Canonicalize both sides so `..` and symlinks cannot escape the root.
        let canonical_root = std::fs::canonicalize(root).ok()?;
        let canonical_file = std::fs::canonicalize(&file_path).ok()?;
        if !canonical_file.starts_with(&canonical_root) || !canonical_file.is_file() {
            return None;
        }

        let data = std::fs::read(&canonical_file).ok()?;
        Some(Asset {
            mime: mime_from_extension(&canonical_file),
            data,
        })
    }
}

/// Guess MIME type from file extension.
pub fn mime_from_extension(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("wasm") => "application/wasm",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("txt") => "text/plain",
        Some("xml") => "application/xml",
        _ => "application/octet-stream",
    }
}
