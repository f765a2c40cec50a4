//! Locally selected file pending upload.

use std::path::Path;

use crate::error::SessionResult;

/// A file selected for upload: raw bytes plus the metadata the upload call
/// needs. Owned by the session until it is reset or replaced.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Original filename
    pub name: String,
    /// MIME type, e.g. "video/mp4"
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Create from in-memory parts.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, deriving the MIME type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = content_type_for(path).to_string();

        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    /// Whether this file carries a video MIME type.
    pub fn is_video(&self) -> bool {
        self.content_type.starts_with("video/")
    }
}

/// MIME type for a path based on its extension. Unknown extensions fall back
/// to `application/octet-stream`, which the session then rejects as non-video.
fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mpg" | "mpeg" => "video/mpeg",
        _ => "application/octet-stream",
    }
}
