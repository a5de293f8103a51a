//! Binary loader: the raw bytes of a selected file plus its name and MIME type.

use crate::error::{ViewerError, ViewerResult};
use crate::format::{DOCX_MIME, PDF_MIME};
use log::debug;
use std::path::Path;
use std::sync::Arc;

/// A file picked by the user, loaded fully into memory.
///
/// The bytes are immutable once loaded and shared with every decode and
/// render task.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    mime: Option<String>,
    bytes: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime: Option<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { name: name.into(), mime, bytes: bytes.into() }
    }

    /// Read `path` from disk, deriving the MIME type from its extension.
    pub async fn load(path: impl AsRef<Path>) -> ViewerResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ViewerError::Io { path: path.to_path_buf(), source })?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = mime_for_path(path).map(str::to_owned);
        debug!("Loaded {} ({} bytes, mime {:?})", name, bytes.len(), mime);

        Ok(Self::new(name, mime, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// MIME type implied by the file extension, if it is one we open.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?;
    if extension.eq_ignore_ascii_case("pdf") {
        Some(PDF_MIME)
    } else if extension.eq_ignore_ascii_case("docx") {
        Some(DOCX_MIME)
    } else {
        None
    }
}
