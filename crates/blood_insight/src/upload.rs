/// Uploaded report files and their base64 encoding
use base64::{engine::general_purpose, Engine as _};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::error::{InsightError, Result};

/// Raw file contents with a declared MIME type
#[derive(Debug, Clone)]
pub struct ImageInput {
    bytes: Vec<u8>,
    mime_type: String,
}

/// Base64 payload ready to embed in a provider request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: String,
    pub mime_type: String,
}

impl EncodedImage {
    /// `data:<mime>;base64,<data>` form used by chat-completions APIs
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// MIME type from a file extension
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// MIME type sniffed from the file contents
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type())
}

impl ImageInput {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Read a report file, taking the MIME type from its extension or,
    /// failing that, from its contents
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).await.map_err(|source| InsightError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mime_type = mime_for_path(path)
            .or_else(|| sniff_mime(&bytes))
            .ok_or_else(|| InsightError::UnsupportedFileType(path.to_path_buf()))?;

        debug!(
            "Loaded {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            mime_type
        );

        Ok(Self::new(bytes, mime_type))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Encode to base64, dropping the raw buffer
    pub fn into_encoded(self) -> EncodedImage {
        EncodedImage {
            data: general_purpose::STANDARD.encode(&self.bytes),
            mime_type: self.mime_type,
        }
    }
}
