//! Reading and transport-encoding of file-service uploads.
//!
//! A file payload is complete only after its bytes have been read and base64
//! encoded in full; any failure here aborts the save before a request is sent.

use std::path::{Path, PathBuf};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::types::FileType;
use crate::error::ManagerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
    /// `data:<mime>;base64,<payload>` as produced by browser file readers
    DataUrl(String),
}

/// A file picked for upload but not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub source: AttachmentSource,
}

impl Attachment {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            name,
            source: AttachmentSource::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: AttachmentSource::Bytes(bytes),
        }
    }

    pub fn from_data_url(name: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: AttachmentSource::DataUrl(data_url.into()),
        }
    }

    pub fn detected_file_type(&self) -> Option<FileType> {
        detect_file_type(&self.name)
    }
}

/// Attachment contents ready to be placed in a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFile {
    pub name: String,
    pub size: u64,
    pub content: String,
}

/// Guesses the file type from the extension.
pub fn detect_file_type(name: &str) -> Option<FileType> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "csv" => Some(FileType::Csv),
        "xlsx" | "xls" => Some(FileType::Excel),
        "json" => Some(FileType::Json),
        "xml" => Some(FileType::Xml),
        _ => None,
    }
}

/// Returns the payload part of a data URL. Anything else is returned as is.
pub fn strip_data_url_prefix(raw: &str) -> &str {
    if !raw.starts_with("data:") {
        return raw;
    }
    match raw.split_once(',') {
        Some((_, payload)) => payload,
        None => "",
    }
}

/// Reads the attachment in full and base64-encodes it.
pub async fn encode(attachment: &Attachment) -> Result<EncodedFile, ManagerError> {
    let (size, content) = match &attachment.source {
        AttachmentSource::Path(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                ManagerError::Transport(format!("Failed to read {}: {}", path.display(), e))
            })?;
            (bytes.len() as u64, STANDARD.encode(&bytes))
        }
        AttachmentSource::Bytes(bytes) => (bytes.len() as u64, STANDARD.encode(bytes)),
        AttachmentSource::DataUrl(url) => {
            let payload = strip_data_url_prefix(url);
            let decoded = STANDARD.decode(payload).map_err(|e| {
                ManagerError::Transport(format!("Failed to decode {}: {}", attachment.name, e))
            })?;
            (decoded.len() as u64, payload.to_string())
        }
    };

    tracing::debug!("Encoded {} ({} bytes)", attachment.name, size);

    Ok(EncodedFile {
        name: attachment.name.clone(),
        size,
        content,
    })
}
