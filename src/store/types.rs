//! Store types shared by every backend

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::mime::detect_mime_type;

pub(crate) const UPLOAD_FAILED: &str = "failed to upload file";
pub(crate) const LIST_FAILED: &str = "failed to list files";
pub(crate) const DOWNLOAD_FAILED: &str = "failed to download file";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Non-success status or unreachable backend. The message names the operation.
    #[error("{0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl StoreError {
    /// Decode failures are reported as the same kind as transport failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Transport(_) | StoreError::Decode(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

/// Metadata of a stored file. Created by the backend; never modified by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ListFilesResponse {
    pub items: Vec<FileRecord>,
}

/// A local file about to be handed to `FileStore::add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, naming it after its final path component and
    /// detecting its mime type from content and extension.
    pub async fn from_path(path: &Path) -> StoreResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::Io(format!("Invalid file name: {}", path.display())))?
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

        let mime_type = detect_mime_type(&name, &bytes);
        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }
}

/// Downloaded file content, held in memory until saved or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl BinaryPayload {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
