use async_trait::async_trait;

use super::types::{BinaryPayload, FileRecord, StoreResult, UploadFile};

/// Capabilities every storage backend provides.
///
/// Each call is an independent round trip; implementations keep no per-call
/// client state and never swallow an error.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Register a new file and return the record the backend created for it.
    async fn add(&self, file: UploadFile) -> StoreResult<FileRecord>;

    /// All records currently known to the backend, in backend-defined order.
    async fn list(&self) -> StoreResult<Vec<FileRecord>>;

    /// Raw content of the file with the given id.
    async fn download(&self, id: &str) -> StoreResult<BinaryPayload>;
}
