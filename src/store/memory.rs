//! In-process file store, used by tests and offline runs

use async_trait::async_trait;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::backend::FileStore;
use super::types::{
    BinaryPayload, FileRecord, StoreError, StoreResult, UploadFile, DOWNLOAD_FAILED, LIST_FAILED,
    UPLOAD_FAILED,
};

struct StoredFile {
    record: FileRecord,
    bytes: Vec<u8>,
}

/// `FileStore` keeping everything in memory, listed in insertion order.
///
/// `set_offline(true)` makes every call fail the way an unreachable backend would.
#[derive(Default)]
pub struct MemoryFileStore {
    files: Mutex<Vec<StoredFile>>,
    offline: AtomicBool,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.files.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.lock().await.is_empty()
    }

    fn ensure_online(&self, failure: &str) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Transport(failure.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn add(&self, file: UploadFile) -> StoreResult<FileRecord> {
        self.ensure_online(UPLOAD_FAILED)?;
        // A multipart part without a filename is not a file.
        if file.name.is_empty() {
            return Err(StoreError::Transport(UPLOAD_FAILED.to_string()));
        }

        let record = FileRecord {
            id: Uuid::new_v4().to_string(),
            name: file.name,
            mime_type: file.mime_type,
        };
        self.files.lock().await.push(StoredFile {
            record: record.clone(),
            bytes: file.bytes,
        });

        info!("add: {} stored as {}", record.name, record.id);
        Ok(record)
    }

    async fn list(&self) -> StoreResult<Vec<FileRecord>> {
        self.ensure_online(LIST_FAILED)?;
        let files = self.files.lock().await;
        Ok(files.iter().map(|f| f.record.clone()).collect())
    }

    async fn download(&self, id: &str) -> StoreResult<BinaryPayload> {
        self.ensure_online(DOWNLOAD_FAILED)?;
        let files = self.files.lock().await;
        let stored = files
            .iter()
            .find(|f| f.record.id == id)
            .ok_or_else(|| StoreError::Transport(DOWNLOAD_FAILED.to_string()))?;

        Ok(BinaryPayload {
            bytes: stored.bytes.clone(),
            content_type: Some(stored.record.mime_type.clone()),
        })
    }
}
