//! Batch worker - fan-out of one store operation over many entries

use futures_util::future::join_all;
use log::{info, warn};
use std::path::PathBuf;

use super::save::SaveTarget;
use crate::store::{FileRecord, FileStore, StoreResult, UploadFile};

/// Download one record and hand it to `target` under the record's name.
/// Returns where the target put it.
pub async fn download_one(
    store: &dyn FileStore,
    record: &FileRecord,
    target: &dyn SaveTarget,
) -> StoreResult<PathBuf> {
    let payload = store.download(&record.id).await?;
    target.save(&record.name, payload).await
}

/// Download every record concurrently and save each one that succeeds.
///
/// Items are independent: a failed download or save is logged and does not stop
/// the others. No combined failure report is produced. Returns how many items
/// were saved.
pub async fn download_all(
    store: &dyn FileStore,
    records: &[FileRecord],
    target: &dyn SaveTarget,
) -> usize {
    let tasks = records.iter().map(|record| async move {
        match download_one(store, record, target).await {
            Ok(_) => true,
            Err(e) => {
                warn!("download_all: {} ({}) failed: {}", record.name, record.id, e);
                false
            }
        }
    });

    let saved = join_all(tasks).await.into_iter().filter(|ok| *ok).count();
    info!("download_all: saved {}/{} files", saved, records.len());
    saved
}

/// Submit every file concurrently, then call `on_update` exactly once.
///
/// The update signal fires after all submissions have settled, whatever their
/// individual result; per-item failures are only logged.
pub async fn upload_all<F>(store: &dyn FileStore, files: Vec<UploadFile>, on_update: F)
where
    F: FnOnce(),
{
    let count = files.len();
    let tasks = files.into_iter().map(|file| async move {
        let name = file.name.clone();
        if let Err(e) = store.add(file).await {
            warn!("upload_all: {} failed: {}", name, e);
        }
    });

    join_all(tasks).await;
    info!("upload_all: {} submissions settled", count);
    on_update();
}
