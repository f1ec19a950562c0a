//! The "current list query" of a client, observable while in flight

use async_outcome::{AsyncOutcome, Generation, OutcomeTracker, Snapshot};
use log::debug;
use std::sync::Arc;
use tokio::sync::watch;

use crate::store::{FileRecord, FileStore, StoreError};

pub type ListingOutcome = AsyncOutcome<Vec<FileRecord>, StoreError>;

/// Tracks the most recent `list()` call issued through [`FileListing::refresh`].
///
/// Refreshing again (after an upload, or against a new store) immediately
/// reads `Pending`; results of earlier refreshes are dropped if they arrive late.
#[derive(Clone, Default)]
pub struct FileListing {
    tracker: OutcomeTracker<Vec<FileRecord>, StoreError>,
}

impl FileListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listing `store`. Must be called within a Tokio runtime.
    pub fn refresh(&self, store: Arc<dyn FileStore>) -> Generation {
        let generation = self.tracker.attach(async move { store.list().await });
        debug!("listing: refresh {}", generation);
        generation
    }

    pub fn outcome(&self) -> ListingOutcome {
        self.tracker.outcome()
    }

    pub fn generation(&self) -> Generation {
        self.tracker.generation()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Vec<FileRecord>, StoreError>> {
        self.tracker.subscribe()
    }

    /// Wait for the latest refresh to settle.
    pub async fn settled(&self) -> ListingOutcome {
        self.tracker.settled().await
    }
}
