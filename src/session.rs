//! Session - wires settings, the active store and its listing together

use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::batch::{self, SaveTarget};
use crate::listing::FileListing;
use crate::preferences::{PreferenceError, PreferenceStore};
use crate::settings::Settings;
use crate::store::{FileRecord, FileStore, HttpFileStore, StoreError, StoreResult, UploadFile};
use async_outcome::{AsyncOutcome, Generation};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Preferences(#[from] PreferenceError),
}

/// What a front end holds on to: the endpoint setting, a store bound to it and
/// the listing of that store.
pub struct Session {
    preferences: Arc<dyn PreferenceStore>,
    settings: Settings,
    store: Arc<dyn FileStore>,
    listing: FileListing,
}

impl Session {
    /// Load settings, bind an HTTP store to the saved endpoint and start listing it.
    /// Must be called within a Tokio runtime.
    pub async fn open(preferences: Arc<dyn PreferenceStore>) -> Result<Self, SessionError> {
        let settings = Settings::load(preferences.as_ref()).await?;
        let store = HttpFileStore::new(&settings.base_url)?;
        info!("session: using endpoint {}", store.endpoint());
        Ok(Self::with_store(preferences, settings, Arc::new(store)))
    }

    /// Build a session around an existing store and start listing it.
    pub fn with_store(
        preferences: Arc<dyn PreferenceStore>,
        settings: Settings,
        store: Arc<dyn FileStore>,
    ) -> Self {
        let listing = FileListing::new();
        listing.refresh(Arc::clone(&store));
        Self {
            preferences,
            settings,
            store,
            listing,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> Arc<dyn FileStore> {
        Arc::clone(&self.store)
    }

    pub fn listing(&self) -> &FileListing {
        &self.listing
    }

    /// Switch to a new endpoint: persist it, bind a fresh store and re-list.
    ///
    /// The previous store is left untouched; anything it still returns is
    /// ignored by the listing.
    pub async fn set_endpoint(&mut self, endpoint: &str) -> Result<(), SessionError> {
        let store = HttpFileStore::new(endpoint)?;
        let settings = Settings {
            base_url: store.endpoint().to_string(),
        };
        settings.save(self.preferences.as_ref()).await?;
        info!("session: endpoint changed to {}", settings.base_url);

        self.settings = settings;
        self.store = Arc::new(store);
        self.refresh();
        Ok(())
    }

    /// Re-list the current store.
    pub fn refresh(&self) -> Generation {
        self.listing.refresh(Arc::clone(&self.store))
    }

    /// Upload every file, then refresh the listing once.
    pub async fn upload(&self, files: Vec<UploadFile>) {
        let store = Arc::clone(&self.store);
        batch::upload_all(store.as_ref(), files, || {
            self.refresh();
        })
        .await;
    }

    /// Download one record into `target`, returning where it was saved.
    pub async fn download(
        &self,
        record: &FileRecord,
        target: &dyn SaveTarget,
    ) -> StoreResult<PathBuf> {
        batch::download_one(self.store.as_ref(), record, target).await
    }

    /// Download every record of the loaded listing. Does nothing unless the
    /// listing is currently loaded.
    pub async fn download_all(&self, target: &dyn SaveTarget) -> usize {
        match self.listing.outcome() {
            AsyncOutcome::Loaded(records) => {
                batch::download_all(self.store.as_ref(), &records, target).await
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferences;
    use crate::settings::BASE_URL_KEY;
    use crate::store::{BinaryPayload, MemoryFileStore};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct CollectingTarget {
        names: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SaveTarget for CollectingTarget {
        async fn save(&self, name: &str, _payload: BinaryPayload) -> StoreResult<PathBuf> {
            self.names.lock().await.push(name.to_string());
            Ok(PathBuf::from(name))
        }
    }

    fn memory_session() -> (Session, Arc<MemoryFileStore>) {
        let store = Arc::new(MemoryFileStore::new());
        let session = Session::with_store(
            Arc::new(MemoryPreferences::new()),
            Settings::default(),
            store.clone(),
        );
        (session, store)
    }

    #[tokio::test]
    async fn upload_refreshes_listing_with_new_records() {
        let (session, _) = memory_session();
        assert_eq!(session.listing().settled().await, AsyncOutcome::Loaded(Vec::new()));
        let before = session.listing().generation();

        session
            .upload(vec![
                UploadFile::new("a.txt", "text/plain", b"a".to_vec()),
                UploadFile::new("b.txt", "text/plain", b"b".to_vec()),
            ])
            .await;

        assert!(session.listing().generation() > before);
        let outcome = session.listing().settled().await;
        let names: HashSet<_> = outcome
            .loaded()
            .unwrap()
            .iter()
            .map(|r| r.name.clone())
            .collect();
        assert_eq!(names, HashSet::from(["a.txt".to_string(), "b.txt".to_string()]));
    }

    #[tokio::test]
    async fn download_all_uses_loaded_listing() {
        let (session, store) = memory_session();
        store
            .add(UploadFile::new("a.txt", "text/plain", b"a".to_vec()))
            .await
            .unwrap();
        session.refresh();
        session.listing().settled().await;

        let target = CollectingTarget::default();
        assert_eq!(session.download_all(&target).await, 1);
        assert_eq!(*target.names.lock().await, vec!["a.txt".to_string()]);
    }

    #[tokio::test]
    async fn download_all_is_a_no_op_while_listing_failed() {
        let (session, store) = memory_session();
        store.set_offline(true);
        session.refresh();
        assert!(session.listing().settled().await.is_failed());

        let target = CollectingTarget::default();
        assert_eq!(session.download_all(&target).await, 0);
    }

    #[tokio::test]
    async fn set_endpoint_persists_and_rebinds() {
        let prefs = Arc::new(MemoryPreferences::new());
        let mut session = Session::with_store(
            prefs.clone(),
            Settings::default(),
            Arc::new(MemoryFileStore::new()),
        );

        session.set_endpoint("http://127.0.0.1:1/").await.unwrap();
        assert!(session.listing().outcome().is_pending());

        assert_eq!(session.settings().base_url, "http://127.0.0.1:1");
        assert_eq!(
            prefs.get(BASE_URL_KEY).await.unwrap().as_deref(),
            Some("\"http://127.0.0.1:1\"")
        );
    }

    #[tokio::test]
    async fn invalid_endpoint_is_rejected_without_persisting() {
        let prefs = Arc::new(MemoryPreferences::new());
        let mut session = Session::with_store(
            prefs.clone(),
            Settings::default(),
            Arc::new(MemoryFileStore::new()),
        );

        let err = session.set_endpoint("localhost:9000").await.unwrap_err();
        assert!(matches!(err, SessionError::Store(StoreError::InvalidEndpoint(_))));
        assert_eq!(prefs.get(BASE_URL_KEY).await.unwrap(), None);
        assert_eq!(session.settings(), &Settings::default());
    }
}
