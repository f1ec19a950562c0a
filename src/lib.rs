//! filedrop - client for a remote file store
//!
//! - `store`: the `FileStore` trait with its HTTP and in-memory backends
//! - `listing`: the observable "current list query"
//! - `batch`: download-all / upload-all fan-out
//! - `session`: settings + store + listing, as a front end holds them
//! - `preferences` / `settings`: persisted user preferences

pub mod batch;
pub mod listing;
pub mod preferences;
pub mod session;
pub mod settings;
pub mod store;

pub use async_outcome::{AsyncOutcome, Generation, OutcomeTracker};
pub use batch::{DirectoryTarget, SaveTarget};
pub use listing::{FileListing, ListingOutcome};
pub use session::{Session, SessionError};
pub use settings::Settings;
pub use store::{
    BinaryPayload, FileRecord, FileStore, HttpFileStore, MemoryFileStore, StoreError,
    StoreResult, UploadFile,
};
