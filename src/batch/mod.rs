//! Batch transfers over a single `FileStore`
//!
//! - `worker`: concurrent download/upload fan-out with per-item isolation
//! - `save`: where downloaded payloads go

mod save;
mod worker;

pub use save::{DirectoryTarget, SaveTarget};
pub use worker::{download_all, download_one, upload_all};
