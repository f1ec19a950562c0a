//! Store module - file storage backends
//!
//! This module is organized into submodules:
//! - `backend`: the `FileStore` capability trait
//! - `types`: records, payloads and errors shared by all backends
//! - `http`: `HttpFileStore`, the remote HTTP backend
//! - `memory`: `MemoryFileStore`, an in-process backend
//! - `mime`: mime type detection for uploads

mod backend;
mod http;
mod memory;
mod mime;
mod types;

pub use backend::FileStore;
pub use http::HttpFileStore;
pub use memory::MemoryFileStore;
pub use mime::detect_mime_type;
pub use types::{BinaryPayload, FileRecord, StoreError, StoreResult, UploadFile};
