//! Save targets for downloaded payloads

use async_trait::async_trait;
use log::{debug, info, warn};
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::store::{BinaryPayload, StoreError, StoreResult};

/// Gives up on finding a free `name (n).ext` after this many candidates.
const MAX_NAME_ATTEMPTS: usize = 10_000;

/// Receives downloaded files, e.g. by writing them somewhere the user can reach.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Store `payload` under `name` and return where it ended up.
    async fn save(&self, name: &str, payload: BinaryPayload) -> StoreResult<PathBuf>;
}

/// Writes every payload to `<root>/<name>`, creating `root` when needed.
///
/// Existing files are never overwritten: when `<name>` is taken the payload goes
/// to `<stem> (1).<ext>`, `<stem> (2).<ext>` and so on. Names are claimed with
/// `create_new`, so concurrent saves of the same name land in distinct files.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    root: PathBuf,
}

impl DirectoryTarget {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination for `name`. Only the final path component is kept, so a
    /// record name can never point outside `root`.
    pub fn path_for(&self, name: &str) -> StoreResult<PathBuf> {
        let file_name = Path::new(name)
            .file_name()
            .ok_or_else(|| StoreError::Io(format!("Invalid file name: {:?}", name)))?;
        Ok(self.root.join(file_name))
    }

    /// Create the first free destination for `name`.
    async fn claim(&self, name: &str) -> StoreResult<(PathBuf, File)> {
        let first = self.path_for(name)?;
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                first.clone()
            } else {
                numbered(&first, attempt)
            };
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(file) => return Ok((candidate, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} exists, trying next name", candidate.display());
                }
                Err(e) => return Err(StoreError::Io(format!("Failed to create file: {}", e))),
            }
        }
        Err(StoreError::Io(format!("No free file name for {:?}", name)))
    }
}

/// `dir/a.txt` -> `dir/a (n).txt`; `dir/archive` -> `dir/archive (n)`.
fn numbered(path: &Path, n: usize) -> PathBuf {
    let stem = path.file_stem().and_then(OsStr::to_str).unwrap_or_default();
    let file_name = match path.extension().and_then(OsStr::to_str) {
        Some(ext) => format!("{} ({}).{}", stem, n, ext),
        None => format!("{} ({})", stem, n),
    };
    path.with_file_name(file_name)
}

async fn write_payload(file: &mut File, payload: &BinaryPayload) -> StoreResult<()> {
    file.write_all(&payload.bytes)
        .await
        .map_err(|e| StoreError::Io(format!("Failed to write file: {}", e)))?;
    file.flush()
        .await
        .map_err(|e| StoreError::Io(format!("Failed to flush file: {}", e)))
}

#[async_trait]
impl SaveTarget for DirectoryTarget {
    async fn save(&self, name: &str, payload: BinaryPayload) -> StoreResult<PathBuf> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::Io(format!("Failed to create directory: {}", e)))?;

        let (destination, mut file) = self.claim(name).await?;
        if let Err(e) = write_payload(&mut file, &payload).await {
            drop(file);
            if let Err(remove) = tokio::fs::remove_file(&destination).await {
                warn!("failed to remove partial {}: {}", destination.display(), remove);
            }
            return Err(e);
        }

        info!("saved {} ({} bytes)", destination.display(), payload.len());
        Ok(destination)
    }
}
