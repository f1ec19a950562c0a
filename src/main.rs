//! filedrop command-line client

mod args;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::warn;

use args::{Args, Command};
use filedrop_lib::preferences::{PreferenceStore, SqlitePreferences};
use filedrop_lib::{
    AsyncOutcome, DirectoryTarget, FileRecord, HttpFileStore, Session, Settings, UploadFile,
};

fn default_database_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Could not determine data directory")?;
    Ok(data_dir.join("filedrop").join("filedrop.db"))
}

async fn open_preferences(database: Option<PathBuf>) -> Result<Arc<dyn PreferenceStore>> {
    let db_path = match database {
        Some(path) => path,
        None => default_database_path()?,
    };
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let preferences = SqlitePreferences::open(&db_path)
        .await
        .with_context(|| format!("Failed to open {}", db_path.display()))?;
    Ok(Arc::new(preferences))
}

async fn open_session(
    preferences: Arc<dyn PreferenceStore>,
    endpoint: Option<String>,
) -> Result<Session> {
    match endpoint {
        Some(url) => {
            let store = HttpFileStore::new(&url)?;
            let settings = Settings {
                base_url: store.endpoint().to_string(),
            };
            Ok(Session::with_store(preferences, settings, Arc::new(store)))
        }
        None => Ok(Session::open(preferences).await?),
    }
}

/// Wait for the session's listing and return the records, or the listing error.
async fn loaded_records(session: &Session) -> Result<Vec<FileRecord>> {
    match session.listing().settled().await {
        AsyncOutcome::Loaded(records) => Ok(records),
        AsyncOutcome::Failed(e) => bail!("{}", e),
        AsyncOutcome::Pending => bail!("listing did not settle"),
    }
}

async fn read_uploads(paths: &[PathBuf]) -> Vec<UploadFile> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match UploadFile::from_path(path).await {
            Ok(file) => files.push(file),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }
    files
}

fn print_records(records: &[FileRecord]) {
    if records.is_empty() {
        println!("No files stored.");
        return;
    }
    for record in records {
        println!("{}\t{}\t{}", record.id, record.name, record.mime_type);
    }
}

async fn run_endpoint(preferences: Arc<dyn PreferenceStore>, url: Option<String>) -> Result<()> {
    let settings = match url {
        Some(url) => {
            let store = HttpFileStore::new(&url)?;
            let settings = Settings {
                base_url: store.endpoint().to_string(),
            };
            settings.save(preferences.as_ref()).await?;
            settings
        }
        None => Settings::load(preferences.as_ref()).await?,
    };
    println!("{}", settings.base_url);
    Ok(())
}

async fn run_download(session: &Session, id: &str, out: &Path) -> Result<()> {
    let records = loaded_records(session).await?;
    let record = records
        .iter()
        .find(|r| r.id == id)
        .with_context(|| format!("No file with id {}", id))?;

    let target = DirectoryTarget::new(out);
    let saved = session.download(record, &target).await?;
    println!("{}", saved.display());
    Ok(())
}

async fn run_download_all(session: &Session, out: &Path) -> Result<()> {
    let total = loaded_records(session).await?.len();
    let target = DirectoryTarget::new(out);
    let saved = session.download_all(&target).await;
    println!("Saved {} of {} files to {}", saved, total, target.root().display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let preferences = open_preferences(args.database).await?;

    match args.command {
        Command::Endpoint { url } => run_endpoint(preferences, url).await?,
        Command::List => {
            let session = open_session(preferences, args.endpoint).await?;
            print_records(&loaded_records(&session).await?);
        }
        Command::Upload { files } => {
            let uploads = read_uploads(&files).await;
            if uploads.is_empty() {
                bail!("Nothing to upload");
            }
            let session = open_session(preferences, args.endpoint).await?;
            session.upload(uploads).await;
            print_records(&loaded_records(&session).await?);
        }
        Command::Download { id, out } => {
            let session = open_session(preferences, args.endpoint).await?;
            run_download(&session, &id, &out).await?;
        }
        Command::DownloadAll { out } => {
            let session = open_session(preferences, args.endpoint).await?;
            run_download_all(&session, &out).await?;
        }
    }

    Ok(())
}
