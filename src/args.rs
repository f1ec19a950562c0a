//! Command-line argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Get default database path help text for current platform
fn default_database_help() -> String {
    #[cfg(target_os = "linux")]
    return "Preferences database path (default: ~/.local/share/filedrop/filedrop.db)".to_string();

    #[cfg(target_os = "macos")]
    return "Preferences database path (default: ~/Library/Application Support/filedrop/filedrop.db)"
        .to_string();

    #[cfg(target_os = "windows")]
    return "Preferences database path (default: %APPDATA%\\filedrop\\filedrop.db)".to_string();

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    return "Preferences database path (overrides platform default)".to_string();
}

/// Upload, list and download files on a remote file store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Preferences database path (overrides platform default)
    #[arg(short, long, global = true, help = default_database_help())]
    pub database: Option<PathBuf>,

    /// Use this endpoint for this run only, without saving it
    #[arg(short, long, global = true, env = "FILEDROP_ENDPOINT")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the saved endpoint, or save a new one
    Endpoint {
        /// Base URL of the file service, e.g. http://localhost:9000
        url: Option<String>,
    },
    /// List stored files
    List,
    /// Upload one or more files
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Download a single file by id
    Download {
        id: String,
        /// Directory to save into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Download every stored file
    DownloadAll {
        /// Directory to save into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}
