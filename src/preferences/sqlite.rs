use async_trait::async_trait;
use std::path::Path;
use tokio::sync::Mutex;
use turso::{Builder, Connection};

use super::{PreferenceError, PreferenceResult, PreferenceStore};

/// Get SQL for creating app_state table
pub fn get_table_sql() -> &'static str {
    "
    CREATE TABLE IF NOT EXISTS app_state (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    "
}

fn db_error(e: impl std::fmt::Display) -> PreferenceError {
    PreferenceError::Database(e.to_string())
}

/// Preferences stored in the `app_state` table of a local database file.
pub struct SqlitePreferences {
    // One connection, serialized behind a mutex
    conn: Mutex<Connection>,
}

impl SqlitePreferences {
    /// Open (or create) the database at `db_path` and ensure the table exists.
    pub async fn open(db_path: &Path) -> PreferenceResult<Self> {
        let path = db_path
            .to_str()
            .ok_or_else(|| PreferenceError::Database(format!("Non UTF-8 path: {}", db_path.display())))?;

        let db = Builder::new_local(path).build().await.map_err(db_error)?;
        let conn = db.connect().map_err(db_error)?;
        conn.execute_batch(get_table_sql()).await.map_err(db_error)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl PreferenceStore for SqlitePreferences {
    async fn get(&self, key: &str) -> PreferenceResult<Option<String>> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query("SELECT value FROM app_state WHERE key = ?1", turso::params![key])
            .await
            .map_err(db_error)?;

        if let Some(row) = rows.next().await.map_err(db_error)? {
            let value: String = row.get(0).map_err(db_error)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str) -> PreferenceResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO app_state (key, value) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET value = ?2",
            turso::params![key, value],
        )
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> PreferenceResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM app_state WHERE key = ?1", turso::params![key])
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
