//! Client settings, read and written at process boundaries

use log::warn;

use crate::preferences::{PreferenceResult, PreferenceStore};

/// Preference key holding the service endpoint
pub const BASE_URL_KEY: &str = "baseURL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:9000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings; missing or unreadable values fall back to the defaults.
    ///
    /// Values are stored JSON-encoded.
    pub async fn load(preferences: &dyn PreferenceStore) -> PreferenceResult<Self> {
        let base_url = match preferences.get(BASE_URL_KEY).await? {
            Some(raw) => match serde_json::from_str::<String>(&raw) {
                Ok(url) => url,
                Err(e) => {
                    warn!("Ignoring malformed {} preference {:?}: {}", BASE_URL_KEY, raw, e);
                    DEFAULT_BASE_URL.to_string()
                }
            },
            None => DEFAULT_BASE_URL.to_string(),
        };
        Ok(Self { base_url })
    }

    pub async fn save(&self, preferences: &dyn PreferenceStore) -> PreferenceResult<()> {
        let encoded = serde_json::to_string(&self.base_url)?;
        preferences.set(BASE_URL_KEY, &encoded).await
    }
}
