//! Settings client backed by a JSON file

use lumen_theme::{FetchError, RemoteSettingsSnapshot, SettingsClient};
use std::io;
use std::path::PathBuf;

/// Reads the settings document from disk on every fetch
///
/// Stands in for the settings service: a missing (or unconfigured) file is
/// reported as unreachable, so reconciliation falls back to the cache.
#[derive(Clone, Debug, Default)]
pub struct JsonFileSettingsClient {
    path: Option<PathBuf>,
}

impl JsonFileSettingsClient {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl SettingsClient for JsonFileSettingsClient {
    async fn fetch_settings(&self) -> Result<RemoteSettingsSnapshot, FetchError> {
        let Some(path) = &self.path else {
            return Err(FetchError::Network("no settings file configured".into()));
        };

        let body = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => {
                    FetchError::Network(format!("{} not found", path.display()))
                }
                _ => FetchError::Network(format!("{}: {err}", path.display())),
            })?;

        tracing::debug!(path = %path.display(), bytes = body.len(), "fetched settings");
        RemoteSettingsSnapshot::from_json(&body)
    }
}
