//! Persisted watcher state
//!
//! A single JSON record survives between invocations:
//! `{ "version": 1, "lastFreeSignature": "...", "lastHeartbeatKey": "..." }`.
//! Missing, unreadable, or malformed files load as defaults.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::data::Signature;

pub const STATE_VERSION: u32 = 1;

fn state_version() -> u32 {
    STATE_VERSION
}

/// State carried across runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default = "state_version")]
    pub version: u32,
    /// Signature of the free list last alerted on, empty when quiet
    #[serde(default)]
    pub last_free_signature: Signature,
    /// Key of the last heartbeat sent, empty if none
    #[serde(default)]
    pub last_heartbeat_key: String,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            last_free_signature: Signature::empty(),
            last_heartbeat_key: String::new(),
        }
    }
}

/// Loads and saves `PersistedState` at a fixed path
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict read: distinguishes absence from corruption.
    pub fn read(&self) -> Result<Option<PersistedState>, StateError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = std::fs::read(&self.path)?;
        let state: PersistedState = serde_json::from_slice(&data)
            .map_err(|e| StateError::Deserialization(e.to_string()))?;

        if state.version != STATE_VERSION {
            return Err(StateError::Version(state.version));
        }
        Ok(Some(state))
    }

    /// Load state, substituting defaults for anything unusable.
    pub fn load(&self) -> PersistedState {
        match self.read() {
            Ok(Some(state)) => state,
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "No state file, starting fresh");
                PersistedState::default()
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "State file unusable, using defaults"
                );
                PersistedState::default()
            }
        }
    }

    /// Write state atomically (temp file + rename).
    pub fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(state)
            .map_err(|e| StateError::Serialization(e.to_string()))?;

        let tmp = self.tmp_path();
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)?;
            file.write_all(&data)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Unsupported state version: {0}")]
    Version(u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("state.json"));

        assert!(store.read().unwrap().is_none());
        let state = store.load();
        assert!(state.last_free_signature.is_empty());
        assert_eq!(state.last_heartbeat_key, "");
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("nested/dir/state.json"));

        let state = PersistedState {
            last_free_signature: Signature::from("ab12".to_string()),
            last_heartbeat_key: "2026-10-19T09".to_string(),
            ..PersistedState::default()
        };
        store.save(&state).unwrap();

        assert_eq!(store.load(), state);
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn test_json_field_names() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::new(temp_dir.path().join("state.json"));
        store.save(&PersistedState::default()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw["lastFreeSignature"], "");
        assert_eq!(raw["lastHeartbeatKey"], "");
        assert_eq!(raw["version"], 1);
    }

    #[test]
    fn test_legacy_unversioned_file_is_accepted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, r#"{"lastFreeSignature": "abc", "lastHeartbeatKey": "k"}"#).unwrap();

        let state = StateStore::new(&path).load();
        assert_eq!(state.last_free_signature.as_str(), "abc");
        assert_eq!(state.last_heartbeat_key, "k");
    }

    #[test]
    fn test_corrupt_file_loads_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        let store = StateStore::new(&path);

        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(store.read(), Err(StateError::Deserialization(_))));
        assert_eq!(store.load(), PersistedState::default());

        std::fs::write(&path, r#"{"version": 7, "lastFreeSignature": "abc"}"#).unwrap();
        assert!(matches!(store.read(), Err(StateError::Version(7))));
        assert_eq!(store.load(), PersistedState::default());
    }
}
