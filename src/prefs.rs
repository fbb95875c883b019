//! Persisted preferences
//!
//! Exactly one value survives a restart: the dark-mode flag, stored as JSON
//! at a configured path. It is read once at startup and written on every
//! toggle. A missing or unreadable file falls back to the configured default.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{MarketplaceError, Result};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub dark_mode: bool,
}

#[derive(Clone, Debug)]
pub struct PrefsStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PrefsStore {
    pub fn load(path: PathBuf, default_dark_mode: bool) -> Self {
        let prefs = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(prefs) => prefs,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "corrupt preferences file, using default");
                    Preferences { dark_mode: default_dark_mode }
                }
            },
            Err(_) => Preferences { dark_mode: default_dark_mode },
        };
        Self { path, prefs }
    }

    pub fn dark_mode(&self) -> bool {
        self.prefs.dark_mode
    }

    pub fn toggle_dark_mode(&mut self) -> Result<bool> {
        self.prefs.dark_mode = !self.prefs.dark_mode;
        self.persist()?;
        Ok(self.prefs.dark_mode)
    }

    fn persist(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.prefs)
            .map_err(|e| MarketplaceError::Prefs(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| MarketplaceError::Prefs(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = PrefsStore::load(path.clone(), false);
        assert!(!store.dark_mode());
        assert!(store.toggle_dark_mode().unwrap());

        let reloaded = PrefsStore::load(path, false);
        assert!(reloaded.dark_mode());
    }

    #[test]
    fn test_missing_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::load(dir.path().join("nope.json"), true);
        assert!(store.dark_mode());
    }

    #[test]
    fn test_corrupt_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").unwrap();
        let store = PrefsStore::load(path, true);
        assert!(store.dark_mode());
    }
}
