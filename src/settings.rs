//! Persisted user settings and the recent-files list.
//!
//! Both live as small JSON documents under `~/.refviewer`. The core treats
//! them as opaque key-value state for the frontend, except for `autosave`
//! and `savedir`, which drive the post-capture autosave side effect.

use std::path::{Path, PathBuf};

pub const RECENTS_LIMIT: usize = 10;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub zoom: f64,
    pub overwrite: bool,
    pub theme: String,
    pub tooltips: bool,
    pub autosave: bool,
    pub savedir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            overwrite: false,
            theme: "dark".to_string(),
            tooltips: true,
            autosave: false,
            savedir: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// File-backed store for `config.json` and `recents.json`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    home: PathBuf,
}

impl SettingsStore {
    pub fn new() -> Self {
        let home = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".refviewer");
        Self { home }
    }

    /// Store rooted at an explicit directory (tests).
    pub fn at(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    fn config_path(&self) -> PathBuf {
        self.home.join("config.json")
    }

    fn recents_path(&self) -> PathBuf {
        self.home.join("recents.json")
    }

    /// Loads settings; a missing or unreadable file yields defaults so the
    /// app always starts.
    pub fn load(&self) -> Settings {
        match std::fs::read_to_string(self.config_path()) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("[SETTINGS] Ignoring malformed config.json: {e}");
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    pub fn write(&self, settings: &Settings) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.home)?;
        let raw = serde_json::to_string_pretty(settings)?;
        std::fs::write(self.config_path(), raw)?;
        log::info!("[SETTINGS] Wrote {}", self.config_path().display());
        Ok(())
    }

    pub fn recents(&self) -> Vec<PathBuf> {
        match std::fs::read_to_string(self.recents_path()) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    /// Moves `path` to the front of the recents list, deduplicated and
    /// capped at `RECENTS_LIMIT`.
    pub fn push_recent(&self, path: &Path) -> Result<(), ConfigError> {
        let mut recents = self.recents();
        recents.retain(|p| p != path);
        recents.insert(0, path.to_path_buf());
        recents.truncate(RECENTS_LIMIT);

        std::fs::create_dir_all(&self.home)?;
        std::fs::write(self.recents_path(), serde_json::to_string_pretty(&recents)?)?;
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("nothing-here"));
        let settings = store.load();
        assert_eq!(settings.zoom, 1.0);
        assert!(!settings.autosave);
    }

    #[test]
    fn write_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path());
        let mut settings = Settings::default();
        settings.autosave = true;
        settings.savedir = Some(PathBuf::from("/tmp/shots"));
        store.write(&settings).unwrap();

        let loaded = store.load();
        assert!(loaded.autosave);
        assert_eq!(loaded.savedir.as_deref(), Some(Path::new("/tmp/shots")));
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path());
        std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();
        assert_eq!(store.load().theme, "dark");
    }

    #[test]
    fn recents_dedupe_and_stay_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path());

        for i in 0..15 {
            store.push_recent(Path::new(&format!("/pics/{i}.png"))).unwrap();
        }
        // Re-open an old one; it moves to the front without duplicating.
        store.push_recent(Path::new("/pics/10.png")).unwrap();

        let recents = store.recents();
        assert_eq!(recents.len(), RECENTS_LIMIT);
        assert_eq!(recents[0], PathBuf::from("/pics/10.png"));
        assert_eq!(
            recents.iter().filter(|p| **p == PathBuf::from("/pics/10.png")).count(),
            1
        );
    }
}
