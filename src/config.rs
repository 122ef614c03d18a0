use crate::error::Result;
use crate::language::SupportedLanguage;
use crate::session::{SessionConfig, TestMode};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persisted test preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: TestMode,
    pub duration_secs: u32,
    pub word_count: usize,
    pub language: SupportedLanguage,
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            mode: session.mode,
            duration_secs: session.duration_secs,
            word_count: session.word_count,
            language: SupportedLanguage::English,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            mode: self.mode,
            duration_secs: self.duration_secs,
            word_count: self.word_count,
        }
    }

    /// Take over the test parameters of `session`, keeping the language.
    pub fn update_from(&mut self, session: SessionConfig) {
        self.mode = session.mode;
        self.duration_secs = session.duration_secs;
        self.word_count = session.word_count;
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typetest") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("typetest_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files fall back to defaults.
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            mode: TestMode::Words,
            duration_secs: 60,
            word_count: 25,
            language: SupportedLanguage::Code,
        };
        store.save(&cfg).unwrap();

        assert!(path.exists());
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "mode": "words", "word_count": 10 }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.mode, TestMode::Words);
        assert_eq!(cfg.word_count, 10);
        assert_eq!(cfg.duration_secs, Config::default().duration_secs);
    }

    #[test]
    fn update_from_keeps_language() {
        let mut cfg = Config {
            language: SupportedLanguage::Code,
            ..Config::default()
        };
        cfg.update_from(SessionConfig {
            mode: TestMode::Words,
            duration_secs: 15,
            word_count: 100,
        });

        assert_eq!(cfg.session_config().word_count, 100);
        assert_eq!(cfg.language, SupportedLanguage::Code);
    }
}
