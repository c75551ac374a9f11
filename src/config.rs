use crate::app_dirs::AppDirs;
use crate::error::ConfigError;
use crate::verse::{CatalogOrder, Schedule};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Memorization day override, otherwise taken from the calendar
    pub day: Option<u8>,
    pub typing_rounds: u8,
    pub show_hints: bool,
    pub lock_first_letter: bool,
    pub user: Option<String>,
    pub verse_reference: Option<String>,
    pub order: CatalogOrder,
    /// Day the current pass through the catalog began
    pub plan_started: Option<NaiveDate>,
}

impl Config {
    pub fn schedule(&self) -> Schedule {
        Schedule::new(self.order, self.plan_started)
    }

    /// Begin the weekly plan again from the first verse of the current order
    pub fn restart_plan(&mut self, today: NaiveDate) {
        self.plan_started = Some(today);
    }

    /// Switch the catalog order. Returns true when it changed, in which case the plan restarts.
    pub fn set_order(&mut self, order: CatalogOrder, today: NaiveDate) -> bool {
        if self.order == order {
            return false;
        }
        self.order = order;
        self.restart_plan(today);
        true
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            day: None,
            typing_rounds: 3,
            show_hints: true,
            lock_first_letter: false,
            user: None,
            verse_reference: None,
            order: CatalogOrder::default(),
            plan_started: None,
        }
    }
}

impl From<&crate::app::RuntimeSettings> for Config {
    fn from(rs: &crate::app::RuntimeSettings) -> Self {
        Self {
            day: rs.day_override,
            typing_rounds: rs.typing_rounds,
            show_hints: rs.show_hints,
            lock_first_letter: rs.lock_first_letter,
            user: rs.user.clone(),
            verse_reference: rs.verse_reference.clone(),
            order: rs.schedule.order,
            plan_started: rs.schedule.started,
        }
    }
}

pub trait ConfigStore {
    /// Stored config, or defaults when missing or unreadable
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("engrave_config.json"));
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

    pub fn try_load(&self) -> Result<Config, ConfigError> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(cfg) => cfg,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => {
                log::warn!("ignoring config at {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
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
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn test_save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = Config {
            day: Some(5),
            typing_rounds: 1,
            show_hints: false,
            lock_first_letter: true,
            user: Some("reader".into()),
            verse_reference: Some("Psalms 46:10".into()),
            order: CatalogOrder::BookType,
            plan_started: NaiveDate::from_ymd_opt(2026, 10, 12),
        };
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
        assert_matches!(store.try_load(), Err(ConfigError::Io(_)));
    }

    #[test]
    fn test_corrupt_file_is_lenient_but_try_load_reports() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());
        assert_matches!(store.try_load(), Err(ConfigError::Parse(_)));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"typing_rounds": 2}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.typing_rounds, 2);
        assert!(cfg.show_hints);
        assert_eq!(cfg.order, CatalogOrder::Canonical);
    }

    #[test]
    fn test_order_is_stored_by_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"order": "narrative", "plan_started": "2026-10-14"}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.order, CatalogOrder::Narrative);
        assert_eq!(cfg.plan_started, NaiveDate::from_ymd_opt(2026, 10, 14));
    }

    #[test]
    fn test_changing_order_restarts_plan() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mut cfg = Config::default();

        assert!(!cfg.set_order(CatalogOrder::Canonical, today));
        assert_eq!(cfg.plan_started, None);

        assert!(cfg.set_order(CatalogOrder::Chronological, today));
        assert_eq!(cfg.order, CatalogOrder::Chronological);
        assert_eq!(cfg.schedule(), Schedule::new(CatalogOrder::Chronological, Some(today)));

        let later = today + chrono::Duration::days(40);
        cfg.restart_plan(later);
        assert_eq!(cfg.plan_started, Some(later));
    }
}
