/// Application settings and on-disk locations
///
/// Settings live in a flat JSON document next to the catalog database.
/// They are loaded once at startup and written back only when `save` is
/// called explicitly.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{CatalogError, Result};

/// Folder name used under the platform data and cache directories
pub const APP_DIR_NAME: &str = "photo-clients";

/// Default display color for newly created client types (mint green)
pub const THEME_COLOR: &str = "#A8E6CF";

/// Card size in the client grid
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// User settings
///
/// Presentation keys (`card_size`, `view_mode`, `sort_by`) are carried for the
/// UI and never interpreted here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Root of the NAS share that client folders usually live under
    pub nas_path: String,
    pub card_size: CardSize,
    pub sort_by: String,
    pub view_mode: String,
    /// Copy the database into `backup_path` at launch
    pub auto_backup: bool,
    /// Backup directory; `None` means `<data dir>/backups`
    pub backup_path: Option<PathBuf>,
    pub last_opened: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nas_path: String::new(),
            card_size: CardSize::Medium,
            sort_by: "date".to_string(),
            view_mode: "grid".to_string(),
            auto_backup: true,
            backup_path: None,
            last_opened: None,
        }
    }
}

impl AppConfig {
    /// Load settings from `path`.
    ///
    /// Never fails. A missing or unreadable document gives the defaults, and
    /// every key that is absent or has the wrong type falls back to its own
    /// default without affecting the others.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = ?path, "Settings file not found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_json_str(&content);
                info!(path = ?path, "Settings loaded");
                config
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "Could not read settings, using defaults");
                Self::default()
            }
        }
    }

    /// Parse a settings document, falling back per key.
    pub fn from_json_str(content: &str) -> Self {
        let mut config = Self::default();

        let map = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!("Settings document is not an object, using defaults");
                return config;
            }
            Err(e) => {
                warn!(error = %e, "Settings document is not valid JSON, using defaults");
                return config;
            }
        };

        take(&map, "nas_path", &mut config.nas_path);
        take(&map, "card_size", &mut config.card_size);
        take(&map, "sort_by", &mut config.sort_by);
        take(&map, "view_mode", &mut config.view_mode);
        take(&map, "auto_backup", &mut config.auto_backup);
        take(&map, "backup_path", &mut config.backup_path);
        take(&map, "last_opened", &mut config.last_opened);

        config
    }

    /// Write the whole document to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;

        info!(path = ?path, "Settings saved");
        Ok(())
    }

    /// Resolve the backup directory against the application data directory.
    pub fn backup_dir(&self, paths: &AppPaths) -> PathBuf {
        self.backup_path
            .clone()
            .unwrap_or_else(|| paths.data_dir.join("backups"))
    }
}

/// Overwrite `slot` with `map[key]` when it is present and well-typed.
fn take<T: DeserializeOwned>(map: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = map.get(key) else {
        return;
    };

    match T::deserialize(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => warn!(key, error = %e, "Ignoring invalid setting"),
    }
}

/// Where the application keeps its files
#[derive(Debug, Clone, PartialEq)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    pub thumbnail_dir: PathBuf,
}

impl AppPaths {
    /// Platform locations:
    /// - Linux: ~/.local/share/photo-clients and ~/.cache/photo-clients/thumbnails
    /// - macOS: ~/Library/Application Support/photo-clients and ~/Library/Caches/...
    /// - Windows: %APPDATA%\photo-clients and %LOCALAPPDATA%\...
    pub fn from_env() -> Result<Self> {
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| CatalogError::Config("Could not determine user data directory".to_string()))?
            .join(APP_DIR_NAME);

        let thumbnail_dir = dirs_next::cache_dir()
            .or_else(dirs_next::home_dir)
            .ok_or_else(|| CatalogError::Config("Could not determine cache directory".to_string()))?
            .join(APP_DIR_NAME)
            .join("thumbnails");

        Ok(Self {
            db_path: data_dir.join("clients.db"),
            config_path: data_dir.join("config.json"),
            data_dir,
            thumbnail_dir,
        })
    }

    /// Put every file beneath `root`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let data_dir = root.into();
        Self {
            db_path: data_dir.join("clients.db"),
            config_path: data_dir.join("config.json"),
            thumbnail_dir: data_dir.join("cache"),
            data_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.nas_path, "");
        assert_eq!(config.card_size, CardSize::Medium);
        assert_eq!(config.sort_by, "date");
        assert_eq!(config.view_mode, "grid");
        assert!(config.auto_backup);
        assert!(config.backup_path.is_none());
        assert!(config.last_opened.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("config.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_garbage_gives_defaults() {
        assert_eq!(AppConfig::from_json_str("{not json"), AppConfig::default());
        assert_eq!(AppConfig::from_json_str("[1, 2]"), AppConfig::default());
    }

    #[test]
    fn test_bad_keys_fall_back_individually() {
        let config = AppConfig::from_json_str(
            r#"{
                "nas_path": "//nas/shoots",
                "card_size": "huge",
                "auto_backup": "yes",
                "view_mode": "list",
                "theme": "dark"
            }"#,
        );

        assert_eq!(config.nas_path, "//nas/shoots");
        assert_eq!(config.view_mode, "list");
        assert_eq!(config.card_size, CardSize::Medium);
        assert!(config.auto_backup);
        assert_eq!(config.sort_by, "date");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.nas_path = "/mnt/nas".to_string();
        config.card_size = CardSize::Large;
        config.auto_backup = false;
        config.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"card_size\": \"large\""));

        assert_eq!(AppConfig::load(&path), config);
    }

    #[test]
    fn test_backup_dir_resolution() {
        let paths = AppPaths::under("/data/app");
        let mut config = AppConfig::default();
        assert_eq!(config.backup_dir(&paths), PathBuf::from("/data/app/backups"));

        config.backup_path = Some(PathBuf::from("/nas/backups"));
        assert_eq!(config.backup_dir(&paths), PathBuf::from("/nas/backups"));
    }

    #[test]
    fn test_paths_under_root() {
        let paths = AppPaths::under("/tmp/catalog");
        assert_eq!(paths.db_path, PathBuf::from("/tmp/catalog/clients.db"));
        assert_eq!(paths.config_path, PathBuf::from("/tmp/catalog/config.json"));
        assert_eq!(paths.thumbnail_dir, PathBuf::from("/tmp/catalog/cache"));
    }
}
