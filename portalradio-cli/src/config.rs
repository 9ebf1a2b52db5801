//! Configuration file support for portalradio.
//!
//! Configuration is loaded from multiple sources with the following priority (highest first):
//! 1. Command-line arguments
//! 2. Environment variables (PORTALRADIO_*)
//! 3. Local config file (./portalradio.toml)
//! 4. Global config file (~/.config/portalradio/config.toml)

use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Connection configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Fixed serial port (e.g., "/dev/ttyACM0" or "COM3"); skips discovery.
    pub serial: Option<String>,
    /// Baud rate.
    pub baud: Option<u32>,
}

/// Port cache configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache file location.
    pub file: Option<PathBuf>,
    /// Whether the cache is read and written (default: true).
    pub enabled: Option<bool>,
}

impl CacheConfig {
    /// Whether the port cache should be used.
    pub fn is_enabled(&self) -> bool {
        self.enabled
            .unwrap_or(true)
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection configuration.
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Port cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from all available sources.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global_config) = Self::load_from_file(&global_path) {
                debug!("Loaded global config from {}", global_path.display());
                config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        if let Some(local_config) = Self::load_from_file(Path::new("portalradio.toml")) {
            debug!("Loaded local config from portalradio.toml");
            config.merge(local_config);
        }

        config
    }

    /// Load configuration from a specific file path (--config flag).
    pub fn load_from_path(path: &Path) -> Self {
        if let Some(config) = Self::load_from_file(path) {
            debug!("Loaded config from {}", path.display());
            config
        } else {
            warn!(
                "Could not load config from {}, using defaults",
                path.display()
            );
            Self::default()
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!("Failed to parse config file {}: {}", path.display(), e);
                    None
                },
            },
            Err(e) => {
                warn!("Failed to read config file {}: {}", path.display(), e);
                None
            },
        }
    }

    /// Get the global configuration directory.
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "portalradio").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the global configuration file path.
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Merge another config into this one.
    fn merge(&mut self, other: Self) {
        if other.connection.serial.is_some() {
            self.connection.serial = other.connection.serial;
        }
        if other.connection.baud.is_some() {
            self.connection.baud = other.connection.baud;
        }

        if other.cache.file.is_some() {
            self.cache.file = other.cache.file;
        }
        if other.cache.enabled.is_some() {
            self.cache.enabled = other.cache.enabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // ---- Default values ----

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.connection.serial.is_none());
        assert!(config.connection.baud.is_none());
        assert!(config.cache.file.is_none());
        assert!(config.cache.is_enabled());
    }

    // ---- Config merge ----

    #[test]
    fn test_config_merge_overrides_set_values() {
        let mut base = Config::default();
        base.connection.baud = Some(9600);

        let mut other = Config::default();
        other.connection.serial = Some("/dev/ttyACM0".to_string());
        other.connection.baud = Some(115200);
        other.cache.file = Some(PathBuf::from("/tmp/port.txt"));

        base.merge(other);

        assert_eq!(base.connection.serial.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(base.connection.baud, Some(115200));
        assert_eq!(base.cache.file, Some(PathBuf::from("/tmp/port.txt")));
    }

    #[test]
    fn test_config_merge_does_not_overwrite_with_none() {
        let mut base = Config::default();
        base.connection.serial = Some("COM3".to_string());
        base.cache.enabled = Some(false);

        base.merge(Config::default());

        assert_eq!(base.connection.serial.as_deref(), Some("COM3"));
        assert!(!base.cache.is_enabled());
    }

    #[test]
    fn test_config_merge_can_reenable_cache() {
        let mut base = Config::default();
        base.cache.enabled = Some(false);

        let mut other = Config::default();
        other.cache.enabled = Some(true);
        base.merge(other);

        assert!(base.cache.is_enabled());
    }

    // ---- TOML deserialization ----

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[connection]
serial = "/dev/ttyACM0"
baud = 9600

[cache]
file = "/var/tmp/portalradio_port.txt"
enabled = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.connection.serial.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(config.connection.baud, Some(9600));
        assert_eq!(
            config.cache.file,
            Some(PathBuf::from("/var/tmp/portalradio_port.txt"))
        );
        assert!(!config.cache.is_enabled());
    }

    #[test]
    fn test_config_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.connection.serial.is_none());
        assert!(config.cache.is_enabled());
    }

    // ---- load_from_path ----

    #[test]
    fn test_load_from_path_valid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[connection]\nbaud = 57600\n").unwrap();

        let config = Config::load_from_path(&path);
        assert_eq!(config.connection.baud, Some(57600));
    }

    #[test]
    fn test_load_from_path_invalid_toml_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[connection\nbaud = ").unwrap();

        let config = Config::load_from_path(&path);
        assert!(config.connection.baud.is_none());
    }

    #[test]
    fn test_load_from_path_nonexistent() {
        let config = Config::load_from_path(Path::new("/nonexistent/path/config.toml"));
        assert!(config.connection.serial.is_none());
    }

    #[test]
    fn test_global_config_path_mentions_app() {
        if let Some(p) = Config::global_config_path() {
            assert!(p.to_str().unwrap().contains("portalradio"));
            assert!(p.to_str().unwrap().ends_with("config.toml"));
        }
    }
}
