use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{FolioError, Result};

pub const ENV_API_BASE_URL: &str = "FOLIO_API_BASE_URL";
pub const ENV_BIND: &str = "FOLIO_BIND";
pub const ENV_DATABASE_URL: &str = "FOLIO_DATABASE_URL";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Configuration shared by the folio client, server and CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FolioConfig {
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL of the persistence service
    pub base_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind: String,
    /// SQLite URL; `${HOME}` is expanded on load
    pub database_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            database_url: "sqlite://${HOME}/.folio/folio.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoggingSettings {
    /// Default filter when RUST_LOG is unset (e.g. "info", "folio_core=debug")
    pub level: Option<String>,
}

impl FolioConfig {
    /// Load ~/.folio/config.toml, then apply FOLIO_* environment overrides.
    ///
    /// A missing file is not an error: defaults are used.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|key| env::var(key).ok());
        config.expand_variables(|key| env::var(key).ok());
        Ok(config)
    }

    /// Get config file path: ~/.folio/config.toml
    pub fn config_path() -> PathBuf {
        Self::folio_home().join("config.toml")
    }

    /// ~/.folio
    pub fn folio_home() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".folio")
    }

    /// Parse a config file without applying overrides or expansion
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FolioError::config(path, e.to_string()))
    }

    /// Write the config as TOML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FolioError::config(path, e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Override settings from FOLIO_* variables; empty values are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_BASE_URL) {
            self.client.base_url = url;
        }
        if let Some(bind) = get(ENV_BIND) {
            self.server.bind = bind;
        }
        if let Some(url) = get(ENV_DATABASE_URL) {
            self.server.database_url = url;
        }
    }

    /// Expand ${VAR} references in string settings
    pub fn expand_variables<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.client.base_url = expand_string(&self.client.base_url, &lookup);
        self.server.database_url = expand_string(&self.server.database_url, &lookup);
    }
}

/// Replace each `${NAME}` with `lookup(NAME)`, empty when unset.
/// An unterminated `${` is left as is.
fn expand_string<F>(s: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                result.push_str(&lookup(name).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = FolioConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, FolioConfig::default());
        assert_eq!(config.client.base_url, "http://localhost:8000");
        assert_eq!(config.server.bind, "127.0.0.1:8000");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[client]\nbase_url = \"http://studio:9000\"\n").unwrap();

        let config = FolioConfig::load_from(&path).unwrap();
        assert_eq!(config.client.base_url, "http://studio:9000");
        assert_eq!(config.server, ServerSettings::default());
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[client\nbase_url = 1").unwrap();

        let err = FolioConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, FolioError::Config { ref path, .. } if path.ends_with("config.toml")));
    }

    #[test]
    fn env_overrides_file() {
        let mut config = FolioConfig::default();
        config.apply_env(vars(&[
            (ENV_API_BASE_URL, "http://remote:8000"),
            (ENV_BIND, "  "),
            (ENV_DATABASE_URL, "sqlite::memory:"),
        ]));

        assert_eq!(config.client.base_url, "http://remote:8000");
        assert_eq!(config.server.bind, DEFAULT_BIND, "blank value ignored");
        assert_eq!(config.server.database_url, "sqlite::memory:");
    }

    #[test]
    fn expands_home() {
        let mut config = FolioConfig::default();
        config.expand_variables(vars(&[("HOME", "/home/sofer")]));
        assert_eq!(
            config.server.database_url,
            "sqlite:///home/sofer/.folio/folio.db"
        );
    }

    #[test]
    fn expand_leaves_unterminated_reference() {
        let lookup = vars(&[("A", "x")]);
        assert_eq!(expand_string("${A}/${B}/${C", &lookup), "x//${C");
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = FolioConfig::default();
        config.logging.level = Some("debug".into());
        config.save_to(&path).unwrap();

        assert_eq!(FolioConfig::load_from(&path).unwrap(), config);
    }
}
