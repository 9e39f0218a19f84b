//! TOML-based application configuration.
//!
//! Stores:
//! - Locations of the task file and the validation log
//! - Duplicate-validation policy
//! - Staff authentication settings
//!
//! Configuration is stored at `~/.config/misenplace/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Backing file locations. Relative paths resolve against the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_task_file")]
    pub task_file: PathBuf,
    #[serde(default = "default_validation_log")]
    pub validation_log: PathBuf,
}

/// Which fields make two validations duplicates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// One validation per task per day
    #[default]
    TaskDate,
    /// One validation per task per day per cook
    TaskDateCook,
}

/// Validation behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ValidationConfig {
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

/// How staff sign in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Name only, no password
    #[default]
    Disabled,
    /// Any name with one kitchen-wide password
    SharedPassword,
    /// Each cook has their own password
    NamedUsers,
}

/// Authentication settings. Passwords are stored as hex SHA-256 digests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    #[serde(default)]
    pub shared_password_sha256: Option<String>,
    /// Cook name -> password digest
    #[serde(default)]
    pub users: BTreeMap<String, String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/misenplace/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_task_file() -> PathBuf {
    PathBuf::from("tasks.csv")
}
fn default_validation_log() -> PathBuf {
    PathBuf::from("validations.csv")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            task_file: default_task_file(),
            validation_log: default_validation_log(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default config location inside the data directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                tracing::info!(path = %path.display(), "wrote default configuration");
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// An unset optional value is an empty string; `None` means the key is
    /// unknown.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::Null => Some(String::new()),
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Task file path, resolved against `base`.
    pub fn task_file_in(&self, base: &Path) -> PathBuf {
        base.join(&self.storage.task_file)
    }

    /// Validation log path, resolved against `base`.
    pub fn validation_log_in(&self, base: &Path) -> PathBuf {
        base.join(&self.storage.validation_log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.validation.duplicate_policy, DuplicatePolicy::TaskDate);
        assert_eq!(parsed.auth.mode, AuthMode::Disabled);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[validation]\nduplicate_policy = \"task_date_cook\"\n").unwrap();
        assert_eq!(cfg.validation.duplicate_policy, DuplicatePolicy::TaskDateCook);
        assert_eq!(cfg.storage.task_file, PathBuf::from("tasks.csv"));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("validation.duplicate_policy").as_deref(), Some("task_date"));
        assert_eq!(cfg.get("storage.task_file").as_deref(), Some("tasks.csv"));
        assert!(cfg.get("storage.missing_key").is_none());
    }

    #[test]
    fn get_unset_optional_is_empty() {
        let mut cfg = Config::default();
        assert_eq!(cfg.get("auth.shared_password_sha256").as_deref(), Some(""));

        cfg.set("auth.shared_password_sha256", "abc123").unwrap();
        assert_eq!(cfg.get("auth.shared_password_sha256").as_deref(), Some("abc123"));
    }

    #[test]
    fn set_updates_enum_and_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.set("validation.duplicate_policy", "task_date_cook").unwrap();
        assert_eq!(cfg.validation.duplicate_policy, DuplicatePolicy::TaskDateCook);

        let err = cfg.set("auth.mode", "biometric").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(cfg.auth.mode, AuthMode::Disabled);
    }

    #[test]
    fn set_unknown_key_fails() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.set("ui.dark_mode", "true"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(cfg.set("", "x"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_users_map_from_json() {
        let mut cfg = Config::default();
        cfg.set("auth.users", r#"{"rosa": "abc123"}"#).unwrap();
        assert_eq!(cfg.auth.users.get("rosa").map(String::as_str), Some("abc123"));
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        std::fs::write(&path, "[storage\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::LoadFailed { .. })));
    }

    #[test]
    fn paths_resolve_against_base() {
        let mut cfg = Config::default();
        let base = Path::new("/srv/kitchen");
        assert_eq!(cfg.task_file_in(base), PathBuf::from("/srv/kitchen/tasks.csv"));

        cfg.storage.validation_log = PathBuf::from("/var/log/validations.csv");
        assert_eq!(cfg.validation_log_in(base), PathBuf::from("/var/log/validations.csv"));
    }
}
