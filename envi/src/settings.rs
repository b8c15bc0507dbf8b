//! # Aggregator Settings
//!
//! Knobs controlling how sources are merged and exported.
//!
//! Settings can be built in code, read from `ENVI_*` environment variables,
//! or loaded from a TOML/YAML file.
//!
//! # Environment Variables
//! - `ENVI_DOTENV_FILE`: default dotenv file merged on initialize (default: `.env`)
//! - `ENVI_KEY_MODE`: `strict` or `legacy` (default: `strict`)
//! - `ENVI_RETAIN_ORIGINAL_KEYS`: keep original file keys next to normalized ones (default: `true`)
//! - `ENVI_AUTOMATIC_ENV`: let existing variables override file values (default: `true`)

use crate::key::KeyMode;
use errors::SettingsError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;
use validator::Validate;

/// Aggregator settings.
///
/// ## Fields
/// - `dotenv_file`: path of the dotenv file merged between optional and main
///   sources; a missing file is ignored
/// - `key_mode`: character set kept by key normalization
/// - `retain_original_keys`: when a file key differs from its normalized
///   name, also store it under the original key
/// - `automatic_env`: when a file key's upper-cased name is already set in
///   the environment, that value wins over the file
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct Settings {
    #[validate(length(min = 1))]
    pub dotenv_file: String,

    pub key_mode: KeyMode,

    pub retain_original_keys: bool,

    pub automatic_env: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dotenv_file: ".env".to_string(),
            key_mode: KeyMode::Strict,
            retain_original_keys: true,
            automatic_env: true,
        }
    }
}

impl Settings {
    /// Read settings from `ENVI_*` variables, keeping defaults for anything
    /// unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            dotenv_file: env::var("ENVI_DOTENV_FILE")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.dotenv_file),
            key_mode: parse_env("ENVI_KEY_MODE").unwrap_or(defaults.key_mode),
            retain_original_keys: parse_env("ENVI_RETAIN_ORIGINAL_KEYS")
                .unwrap_or(defaults.retain_original_keys),
            automatic_env: parse_env("ENVI_AUTOMATIC_ENV").unwrap_or(defaults.automatic_env),
        }
    }

    /// Load settings from a `.toml`, `.yaml` or `.yml` file and validate them.
    ///
    /// ## Errors
    /// Returns `SettingsError` for a missing file, an unknown extension,
    /// invalid syntax, or values failing validation.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SettingsError::NoExtension {
                path: path.display().to_string(),
            })?
            .to_lowercase();

        let contents =
            std::fs::read_to_string(path).map_err(|_e| SettingsError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let settings: Settings = match extension.as_str() {
            "toml" => toml::from_str(&contents).map_err(|e| SettingsError::Parse {
                reason: e.to_string(),
            })?,
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| SettingsError::Parse {
                reason: e.to_string(),
            })?,
            other => {
                return Err(SettingsError::UnsupportedFormat {
                    extension: other.to_string(),
                });
            }
        };

        settings.validate().map_err(|e| SettingsError::Invalid {
            reason: e.to_string(),
        })?;

        Ok(settings)
    }
}

fn parse_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        unsafe {
            env::remove_var("ENVI_DOTENV_FILE");
            env::remove_var("ENVI_KEY_MODE");
            env::remove_var("ENVI_RETAIN_ORIGINAL_KEYS");
            env::remove_var("ENVI_AUTOMATIC_ENV");
        }
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.dotenv_file, ".env");
        assert_eq!(settings.key_mode, KeyMode::Strict);
        assert!(settings.retain_original_keys);
        assert!(settings.automatic_env);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_dotenv_file_is_invalid() {
        let settings = Settings {
            dotenv_file: String::new(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        assert_eq!(Settings::from_env(), Settings::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        unsafe {
            env::set_var("ENVI_DOTENV_FILE", "config/.env.local");
            env::set_var("ENVI_KEY_MODE", "legacy");
            env::set_var("ENVI_RETAIN_ORIGINAL_KEYS", "false");
        }

        let settings = Settings::from_env();
        clear_env();

        assert_eq!(settings.dotenv_file, "config/.env.local");
        assert_eq!(settings.key_mode, KeyMode::Legacy);
        assert!(!settings.retain_original_keys);
        assert!(settings.automatic_env);
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_invalid_values() {
        clear_env();
        unsafe {
            env::set_var("ENVI_KEY_MODE", "loose");
            env::set_var("ENVI_AUTOMATIC_ENV", "sometimes");
        }

        let settings = Settings::from_env();
        clear_env();

        assert_eq!(settings.key_mode, KeyMode::Strict);
        assert!(settings.automatic_env);
    }

    #[test]
    fn test_from_file_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("envi.toml");
        fs::write(
            &path,
            r#"
dotenv_file = ".env.production"
key_mode = "legacy"
"#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.dotenv_file, ".env.production");
        assert_eq!(settings.key_mode, KeyMode::Legacy);
        assert!(settings.retain_original_keys);
    }

    #[test]
    fn test_from_file_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("envi.yml");
        fs::write(&path, "automatic_env: false\nretain_original_keys: false\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert!(!settings.automatic_env);
        assert!(!settings.retain_original_keys);
        assert_eq!(settings.dotenv_file, ".env");
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("envi.toml");
        fs::write(&path, "dotenv_file = \"\"\n").unwrap();

        let result = Settings::from_file(&path);
        assert!(matches!(result, Err(SettingsError::Invalid { .. })));
    }

    #[test]
    fn test_from_file_unsupported_and_missing() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("envi.json");
        fs::write(&json, "{}").unwrap();

        assert!(matches!(
            Settings::from_file(&json),
            Err(SettingsError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            Settings::from_file(&dir.path().join("missing.toml")),
            Err(SettingsError::FileNotFound { .. })
        ));
        assert!(matches!(
            Settings::from_file(&dir.path().join("envi")),
            Err(SettingsError::NoExtension { .. })
        ));
    }
}
