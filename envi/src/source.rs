//! # Source File Loading
//!
//! Decodes configuration files into isolated [`Store`]s.
//!
//! The format is chosen by name rather than by extension so that files such
//! as `.env` or `config.test` can be loaded explicitly.

use crate::store::Store;
use errors::SourceError;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;
use strum::{Display, EnumString};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Format {
    #[strum(to_string = "json")]
    Json,

    #[strum(to_string = "yaml", serialize = "yml")]
    Yaml,

    #[strum(to_string = "toml")]
    Toml,

    /// `KEY=VALUE` lines; values are always strings.
    #[strum(to_string = "dotenv", serialize = "env")]
    Dotenv,
}

/// Load a file of the named format into a fresh store.
///
/// ## Errors
/// - `UnsupportedFormat` when `format` names no known format
/// - `NotFound` when the file does not exist
/// - `FileRead` for any other IO failure
/// - `Parse` when the content is not valid for the format
pub fn load_store(format: &str, path: &Path) -> Result<Store, SourceError> {
    let format: Format = format
        .parse()
        .map_err(|_| SourceError::UnsupportedFormat {
            format: format.to_string(),
        })?;

    let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SourceError::NotFound {
            path: path.display().to_string(),
        },
        _ => SourceError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        },
    })?;

    parse_store(format, &contents).map_err(|reason| SourceError::Parse {
        format: format.to_string(),
        path: path.display().to_string(),
        reason,
    })
}

/// Decode in-memory content of a known format.
pub fn parse_store(format: Format, contents: &str) -> Result<Store, String> {
    let document: Value = match format {
        Format::Json => serde_json::from_str(contents).map_err(|e| e.to_string())?,
        Format::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string())?,
        Format::Toml => toml::from_str(contents).map_err(|e| e.to_string())?,
        Format::Dotenv => return parse_dotenv(contents),
    };

    Ok(Store::from_value(document))
}

fn parse_dotenv(contents: &str) -> Result<Store, String> {
    let mut store = Store::new();
    for item in dotenvy::from_read_iter(contents.as_bytes()) {
        let (key, value) = item.map_err(|e| e.to_string())?;
        store.set(&key, value);
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("YML".parse::<Format>().unwrap(), Format::Yaml);
        assert_eq!("Yaml".parse::<Format>().unwrap(), Format::Yaml);
        assert_eq!("env".parse::<Format>().unwrap(), Format::Dotenv);
        assert_eq!(Format::Dotenv.to_string(), "dotenv");
        assert!("hcl".parse::<Format>().is_err());
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.json", r#"{"message": "hello world", "count": 3}"#);

        let store = load_store("json", &path).unwrap();
        assert_eq!(store.get_string("message"), "hello world");
        assert_eq!(store.get("count"), Some(json!(3)));
    }

    #[test]
    fn test_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "config.yml",
            r#"
version: "3.8"
services:
  go:
    image: golang:1.15-buster
"#,
        );

        let store = load_store("yaml", &path).unwrap();
        assert_eq!(store.get_string("version"), "3.8");
        assert_eq!(store.get_string("services.go.image"), "golang:1.15-buster");
    }

    #[test]
    fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "config.toml",
            r#"
message = "hello world"

[database]
port = 5432
"#,
        );

        let store = load_store("toml", &path).unwrap();
        assert_eq!(store.get_string("message"), "hello world");
        assert_eq!(store.get_string("database.port"), "5432");
    }

    #[test]
    fn test_load_dotenv() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            ".env.test",
            "# comment\nMESSAGE=\"hello world\"\nEMPTY=\n",
        );

        let store = load_store("dotenv", &path).unwrap();
        assert_eq!(store.get_string("MESSAGE"), "hello world");
        assert_eq!(store.get("empty"), Some(json!("")));
    }

    #[test]
    fn test_load_unsupported_format() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.hcl", "a = 1");

        let result = load_store("hcl", &path);
        assert!(matches!(result, Err(SourceError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_load_not_found() {
        let result = load_store("json", Path::new("/nonexistent/path/config.json"));
        assert!(matches!(result, Err(SourceError::NotFound { .. })));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.json", r#"{"message": "#);

        let result = load_store("json", &path);
        assert!(matches!(result, Err(SourceError::Parse { .. })));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.yaml", "invalid: [unmatched\n");

        let result = load_store("yaml", &path);
        assert!(matches!(result, Err(SourceError::Parse { .. })));
    }
}
