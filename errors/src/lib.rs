//! # Envi Errors
//!
//! Error taxonomy for the envi workspace.
//!
//! - Uses `thiserror` for structured error definitions
//! - Named fields carry the context needed to diagnose a suppressed failure

use thiserror::Error;

/// A configuration source could not be read, parsed, bound, or exported.
///
/// The aggregator never escalates these; they are collected into a report
/// so callers can opt into observing them.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Failed to parse {path} as {format}: {reason}")]
    Parse {
        format: String,
        path: String,
        reason: String
    },

    #[error("Unsupported source format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to bind flag set {flag_set}: {reason}")]
    FlagBind { flag_set: String, reason: String },

    #[error("Failed to encode {key} for export: {reason}")]
    Encode { key: String, reason: String }
}

impl SourceError {
    /// True when the source simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while loading the aggregator's own settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings file not found: {path}")]
    FileNotFound { path: String },

    #[error("Settings file has no extension: {path}")]
    NoExtension { path: String },

    #[error("Unsupported settings file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Failed to parse settings: {reason}")]
    Parse { reason: String },

    #[error("Invalid settings: {reason}")]
    Invalid { reason: String }
}
