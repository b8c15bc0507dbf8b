//! # Key Normalization
//!
//! Turns arbitrary configuration key paths into environment variable names.
//!
//! Every run of disallowed characters collapses to a single `_` and the
//! result is upper-cased: `services.go.image` becomes `SERVICES_GO_IMAGE`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which characters survive normalization untouched.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum KeyMode {
    /// `A-Z`, `a-z`, `0-9` and `_`.
    #[default]
    Strict,

    /// The ASCII range `A` through `z`, digits and `_`.
    ///
    /// Also lets `[`, `\`, `]`, `^` and `` ` `` through, matching older
    /// deployments that normalized keys with an `[A-z]` character range.
    Legacy,
}

impl KeyMode {
    fn allows(self, c: char) -> bool {
        match self {
            Self::Strict => c.is_ascii_alphanumeric() || c == '_',
            Self::Legacy => c.is_ascii_digit() || c == '_' || ('A'..='z').contains(&c),
        }
    }
}

/// Normalize a key into its environment variable name.
///
/// ```
/// use envi::{KeyMode, fix_key_name};
///
/// assert_eq!(fix_key_name("services.go.image", KeyMode::Strict), "SERVICES_GO_IMAGE");
/// assert_eq!(fix_key_name("log--level", KeyMode::Strict), "LOG_LEVEL");
/// ```
pub fn fix_key_name(key: &str, mode: KeyMode) -> String {
    let mut name = String::with_capacity(key.len());
    let mut in_run = false;

    for c in key.chars() {
        if mode.allows(c) {
            name.push(c.to_ascii_uppercase());
            in_run = false;
        } else if !in_run {
            name.push('_');
            in_run = true;
        }
    }

    name
}
