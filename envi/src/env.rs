//! # Environment Sinks
//!
//! Where resolved keys are exported. [`ProcessEnv`] writes the real process
//! environment; [`MemoryEnv`] keeps variables in a map.

use std::collections::BTreeMap;
use tracing::warn;

/// Readable and writable set of environment variables.
pub trait EnvSink {
    fn get(&self, name: &str) -> Option<String>;

    fn set(&mut self, name: &str, value: &str);
}

/// The operating system environment of the current process.
///
/// Writing is only sound while no other thread reads or writes the
/// environment, so exports must happen during single-threaded startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSink for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set(&mut self, name: &str, value: &str) {
        if name.is_empty() || name.contains('=') || name.contains('\0') || value.contains('\0') {
            warn!("Skipping invalid environment variable name: {:?}", name);
            return;
        }

        // SAFETY: exports run during single-threaded initialization.
        unsafe {
            std::env::set_var(name, value);
        }
    }
}

/// In-memory environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: BTreeMap<String, String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvSink for MemoryEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
