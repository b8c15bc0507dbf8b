//! # Flag Sets
//!
//! Command-line flags enter the aggregator through [`FlagSetProvider`]. Any
//! type able to enumerate flag sets (a name plus `name = value` definitions)
//! can be registered; an adapter for `clap::ArgMatches` is provided.

use crate::store::Store;
use clap::ArgMatches;
use errors::SourceError;
use serde_json::Value;
use tracing::debug;

/// One flag definition and its current value. `Null` means unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    pub name: String,
    pub value: Value,
}

/// A named group of flags, typically one command or subcommand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagSet {
    name: String,
    flags: Vec<Flag>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: Vec::new(),
        }
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add(name, value);
        self
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.flags.push(Flag {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Bind every flag into a fresh store keyed by flag name.
    ///
    /// Fails as a whole when a flag has no name.
    pub fn bind(&self) -> Result<Store, SourceError> {
        let mut store = Store::new();
        for flag in &self.flags {
            if flag.name.is_empty() {
                return Err(SourceError::FlagBind {
                    flag_set: self.name.clone(),
                    reason: "flag has an empty name".to_string(),
                });
            }
            store.set(&flag.name, flag.value.clone());
        }
        Ok(store)
    }
}

/// Anything that can enumerate its flag sets.
pub trait FlagSetProvider {
    fn visit_all(&self, visit: &mut dyn FnMut(&FlagSet));
}

impl FlagSetProvider for FlagSet {
    fn visit_all(&self, visit: &mut dyn FnMut(&FlagSet)) {
        visit(self);
    }
}

impl FlagSetProvider for Vec<FlagSet> {
    fn visit_all(&self, visit: &mut dyn FnMut(&FlagSet)) {
        self.iter().for_each(|set| visit(set));
    }
}

impl<P: FlagSetProvider + ?Sized> FlagSetProvider for &P {
    fn visit_all(&self, visit: &mut dyn FnMut(&FlagSet)) {
        (**self).visit_all(visit);
    }
}

/// Parsed `clap` arguments. The root command is visited first, then each
/// nested subcommand as its own flag set.
impl FlagSetProvider for ArgMatches {
    fn visit_all(&self, visit: &mut dyn FnMut(&FlagSet)) {
        let mut name = String::new();
        let mut matches = Some(self);

        while let Some(current) = matches {
            visit(&flag_set_from_matches(&name, current));

            matches = current.subcommand().map(|(sub, sub_matches)| {
                name = sub.to_string();
                sub_matches
            });
        }
    }
}

fn flag_set_from_matches(name: &str, matches: &ArgMatches) -> FlagSet {
    let mut set = FlagSet::new(name);

    for id in matches.ids() {
        let id = id.as_str();
        let mut raw: Vec<Value> = match matches.try_get_raw(id) {
            Ok(Some(values)) => values
                .map(|v| Value::String(v.to_string_lossy().into_owned()))
                .collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!("No raw value for argument {}: {}", id, e);
                Vec::new()
            }
        };

        let value = match raw.len() {
            0 => Value::Null,
            1 => raw.remove(0),
            _ => Value::Array(raw),
        };
        set.add(id, value);
    }

    set
}
