//! # Environment Aggregator
//!
//! Merges registered sources into a [`Registry`] and exports the result as
//! environment variables.
//!
//! # Precedence Order
//! 1. Flag-set providers (highest priority)
//! 2. Main sources
//! 3. Default dotenv file
//! 4. Optional sources (lowest priority)
//!
//! Every step is best-effort: a source that cannot be read, parsed or bound
//! is skipped and recorded in the returned [`Report`].

use crate::env::EnvSink;
use crate::flags::FlagSetProvider;
use crate::key::fix_key_name;
use crate::report::Report;
use crate::settings::Settings;
use crate::source::load_store;
use crate::store::{Normalize, Registry, Store};
use crate::value::export_form;
use errors::SourceError;
use std::path::Path;
use tracing::{debug, info, warn};

/// Aggregates optional sources, main sources and flag-set providers.
///
/// ## Usage
/// ```rust,no_run
/// use envi::{Environment, ProcessEnv, Registry, Store};
/// use serde_json::json;
///
/// let mut environment = Environment::new();
/// environment.register(Some(Store::from_value(json!({"port": 8080}))), true);
///
/// let mut registry = Registry::new();
/// let mut env = ProcessEnv;
/// environment.add_from_file(&mut registry, &env, "yaml", "config.yml");
/// let report = environment.initialize(&mut registry, &mut env);
///
/// for diagnostic in report.iter() {
///     eprintln!("skipped: {diagnostic}");
/// }
/// ```
#[derive(Default)]
pub struct Environment {
    settings: Settings,
    optional_sources: Vec<Store>,
    main_sources: Vec<Store>,
    flag_set_providers: Vec<Box<dyn FlagSetProvider>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Append a source to the optional or main list. `None` is ignored.
    pub fn register(&mut self, source: Option<Store>, optional: bool) {
        let Some(source) = source else {
            return;
        };

        if optional {
            self.optional_sources.push(source);
        } else {
            self.main_sources.push(source);
        }
    }

    pub fn add_flag_set_provider(&mut self, provider: impl FlagSetProvider + 'static) {
        self.flag_set_providers.push(Box::new(provider));
    }

    /// Load a file of the named format and merge its keys, normalized, into
    /// `registry`.
    ///
    /// A missing or malformed file leaves the registry untouched; the failure
    /// is only recorded in the returned report.
    pub fn add_from_file(
        &self,
        registry: &mut Registry,
        env: &dyn EnvSink,
        format: &str,
        path: impl AsRef<Path>,
    ) -> Report {
        let path = path.as_ref();

        let store = match load_store(format, path) {
            Ok(store) => store,
            Err(e) => {
                if e.is_not_found() {
                    debug!("Skipping {} source {}: {}", format, path.display(), e);
                } else {
                    warn!("Skipping {} source {}: {}", format, path.display(), e);
                }
                return Report::from(e);
            }
        };

        let store = if self.settings.automatic_env {
            apply_automatic_env(store, env)
        } else {
            store
        };

        let merged = registry.merge_normalized(
            &store,
            Normalize {
                mode: self.settings.key_mode,
                retain_original: self.settings.retain_original_keys,
                skip_null: false,
            },
        );
        info!("Configuration from {}: {} keys", path.display(), merged);

        Report::new()
    }

    /// Merge every source into `registry` in precedence order, then export
    /// each resolved key to `env`.
    pub fn initialize(&self, registry: &mut Registry, env: &mut dyn EnvSink) -> Report {
        let mut report = Report::new();

        for source in &self.optional_sources {
            let merged = registry.merge_verbatim(source, self.settings.key_mode);
            debug!("Configuration from optional source: {} keys", merged);
        }

        let dotenv_file = Path::new(&self.settings.dotenv_file);
        report.extend(self.add_from_file(registry, &*env, "dotenv", dotenv_file));

        for source in &self.main_sources {
            let merged = registry.merge_verbatim(source, self.settings.key_mode);
            debug!("Configuration from main source: {} keys", merged);
        }

        for provider in &self.flag_set_providers {
            report.extend(self.load_parameters(registry, provider.as_ref()));
        }

        report.extend(self.export(registry, env));

        report
    }

    fn load_parameters(&self, registry: &mut Registry, provider: &dyn FlagSetProvider) -> Report {
        let mut report = Report::new();

        provider.visit_all(&mut |flag_set| match flag_set.bind() {
            Ok(store) => {
                let merged = registry.merge_normalized(
                    &store,
                    Normalize {
                        mode: self.settings.key_mode,
                        retain_original: false,
                        skip_null: true,
                    },
                );
                debug!("Configuration from flag set {:?}: {} keys", flag_set.name(), merged);
            }
            Err(e) => {
                warn!("Skipping flag set {:?}: {}", flag_set.name(), e);
                report.push(e);
            }
        });

        report
    }

    fn export(&self, registry: &Registry, env: &mut dyn EnvSink) -> Report {
        let mut report = Report::new();
        let mut exported = 0;

        for (key, value) in registry.iter() {
            let name = fix_key_name(key, self.settings.key_mode);

            match export_form(value) {
                Ok(Some(text)) => {
                    env.set(&name, &text);
                    exported += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping export of {}: {}", name, e);
                    report.push(SourceError::Encode {
                        key: key.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!("Exported {} environment variables", exported);
        report
    }
}

/// Replace file values whose upper-cased key is already set in `env`.
fn apply_automatic_env(mut store: Store, env: &dyn EnvSink) -> Store {
    let overrides: Vec<(String, String)> = store
        .keys()
        .filter_map(|key| env.get(&key.to_uppercase()).map(|v| (key.to_string(), v)))
        .collect();

    for (key, value) in overrides {
        debug!("Environment overrides file key {}", key);
        store.set(&key, value);
    }

    store
}
