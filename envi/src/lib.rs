//! # Envi
//!
//! Layered configuration aggregation for process startup.
//!
//! This crate provides:
//! - Isolated per-source key/value stores decoded from JSON, YAML, TOML and
//!   dotenv files
//! - A merge with fixed precedence (flags > main sources > `.env` > optional
//!   sources)
//! - Key normalization into environment variable names
//!   (`services.go.image` → `SERVICES_GO_IMAGE`)
//! - Export of every resolved key to the process environment
//!
//! Loading is best-effort. Sources that cannot be read or parsed are
//! skipped, and each operation returns a [`Report`] listing what was skipped.
//!
//! ```rust,no_run
//! use envi::{Environment, ProcessEnv, Registry};
//!
//! let mut environment = Environment::new();
//! environment.add_flag_set_provider(
//!     clap::Command::new("app")
//!         .arg(clap::Arg::new("log-level").long("log-level"))
//!         .get_matches(),
//! );
//!
//! let mut registry = Registry::new();
//! let report = environment.initialize(&mut registry, &mut ProcessEnv);
//! println!("{} sources skipped", report.len());
//! ```

pub mod env;
pub mod environment;
pub mod flags;
pub mod key;
pub mod report;
pub mod settings;
pub mod source;
pub mod store;
pub mod value;

pub use env::{EnvSink, MemoryEnv, ProcessEnv};
pub use environment::Environment;
pub use errors::{SettingsError, SourceError};
pub use flags::{Flag, FlagSet, FlagSetProvider};
pub use key::{KeyMode, fix_key_name};
pub use report::Report;
pub use settings::Settings;
pub use source::{Format, load_store};
pub use store::{Normalize, Registry, Store};
