//! zSnap Core Library
//!
//! This crate provides the persistent settings store for zSnap: a registry
//! of named, lockable key/value namespaces that is merged with built-in
//! defaults at startup and read through typed, non-failing accessors.
//!
//! # Quick Start
//!
//! ```no_run
//! use zsnap_core::{default_settings, load_settings, Config, Storage};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let mut storage = Storage::open(config.settings_path())?;
//! let loaded = load_settings(&mut storage, &default_settings())?;
//!
//! if loaded.settings.check_updates() {
//!     // start the update checker
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - `namespace`: open and locked settings namespaces
//! - `value`: typed conversion of stored strings
//! - `defaults`: built-in default settings and the default merger
//! - `storage`: namespace registry and settings file persistence
//! - `startup`: first-run / merge sequence and `AppSettings`
//! - `config`: application configuration

pub mod config;
pub mod defaults;
pub mod namespace;
pub mod startup;
pub mod storage;
pub mod value;

pub use config::Config;
pub use defaults::{default_settings, APP_NAMESPACE};
pub use namespace::{Namespace, NamespaceBuilder, NamespaceError};
pub use startup::{load_settings, AppSettings, LoadedSettings, UPDATE_CHECK_INTERVAL};
pub use storage::{Storage, StorageError, StorageResult};
pub use value::SettingValue;
