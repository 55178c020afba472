//! Command handlers

pub mod config;
pub mod settings;
pub mod status;

use anyhow::{Context, Result};
use tracing::debug;

use zsnap_core::{default_settings, load_settings, Config, LoadedSettings, Storage};

/// Open the settings store and run the startup sequence
///
/// A `StorageError::Inaccessible` from opening the store is passed through
/// unchanged so `main` can report it as a startup failure.
pub fn open_settings(config: &Config) -> Result<(Storage, LoadedSettings)> {
    let path = config.settings_path();
    debug!(path = %path.display(), "Opening settings store");

    let mut storage = Storage::open(path)?;
    let loaded = load_settings(&mut storage, &default_settings())
        .context("Failed to load settings")?;

    Ok((storage, loaded))
}
