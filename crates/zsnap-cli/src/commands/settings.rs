//! Settings command handlers

use anyhow::{bail, Context, Result};

use zsnap_core::defaults::{CHECK_UPDATES, LOAD_EXTERNALS, LOG_UPLOADS, STORE_BACKUPS};
use zsnap_core::{Config, SettingValue, Storage};

use super::open_settings;
use crate::output::Output;

/// Settings that only accept `True` or `False`
const BOOL_KEYS: &[&str] = &[STORE_BACKUPS, LOG_UPLOADS, LOAD_EXTERNALS, CHECK_UPDATES];

/// Show every setting in the application namespace
pub fn show(config: &Config, output: &Output) -> Result<()> {
    let (_, loaded) = open_settings(config)?;
    output.print_namespace(loaded.settings.namespace());
    Ok(())
}

/// Show one stored setting
pub fn get(config: &Config, key: String, output: &Output) -> Result<()> {
    let (_, loaded) = open_settings(config)?;
    let value = loaded.settings.namespace().get(&key)?;
    output.print_value(&key, value);
    Ok(())
}

/// Change one setting and write the store back
pub fn set(config: &Config, key: String, value: String, output: &Output) -> Result<()> {
    let (mut storage, loaded) = open_settings(config)?;

    let mut draft = loaded.settings.namespace().edit();
    let stored = normalize(&key, &value)?;
    draft.set(key.as_str(), stored.as_str());
    storage.put_namespace(draft.lock());

    write_back(&storage)?;
    output.success(&format!("Set {} = {}", key, stored));
    Ok(())
}

/// Remove a setting; keys with defaults come back on the next start
pub fn unset(config: &Config, key: String, output: &Output) -> Result<()> {
    let (mut storage, loaded) = open_settings(config)?;

    let mut draft = loaded.settings.namespace().edit();
    if draft.remove(&key).is_none() {
        bail!("Setting '{}' is not defined", key);
    }
    storage.put_namespace(draft.lock());

    write_back(&storage)?;
    output.success(&format!("Removed {}", key));
    Ok(())
}

fn write_back(storage: &Storage) -> Result<()> {
    storage
        .writeback()
        .with_context(|| format!("Failed to save settings to {}", storage.path().display()))
}

/// Validate a value for `key` and return its stored form
fn normalize(key: &str, value: &str) -> Result<String> {
    if BOOL_KEYS.contains(&key) {
        let Some(flag) = bool::parse_setting(value) else {
            bail!("Invalid value for {}: '{}'. Use 'true' or 'false'.", key, value);
        };
        return Ok(flag.to_setting());
    }
    Ok(value.to_string())
}
