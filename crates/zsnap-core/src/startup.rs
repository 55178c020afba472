//! Settings startup sequence
//!
//! Brings the application's namespace into its final, locked state:
//!
//! 1. Look the namespace up in the registry.
//! 2. If it is missing, register the defaults, write them back, and look it
//!    up again, so first run and later runs go through the same path.
//! 3. Fill in any keys the defaults define but the loaded namespace lacks.
//! 4. Lock the result and hand it out as [`AppSettings`].
//!
//! The merged namespace replaces the loaded one in the registry but is not
//! written back; only a first run writes the settings file.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::defaults::{
    CAPTURE_MODE, CHECK_UPDATES, HOSTING_SERVICE, LOAD_EXTERNALS, LOG_UPLOADS, STORE_BACKUPS,
};
use crate::namespace::Namespace;
use crate::storage::{Storage, StorageResult};
use crate::value::SettingValue;

/// How often the application re-runs the update check while it is enabled
pub const UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Outcome of [`load_settings`]
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    /// The locked application settings
    pub settings: AppSettings,
    /// Whether the defaults had to be seeded and written back
    pub first_run: bool,
    /// How many keys were filled in from the defaults
    pub keys_added: usize,
}

/// Run the startup sequence for the namespace named by `defaults`
pub fn load_settings(storage: &mut Storage, defaults: &Namespace) -> StorageResult<LoadedSettings> {
    let mut first_run = false;

    let mut draft = loop {
        match storage.get_namespace(defaults.name()) {
            Some(loaded) => break loaded.edit(),
            None => {
                info!(namespace = %defaults.name(), "First run, writing default settings");
                storage.add_namespace(defaults.clone())?;
                if let Err(e) = storage.writeback() {
                    // Only what reached the file may stay registered
                    storage.discard_namespace(defaults.name());
                    return Err(e);
                }
                first_run = true;
            }
        }
    };

    let keys_added = draft.merge_defaults(defaults);
    let settings = draft.lock();
    storage.put_namespace(settings.clone());

    debug!(
        namespace = %settings.name(),
        keys = settings.len(),
        keys_added,
        first_run,
        "Settings loaded and locked"
    );

    Ok(LoadedSettings {
        settings: AppSettings::new(settings, defaults.clone()),
        first_run,
        keys_added,
    })
}

/// Read-only view of the application's settings
///
/// Cheap to clone and safe to share between threads. Every getter falls
/// back to the default namespace when the stored value is missing or
/// malformed, so reading a setting never fails.
#[derive(Debug, Clone)]
pub struct AppSettings {
    settings: Arc<Namespace>,
    defaults: Arc<Namespace>,
}

impl AppSettings {
    pub fn new(settings: Namespace, defaults: Namespace) -> Self {
        Self {
            settings: Arc::new(settings),
            defaults: Arc::new(defaults),
        }
    }

    /// The underlying locked namespace
    pub fn namespace(&self) -> &Namespace {
        &self.settings
    }

    /// The defaults used for fallback
    pub fn defaults(&self) -> &Namespace {
        &self.defaults
    }

    /// Read `key` as `T`, falling back to its default value
    ///
    /// Returns `None` only if neither the settings nor the defaults hold a
    /// usable value.
    pub fn value<T: SettingValue>(&self, key: &str) -> Option<T> {
        if let Some(value) = self.settings.retrieve_safe(key) {
            return Some(value);
        }

        let fallback = self.defaults.retrieve_safe(key);
        if fallback.is_some() {
            warn!(
                namespace = %self.settings.name(),
                key,
                "Setting missing or malformed, using default"
            );
        }
        fallback
    }

    /// Read a boolean setting, with default fallback
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.value(key)
    }

    pub fn store_backups(&self) -> bool {
        self.flag(STORE_BACKUPS).unwrap_or(false)
    }

    pub fn log_uploads(&self) -> bool {
        self.flag(LOG_UPLOADS).unwrap_or(false)
    }

    pub fn load_externals(&self) -> bool {
        self.flag(LOAD_EXTERNALS).unwrap_or(false)
    }

    pub fn check_updates(&self) -> bool {
        self.flag(CHECK_UPDATES).unwrap_or(false)
    }

    /// Selected capture mode, if the user has chosen one
    pub fn capture_mode(&self) -> Option<String> {
        self.value(CAPTURE_MODE)
    }

    /// Selected upload destination, if the user has chosen one
    pub fn hosting_service(&self) -> Option<String> {
        self.value(HOSTING_SERVICE)
    }

    /// Interval for the periodic update check, or `None` if it is disabled
    pub fn update_check_schedule(&self) -> Option<Duration> {
        self.check_updates().then_some(UPDATE_CHECK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{default_settings, APP_NAMESPACE};
    use crate::namespace::NamespaceBuilder;
    use crate::storage::StorageError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn settings_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("settings.toml")
    }

    fn seed(path: &PathBuf, entries: &[(&str, &str)]) {
        let mut storage = Storage::open(path).unwrap();
        storage
            .add_namespace(NamespaceBuilder::with_entries(APP_NAMESPACE, entries.iter().copied()).lock())
            .unwrap();
        storage.writeback().unwrap();
    }

    #[test]
    fn test_first_run_seeds_exactly_the_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = settings_path(&temp_dir);
        let defaults = default_settings();

        let mut storage = Storage::open(&path).unwrap();
        assert!(storage.get_namespace(APP_NAMESPACE).is_none());

        let loaded = load_settings(&mut storage, &defaults).unwrap();
        assert!(loaded.first_run);
        assert_eq!(loaded.keys_added, 0);
        assert_eq!(loaded.settings.namespace(), &defaults);

        // The defaults were persisted, not just kept in memory
        let reopened = Storage::open(&path).unwrap();
        let persisted = reopened.get_namespace(APP_NAMESPACE).unwrap();
        assert_eq!(
            persisted.iter().collect::<Vec<_>>(),
            vec![
                ("CheckUpdates", "True"),
                ("LoadExternals", "True"),
                ("LogUploads", "True"),
                ("StoreBackups", "True"),
            ]
        );
    }

    #[test]
    fn test_existing_values_survive_merge() {
        let temp_dir = TempDir::new().unwrap();
        let path = settings_path(&temp_dir);
        seed(&path, &[(CHECK_UPDATES, "False")]);

        let mut storage = Storage::open(&path).unwrap();
        let loaded = load_settings(&mut storage, &default_settings()).unwrap();

        assert!(!loaded.first_run);
        assert_eq!(loaded.keys_added, 3);

        let ns = loaded.settings.namespace();
        assert_eq!(ns.get(CHECK_UPDATES).unwrap(), "False");
        assert_eq!(ns.get(STORE_BACKUPS).unwrap(), "True");
        assert_eq!(ns.get(LOAD_EXTERNALS).unwrap(), "True");
        assert_eq!(ns.get(LOG_UPLOADS).unwrap(), "True");
        assert!(!loaded.settings.check_updates());
        assert!(loaded.settings.update_check_schedule().is_none());
    }

    #[test]
    fn test_merge_updates_registry_but_not_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = settings_path(&temp_dir);
        seed(&path, &[(LOG_UPLOADS, "False")]);

        let mut storage = Storage::open(&path).unwrap();
        let loaded = load_settings(&mut storage, &default_settings()).unwrap();

        assert_eq!(storage.get_namespace(APP_NAMESPACE), Some(loaded.settings.namespace()));

        let reopened = Storage::open(&path).unwrap();
        assert_eq!(reopened.get_namespace(APP_NAMESPACE).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let path = settings_path(&temp_dir);
        seed(&path, &[("RetiredSetting", "x"), (HOSTING_SERVICE, "Imgur")]);

        let mut storage = Storage::open(&path).unwrap();
        let loaded = load_settings(&mut storage, &default_settings()).unwrap();

        let ns = loaded.settings.namespace();
        assert_eq!(ns.get("RetiredSetting").unwrap(), "x");
        assert_eq!(loaded.settings.hosting_service(), Some("Imgur".to_string()));
        assert_eq!(loaded.settings.capture_mode(), None);
    }

    #[test]
    fn test_running_startup_twice_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let path = settings_path(&temp_dir);
        let defaults = default_settings();

        let mut storage = Storage::open(&path).unwrap();
        let first = load_settings(&mut storage, &defaults).unwrap();
        let second = load_settings(&mut storage, &defaults).unwrap();

        assert!(first.first_run);
        assert!(!second.first_run);
        assert_eq!(second.keys_added, 0);
        assert_eq!(first.settings.namespace(), second.settings.namespace());
    }

    #[test]
    fn test_failed_first_write_leaves_registry_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = settings_path(&temp_dir);
        let defaults = default_settings();
        // A directory where the temp file would go makes the write fail
        fs::create_dir(path.with_extension("tmp")).unwrap();

        let mut storage = Storage::open(&path).unwrap();
        let err = load_settings(&mut storage, &defaults).unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed { .. }));
        assert!(storage.get_namespace(APP_NAMESPACE).is_none());
        assert!(!path.exists());

        // Once the medium is writable again, the next attempt is a first run
        fs::remove_dir(path.with_extension("tmp")).unwrap();
        let loaded = load_settings(&mut storage, &defaults).unwrap();
        assert!(loaded.first_run);
        assert!(path.exists());
    }

    #[test]
    fn test_malformed_flag_falls_back_to_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = settings_path(&temp_dir);
        seed(&path, &[(CHECK_UPDATES, "notabool")]);

        let mut storage = Storage::open(&path).unwrap();
        let loaded = load_settings(&mut storage, &default_settings()).unwrap();

        // The stored value is kept as-is; only the typed read falls back
        assert_eq!(loaded.settings.namespace().retrieve_safe::<bool>(CHECK_UPDATES), None);
        assert!(loaded.settings.check_updates());
        assert_eq!(
            loaded.settings.update_check_schedule(),
            Some(UPDATE_CHECK_INTERVAL)
        );
    }

    #[test]
    fn test_flag_without_default_is_none() {
        let settings = AppSettings::new(
            NamespaceBuilder::with_entries(APP_NAMESPACE, [("Beta", "yes")]).lock(),
            default_settings(),
        );

        assert_eq!(settings.flag("Beta"), None);
        assert_eq!(settings.flag("Unknown"), None);
        assert!(settings.store_backups());
    }

    #[test]
    fn test_unopenable_storage_never_reaches_startup() {
        let temp_dir = TempDir::new().unwrap();
        let path = settings_path(&temp_dir);
        fs::write(&path, "[zsnap\nCheckUpdates = ").unwrap();

        let result = Storage::open(&path);
        assert!(matches!(result, Err(StorageError::Inaccessible { .. })));
    }

    #[test]
    fn test_settings_shared_across_threads() {
        let settings = AppSettings::new(default_settings(), default_settings());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let settings = settings.clone();
                std::thread::spawn(move || settings.check_updates() && settings.log_uploads())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
