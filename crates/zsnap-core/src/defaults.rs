//! Built-in default settings
//!
//! The default namespace holds a fallback value for every setting that has
//! one. Loaded namespaces are reconciled against it by key: missing keys are
//! filled in, existing values always win, and keys the defaults no longer
//! know about are left alone.

use tracing::debug;

use crate::namespace::{Namespace, NamespaceBuilder};

/// Name of the application's settings namespace
pub const APP_NAMESPACE: &str = "zsnap";

/// Capture behavior selector
pub const CAPTURE_MODE: &str = "CaptureMode";
/// Whether captured images are retained locally
pub const STORE_BACKUPS: &str = "StoreBackups";
/// Whether upload events are logged
pub const LOG_UPLOADS: &str = "LogUploads";
/// Whether external add-ons are loaded
pub const LOAD_EXTERNALS: &str = "LoadExternals";
/// Whether the update check runs
pub const CHECK_UPDATES: &str = "CheckUpdates";
/// Selected upload destination
pub const HOSTING_SERVICE: &str = "HostingService";

/// Build the locked default settings namespace
///
/// `CaptureMode` and `HostingService` have no defaults; they are only
/// present once the user has chosen them.
pub fn default_settings() -> Namespace {
    let mut builder = NamespaceBuilder::new(APP_NAMESPACE);
    builder.set_value(STORE_BACKUPS, &true);
    builder.set_value(LOAD_EXTERNALS, &true);
    builder.set_value(CHECK_UPDATES, &true);
    builder.set_value(LOG_UPLOADS, &true);
    builder.lock()
}

impl NamespaceBuilder {
    /// Fill in every key from `defaults` that this namespace lacks
    ///
    /// Existing values are never overwritten and no key is removed, so
    /// merging the same defaults again is a no-op. Returns the number of
    /// keys added.
    pub fn merge_defaults(&mut self, defaults: &Namespace) -> usize {
        let mut added = 0;
        for (key, value) in defaults {
            if self.insert_if_absent(key, value) {
                debug!(namespace = %self.name(), key, "Filled missing setting from defaults");
                added += 1;
            }
        }
        added
    }
}
