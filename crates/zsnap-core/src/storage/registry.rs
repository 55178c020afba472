//! Namespace registry
//!
//! `Storage` owns every namespace known to the process together with the
//! path of the file they are persisted to. It is constructed once, by
//! [`Storage::open`], and passed to whatever needs it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::{StorageError, StorageResult};
use super::persistence::{load_namespaces, save_namespaces};
use crate::namespace::Namespace;

/// Registry of settings namespaces backed by a settings file
#[derive(Debug)]
pub struct Storage {
    path: PathBuf,
    namespaces: BTreeMap<String, Namespace>,
}

impl Storage {
    /// Open the registry stored at `path`
    ///
    /// A missing file yields an empty registry (first run). A file that
    /// exists but cannot be read or parsed fails with
    /// `StorageError::Inaccessible`.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let mut namespaces = BTreeMap::new();

        match load_namespaces(&path)? {
            Some(loaded) => {
                for ns in loaded {
                    namespaces.insert(ns.name().to_string(), ns);
                }
            }
            None => info!(path = %path.display(), "No settings file yet, starting empty"),
        }

        Ok(Self { path, namespaces })
    }

    /// Path of the backing settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a namespace by name
    pub fn get_namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    /// Register a new namespace
    ///
    /// Fails with `StorageError::DuplicateNamespace` if the name is taken;
    /// the registry is left unchanged.
    pub fn add_namespace(&mut self, ns: Namespace) -> StorageResult<()> {
        if self.namespaces.contains_key(ns.name()) {
            return Err(StorageError::DuplicateNamespace {
                name: ns.name().to_string(),
            });
        }
        debug!(namespace = %ns.name(), keys = ns.len(), "Added namespace");
        self.namespaces.insert(ns.name().to_string(), ns);
        Ok(())
    }

    /// Insert or replace a namespace, returning the one it replaced
    pub fn put_namespace(&mut self, ns: Namespace) -> Option<Namespace> {
        debug!(namespace = %ns.name(), keys = ns.len(), "Stored namespace");
        self.namespaces.insert(ns.name().to_string(), ns)
    }

    /// Drop a namespace from the registry without touching the file
    pub(crate) fn discard_namespace(&mut self, name: &str) -> Option<Namespace> {
        self.namespaces.remove(name)
    }

    /// Names of all registered namespaces, sorted
    pub fn namespace_names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Flush the whole registry to the settings file
    ///
    /// The file is replaced atomically. Errors are returned as
    /// `StorageError::WriteFailed` and are not retried.
    pub fn writeback(&self) -> StorageResult<()> {
        save_namespaces(&self.path, self.namespaces.values())
    }
}
