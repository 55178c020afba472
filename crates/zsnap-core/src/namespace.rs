//! Settings namespaces
//!
//! A namespace is a named collection of string settings. It starts life as an
//! open [`NamespaceBuilder`], which can be freely mutated, and becomes a
//! [`Namespace`] through the consuming [`NamespaceBuilder::lock`] transition.
//! A locked namespace has no mutation methods, so once it has been handed to
//! the rest of the application it can be shared and read from any thread.
//!
//! Mutating a locked namespace does not compile:
//!
//! ```compile_fail
//! use zsnap_core::NamespaceBuilder;
//!
//! let mut ns = NamespaceBuilder::new("zsnap").lock();
//! ns.set("CheckUpdates", "False");
//! ```
//!
//! Reads work the same way on both:
//!
//! ```
//! use zsnap_core::NamespaceBuilder;
//!
//! let mut builder = NamespaceBuilder::new("zsnap");
//! builder.set("CheckUpdates", "False");
//! let ns = builder.lock();
//!
//! assert_eq!(ns.retrieve_safe::<bool>("CheckUpdates"), Some(false));
//! assert_eq!(ns.retrieve_safe::<bool>("StoreBackups"), None);
//! ```

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ops::Deref;

use thiserror::Error;
use tracing::trace;

use crate::value::SettingValue;

/// Errors from direct namespace lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// The key is not defined in the namespace
    #[error("Setting '{key}' is not defined in namespace '{namespace}'")]
    KeyNotFound { namespace: String, key: String },
}

/// A locked, read-only settings namespace
///
/// Keys iterate in sorted order, which keeps persisted output deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    name: String,
    entries: BTreeMap<String, String>,
}

impl Namespace {
    /// Namespace name (unique within a `Storage` registry)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the stored string for `key`
    pub fn get(&self, key: &str) -> Result<&str, NamespaceError> {
        self.entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| NamespaceError::KeyNotFound {
                namespace: self.name.clone(),
                key: key.to_string(),
            })
    }

    /// Read `key` as `T` without failing
    ///
    /// Returns `None` if the key is missing or its value does not parse as
    /// `T`. A present `false` or `0` comes back as `Some`, so it is never
    /// confused with a failed read.
    pub fn retrieve_safe<T: SettingValue>(&self, key: &str) -> Option<T> {
        let raw = self.entries.get(key)?;
        let parsed = T::parse_setting(raw);
        if parsed.is_none() {
            trace!(namespace = %self.name, key, raw = %raw, "Stored value did not parse");
        }
        parsed
    }

    /// Check whether `key` is defined
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Defined keys, in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Key/value pairs, in sorted key order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start a new open namespace with a copy of this one's entries
    ///
    /// `self` is not affected; the copy must be locked again before it can
    /// replace the original in a registry.
    pub fn edit(&self) -> NamespaceBuilder {
        NamespaceBuilder {
            inner: self.clone(),
        }
    }
}

/// Iterator over a namespace's key/value pairs
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Namespace {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An open namespace that can still be modified
///
/// All read methods of [`Namespace`] are available through `Deref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBuilder {
    inner: Namespace,
}

impl NamespaceBuilder {
    /// Create an empty namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Namespace {
                name: name.into(),
                entries: BTreeMap::new(),
            },
        }
    }

    /// Create a namespace pre-populated with `entries`
    ///
    /// Later duplicates of a key overwrite earlier ones.
    pub fn with_entries<I, K, V>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut builder = Self::new(name);
        for (key, value) in entries {
            builder.set(key, value);
        }
        builder
    }

    /// Insert or overwrite a setting
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.entries.insert(key.into(), value.into());
    }

    /// Store a typed value in its string form
    pub fn set_value<T: SettingValue>(&mut self, key: impl Into<String>, value: &T) {
        self.set(key, value.to_setting());
    }

    /// Remove a setting, returning its previous value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.inner.entries.remove(key)
    }

    /// Insert `value` only if `key` is not already defined
    ///
    /// Returns `true` if the value was inserted.
    pub(crate) fn insert_if_absent(&mut self, key: &str, value: &str) -> bool {
        match self.inner.entries.entry(key.to_string()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value.to_string());
                true
            }
        }
    }

    /// Lock the namespace, making it permanently read-only
    pub fn lock(self) -> Namespace {
        self.inner
    }
}

impl Deref for NamespaceBuilder {
    type Target = Namespace;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
