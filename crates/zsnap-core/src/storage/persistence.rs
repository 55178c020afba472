//! Settings file persistence
//!
//! The registry is stored as a single TOML document with one table per
//! namespace and string values only:
//!
//! ```toml
//! [zsnap]
//! CheckUpdates = "True"
//! StoreBackups = "False"
//! ```
//!
//! Writes are atomic (write to a temp file, sync, then rename), so a reader
//! never observes a partially-written file.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use super::error::{StorageError, StorageResult};
use crate::namespace::{Namespace, NamespaceBuilder};

/// On-disk shape: namespace name -> key -> value
type RawRegistry = BTreeMap<String, BTreeMap<String, String>>;

/// Read all namespaces from `path`
///
/// Returns `None` if the file doesn't exist, which signals a first run.
/// Any other read or parse failure is `StorageError::Inaccessible`.
pub fn load_namespaces(path: &Path) -> StorageResult<Option<Vec<Namespace>>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Settings file not found");
            return Ok(None);
        }
        Err(source) => {
            return Err(StorageError::Inaccessible {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let namespaces = decode(&content).map_err(|e| StorageError::corrupt(path.to_path_buf(), e))?;
    debug!(path = %path.display(), count = namespaces.len(), "Loaded settings file");
    Ok(Some(namespaces))
}

/// Write all namespaces to `path`, replacing its previous contents atomically
pub fn save_namespaces<'a, I>(path: &Path, namespaces: I) -> StorageResult<()>
where
    I: IntoIterator<Item = &'a Namespace>,
{
    let content = encode(namespaces)?;
    atomic_write(path, content.as_bytes()).map_err(|source| StorageError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote settings file");
    Ok(())
}

fn decode(content: &str) -> Result<Vec<Namespace>, toml::de::Error> {
    let raw: RawRegistry = toml::from_str(content)?;
    Ok(raw
        .into_iter()
        .map(|(name, entries)| NamespaceBuilder::with_entries(name, entries).lock())
        .collect())
}

fn encode<'a, I>(namespaces: I) -> StorageResult<String>
where
    I: IntoIterator<Item = &'a Namespace>,
{
    let raw: RawRegistry = namespaces
        .into_iter()
        .map(|ns| {
            let entries = ns
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            (ns.name().to_string(), entries)
        })
        .collect();

    toml::to_string(&raw).map_err(|e| StorageError::Serialize(e.to_string()))
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Same directory, so the rename cannot cross filesystems
    let temp_path = path.with_extension("tmp");

    let result = write_and_rename(&temp_path, path, data);
    if result.is_err() {
        // Best effort; the original error is what gets reported
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_rename(temp_path: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<Namespace> {
        vec![
            NamespaceBuilder::with_entries(
                "zsnap",
                [("CheckUpdates", "False"), ("HostingService", "Imgur")],
            )
            .lock(),
            NamespaceBuilder::with_entries("plugin.upload", [("Token = x", "a \"quoted\" value\n")])
                .lock(),
        ]
    }

    #[test]
    fn test_missing_file_is_first_run() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");

        assert!(load_namespaces(&path).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        let namespaces = sample();

        save_namespaces(&path, &namespaces).unwrap();
        let mut loaded = load_namespaces(&path).unwrap().unwrap();
        loaded.sort_by(|a, b| a.name().cmp(b.name()));

        let mut expected = namespaces;
        expected.sort_by(|a, b| a.name().cmp(b.name()));
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_file_format_is_one_table_per_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        let ns = NamespaceBuilder::with_entries("zsnap", [("StoreBackups", "True")]).lock();

        save_namespaces(&path, [&ns]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[zsnap]"));
        assert!(content.contains("StoreBackups = \"True\""));
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");

        save_namespaces(&path, &sample()).unwrap();
        let only = NamespaceBuilder::with_entries("zsnap", [("LogUploads", "False")]).lock();
        save_namespaces(&path, [&only]).unwrap();

        let loaded = load_namespaces(&path).unwrap().unwrap();
        assert_eq!(loaded, vec![only]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_inaccessible() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "this is [not toml").unwrap();

        let err = load_namespaces(&path).unwrap_err();
        assert!(matches!(err, StorageError::Inaccessible { .. }));
    }

    #[test]
    fn test_non_string_value_is_inaccessible() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "[zsnap]\nCheckUpdates = true\n").unwrap();

        let err = load_namespaces(&path).unwrap_err();
        assert!(matches!(err, StorageError::Inaccessible { .. }));
    }

    #[test]
    fn test_directory_in_place_of_file_is_inaccessible() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::create_dir(&path).unwrap();

        let err = load_namespaces(&path).unwrap_err();
        assert!(matches!(err, StorageError::Inaccessible { .. }));
    }

    #[test]
    fn test_write_to_blocked_location_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();
        let path = blocker.join("settings.toml");

        let err = save_namespaces(&path, &sample()).unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed { .. }));
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("settings.toml");

        atomic_write(&nested_path, b"[zsnap]\n").unwrap();

        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "[zsnap]\n");
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        // A non-empty directory at the target makes the final rename fail
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let err = save_namespaces(&path, &sample()).unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed { .. }));
        assert!(!path.with_extension("tmp").exists());
        assert!(path.join("keep").exists());
    }
}
