//! Storage layer
//!
//! Owns the registry of settings namespaces and persists it to a single
//! settings file.
//!
//! ## Architecture
//!
//! - **Registry** (`Storage`): in-memory namespaces keyed by name
//! - **Persistence**: TOML encoding and atomic file replacement
//!
//! A missing settings file means first run. A settings file that exists but
//! cannot be opened is an error the application treats as fatal.

pub mod error;
pub mod persistence;
pub mod registry;

pub use error::{StorageError, StorageResult};
pub use registry::Storage;
