//! store_core - JSON key-value store with optional expiry
//!
//! Values are wrapped as `{ "havoc:store": data, "havoc:expires": epoch_ms }`
//! before they reach a [`Backend`].

mod backend;
mod config;
mod store;

pub use backend::{Backend, DirBackend, MemoryBackend};
pub use config::{Expiry, StoreSettings};
pub use store::Store;

use std::path::PathBuf;
use thiserror::Error;

/// Error reading or writing the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error at '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: PathBuf,
    },
    #[error("JSON error for key '{key}': {error}")]
    Json {
        error: serde_json::Error,
        key: String,
    },
    #[error("Invalid store settings: {0}")]
    InvalidSettings(String),
}
