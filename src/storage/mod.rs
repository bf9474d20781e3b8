//! Key-value persistence medium shared by the content and comment stores.
//!
//! Each aggregate lives under one fixed, versioned key so that documents
//! written by an older schema never decode as the current one.

pub mod errors;
pub mod memory;
pub mod postgres;

use std::future::Future;

pub use errors::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Key of the serialized `SiteContent` document
pub const CONTENT_KEY: &str = "site_content_v3";

/// Key of the serialized comment collection
pub const COMMENTS_KEY: &str = "site_comments_v3";

/// String-valued key-value capability the stores are built on.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the raw value stored under `key`, `None` if never written
    fn get(&self, key: &str) -> impl Future<Output = StorageResult<Option<String>>> + Send;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: String) -> impl Future<Output = StorageResult<()>> + Send;

    /// Cheap reachability probe used by the health routes
    fn ping(&self) -> impl Future<Output = StorageResult<()>> + Send {
        async { Ok(()) }
    }

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}
