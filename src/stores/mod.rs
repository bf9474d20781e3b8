//! Content and comment stores layered over a [`KeyValueStore`].
//!
//! Every operation is a plain read-modify-write of one JSON value. There is
//! no locking across that cycle: overlapping writers race and the write that
//! lands last wins.

pub mod comments;
pub mod content;

use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

pub use comments::CommentStore;
pub use content::ContentStore;

use crate::storage::{KeyValueStore, StorageError, StorageResult};

/// Artificial per-operation delays. All zero unless `SIMULATE_LATENCY=true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub read: Duration,
    pub save_content: Duration,
    pub add_comment: Duration,
    pub moderate: Duration,
}

impl LatencyProfile {
    pub const fn none() -> Self {
        Self {
            read: Duration::ZERO,
            save_content: Duration::ZERO,
            add_comment: Duration::ZERO,
            moderate: Duration::ZERO,
        }
    }

    /// Delays of a slow remote backend, for demos and frontend work
    pub const fn simulated() -> Self {
        Self {
            read: Duration::from_millis(300),
            save_content: Duration::from_millis(500),
            add_comment: Duration::from_millis(400),
            moderate: Duration::from_millis(200),
        }
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        let enabled = std::env::var("SIMULATE_LATENCY")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        if enabled {
            Self::simulated()
        } else {
            Self::none()
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Decode the JSON value under `key`, `None` if the key was never written.
async fn read_json<S, T>(storage: &S, key: &str) -> StorageResult<Option<T>>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    match storage.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| {
                tracing::error!(key = %key, error = %source, "stored value does not decode");
                StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                }
            }),
        None => Ok(None),
    }
}

async fn write_json<S, T>(storage: &S, key: &str, value: &T) -> StorageResult<()>
where
    S: KeyValueStore,
    T: Serialize + Sync + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    storage.set(key, raw).await
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::storage::{KeyValueStore, StorageError, StorageResult};

    /// Backend whose every call fails, for fault propagation tests.
    #[derive(Debug, Clone, Default)]
    pub struct FailingStore;

    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable("medium offline".to_string()))
        }

        async fn set(&self, _key: &str, _value: String) -> StorageResult<()> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        async fn ping(&self) -> StorageResult<()> {
            Err(StorageError::Unavailable("medium offline".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_latency_none_is_zero() {
        let profile = LatencyProfile::none();
        assert!(profile.read.is_zero());
        assert!(profile.save_content.is_zero());
    }

    #[tokio::test]
    async fn test_read_json_missing_key() {
        let store = MemoryStore::new();
        let value: Option<Vec<u32>> = read_json(&store, "k").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_read_json_malformed_is_corrupt() {
        let store = MemoryStore::new();
        store.set("k", "not json".to_string()).await.unwrap();
        let result: StorageResult<Option<Vec<u32>>> = read_json(&store, "k").await;
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_pause_waits_for_delay() {
        let start = tokio::time::Instant::now();
        pause(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
