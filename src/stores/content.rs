use super::{pause, read_json, write_json, LatencyProfile};
use crate::models::SiteContent;
use crate::storage::{KeyValueStore, StorageResult, CONTENT_KEY};

/// Durable home of the one `SiteContent` document.
#[derive(Debug, Clone)]
pub struct ContentStore<S> {
    storage: S,
    latency: LatencyProfile,
}

impl<S: KeyValueStore> ContentStore<S> {
    pub fn new(storage: S, latency: LatencyProfile) -> Self {
        Self { storage, latency }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Stored document, or the default document if none was ever saved.
    pub async fn get_content(&self) -> StorageResult<SiteContent> {
        pause(self.latency.read).await;
        let stored: Option<SiteContent> = read_json(&self.storage, CONTENT_KEY).await?;
        Ok(stored.unwrap_or_default())
    }

    /// Replace the stored document wholesale.
    pub async fn save_content(&self, doc: &SiteContent) -> StorageResult<()> {
        pause(self.latency.save_content).await;
        write_json(&self.storage, CONTENT_KEY, doc).await?;
        tracing::info!(
            case_studies = doc.case_studies.len(),
            backend = self.storage.backend_name(),
            "site content saved"
        );
        Ok(())
    }
}
