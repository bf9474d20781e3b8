use chrono::Utc;
use uuid::Uuid;

use super::{pause, read_json, write_json, LatencyProfile};
use crate::models::{Comment, CommentStatus, ModerationDecision};
use crate::storage::{KeyValueStore, StorageResult, COMMENTS_KEY};

/// Durable home of the comment collection, most recent first.
///
/// Moderating or deleting an unknown id is a silent no-op, so both
/// operations are safe to repeat.
#[derive(Debug, Clone)]
pub struct CommentStore<S> {
    storage: S,
    latency: LatencyProfile,
}

impl<S: KeyValueStore> CommentStore<S> {
    pub fn new(storage: S, latency: LatencyProfile) -> Self {
        Self { storage, latency }
    }

    /// All comments in every status, newest first.
    pub async fn list_comments(&self) -> StorageResult<Vec<Comment>> {
        pause(self.latency.read).await;
        self.load().await
    }

    /// Record a visitor submission as `pending` and return it.
    pub async fn add_comment(&self, author: &str, content: &str) -> StorageResult<Comment> {
        pause(self.latency.add_comment).await;
        let mut comments = self.load().await?;

        let comment = Comment {
            id: fresh_id(&comments),
            author: author.to_string(),
            content: content.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            status: CommentStatus::Pending,
        };
        comments.insert(0, comment.clone());
        self.persist(&comments).await?;

        tracing::info!(comment_id = %comment.id, "comment submitted for moderation");
        Ok(comment)
    }

    /// Move the comment with `id` to the decided status.
    ///
    /// Returns whether a comment matched.
    pub async fn set_comment_status(
        &self,
        id: &str,
        decision: ModerationDecision,
    ) -> StorageResult<bool> {
        pause(self.latency.moderate).await;
        let mut comments = self.load().await?;
        let status = CommentStatus::from(decision);

        let mut matched = false;
        for comment in comments.iter_mut().filter(|c| c.id == id) {
            tracing::info!(
                comment_id = %id,
                from = %comment.status,
                to = %status,
                "comment moderated"
            );
            comment.status = status;
            matched = true;
        }
        if !matched {
            tracing::debug!(comment_id = %id, "moderation target not found, ignoring");
        }

        self.persist(&comments).await?;
        Ok(matched)
    }

    /// Permanently remove the comment with `id`.
    ///
    /// Returns whether a comment was removed.
    pub async fn delete_comment(&self, id: &str) -> StorageResult<bool> {
        pause(self.latency.moderate).await;
        let mut comments = self.load().await?;

        let before = comments.len();
        comments.retain(|c| c.id != id);
        let removed = comments.len() != before;

        if removed {
            tracing::info!(comment_id = %id, "comment deleted");
        } else {
            tracing::debug!(comment_id = %id, "delete target not found, ignoring");
        }

        self.persist(&comments).await?;
        Ok(removed)
    }

    async fn load(&self) -> StorageResult<Vec<Comment>> {
        let stored: Option<Vec<Comment>> = read_json(&self.storage, COMMENTS_KEY).await?;
        Ok(stored.unwrap_or_default())
    }

    async fn persist(&self, comments: &[Comment]) -> StorageResult<()> {
        write_json(&self.storage, COMMENTS_KEY, comments).await
    }
}

/// UUID that no comment in `existing` already carries.
fn fresh_id(existing: &[Comment]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if existing.iter().all(|c| c.id != id) {
            return id;
        }
    }
}
