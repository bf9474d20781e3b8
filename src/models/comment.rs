//! Visitor comments and the moderation states they move through.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommentStatus::Pending => write!(f, "pending"),
            CommentStatus::Approved => write!(f, "approved"),
            CommentStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Target state of an admin moderation action. A comment can never be moved
/// back to `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Approved,
    Rejected,
}

impl From<ModerationDecision> for CommentStatus {
    fn from(decision: ModerationDecision) -> Self {
        match decision {
            ModerationDecision::Approved => CommentStatus::Approved,
            ModerationDecision::Rejected => CommentStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub content: String,
    /// Creation time, epoch milliseconds
    pub timestamp: i64,
    pub status: CommentStatus,
}

/// Comments a visitor may see: approved only, order preserved.
pub fn visible_to_visitors(comments: &[Comment]) -> Vec<Comment> {
    comments
        .iter()
        .filter(|c| c.status == CommentStatus::Approved)
        .cloned()
        .collect()
}

/// Number of comments awaiting moderation (admin badge).
pub fn pending_count(comments: &[Comment]) -> usize {
    comments
        .iter()
        .filter(|c| c.status == CommentStatus::Pending)
        .count()
}
