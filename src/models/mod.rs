//! Domain Models - the two aggregates persisted by the stores.

pub mod comment;
pub mod content;

pub use comment::{pending_count, visible_to_visitors, Comment, CommentStatus, ModerationDecision};
pub use content::{CaseStudy, SiteContent};
