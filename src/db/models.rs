//! Database Models - rows of the `site_entries` table (used by sqlx/serde).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One key-value entry
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
