use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry from the feed.
///
/// `description` keeps the raw markup from the feed; images, tags and the
/// cleaned body are derived from it at render time and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub link: String,
}
