use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::store::{Store, StoreError};
use crate::feed::Post;

/// Fixed key of the single cache record.
pub const CACHE_KEY: &str = "quotewall_cache";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Corrupt cache record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Cache timestamp out of range: {0}")]
    Timestamp(i64),
}

/// The most recently fetched posts and when they were fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub posts: Vec<Post>,
    pub fetched_at: DateTime<Utc>,
}

/// On-disk shape: `{ "posts": [...], "timestamp": <epoch-millis> }`.
#[derive(Serialize, Deserialize)]
struct CacheRecord {
    posts: Vec<Post>,
    timestamp: i64,
}

/// Whether `entry` is still within `max_age` at `now`.
///
/// Monotonic in elapsed time: once stale, an entry stays stale until a new
/// save replaces it.
pub fn is_fresh(entry: &CacheEntry, max_age: Duration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(entry.fetched_at) < max_age
}

/// Persists the last successful fetch under [`CACHE_KEY`].
#[derive(Debug, Clone)]
pub struct CacheStore {
    store: Store,
}

impl CacheStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Replace the cached entry with `posts`, stamped with the current time.
    pub fn save(&self, posts: &[Post]) -> Result<(), CacheError> {
        self.save_at(posts, Utc::now())
    }

    /// Replace the cached entry with `posts`, stamped with `now`.
    pub fn save_at(&self, posts: &[Post], now: DateTime<Utc>) -> Result<(), CacheError> {
        let record = CacheRecord {
            posts: posts.to_vec(),
            timestamp: now.timestamp_millis(),
        };
        let json = serde_json::to_string(&record)?;
        self.store.set(CACHE_KEY, &json)?;
        tracing::debug!(posts = posts.len(), "Cache saved");
        Ok(())
    }

    /// The stored entry, if present, decodable and non-empty.
    ///
    /// Any failure is logged and reported as "no usable cache"; a broken
    /// cache never stops the application.
    pub fn load(&self) -> Option<CacheEntry> {
        match self.try_load() {
            Ok(Some(entry)) if !entry.posts.is_empty() => Some(entry),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable cache");
                None
            }
        }
    }

    /// The stored entry only if it is still fresh at `now`.
    pub fn load_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> Option<CacheEntry> {
        self.load().filter(|entry| is_fresh(entry, max_age, now))
    }

    /// Remove the cached entry. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, CacheError> {
        Ok(self.store.remove(CACHE_KEY)?)
    }

    fn try_load(&self) -> Result<Option<CacheEntry>, CacheError> {
        let Some(raw) = self.store.get(CACHE_KEY)? else {
            return Ok(None);
        };
        let record: CacheRecord = serde_json::from_str(&raw)?;
        let fetched_at = Utc
            .timestamp_millis_opt(record.timestamp)
            .single()
            .ok_or(CacheError::Timestamp(record.timestamp))?;
        Ok(Some(CacheEntry {
            posts: record.posts,
            fetched_at,
        }))
    }
}
