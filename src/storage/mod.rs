//! Persistent state: a small directory-backed key/value store holding the
//! post cache and the theme preference.

mod cache;
mod preferences;
pub(crate) mod store;

pub use cache::{is_fresh, CacheEntry, CacheError, CacheStore, CACHE_KEY};
pub use preferences::THEME_KEY;
pub use store::{Store, StoreError};
