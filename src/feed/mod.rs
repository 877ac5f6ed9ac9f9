//! Feed retrieval and parsing.
//!
//! - [`parser`] - Converts RSS/Atom documents into [`Post`] records using `feed-rs`
//! - [`fetcher`] - Direct request with an ordered proxy fallback chain
//! - [`snapshot`] - One-shot download of the raw document to disk
//! - [`client`] - Shared HTTP client configuration
//!
//! # Example
//!
//! ```ignore
//! use quotewall::feed::{build_http_client, FeedFetcher, DEFAULT_ATTEMPT_TIMEOUT};
//!
//! let client = build_http_client(DEFAULT_ATTEMPT_TIMEOUT)?;
//! let fetcher = FeedFetcher::new(client, feed_url, proxies, DEFAULT_ATTEMPT_TIMEOUT);
//! let posts = fetcher.fetch_feed().await?;
//! ```

mod client;
mod fetcher;
mod parser;
mod post;
mod snapshot;

pub use client::{build_http_client, BROWSER_USER_AGENT, FEED_ACCEPT};
pub use fetcher::{
    proxied_url, AttemptError, AttemptFailure, Endpoint, FeedFetcher, FeedSource, FetchError,
    DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_PROXIES, URL_PLACEHOLDER,
};
pub use parser::{parse_feed, ParseError};
pub use post::Post;
pub use snapshot::{save_snapshot, SnapshotError, SnapshotFallback};
