//! A terminal quote wall fed by a personal RSS feed.
//!
//! Posts are fetched directly or through an ordered list of proxies, cached
//! on disk with a freshness window, and refreshed on a schedule with bounded
//! retries. The [`ui`] module renders them in a ratatui terminal interface.

pub mod app;
pub mod catalog;
pub mod config;
pub mod feed;
pub mod refresh;
pub mod render;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;
