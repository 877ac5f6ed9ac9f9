//! Refresh orchestration: fetch, cache fallback, bounded retries and
//! periodic background refresh.
//!
//! The controller is the only writer of [`RefreshState`]. Network work runs on
//! spawned tasks that report back through [`RefreshEvent`]s; the owner feeds
//! those events into [`RefreshController::handle_event`] from its event loop,
//! so every state change happens on one task without locks.
//!
//! At most one fetch is in flight. Triggers arriving while one is running
//! (a periodic tick during a manual refresh, say) are dropped, so the shown
//! posts always come from exactly one completed attempt.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::feed::{FeedSource, FetchError, Post};
use crate::storage::CacheStore;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(30);
pub const DEFAULT_AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_CACHE_MAX_AGE: Duration = Duration::from_secs(30 * 60);

/// What started a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// No fresh cache at startup.
    Startup,
    /// The user asked for a refresh; resets the retry budget.
    Manual,
    /// A scheduled retry after a failure.
    Retry,
    /// The periodic timer; runs without a loading indicator.
    Auto,
}

impl Trigger {
    pub fn shows_loading(self) -> bool {
        !matches!(self, Self::Auto)
    }
}

/// Sync state shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Success { from_cache: bool },
    FailedWithCache { error: String },
    FailedNoCache { error: String },
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Syncing => "syncing...",
            Self::Success { from_cache: false } => "live sync",
            Self::Success { from_cache: true } | Self::FailedWithCache { .. } => {
                "showing cached data"
            }
            Self::FailedNoCache { .. } => "sync failed",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::FailedWithCache { error } | Self::FailedNoCache { error } => Some(error),
            _ => None,
        }
    }
}

/// Why a refresh attempt produced no posts.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Fetch task panicked: {0}")]
    TaskPanicked(String),
}

/// Messages from background tasks back to the controller's owner.
#[derive(Debug)]
pub enum RefreshEvent {
    FetchFinished {
        trigger: Trigger,
        result: Result<Vec<Post>, RefreshError>,
    },
    RetryDue,
    AutoRefreshDue,
}

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// `None` disables the periodic refresh.
    pub auto_refresh_interval: Option<Duration>,
    pub cache_max_age: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            auto_refresh_interval: Some(DEFAULT_AUTO_REFRESH_INTERVAL),
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
        }
    }
}

/// Everything the controller mutates.
#[derive(Debug)]
pub struct RefreshState {
    pub current_posts: Vec<Post>,
    pub last_fetch_time: Option<DateTime<Utc>>,
    /// Automatic retries scheduled since the last success or manual refresh.
    pub retry_count: u32,
    pub status: SyncStatus,
    in_flight: Option<Trigger>,
    retry_handle: Option<JoinHandle<()>>,
    auto_refresh_handle: Option<JoinHandle<()>>,
}

impl Default for RefreshState {
    fn default() -> Self {
        Self {
            current_posts: Vec::new(),
            last_fetch_time: None,
            retry_count: 0,
            status: SyncStatus::Idle,
            in_flight: None,
            retry_handle: None,
            auto_refresh_handle: None,
        }
    }
}

pub struct RefreshController<S: FeedSource + ?Sized> {
    source: Arc<S>,
    cache: CacheStore,
    settings: RefreshSettings,
    events: mpsc::Sender<RefreshEvent>,
    state: RefreshState,
}

impl<S: FeedSource + ?Sized> RefreshController<S> {
    pub fn new(
        source: Arc<S>,
        cache: CacheStore,
        settings: RefreshSettings,
        events: mpsc::Sender<RefreshEvent>,
    ) -> Self {
        Self {
            source,
            cache,
            settings,
            events,
            state: RefreshState::default(),
        }
    }

    pub fn state(&self) -> &RefreshState {
        &self.state
    }

    pub fn posts(&self) -> &[Post] {
        &self.state.current_posts
    }

    pub fn status(&self) -> &SyncStatus {
        &self.state.status
    }

    pub fn settings(&self) -> &RefreshSettings {
        &self.settings
    }

    /// Refresh controls are disabled while a fetch is in flight.
    pub fn controls_enabled(&self) -> bool {
        self.state.in_flight.is_none()
    }

    /// A foreground fetch is running.
    pub fn is_loading(&self) -> bool {
        self.state.in_flight.is_some_and(Trigger::shows_loading)
    }

    pub fn retry_pending(&self) -> bool {
        self.state
            .retry_handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Show a fresh cache immediately, or start fetching.
    ///
    /// The periodic timer is armed either way, so a failing first fetch with
    /// an exhausted retry budget still gets refreshed later.
    pub fn start(&mut self, now: DateTime<Utc>) {
        let max_age = chrono::Duration::from_std(self.settings.cache_max_age)
            .unwrap_or(chrono::Duration::MAX);

        self.schedule_auto_refresh();
        match self.cache.load_fresh(max_age, now) {
            Some(entry) => {
                tracing::info!(
                    posts = entry.posts.len(),
                    fetched_at = %entry.fetched_at,
                    "Showing fresh cache"
                );
                self.state.current_posts = entry.posts;
                self.state.last_fetch_time = Some(entry.fetched_at);
                self.state.status = SyncStatus::Success { from_cache: true };
            }
            None => {
                self.request_refresh(Trigger::Startup);
            }
        }
    }

    /// Start a fetch unless one is already in flight.
    ///
    /// Returns whether a fetch was started.
    pub fn request_refresh(&mut self, trigger: Trigger) -> bool {
        if let Some(running) = self.state.in_flight {
            tracing::debug!(?trigger, ?running, "Refresh already in flight, dropping trigger");
            return false;
        }

        if trigger == Trigger::Manual {
            self.state.retry_count = 0;
            self.cancel_retry();
        }
        if trigger.shows_loading() {
            self.state.status = SyncStatus::Syncing;
        }

        self.state.in_flight = Some(trigger);
        tracing::debug!(?trigger, "Starting feed refresh");
        self.spawn_fetch(trigger);
        true
    }

    /// Apply an event from a background task.
    pub fn handle_event(&mut self, event: RefreshEvent, now: DateTime<Utc>) {
        match event {
            RefreshEvent::FetchFinished { trigger, result } => {
                self.handle_fetch_result(trigger, result, now);
            }
            RefreshEvent::RetryDue => {
                self.state.retry_handle = None;
                self.request_refresh(Trigger::Retry);
            }
            RefreshEvent::AutoRefreshDue => {
                self.request_refresh(Trigger::Auto);
            }
        }
    }

    /// Apply the outcome of a fetch.
    ///
    /// Controls are re-enabled whatever the outcome.
    pub fn handle_fetch_result(
        &mut self,
        trigger: Trigger,
        result: Result<Vec<Post>, RefreshError>,
        now: DateTime<Utc>,
    ) {
        self.state.in_flight = None;

        match result {
            Ok(posts) => {
                tracing::info!(?trigger, posts = posts.len(), "Feed refreshed");
                if let Err(e) = self.cache.save_at(&posts, now) {
                    tracing::warn!(error = %e, "Failed to write cache");
                }
                self.state.current_posts = posts;
                self.state.last_fetch_time = Some(now);
                self.state.retry_count = 0;
                self.state.status = SyncStatus::Success { from_cache: false };
                self.cancel_retry();
                self.schedule_auto_refresh();
            }
            Err(e) => {
                let error = e.to_string();
                tracing::warn!(?trigger, error = %error, "Feed refresh failed");

                match self.cache.load() {
                    Some(entry) => {
                        tracing::info!(
                            posts = entry.posts.len(),
                            fetched_at = %entry.fetched_at,
                            "Falling back to cached posts"
                        );
                        self.state.current_posts = entry.posts;
                        self.state.status = SyncStatus::FailedWithCache { error };
                    }
                    None => {
                        self.state.status = SyncStatus::FailedNoCache { error };
                    }
                }

                if self.state.auto_refresh_handle.is_none() {
                    self.schedule_auto_refresh();
                }

                if self.state.retry_count < self.settings.max_retries {
                    self.state.retry_count += 1;
                    self.schedule_retry();
                } else {
                    tracing::warn!(
                        retries = self.state.retry_count,
                        "Retry budget exhausted, waiting for manual or periodic refresh"
                    );
                }
            }
        }
    }

    /// Abort timers. Any in-flight fetch finishes on its own and its result
    /// is dropped with the channel.
    pub fn shutdown(&mut self) {
        self.cancel_retry();
        if let Some(handle) = self.state.auto_refresh_handle.take() {
            handle.abort();
        }
    }

    fn spawn_fetch(&self, trigger: Trigger) {
        let source = Arc::clone(&self.source);
        let tx = self.events.clone();

        tokio::spawn(async move {
            let result = match AssertUnwindSafe(source.fetch()).catch_unwind().await {
                Ok(result) => result.map_err(RefreshError::from),
                Err(panic) => Err(RefreshError::TaskPanicked(panic_message(panic.as_ref()))),
            };
            if tx
                .send(RefreshEvent::FetchFinished { trigger, result })
                .await
                .is_err()
            {
                tracing::debug!("Refresh result dropped (receiver closed)");
            }
        });
    }

    fn schedule_retry(&mut self) {
        self.cancel_retry();
        let delay = self.settings.retry_delay;
        let tx = self.events.clone();
        tracing::info!(
            attempt = self.state.retry_count,
            max = self.settings.max_retries,
            delay_secs = delay.as_secs(),
            "Scheduling retry"
        );

        self.state.retry_handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(RefreshEvent::RetryDue).await;
        }));
    }

    fn cancel_retry(&mut self) {
        if let Some(handle) = self.state.retry_handle.take() {
            handle.abort();
        }
    }

    fn schedule_auto_refresh(&mut self) {
        if let Some(handle) = self.state.auto_refresh_handle.take() {
            handle.abort();
        }
        let Some(period) = self.settings.auto_refresh_interval else {
            return;
        };
        let tx = self.events.clone();

        self.state.auto_refresh_handle = Some(tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if tx.send(RefreshEvent::AutoRefreshDue).await.is_err() {
                    break;
                }
            }
        }));
    }
}

impl<S: FeedSource + ?Sized> Drop for RefreshController<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
