use crate::catalog::{category_label, pick_random, Catalog, CategoryFilter, Quote};
use crate::feed::FeedSource;
use crate::refresh::{RefreshController, RefreshEvent, SyncStatus, Trigger};
use crate::storage::Store;
use crate::theme::{ColorPalette, ThemeVariant};
use crate::util::validate_http_url;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::borrow::Cow;
use tokio::time::{Duration, Instant};

/// How long a transient status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Relative time labels are recomputed at most this often.
const TIME_LABEL_REFRESH: Duration = Duration::from_secs(60);

// ============================================================================
// Page
// ============================================================================

/// Top-level page shown in the main area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    About,
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state.
///
/// Owns the single [`RefreshController`]; the feed source and store are
/// injected so tests can run the whole state machine without a network.
pub struct App {
    pub controller: RefreshController<dyn FeedSource>,
    pub catalog: Catalog,
    pub store: Store,
    pub feed_url: String,

    // Derived from the controller's posts
    pub quotes: Vec<Quote>,
    quotes_built_at: Instant,

    // UI State
    pub page: Page,
    pub filter: CategoryFilter,
    pub selected: usize,
    /// Quote shown in the random-post modal.
    pub modal: Option<Quote>,

    // Theme
    pub theme_variant: ThemeVariant,
    pub palette: ColorPalette,

    /// Status message with expiry; `Cow` avoids allocation for static literals
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    /// Current frame of the syncing spinner.
    pub spinner_frame: usize,

    rng: StdRng,
}

impl App {
    /// Build the app. A persisted theme preference wins over `default_theme`.
    pub fn new(
        controller: RefreshController<dyn FeedSource>,
        catalog: Catalog,
        store: Store,
        default_theme: ThemeVariant,
        feed_url: impl Into<String>,
    ) -> Self {
        let theme_variant = store.theme_preference().unwrap_or(default_theme);

        Self {
            controller,
            catalog,
            store,
            feed_url: feed_url.into(),
            quotes: Vec::new(),
            quotes_built_at: Instant::now(),
            page: Page::Home,
            filter: CategoryFilter::All,
            selected: 0,
            modal: None,
            theme_variant,
            palette: theme_variant.palette(),
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random source; used to make picks reproducible.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Show the cache or kick off the first fetch.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.controller.start(now);
        self.sync_quotes(now);
    }

    pub fn handle_refresh_event(&mut self, event: RefreshEvent, now: DateTime<Utc>) {
        let finished = matches!(event, RefreshEvent::FetchFinished { .. });
        self.controller.handle_event(event, now);
        if finished {
            self.sync_quotes(now);
        }
        self.needs_redraw = true;
    }

    /// Rebuild quotes from the controller's posts, keeping the selection in
    /// range.
    pub fn sync_quotes(&mut self, now: DateTime<Utc>) {
        self.quotes = self.catalog.build(self.controller.posts(), now);
        self.quotes_built_at = Instant::now();
        self.clamp_selection();
        self.needs_redraw = true;
    }

    /// Recompute relative time labels once they may have gone stale.
    pub fn refresh_time_labels(&mut self, now: DateTime<Utc>) -> bool {
        if self.quotes_built_at.elapsed() < TIME_LABEL_REFRESH {
            return false;
        }
        self.sync_quotes(now);
        true
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Quotes passing the active category filter, in feed order.
    pub fn visible_quotes(&self) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|q| self.filter.matches(q))
            .collect()
    }

    pub fn selected_quote(&self) -> Option<&Quote> {
        self.visible_quotes().get(self.selected).copied()
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_quotes().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn nav_down(&mut self) {
        let len = self.visible_quotes().len();
        if len > 0 {
            self.selected = self.selected.saturating_add(1).min(len - 1);
        }
    }

    /// Advance to the next category filter. Returns its display name.
    pub fn cycle_filter(&mut self) -> String {
        self.filter = self.catalog.next_filter(&self.filter);
        self.selected = 0;
        self.filter_label()
    }

    pub fn filter_label(&self) -> String {
        match &self.filter {
            CategoryFilter::All => "全部".to_string(),
            CategoryFilter::Category(key) => category_label(key).to_string(),
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Start a user-requested refresh unless one is already running.
    pub fn request_manual_refresh(&mut self) -> bool {
        if !self.controller.controls_enabled() {
            self.set_status("Refresh already in progress");
            return false;
        }
        self.controller.request_refresh(Trigger::Manual)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.palette = variant.palette();
        self.needs_redraw = true;
    }

    /// Flip between dark and light and persist the choice.
    pub fn toggle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.toggle();
        self.set_theme(next);
        if let Err(e) = self.store.set_theme_preference(next) {
            tracing::warn!(error = %e, "Failed to persist theme preference");
        }
        next.name()
    }

    pub fn toggle_page(&mut self) {
        self.page = match self.page {
            Page::Home => Page::About,
            Page::About => Page::Home,
        };
    }

    /// Open the modal on a uniformly random quote. Returns false when there
    /// is nothing to show.
    pub fn open_random(&mut self) -> bool {
        match pick_random(&self.quotes, &mut self.rng) {
            Some(quote) => {
                self.modal = Some(quote.clone());
                true
            }
            None => {
                self.set_status("No posts to pick from");
                false
            }
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Link of the modal's quote, or of the selected one.
    pub fn active_link(&self) -> Option<&str> {
        let quote = self.modal.as_ref().or_else(|| self.selected_quote())?;
        let link = quote.view.link.as_str();
        (!link.is_empty()).then_some(link)
    }

    /// Open the active post's link in the system browser.
    pub fn open_active_link(&mut self) {
        let Some(link) = self.active_link().map(str::to_owned) else {
            self.set_status("Post has no link");
            return;
        };
        // Reject non-http links before handing them to the OS
        if let Err(e) = validate_http_url(&link) {
            self.set_status(e.to_string());
        } else if let Err(e) = open::that(&link) {
            self.set_status(format!("Failed to open browser: {}", e));
        }
    }

    /// Whether to show the full-page error panel.
    pub fn show_error_panel(&self) -> bool {
        self.quotes.is_empty()
            && matches!(self.controller.status(), SyncStatus::FailedNoCache { .. })
    }

    // ========================================================================
    // Status Messages
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    pub fn shutdown(&mut self) {
        self.controller.shutdown();
    }
}
