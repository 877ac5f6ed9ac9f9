use crate::app::App;
use crate::refresh::SyncStatus;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

use super::helpers::SPINNER;

/// Sync indicator: label plus the style for its state.
fn sync_span(app: &App) -> Span<'static> {
    let status = app.controller.status();
    let p = &app.palette;
    let style: Style = match status {
        SyncStatus::Idle => p.muted,
        SyncStatus::Syncing => p.status_syncing,
        SyncStatus::Success { from_cache: false } => p.status_live,
        SyncStatus::Success { from_cache: true } | SyncStatus::FailedWithCache { .. } => {
            p.status_cached
        }
        SyncStatus::FailedNoCache { .. } => p.status_error,
    };

    let text = if app.controller.is_loading() {
        Cow::Owned(format!("{} {}", SPINNER[app.spinner_frame % SPINNER.len()], status.label()))
    } else {
        Cow::Borrowed(status.label())
    };
    Span::styled(format!(" ● {} ", text), style)
}

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let hint: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.modal.is_some() {
        Cow::Borrowed("[Esc]close [o]pen")
    } else if app.controller.controls_enabled() {
        Cow::Borrowed("[r]efresh [t]heme [x]random [c]ategory [a]bout [o]pen [q]uit")
    } else {
        Cow::Borrowed("[t]heme [x]random [c]ategory [a]bout [o]pen [q]uit")
    };

    let line = Line::from(vec![sync_span(app), Span::raw(hint)]);
    let paragraph = Paragraph::new(line).style(app.palette.status_bar);
    f.render_widget(paragraph, area);
}
