//! Render functions for the TUI.
//!
//! Header, page body and status bar, with the error panel and the
//! random-post modal drawn over the body when active.

use crate::app::{App, Page};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{about, modal, posts, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    match app.page {
        Page::Home if app.show_error_panel() => render_error_panel(f, app, chunks[1]),
        Page::Home => posts::render(f, app, chunks[1]),
        Page::About => about::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);

    if app.modal.is_some() {
        modal::render(f, app);
    }
}

/// Title plus home/about navigation, the active page highlighted.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(format!("[{label}]"), p.heading)
        } else {
            Span::styled(format!(" {label} "), p.muted)
        }
    };

    let line = Line::from(vec![
        Span::styled(" quotewall  ", p.post_title),
        tab("Home", app.page == Page::Home),
        Span::raw(" "),
        tab("About", app.page == Page::About),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// Shown when neither the network nor the cache produced posts.
fn render_error_panel(f: &mut Frame, app: &App, area: Rect) {
    let error = app.controller.status().error().unwrap_or("unknown error");
    let p = &app.palette;

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Could not load posts", p.heading)),
        Line::from(""),
        Line::from(Span::styled(error.to_string(), p.error_panel)),
        Line::from(""),
        Line::from(Span::styled(
            if app.controller.retry_pending() {
                "Retrying automatically. Press r to retry now."
            } else {
                "Press r to retry."
            },
            p.muted,
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(p.error_panel)
                .title(" Sync failed "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
