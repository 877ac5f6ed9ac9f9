//! Home page: the quote wall.

use crate::app::App;
use crate::catalog::{category_label, Quote};
use crate::theme::ColorPalette;
use crate::util::{truncate_to_width, wrap_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Body lines shown per quote before the rest is elided.
const MAX_BODY_LINES: usize = 6;

/// Lines for one quote card: wrapped body, image markers, then a meta line
/// with category, time and tags.
pub(super) fn quote_lines(
    quote: &Quote,
    palette: &ColorPalette,
    selected: bool,
    width: usize,
) -> Vec<Line<'static>> {
    let view = &quote.view;
    let body_style = if selected {
        palette.post_selected
    } else {
        palette.post_body
    };

    let mut lines: Vec<Line<'static>> = Vec::new();
    let wrapped = wrap_to_width(&view.body, width.max(1));
    let elided = wrapped.len() > MAX_BODY_LINES;
    for (i, text) in wrapped.into_iter().take(MAX_BODY_LINES).enumerate() {
        let text = if elided && i + 1 == MAX_BODY_LINES {
            truncate_to_width(&format!("{text}..."), width).into_owned()
        } else {
            text
        };
        lines.push(Line::from(Span::styled(text, body_style)));
    }

    for url in &view.images {
        let label = format!("[image] {url}");
        lines.push(Line::from(Span::styled(
            truncate_to_width(&label, width).into_owned(),
            palette.post_image,
        )));
    }

    let mut meta = vec![Span::styled(
        category_label(&quote.category).to_string(),
        palette.post_category,
    )];
    if !view.time_label.is_empty() {
        meta.push(Span::styled(
            format!(" · {}", view.time_label),
            palette.post_time,
        ));
    }
    for tag in &view.tags {
        meta.push(Span::styled(format!(" #{tag}"), palette.post_tag));
    }
    lines.push(Line::from(meta));
    lines.push(Line::from(""));
    lines
}

/// Render the quote list for the active filter.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let visible = app.visible_quotes();
    let inner_width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem> = if visible.is_empty() {
        let msg = if app.controller.is_loading() {
            "Loading posts..."
        } else {
            "No posts"
        };
        vec![ListItem::new(Line::from(Span::styled(msg, app.palette.muted)))]
    } else {
        visible
            .iter()
            .enumerate()
            .map(|(i, quote)| {
                ListItem::new(quote_lines(
                    quote,
                    &app.palette,
                    i == app.selected,
                    inner_width,
                ))
            })
            .collect()
    };

    let title = format!(" {} ({}) ", app.filter_label(), visible.len());
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.palette.panel_border)
            .title(Span::styled(title, app.palette.heading)),
    );

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}
