//! About page.

use crate::app::App;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Static about text plus where the posts come from.
pub(super) fn about_lines(app: &App) -> Vec<Line<'static>> {
    let p = &app.palette;
    let settings = app.controller.settings();
    let auto = match settings.auto_refresh_interval {
        Some(d) => format!("every {} min", d.as_secs() / 60),
        None => "off".to_string(),
    };

    vec![
        Line::from(Span::styled("About this wall", p.heading)),
        Line::from(""),
        Line::from(Span::styled(
            "Short notes and quotes, pulled from a personal feed and kept offline between runs.",
            p.post_body,
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Feed:          ", p.muted),
            Span::styled(app.feed_url.clone(), p.post_body),
        ]),
        Line::from(vec![
            Span::styled("Auto refresh:  ", p.muted),
            Span::styled(auto, p.post_body),
        ]),
        Line::from(vec![
            Span::styled("Retries:       ", p.muted),
            Span::styled(
                format!(
                    "{} after {}s",
                    settings.max_retries,
                    settings.retry_delay.as_secs()
                ),
                p.post_body,
            ),
        ]),
        Line::from(vec![
            Span::styled("Data dir:      ", p.muted),
            Span::styled(app.store.dir().display().to_string(), p.post_body),
        ]),
        Line::from(""),
        Line::from(Span::styled("Keys", p.heading)),
        Line::from(Span::styled(
            "r refresh · t theme · x random · c category · a home/about · o open · q quit",
            p.muted,
        )),
    ]
}

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let paragraph = Paragraph::new(about_lines(app))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.palette.panel_border)
                .title(" About "),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
