//! Random-post modal overlay.

use crate::app::App;
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::helpers::centered_rect;
use super::posts::quote_lines;

pub fn render(f: &mut Frame, app: &App) {
    let Some(quote) = app.modal.as_ref() else {
        return;
    };

    let overlay = centered_rect(70, 60, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let inner_width = overlay.width.saturating_sub(4) as usize;
    let mut lines = vec![Line::from("")];
    lines.extend(quote_lines(quote, &app.palette, false, inner_width));
    lines.push(Line::from(Span::styled(
        "(Esc/Enter/x) close  (o) open link",
        app.palette.muted,
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.palette.modal_border)
                .title(Span::styled(" 随机一条 ", app.palette.heading))
                .title_alignment(Alignment::Center),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, overlay);
}
