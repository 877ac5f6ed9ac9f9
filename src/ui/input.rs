//! Input handling for the TUI.
//!
//! The random-post modal captures keys while open; otherwise keys map to
//! page-level actions.

use crate::app::{App, Page};
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.modal.is_some() {
        return handle_modal_input(app, code);
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('r') => {
            if app.request_manual_refresh() {
                tracing::debug!("Manual refresh requested");
            }
        }
        KeyCode::Char('t') => {
            let name = app.toggle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KeyCode::Char('x') => {
            app.open_random();
        }
        KeyCode::Char('a') => app.toggle_page(),
        KeyCode::Esc if app.page == Page::About => app.toggle_page(),
        KeyCode::Char('c') if app.page == Page::Home => {
            let label = app.cycle_filter();
            app.set_status(format!("Category: {}", label));
        }
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Home | KeyCode::Char('g') => app.selected = 0,
        KeyCode::End | KeyCode::Char('G') => {
            app.selected = app.visible_quotes().len().saturating_sub(1);
        }
        KeyCode::Char('o') | KeyCode::Enter => app.open_active_link(),
        _ => {}
    }
    Action::Continue
}

/// Keys while the random-post modal is open.
fn handle_modal_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('x') => app.close_modal(),
        KeyCode::Char('o') => app.open_active_link(),
        KeyCode::Char('q') => return Action::Quit,
        _ => {}
    }
    Action::Continue
}
