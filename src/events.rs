use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use tracing::info;

use crate::app::{App, View};

/// File written by the `e` key, relative to the working directory.
pub const EXPORT_FILE: &str = "energy_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // View switching
        KeyCode::Tab | KeyCode::BackTab => app.next_view(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::Char('1') => app.set_view(View::Overview),
        KeyCode::Char('2') => app.set_view(View::Trend),

        // Trend year
        KeyCode::Char('[') => app.prev_trend_year(),
        KeyCode::Char(']') => app.next_trend_year(),
        KeyCode::Char('t') => app.reset_trend_year(),

        KeyCode::Char('r') => app.force_reload(),
        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    info!("Exported dashboard to {}", export_path.display());
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        // Scroll the trend year while on the Trend view
        MouseEventKind::ScrollUp if app.current_view == View::Trend => app.prev_trend_year(),
        MouseEventKind::ScrollDown if app.current_view == View::Trend => app.next_trend_year(),

        // Tab clicks (row 1, after header)
        MouseEventKind::Down(MouseButton::Left) if mouse.row == 1 => {
            // " 1:Overview " spans columns 0-11, the divider is at 12
            if mouse.column < 12 {
                app.set_view(View::Overview);
            } else if mouse.column < 22 {
                app.set_view(View::Trend);
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DashboardOptions;
    use crate::source::ChannelSource;
    use chrono::{Datelike, NaiveDate};
    use crossterm::event::KeyModifiers;

    fn app() -> App {
        let (_tx, source) = ChannelSource::create("test");
        let now = NaiveDate::from_ymd_opt(2025, 5, 21)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let mut app = App::new(Box::new(source), DashboardOptions::default(), now, None);
        app.reload_data();
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn click(app: &mut App, column: u16, row: u16) {
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(app, mouse);
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn test_view_switching() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_view, View::Trend);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.current_view, View::Overview);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.current_view, View::Trend);
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.current_view, View::Overview);
    }

    #[test]
    fn test_trend_year_keys() {
        let mut app = app();
        let year = app.today.year();
        press(&mut app, KeyCode::Char('['));
        assert_eq!(app.trend_year(), year - 1);
        press(&mut app, KeyCode::Char(']'));
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.trend_year(), year + 1);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.trend_year(), year);
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn test_tab_clicks() {
        let mut app = app();
        click(&mut app, 15, 1);
        assert_eq!(app.current_view, View::Trend);
        click(&mut app, 3, 1);
        assert_eq!(app.current_view, View::Overview);
        // Clicks outside the tab row do nothing
        click(&mut app, 15, 5);
        assert_eq!(app.current_view, View::Overview);
    }
}
