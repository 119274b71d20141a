use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, Focus};
use crate::tui::AppEvent;

/// Lines moved per mouse wheel notch over the response panel.
const WHEEL_STEP: u16 = 3;

pub async fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => {
            if app.input_enabled() {
                app.focus = Focus::Input;
            }
            app.insert_str(&text);
        }
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }

    app.poll_reply().await;
    app.poll_backend().await;
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::PageDown => app.scroll_response_down(app.half_page()),
        KeyCode::PageUp => app.scroll_response_up(app.half_page()),
        KeyCode::Enter => {
            app.submit();
        }
        _ => match app.focus {
            Focus::Input => handle_input_key(app, key),
            Focus::SendButton => handle_button_key(app, key),
        },
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.insert_char(c),
        _ => {}
    }
}

fn handle_button_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char(' ') {
        app.submit();
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let hit = |area: Option<Rect>| area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if hit(app.send_area) {
                app.focus = Focus::SendButton;
                app.submit();
            } else if hit(app.input_area) {
                app.focus = Focus::Input;
            }
        }
        MouseEventKind::ScrollDown if hit(app.response_area) => {
            app.scroll_response_down(WHEEL_STEP);
        }
        MouseEventKind::ScrollUp if hit(app.response_area) => {
            app.scroll_response_up(WHEEL_STEP);
        }
        _ => {}
    }
}
