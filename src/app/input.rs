use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use tracing::debug;

use crate::model::SortOrder;
use crate::view::Screen;

use super::Dashboard;

/// Result of handling an event: Quit the app, or the event was consumed
/// (needs render). None means the event changed nothing.
#[derive(Debug, PartialEq, Eq)]
pub enum InputResult {
    Quit,
    Consumed,
}

fn consumed(changed: bool) -> Option<InputResult> {
    changed.then_some(InputResult::Consumed)
}

/// Route one terminal event to the key, mouse or resize handler.
pub fn handle_event<S: Screen>(dashboard: &mut Dashboard<S>, event: Event) -> Option<InputResult> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(dashboard, key),
        Event::Mouse(mouse) => handle_mouse(dashboard, mouse),
        Event::Resize(width, height) => {
            dashboard.resize(width, height);
            Some(InputResult::Consumed)
        }
        _ => None,
    }
}

/// Handle a key press.
pub fn handle_key<S: Screen>(dashboard: &mut Dashboard<S>, key_event: KeyEvent) -> Option<InputResult> {
    let KeyEvent { code, modifiers, .. } = key_event;

    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Some(InputResult::Quit);
    }

    let session = &mut dashboard.session;
    match code {
        KeyCode::Esc => Some(InputResult::Quit),
        KeyCode::Backspace => consumed(session.pop_filter_char()),
        KeyCode::Up => consumed(session.move_selection(-1)),
        KeyCode::Down => consumed(session.move_selection(1)),
        KeyCode::Char(_) if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => None,
        KeyCode::Char(' ') => {
            let active = session.toggle_snapshot();
            debug!(active, records = session.snapshot.len(), "snapshot toggled");
            Some(InputResult::Consumed)
        }
        KeyCode::Char(c) => match SortOrder::from_key(c) {
            Some(order) => {
                let changed = session.set_order(order);
                if changed {
                    debug!(%order, "sort order changed");
                }
                consumed(changed)
            }
            None => consumed(session.push_filter_char(c)),
        },
        _ => None,
    }
}

/// Left click selects the row under the cursor; right click clears the selection.
pub fn handle_mouse<S: Screen>(dashboard: &mut Dashboard<S>, mouse_event: MouseEvent) -> Option<InputResult> {
    let (_, height) = dashboard.screen().size();
    match mouse_event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            consumed(dashboard.session.select_at(mouse_event.column, mouse_event.row, height))
        }
        MouseEventKind::Down(MouseButton::Right) => consumed(dashboard.session.clear_selection()),
        _ => None,
    }
}
