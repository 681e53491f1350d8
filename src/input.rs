//! Key and mouse bindings: arrows or vim keys for the cursor, click to pick a tile.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Action from a key press or mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Enter / Space: activate the tile under the cursor, or the menu entry.
    Activate,
    /// Left click at a terminal position.
    Click { column: u16, row: u16 },
    Reset,
    Quit,
    None,
}

/// Map key event to action. Supports both normal (arrows, enter) and vim (hjkl) keys.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Reset,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Activate,
        _ => Action::None,
    }
}

/// Left button presses become clicks; everything else is ignored.
pub fn mouse_to_action(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Action::Click {
            column: mouse.column,
            row: mouse.row,
        },
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press)
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_arrow_and_vim_keys_agree() {
        let none = KeyModifiers::NONE;
        assert_eq!(key_to_action(key(KeyCode::Left, none)), Action::Left);
        assert_eq!(key_to_action(key(KeyCode::Char('h'), none)), Action::Left);
        assert_eq!(key_to_action(key(KeyCode::Down, none)), Action::Down);
        assert_eq!(key_to_action(key(KeyCode::Char('j'), none)), Action::Down);
        assert_eq!(key_to_action(key(KeyCode::Enter, none)), Action::Activate);
        assert_eq!(key_to_action(key(KeyCode::Char(' '), none)), Action::Activate);
    }

    #[test]
    fn test_reset_and_quit() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('R'), KeyModifiers::SHIFT)),
            Action::Reset
        );
        assert_eq!(
            key_to_action(key(KeyCode::Esc, KeyModifiers::NONE)),
            Action::Quit
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('r'), KeyModifiers::ALT)),
            Action::None
        );
    }

    #[test]
    fn test_only_left_press_clicks() {
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::Down(MouseButton::Left))),
            Action::Click { column: 12, row: 7 }
        );
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::Down(MouseButton::Right))),
            Action::None
        );
        assert_eq!(mouse_to_action(mouse(MouseEventKind::Moved)), Action::None);
    }
}
