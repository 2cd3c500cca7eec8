//! Key bindings (arrows and vim-style) and mouse clicks.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    /// Click the cell under the keyboard cursor.
    Select,
    Restart,
    Quit,
    None,
}

/// Map key event to game action. Supports both arrows and vim hjkl.
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
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Up | KeyCode::Char('k') => Action::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Action::CursorDown,
        KeyCode::Left | KeyCode::Char('h') => Action::CursorLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::CursorRight,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        _ => Action::None,
    }
}

/// Terminal position (column, row) of a left-button press.
pub fn left_click(mouse: MouseEvent) -> Option<(u16, u16)> {
    matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)).then_some((mouse.column, mouse.row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Action {
        key_to_action(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_arrows_and_vim_agree() {
        assert_eq!(press(KeyCode::Up, KeyModifiers::NONE), Action::CursorUp);
        assert_eq!(press(KeyCode::Char('k'), KeyModifiers::NONE), Action::CursorUp);
        assert_eq!(press(KeyCode::Char('l'), KeyModifiers::NONE), Action::CursorRight);
        assert_eq!(press(KeyCode::Char(' '), KeyModifiers::NONE), Action::Select);
    }

    #[test]
    fn test_ctrl_c_quits_other_modifiers_ignored() {
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
        assert_eq!(press(KeyCode::Char('q'), KeyModifiers::ALT), Action::None);
    }

    #[test]
    fn test_only_left_press_clicks() {
        let mut ev = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(left_click(ev), Some((7, 3)));
        ev.kind = MouseEventKind::Up(MouseButton::Left);
        assert_eq!(left_click(ev), None);
    }
}
