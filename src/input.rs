//! Key bindings: normal and vim-style.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    /// Toward the viewer (y - 1).
    MoveForward,
    /// Away from the viewer (y + 1).
    MoveBack,
    RotateCw,
    RotateCcw,
    SoftDrop,
    HardDrop,
    Pause,
    Quit,
    None,
}

impl Action {
    /// Actions that keep firing while the key is held (DAS/ARR).
    pub const fn repeats(self) -> bool {
        matches!(
            self,
            Self::MoveLeft | Self::MoveRight | Self::MoveForward | Self::MoveBack | Self::SoftDrop
        )
    }
}

/// Map key event to game action. Arrows move on the floor plane; vim users get hjkl.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod && modifiers != KeyModifiers::CONTROL {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc if no_mod => Action::Quit,
        KeyCode::Char('p' | ' ') if modifiers == KeyModifiers::CONTROL => Action::Pause,
        KeyCode::Char('p') if no_mod => Action::Pause,
        KeyCode::Left | KeyCode::Char('h') if no_mod => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') if no_mod => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') if no_mod => Action::MoveForward,
        KeyCode::Down | KeyCode::Char('j') if no_mod => Action::MoveBack,
        KeyCode::Char('x' | 'i') if no_mod => Action::RotateCw,
        KeyCode::Char('z' | 'u') if no_mod => Action::RotateCcw,
        KeyCode::Char('s' | 'd') if no_mod => Action::SoftDrop,
        KeyCode::Enter | KeyCode::Char(' ') if no_mod => Action::HardDrop,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrows_and_vim_agree() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('h'))), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::MoveForward);
        assert_eq!(key_to_action(key(KeyCode::Char('k'))), Action::MoveForward);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::MoveBack);
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), Action::MoveBack);
    }

    #[test]
    fn test_drops_and_rotation() {
        assert_eq!(key_to_action(key(KeyCode::Char(' '))), Action::HardDrop);
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::HardDrop);
        assert_eq!(key_to_action(key(KeyCode::Char('s'))), Action::SoftDrop);
        assert_eq!(key_to_action(key(KeyCode::Char('x'))), Action::RotateCw);
        assert_eq!(key_to_action(key(KeyCode::Char('z'))), Action::RotateCcw);
    }

    #[test]
    fn test_modifiers() {
        let ctrl_p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_p), Action::Pause);
        let alt_h = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::ALT);
        assert_eq!(key_to_action(alt_h), Action::None);
        let ctrl_h = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_h), Action::None);
    }

    #[test]
    fn test_repeatable() {
        assert!(Action::MoveBack.repeats());
        assert!(Action::SoftDrop.repeats());
        assert!(!Action::HardDrop.repeats());
        assert!(!Action::RotateCw.repeats());
    }
}
