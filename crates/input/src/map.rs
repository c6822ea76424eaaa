//! Key mapping from terminal events to field keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::InputKey;

/// Map a key code to the field key it drives.
pub fn map_key(code: KeyCode) -> Option<InputKey> {
    match code {
        // Movement
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(InputKey::Left)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(InputKey::Right)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(InputKey::Down)
        }

        // Rotation
        KeyCode::Up
        | KeyCode::Char('k')
        | KeyCode::Char('K')
        | KeyCode::Char('w')
        | KeyCode::Char('W')
        | KeyCode::Char('x')
        | KeyCode::Char('X') => Some(InputKey::RotateRight),
        KeyCode::Char('z')
        | KeyCode::Char('Z')
        | KeyCode::Char('y')
        | KeyCode::Char('Y') => Some(InputKey::RotateLeft),

        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Esc => Some(InputKey::Pause),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Check if key should start a new game.
pub fn should_restart(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_movement_keys() {
        assert_eq!(map_key(KeyCode::Left), Some(InputKey::Left));
        assert_eq!(map_key(KeyCode::Right), Some(InputKey::Right));
        assert_eq!(map_key(KeyCode::Down), Some(InputKey::Down));

        assert_eq!(map_key(KeyCode::Char('H')), Some(InputKey::Left));
        assert_eq!(map_key(KeyCode::Char('d')), Some(InputKey::Right));
        assert_eq!(map_key(KeyCode::Char('J')), Some(InputKey::Down));
    }

    #[test]
    fn test_rotation_keys() {
        assert_eq!(map_key(KeyCode::Up), Some(InputKey::RotateRight));
        assert_eq!(map_key(KeyCode::Char('W')), Some(InputKey::RotateRight));
        assert_eq!(map_key(KeyCode::Char('z')), Some(InputKey::RotateLeft));
        assert_eq!(map_key(KeyCode::Char('Y')), Some(InputKey::RotateLeft));
    }

    #[test]
    fn test_pause_and_unmapped_keys() {
        assert_eq!(map_key(KeyCode::Char('p')), Some(InputKey::Pause));
        assert_eq!(map_key(KeyCode::Esc), Some(InputKey::Pause));
        assert_eq!(map_key(KeyCode::Char(' ')), None);
        assert_eq!(map_key(KeyCode::Char('q')), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }

    #[test]
    fn test_restart_keys() {
        assert!(should_restart(KeyEvent::from(KeyCode::Char('r'))));
        assert!(should_restart(KeyEvent::from(KeyCode::Char('R'))));
        assert!(!should_restart(KeyEvent::from(KeyCode::Char('p'))));
    }
}
