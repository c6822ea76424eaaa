//! Per-tick input snapshot handed to the field.
//!
//! Frontends translate device events into one [`InputSnapshot`] per tick; the
//! core only ever reads it.

/// Logical keys the field reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKey {
    Left,
    Right,
    Down,
    RotateLeft,
    RotateRight,
    Pause,
}

impl InputKey {
    pub const ALL: [InputKey; 6] = [
        InputKey::Left,
        InputKey::Right,
        InputKey::Down,
        InputKey::RotateLeft,
        InputKey::RotateRight,
        InputKey::Pause,
    ];

    fn index(self) -> usize {
        match self {
            InputKey::Left => 0,
            InputKey::Right => 1,
            InputKey::Down => 2,
            InputKey::RotateLeft => 3,
            InputKey::RotateRight => 4,
            InputKey::Pause => 5,
        }
    }
}

/// Edge state of a key within one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyState {
    Pressed,
    Released,
    #[default]
    Idle,
}

/// Key states for a single tick. Keys not mentioned are [`KeyState::Idle`].
///
/// # Examples
///
/// ```
/// use blockfall_types::{InputKey, InputSnapshot, KeyState};
///
/// let snapshot = InputSnapshot::new().with(InputKey::Left, KeyState::Pressed);
/// assert!(snapshot.is_pressed(InputKey::Left));
/// assert_eq!(snapshot.state(InputKey::Down), KeyState::Idle);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    states: [KeyState; 6],
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: InputKey, state: KeyState) -> Self {
        self.set(key, state);
        self
    }

    pub fn set(&mut self, key: InputKey, state: KeyState) {
        self.states[key.index()] = state;
    }

    pub fn state(&self, key: InputKey) -> KeyState {
        self.states[key.index()]
    }

    pub fn is_pressed(&self, key: InputKey) -> bool {
        self.state(key) == KeyState::Pressed
    }

    pub fn is_released(&self, key: InputKey) -> bool {
        self.state(key) == KeyState::Released
    }

    /// True when every key is idle.
    pub fn is_idle(&self) -> bool {
        self.states.iter().all(|s| *s == KeyState::Idle)
    }
}
