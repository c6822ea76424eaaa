//! Edge tracker turning terminal key events into per-tick snapshots.
//!
//! Supports terminals that do not emit key release events by using a timeout.
//! Only the down key is treated as held; every other key acts on its press
//! edge, and terminal auto-repeat produces further presses.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::map::map_key;
use crate::types::{InputKey, InputSnapshot, KeyState};

// In terminals without key-release events, a short timeout prevents a single tap
// from turning into a sustained forced drop.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u64 = 150;

/// Collects key edges between two field ticks.
#[derive(Debug, Clone)]
pub struct InputTracker {
    pending: InputSnapshot,
    down_held: bool,
    last_down_time: Instant,
    /// Release seen in the same tick as its press, reported next tick
    deferred_release: bool,
    key_release_timeout: Duration,
}

impl InputTracker {
    pub fn new(now: Instant) -> Self {
        Self {
            pending: InputSnapshot::new(),
            down_held: false,
            last_down_time: now,
            deferred_release: false,
            key_release_timeout: Duration::from_millis(DEFAULT_KEY_RELEASE_TIMEOUT_MS),
        }
    }

    pub fn with_key_release_timeout(mut self, timeout: Duration) -> Self {
        self.key_release_timeout = timeout;
        self
    }

    pub fn key_release_timeout(&self) -> Duration {
        self.key_release_timeout
    }

    pub fn is_down_held(&self) -> bool {
        self.down_held
    }

    /// Feed one crossterm event.
    pub fn handle_event(&mut self, event: KeyEvent, now: Instant) {
        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => self.handle_key_press(event.code, now),
            KeyEventKind::Release => self.handle_key_release(event.code),
        }
    }

    pub fn handle_key_press(&mut self, code: KeyCode, now: Instant) {
        let Some(key) = map_key(code) else {
            return;
        };
        if key == InputKey::Down {
            self.last_down_time = now;
            if self.down_held {
                return;
            }
            self.down_held = true;
            self.deferred_release = false;
        }
        self.pending.set(key, KeyState::Pressed);
    }

    pub fn handle_key_release(&mut self, code: KeyCode) {
        if map_key(code) != Some(InputKey::Down) || !self.down_held {
            return;
        }
        self.down_held = false;
        if self.pending.is_pressed(InputKey::Down) {
            self.deferred_release = true;
        } else {
            self.pending.set(InputKey::Down, KeyState::Released);
        }
    }

    /// Take the edges collected since the previous call.
    pub fn snapshot(&mut self, now: Instant) -> InputSnapshot {
        // Auto-release when terminal does not emit release events.
        if self.down_held
            && now.saturating_duration_since(self.last_down_time) > self.key_release_timeout
        {
            self.handle_key_release(KeyCode::Down);
        }

        let snapshot = self.pending;
        self.pending = InputSnapshot::new();
        if self.deferred_release && !snapshot.is_pressed(InputKey::Down) {
            self.deferred_release = false;
            let mut snapshot = snapshot;
            snapshot.set(InputKey::Down, KeyState::Released);
            return snapshot;
        }
        snapshot
    }

    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now).with_key_release_timeout(self.key_release_timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_press_is_reported_once() {
        let t0 = Instant::now();
        let mut tracker = InputTracker::new(t0);
        tracker.handle_key_press(KeyCode::Left, t0);

        let snapshot = tracker.snapshot(t0);
        assert!(snapshot.is_pressed(InputKey::Left));
        assert!(tracker.snapshot(t0 + ms(16)).is_idle());
    }

    #[test]
    fn test_down_press_and_release_edges() {
        let t0 = Instant::now();
        let mut tracker = InputTracker::new(t0).with_key_release_timeout(ms(10_000));

        tracker.handle_key_press(KeyCode::Down, t0);
        assert!(tracker.snapshot(t0).is_pressed(InputKey::Down));
        assert!(tracker.is_down_held());

        // repeats while held are not new presses
        tracker.handle_key_press(KeyCode::Down, t0 + ms(30));
        assert!(tracker.snapshot(t0 + ms(32)).is_idle());

        tracker.handle_key_release(KeyCode::Down);
        assert!(tracker.snapshot(t0 + ms(48)).is_released(InputKey::Down));
        assert!(!tracker.is_down_held());
    }

    #[test]
    fn test_release_in_same_tick_is_deferred() {
        let t0 = Instant::now();
        let mut tracker = InputTracker::new(t0);
        tracker.handle_key_press(KeyCode::Down, t0);
        tracker.handle_key_release(KeyCode::Down);

        assert!(tracker.snapshot(t0).is_pressed(InputKey::Down));
        assert!(tracker.snapshot(t0 + ms(16)).is_released(InputKey::Down));
        assert!(tracker.snapshot(t0 + ms(32)).is_idle());
    }

    #[test]
    fn test_auto_release_triggers_after_timeout_without_key_release_events() {
        let t0 = Instant::now();
        let mut tracker = InputTracker::new(t0).with_key_release_timeout(ms(50));

        tracker.handle_key_press(KeyCode::Char('s'), t0);
        assert!(tracker.snapshot(t0).is_pressed(InputKey::Down));
        assert!(tracker.snapshot(t0 + ms(40)).is_idle());

        let snapshot = tracker.snapshot(t0 + ms(51));
        assert!(snapshot.is_released(InputKey::Down));
        assert!(!tracker.is_down_held());
    }

    #[test]
    fn test_non_down_key_does_not_extend_auto_release_timeout() {
        let t0 = Instant::now();
        let mut tracker = InputTracker::new(t0).with_key_release_timeout(ms(50));

        tracker.handle_key_press(KeyCode::Down, t0);
        tracker.snapshot(t0);
        tracker.handle_key_press(KeyCode::Up, t0 + ms(45));

        let snapshot = tracker.snapshot(t0 + ms(60));
        assert!(snapshot.is_pressed(InputKey::RotateRight));
        assert!(snapshot.is_released(InputKey::Down));
    }

    #[test]
    fn test_event_kinds() {
        let t0 = Instant::now();
        let mut tracker = InputTracker::new(t0);

        let press = KeyEvent::new_with_kind(KeyCode::Down, KeyModifiers::NONE, KeyEventKind::Press);
        let release =
            KeyEvent::new_with_kind(KeyCode::Down, KeyModifiers::NONE, KeyEventKind::Release);
        let repeat =
            KeyEvent::new_with_kind(KeyCode::Char('z'), KeyModifiers::NONE, KeyEventKind::Repeat);

        tracker.handle_event(press, t0);
        tracker.handle_event(repeat, t0);
        let snapshot = tracker.snapshot(t0);
        assert!(snapshot.is_pressed(InputKey::Down));
        assert!(snapshot.is_pressed(InputKey::RotateLeft));

        tracker.handle_event(release, t0 + ms(5));
        assert!(tracker.snapshot(t0 + ms(16)).is_released(InputKey::Down));
    }

    #[test]
    fn test_default_key_release_timeout_is_non_zero() {
        let tracker = InputTracker::new(Instant::now());
        assert!(tracker.key_release_timeout() > Duration::ZERO);
    }

    #[test]
    fn test_reset_clears_held_state() {
        let t0 = Instant::now();
        let mut tracker = InputTracker::new(t0).with_key_release_timeout(ms(10_000));
        tracker.handle_key_press(KeyCode::Down, t0);
        tracker.handle_key_press(KeyCode::Left, t0);

        tracker.reset(t0);
        assert!(!tracker.is_down_held());
        assert!(tracker.snapshot(t0).is_idle());
        assert_eq!(tracker.key_release_timeout(), ms(10_000));
    }
}
