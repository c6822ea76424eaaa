//! Field states and the transition queue
//!
//! Every change of [`GameFieldState`] goes through the [`StateQueue`]. A
//! state is admitted only if the transition table allows it after the
//! queue's tail, so input and animation completions racing within one tick
//! can never schedule an impossible sequence.

use std::collections::VecDeque;

use crate::error::IllegalTransition;

/// Maximum number of pending transitions.
pub const QUEUE_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameFieldState {
    #[default]
    Stopped,
    Paused,
    ShapeSoftDrop,
    ShapeForcedDrop,
    ShapeWallKicked,
    ShapeFell,
    ShapeLocked,
    ClearingFilledLines,
    DroppingBlocks,
    ShapeSpawnReady,
}

const CONTROLLABLE: &[GameFieldState] = &[
    GameFieldState::ShapeSoftDrop,
    GameFieldState::ShapeForcedDrop,
    GameFieldState::ShapeWallKicked,
    GameFieldState::ShapeFell,
];

impl GameFieldState {
    pub const ALL: [GameFieldState; 10] = [
        GameFieldState::Stopped,
        GameFieldState::Paused,
        GameFieldState::ShapeSoftDrop,
        GameFieldState::ShapeForcedDrop,
        GameFieldState::ShapeWallKicked,
        GameFieldState::ShapeFell,
        GameFieldState::ShapeLocked,
        GameFieldState::ClearingFilledLines,
        GameFieldState::DroppingBlocks,
        GameFieldState::ShapeSpawnReady,
    ];

    /// States in which the active shape is falling on its own.
    pub fn shape_falling(self) -> bool {
        matches!(
            self,
            GameFieldState::ShapeSoftDrop
                | GameFieldState::ShapeForcedDrop
                | GameFieldState::ShapeSpawnReady
        )
    }

    /// States that may be queued while `self` is current.
    ///
    /// `None` means any state.
    fn successors(self) -> Option<&'static [GameFieldState]> {
        use GameFieldState::*;
        match self {
            Paused => None,
            Stopped => Some(&[ShapeSpawnReady]),
            ShapeSoftDrop | ShapeForcedDrop | ShapeWallKicked | ShapeSpawnReady => {
                Some(CONTROLLABLE)
            }
            ShapeFell => Some(&[ShapeLocked]),
            ShapeLocked => Some(&[ClearingFilledLines, ShapeSpawnReady]),
            ClearingFilledLines => Some(&[DroppingBlocks, ShapeSpawnReady]),
            DroppingBlocks => Some(&[ShapeSpawnReady]),
        }
    }

    pub fn can_transition_to(self, next: GameFieldState) -> bool {
        self.successors().map_or(true, |allowed| allowed.contains(&next))
    }

    /// Check `next` against the transition table.
    pub fn try_transition(
        current: GameFieldState,
        next: GameFieldState,
    ) -> Result<GameFieldState, IllegalTransition> {
        if current.can_transition_to(next) {
            Ok(next)
        } else {
            Err(IllegalTransition {
                from: current,
                to: next,
            })
        }
    }
}

/// Bounded FIFO of pending transitions.
#[derive(Debug, Clone, Default)]
pub struct StateQueue {
    pending: VecDeque<GameFieldState>,
}

impl StateQueue {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(QUEUE_CAPACITY),
        }
    }

    /// Append `state` if the table allows it after the current tail.
    ///
    /// Returns false when the transition is illegal or the queue is full.
    pub fn offer(&mut self, state: GameFieldState) -> bool {
        if self.pending.len() >= QUEUE_CAPACITY {
            tracing::trace!(?state, "transition queue full");
            return false;
        }
        if let Some(&tail) = self.pending.back() {
            if let Err(err) = GameFieldState::try_transition(tail, state) {
                tracing::trace!(%err, "transition rejected");
                return false;
            }
        }
        self.pending.push_back(state);
        true
    }

    pub fn poll(&mut self) -> Option<GameFieldState> {
        self.pending.pop_front()
    }

    pub fn peek(&self) -> Option<GameFieldState> {
        self.pending.front().copied()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GameFieldState> + '_ {
        self.pending.iter().copied()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GameFieldState::*;

    #[test]
    fn test_falling_states() {
        let falling: Vec<GameFieldState> =
            GameFieldState::ALL.into_iter().filter(|s| s.shape_falling()).collect();
        assert_eq!(falling, vec![ShapeSoftDrop, ShapeForcedDrop, ShapeSpawnReady]);
    }

    #[test]
    fn test_transition_table() {
        assert!(Stopped.can_transition_to(ShapeSpawnReady));
        assert!(!Stopped.can_transition_to(ShapeSoftDrop));

        for state in GameFieldState::ALL {
            assert!(Paused.can_transition_to(state));
        }

        assert!(ShapeFell.can_transition_to(ShapeLocked));
        assert!(!ShapeFell.can_transition_to(ClearingFilledLines));
        assert!(ShapeLocked.can_transition_to(ClearingFilledLines));
        assert!(ClearingFilledLines.can_transition_to(DroppingBlocks));
        assert!(!DroppingBlocks.can_transition_to(ShapeSoftDrop));
        assert!(ShapeSpawnReady.can_transition_to(ShapeFell));
        assert!(ShapeWallKicked.can_transition_to(ShapeSoftDrop));
        assert!(!ShapeSoftDrop.can_transition_to(ShapeSpawnReady));

        assert_eq!(
            GameFieldState::try_transition(ShapeFell, ShapeSoftDrop),
            Err(IllegalTransition {
                from: ShapeFell,
                to: ShapeSoftDrop
            })
        );
        assert_eq!(
            GameFieldState::try_transition(ShapeFell, ShapeLocked),
            Ok(ShapeLocked)
        );
    }

    #[test]
    fn test_queue_admission_follows_tail() {
        let mut queue = StateQueue::new();
        // empty queue admits anything
        assert!(queue.offer(ShapeFell));
        assert!(!queue.offer(ShapeSoftDrop));
        assert!(queue.offer(ShapeLocked));
        assert!(queue.offer(ClearingFilledLines));
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.peek(), Some(ShapeFell));
        assert_eq!(queue.poll(), Some(ShapeFell));
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![ShapeLocked, ClearingFilledLines]);

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn test_queue_is_bounded() {
        let mut queue = StateQueue::new();
        for _ in 0..QUEUE_CAPACITY {
            assert!(queue.offer(ShapeSoftDrop));
        }
        assert!(!queue.offer(ShapeSoftDrop));
        assert_eq!(queue.len(), QUEUE_CAPACITY);
    }
}
