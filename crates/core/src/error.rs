//! Error types for the field and its pieces.

use blockfall_types::{Rotation, TileVector};
use thiserror::Error;

use crate::state::GameFieldState;

/// Errors surfaced by field, shape and block operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Only quarter turns are valid rotation directions.
    #[error("rotation direction must be Left or Right, got {0:?}")]
    InvalidRotationDirection(Rotation),

    #[error("field dimensions {width}x{height} are too small to hold a piece")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("duration `{0}` must be at least one tick")]
    ZeroDuration(&'static str),

    #[error("tile ({}, {}) is outside the field", .0.x, .0.y)]
    OutOfRange(TileVector),

    #[error("tile ({}, {}) is already occupied", .0.x, .0.y)]
    Occupied(TileVector),

    #[error("piece does not fit at ({}, {})", .0.x, .0.y)]
    DoesNotFit(TileVector),
}

/// A requested state change that the transition table forbids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal transition {from:?} -> {to:?}")]
pub struct IllegalTransition {
    pub from: GameFieldState,
    pub to: GameFieldState,
}
