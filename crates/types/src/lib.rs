//! Shared value types and constants.
//!
//! Everything here is plain data with no dependencies, usable from the core,
//! the input layer and the terminal renderer alike.
//!
//! # Field dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn position**: (3, 0), the top-left of the piece frame
//!
//! # Timing
//!
//! The field advances in fixed ticks of [`TICK_MS`]. Durations are expressed
//! in ticks:
//!
//! | Constant | Ticks | Description |
//! |----------|-------|-------------|
//! | `SOFT_DROP_TICKS` | 15 | One row of normal fall |
//! | `FORCED_DROP_TICKS` | 3 | One row while down is held |
//! | `USER_CONTROL_TICKS` | 15 | Left/right nudge and rotation tween |
//! | `BLOCK_BREAK_TICKS` | 15 | Fade-out of a cleared row |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{Rotation, TileVector, DEFAULT_WIDTH, SPAWN_COORDINATES};
//!
//! assert_eq!(Rotation::Right.add(Rotation::Right), Rotation::UpsideDown);
//! assert_eq!(SPAWN_COORDINATES + TileVector::new(1, 1), TileVector::new(4, 1));
//! assert_eq!(DEFAULT_WIDTH, 10);
//! ```

pub mod color;
pub mod geometry;
pub mod input;
pub mod rotation;

pub use color::BlockColor;
pub use geometry::{RenderVector, TileVector, Transform};
pub use input::{InputKey, InputSnapshot, KeyState};
pub use rotation::{normalize_angle, Rotation};

/// Field width in tiles (10 columns)
pub const DEFAULT_WIDTH: i32 = 10;

/// Field height in tiles (20 rows)
pub const DEFAULT_HEIGHT: i32 = 20;

/// Simulation rate
pub const TICKS_PER_SECOND: u32 = 60;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 ticks per second)
pub const TICK_MS: u32 = 1000 / TICKS_PER_SECOND;

/// Top-left frame tile where new pieces appear
pub const SPAWN_COORDINATES: TileVector = TileVector::new(3, 0);

/// Ticks for one row of normal fall (a quarter second)
pub const SOFT_DROP_TICKS: u32 = TICKS_PER_SECOND / 4;

/// Ticks for one row while down is held
pub const FORCED_DROP_TICKS: u32 = TICKS_PER_SECOND / 16;

/// Ticks for left/right nudges and rotation tweens
pub const USER_CONTROL_TICKS: u32 = TICKS_PER_SECOND / 4;

/// Ticks for the break animation of a cleared row
pub const BLOCK_BREAK_TICKS: u32 = TICKS_PER_SECOND / 4;
