//! Core game logic - pure, deterministic and testable
//!
//! This crate holds the falling-block rules: the field state machine, the
//! piece geometry and collision model, line clearing and scoring. It has no
//! dependencies on terminals or input devices.
//!
//! - **Deterministic**: the same seed produces the same piece sequence
//! - **Tick driven**: one call to [`GameField::tick`] per fixed timestep
//! - **Animation aware**: tile state changes immediately, poses catch up
//!   through tweens whose completions feed the transition queue
//!
//! # Module Structure
//!
//! - [`game_field`]: the orchestrator, with input handling and line clears
//! - [`state`]: field states, transition table and bounded queue
//! - [`shape`] and [`shape_type`]: the active piece and the piece catalog
//! - [`block`] and [`locked`]: single tiles and the locked grid
//! - [`animation`]: tweens and per-object animation slots
//! - [`scoring`]: line, T-spin and combo rules
//! - [`display`]: score and next-piece display hooks
//! - [`config`], [`rng`], [`error`]
//!
//! # Field Lifecycle
//!
//! ```text
//! Stopped -> ShapeSpawnReady -> ShapeSoftDrop/ShapeForcedDrop (repeat)
//!         -> ShapeFell -> ClearingFilledLines -> DroppingBlocks
//!         -> ShapeSpawnReady ...
//! ```
//!
//! A blocked spawn goes `ShapeFell -> ShapeLocked` and ends the game.
//!
//! # Example
//!
//! ```
//! use blockfall_core::{FieldConfig, GameField, GameFieldState};
//!
//! let mut field = GameField::new(FieldConfig::default())?;
//! field.start();
//! field.tick()?;
//!
//! assert_eq!(field.state(), GameFieldState::ShapeSpawnReady);
//! assert!(field.active_shape().is_some());
//! # Ok::<(), blockfall_core::FieldError>(())
//! ```

pub mod animation;
pub mod block;
pub mod config;
pub mod display;
pub mod error;
pub mod game_field;
pub mod locked;
pub mod rng;
pub mod scoring;
pub mod shape;
pub mod shape_type;
pub mod state;

pub use blockfall_types as types;

pub use animation::{Animation, AnimationHandle, AnimationSlots, Pose};
pub use block::{Block, BlockAnimation, BlockParent};
pub use config::FieldConfig;
pub use display::{NextShapeDisplay, ScoreDisplay};
pub use error::{FieldError, IllegalTransition};
pub use game_field::{GameField, RenderedBlock};
pub use locked::{LockedBlocks, TileField};
pub use rng::SimpleRng;
pub use scoring::{calculate_score, ScoreResult};
pub use shape::{Shape, ShapeAnimation};
pub use shape_type::ShapeType;
pub use state::{GameFieldState, StateQueue};
