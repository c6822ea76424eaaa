//! Terminal frontend for the falling-block field.
//!
//! Renders into a plain framebuffer that is diffed and flushed to the
//! terminal, instead of going through a widget toolkit.
//!
//! - [`fb`]: styled character grid
//! - [`view`]: draws a field, its panels and overlays into the grid
//! - [`panels`]: score and next-piece panels fed by the field
//! - [`renderer`]: raw-mode terminal output with frame diffing

pub mod fb;
pub mod panels;
pub mod renderer;
pub mod view;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use panels::{NextPanel, ScorePanel};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use view::{AnchorY, FieldView, TermField, Viewport};
