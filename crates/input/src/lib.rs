//! Terminal input module (field-facing).
//!
//! This module is independent of any UI framework. It maps `crossterm` key
//! events onto [`crate::types::InputKey`] and collects them into one
//! [`crate::types::InputSnapshot`] per field tick, including on terminals
//! without key-release events.

pub mod map;
pub mod tracker;

pub use blockfall_types as types;

pub use map::{map_key, should_quit, should_restart};
pub use tracker::InputTracker;
