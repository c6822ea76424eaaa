//! Field configuration.
//!
//! Defaults mirror the constants in `blockfall_types`. Every value can be
//! overridden from the environment:
//!
//! - `BLOCKFALL_WIDTH`, `BLOCKFALL_HEIGHT`: field size in tiles
//! - `BLOCKFALL_SOFT_DROP_TICKS`: ticks per row of normal fall
//! - `BLOCKFALL_FORCED_DROP_TICKS`: ticks per row while down is held
//! - `BLOCKFALL_USER_CONTROL_TICKS`: nudge/rotation tween length
//! - `BLOCKFALL_BLOCK_BREAK_TICKS`: break animation length
//! - `BLOCKFALL_SEED`: RNG seed for piece and color draws
//!
//! Values that fail to parse fall back to the default.

use std::env;
use std::str::FromStr;

use blockfall_types::{
    TileVector, BLOCK_BREAK_TICKS, DEFAULT_HEIGHT, DEFAULT_WIDTH, FORCED_DROP_TICKS,
    SOFT_DROP_TICKS, SPAWN_COORDINATES, USER_CONTROL_TICKS,
};

use crate::error::FieldError;

/// Smallest field that can hold any piece frame.
const MIN_SIDE: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    pub width: i32,
    pub height: i32,
    pub soft_drop_ticks: u32,
    pub forced_drop_ticks: u32,
    pub user_control_ticks: u32,
    pub block_break_ticks: u32,
    pub spawn: TileVector,
    pub seed: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            soft_drop_ticks: SOFT_DROP_TICKS,
            forced_drop_ticks: FORCED_DROP_TICKS,
            user_control_ticks: USER_CONTROL_TICKS,
            block_break_ticks: BLOCK_BREAK_TICKS,
            spawn: SPAWN_COORDINATES,
            seed: 1,
        }
    }
}

impl FieldConfig {
    /// Create from `BLOCKFALL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: FromStr>(value: Option<String>, default: T) -> T {
            value
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        let width = parse(lookup("BLOCKFALL_WIDTH"), defaults.width);
        Self {
            width,
            height: parse(lookup("BLOCKFALL_HEIGHT"), defaults.height),
            soft_drop_ticks: parse(lookup("BLOCKFALL_SOFT_DROP_TICKS"), defaults.soft_drop_ticks),
            forced_drop_ticks: parse(
                lookup("BLOCKFALL_FORCED_DROP_TICKS"),
                defaults.forced_drop_ticks,
            ),
            user_control_ticks: parse(
                lookup("BLOCKFALL_USER_CONTROL_TICKS"),
                defaults.user_control_ticks,
            ),
            block_break_ticks: parse(
                lookup("BLOCKFALL_BLOCK_BREAK_TICKS"),
                defaults.block_break_ticks,
            ),
            // keep the spawn frame roughly centered on wider fields
            spawn: TileVector::new((width - MIN_SIDE) / 2, 0),
            seed: parse(lookup("BLOCKFALL_SEED"), defaults.seed),
        }
    }

    /// Rejects configurations the field cannot run with.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.width < MIN_SIDE || self.height < MIN_SIDE {
            return Err(FieldError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let durations = [
            ("soft_drop_ticks", self.soft_drop_ticks),
            ("forced_drop_ticks", self.forced_drop_ticks),
            ("user_control_ticks", self.user_control_ticks),
            ("block_break_ticks", self.block_break_ticks),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, ticks)| *ticks == 0) {
            return Err(FieldError::ZeroDuration(name));
        }
        if self.spawn.x < 0 || self.spawn.y < 0 || self.spawn.x + MIN_SIDE > self.width {
            return Err(FieldError::OutOfRange(self.spawn));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = FieldConfig::default();
        assert_eq!(config.spawn, TileVector::new(3, 0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = FieldConfig::from_lookup(lookup(&[
            ("BLOCKFALL_WIDTH", "12"),
            ("BLOCKFALL_SOFT_DROP_TICKS", " 30 "),
            ("BLOCKFALL_SEED", "99"),
        ]));
        assert_eq!(config.width, 12);
        assert_eq!(config.height, 20);
        assert_eq!(config.soft_drop_ticks, 30);
        assert_eq!(config.seed, 99);
        assert_eq!(config.spawn, TileVector::new(4, 0));
    }

    #[test]
    fn test_from_lookup_falls_back_on_garbage() {
        let config = FieldConfig::from_lookup(lookup(&[
            ("BLOCKFALL_HEIGHT", "tall"),
            ("BLOCKFALL_FORCED_DROP_TICKS", "-3"),
        ]));
        assert_eq!(config, FieldConfig::default());
    }

    #[test]
    fn test_from_env_does_not_panic() {
        let _config = FieldConfig::from_env();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let narrow = FieldConfig {
            width: 3,
            ..FieldConfig::default()
        };
        assert_eq!(
            narrow.validate(),
            Err(FieldError::InvalidDimensions { width: 3, height: 20 })
        );

        let frozen = FieldConfig {
            block_break_ticks: 0,
            ..FieldConfig::default()
        };
        assert_eq!(
            frozen.validate(),
            Err(FieldError::ZeroDuration("block_break_ticks"))
        );

        let offside = FieldConfig {
            spawn: TileVector::new(8, 0),
            ..FieldConfig::default()
        };
        assert!(matches!(offside.validate(), Err(FieldError::OutOfRange(_))));
    }
}
