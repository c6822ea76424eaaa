//! Rotation algebra for pieces and blocks.
//!
//! A [`Rotation`] is both a *position* (how far a piece is turned relative to
//! its spawn layout) and a *direction* (how far to turn it). The four values
//! form a cyclic group of order 4 under [`Rotation::add`].
//!
//! Screen coordinates have y pointing down, so [`Rotation::Right`] is a
//! clockwise quarter turn on screen and maps to a positive angle.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Quarter-turn rotations, ordered clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Initial,
    Right,
    UpsideDown,
    Left,
}

impl Rotation {
    /// All rotations in clockwise order.
    pub const ALL: [Rotation; 4] = [
        Rotation::Initial,
        Rotation::Right,
        Rotation::UpsideDown,
        Rotation::Left,
    ];

    /// Position of this rotation in [`Rotation::ALL`].
    pub fn index(self) -> usize {
        match self {
            Rotation::Initial => 0,
            Rotation::Right => 1,
            Rotation::UpsideDown => 2,
            Rotation::Left => 3,
        }
    }

    /// Rotation at `index` modulo 4.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Composes two rotations.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::Right.add(Rotation::UpsideDown), Rotation::Left);
    /// assert_eq!(Rotation::Left.add(Rotation::Right), Rotation::Initial);
    /// ```
    pub fn add(self, other: Rotation) -> Self {
        Self::from_index(self.index() + other.index())
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Rotation::Right => Rotation::Left,
            Rotation::Left => Rotation::Right,
            Rotation::UpsideDown => Rotation::UpsideDown,
            Rotation::Initial => Rotation::Initial,
        }
    }

    /// Signed angle from [`Rotation::Initial`] to this rotation, in [-PI, PI).
    pub fn angle(self) -> f64 {
        match self {
            Rotation::Initial => 0.0,
            Rotation::Right => FRAC_PI_2,
            Rotation::UpsideDown => -PI,
            Rotation::Left => -FRAC_PI_2,
        }
    }

    /// Signed angle needed to turn from `from` to `to`.
    pub fn angle_between(from: Rotation, to: Rotation) -> f64 {
        normalize_angle(to.angle() - from.angle())
    }

    /// True for the two rotations that are valid turn directions.
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Left | Rotation::Right)
    }
}

/// Reduces a radian angle into `[-PI, PI)` using a floored modulo.
///
/// # Examples
///
/// ```
/// use blockfall_types::normalize_angle;
/// use std::f64::consts::PI;
///
/// assert_eq!(normalize_angle(PI), -PI);
/// assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
/// ```
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU);
    // rem_euclid may round up to exactly TAU for tiny negative inputs
    let wrapped = if wrapped >= TAU { 0.0 } else { wrapped };
    wrapped - PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_wraps_around() {
        assert_eq!(Rotation::Left.add(Rotation::Right), Rotation::Initial);
        assert_eq!(Rotation::UpsideDown.add(Rotation::UpsideDown), Rotation::Initial);
        assert_eq!(Rotation::Right.add(Rotation::Right), Rotation::UpsideDown);
        assert_eq!(Rotation::Initial.add(Rotation::Left), Rotation::Left);
    }

    #[test]
    fn inverse_undoes_rotation() {
        for rotation in Rotation::ALL {
            assert_eq!(rotation.add(rotation.inverse()), Rotation::Initial);
        }
        assert_eq!(Rotation::UpsideDown.inverse(), Rotation::UpsideDown);
    }

    #[test]
    fn angles_are_half_open() {
        for rotation in Rotation::ALL {
            let angle = rotation.angle();
            assert!((-PI..PI).contains(&angle), "{:?} -> {}", rotation, angle);
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-12, "{} != {}", actual, expected);
    }

    #[test]
    fn angle_between_is_shortest_signed_turn() {
        assert_close(Rotation::angle_between(Rotation::Initial, Rotation::Right), FRAC_PI_2);
        assert_close(Rotation::angle_between(Rotation::Right, Rotation::Initial), -FRAC_PI_2);
        assert_close(Rotation::angle_between(Rotation::Left, Rotation::Right), -PI);
    }

    #[test]
    fn normalize_angle_edges() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(-PI), -PI);
        assert_eq!(normalize_angle(PI), -PI);
        assert!(normalize_angle(-PI - 1e-17) < PI);
    }

    #[test]
    fn quarter_turns() {
        assert!(Rotation::Left.is_quarter_turn());
        assert!(Rotation::Right.is_quarter_turn());
        assert!(!Rotation::Initial.is_quarter_turn());
        assert!(!Rotation::UpsideDown.is_quarter_turn());
    }
}
