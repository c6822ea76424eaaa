//! Tile-grid and render-space geometry.
//!
//! - [`TileVector`]: integer grid coordinates, ordered row-major so that
//!   sorted iteration scans the field top to bottom.
//! - [`RenderVector`]: real-valued coordinates in tile units (one tile = 1.0),
//!   y pointing down.
//! - [`Transform`]: 2x3 affine matrix used to place blocks on screen.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::rotation::Rotation;

/// Integer (column, row) coordinate on the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileVector {
    pub x: i32,
    pub y: i32,
}

impl TileVector {
    pub const ZERO: TileVector = TileVector { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_render(self) -> RenderVector {
        RenderVector::new(self.x as f64, self.y as f64)
    }
}

impl Ord for TileVector {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for TileVector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for TileVector {
    type Output = TileVector;

    fn add(self, rhs: Self) -> Self::Output {
        TileVector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for TileVector {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for TileVector {
    type Output = TileVector;

    fn sub(self, rhs: Self) -> Self::Output {
        TileVector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for TileVector {
    type Output = TileVector;

    fn neg(self) -> Self::Output {
        TileVector::new(-self.x, -self.y)
    }
}

/// Real-valued coordinate in tile units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderVector {
    pub x: f64,
    pub y: f64,
}

impl RenderVector {
    pub const ZERO: RenderVector = RenderVector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rotates the vector around the origin by a quarter-turn multiple.
    ///
    /// Exact for all inputs: no trigonometry is involved.
    pub fn rotate(self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::Initial => self,
            Rotation::Right => RenderVector::new(-self.y, self.x),
            Rotation::UpsideDown => RenderVector::new(-self.x, -self.y),
            Rotation::Left => RenderVector::new(self.y, -self.x),
        }
    }

    /// Rounds both components to the nearest tile.
    pub fn round(self) -> TileVector {
        TileVector::new(self.x.round() as i32, self.y.round() as i32)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl From<TileVector> for RenderVector {
    fn from(value: TileVector) -> Self {
        value.to_render()
    }
}

impl Add for RenderVector {
    type Output = RenderVector;

    fn add(self, rhs: Self) -> Self::Output {
        RenderVector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Add<TileVector> for RenderVector {
    type Output = RenderVector;

    fn add(self, rhs: TileVector) -> Self::Output {
        self + rhs.to_render()
    }
}

impl Sub for RenderVector {
    type Output = RenderVector;

    fn sub(self, rhs: Self) -> Self::Output {
        RenderVector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for RenderVector {
    type Output = RenderVector;

    fn mul(self, rhs: f64) -> Self::Output {
        RenderVector::new(self.x * rhs, self.y * rhs)
    }
}

/// Affine transform `p -> M * p + t` stored as a 2x3 row-major matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: [[f64; 3]; 2],
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        }
    }

    pub fn translation(shift: RenderVector) -> Self {
        Self {
            m: [[1.0, 0.0, shift.x], [0.0, 1.0, shift.y]],
        }
    }

    /// Rotation by `angle` radians around `pivot` (positive is clockwise on screen).
    pub fn rotation(angle: f64, pivot: RenderVector) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            m: [
                [cos, -sin, pivot.x - cos * pivot.x + sin * pivot.y],
                [sin, cos, pivot.y - sin * pivot.x - cos * pivot.y],
            ],
        }
    }

    pub fn scale(factor: f64) -> Self {
        Self {
            m: [[factor, 0.0, 0.0], [0.0, factor, 0.0]],
        }
    }

    /// Transform that applies `self` first and `next` afterwards.
    pub fn combine(&self, next: &Transform) -> Transform {
        let a = &next.m;
        let b = &self.m;
        let mut m = [[0.0; 3]; 2];
        for (row, out) in m.iter_mut().enumerate() {
            out[0] = a[row][0] * b[0][0] + a[row][1] * b[1][0];
            out[1] = a[row][0] * b[0][1] + a[row][1] * b[1][1];
            out[2] = a[row][0] * b[0][2] + a[row][1] * b[1][2] + a[row][2];
        }
        Transform { m }
    }

    pub fn apply(&self, p: RenderVector) -> RenderVector {
        RenderVector::new(
            self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2],
            self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2],
        )
    }

    /// Rotation angle encoded in the linear part.
    pub fn angle(&self) -> f64 {
        self.m[1][0].atan2(self.m[0][0])
    }

    /// Uniform scale factor encoded in the linear part.
    pub fn scale_factor(&self) -> f64 {
        self.m[0][0].hypot(self.m[1][0])
    }
}
