//! Shape catalog - the seven tetrominoes and their SRS data
//!
//! Each type carries:
//! - a square frame (3x3 for J/L/S/T/Z, 4x4 for I and O)
//! - the solid cells for each rotation, in frame-local tile coordinates
//! - the rotation pivot, in the same coordinates
//! - wall kick offsets to try when an in-place rotation is blocked
//!
//! The per-rotation layouts are exactly what rotating the `Initial` cells
//! around the pivot produces, so a [`Shape`](crate::shape::Shape) can rotate
//! its blocks one by one and still match the table.
//!
//! Kick offsets use screen coordinates (y grows downwards) and omit the
//! zero offset, which is always tried first as the in-place rotation.

use blockfall_types::{RenderVector, Rotation, TileVector};

use crate::error::FieldError;
use crate::rng::SimpleRng;

/// Solid cells of one rotation
type Cells = [(i32, i32); 4];

/// Kick offsets for each starting rotation
type KickTable = [[(i32, i32); 4]; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

const I_CELLS: [Cells; 4] = [
    [(0, 1), (1, 1), (2, 1), (3, 1)],
    [(2, 0), (2, 1), (2, 2), (2, 3)],
    [(0, 2), (1, 2), (2, 2), (3, 2)],
    [(1, 0), (1, 1), (1, 2), (1, 3)],
];

// O is symmetric around the grid point (2, 1)
const O_CELLS: [Cells; 4] = [[(1, 0), (2, 0), (1, 1), (2, 1)]; 4];

const T_CELLS: [Cells; 4] = [
    [(1, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (1, 2)],
    [(1, 0), (0, 1), (1, 1), (1, 2)],
];

const S_CELLS: [Cells; 4] = [
    [(1, 0), (2, 0), (0, 1), (1, 1)],
    [(1, 0), (1, 1), (2, 1), (2, 2)],
    [(1, 1), (2, 1), (0, 2), (1, 2)],
    [(0, 0), (0, 1), (1, 1), (1, 2)],
];

const Z_CELLS: [Cells; 4] = [
    [(0, 0), (1, 0), (1, 1), (2, 1)],
    [(2, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (1, 2), (2, 2)],
    [(1, 0), (0, 1), (1, 1), (0, 2)],
];

const J_CELLS: [Cells; 4] = [
    [(0, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (2, 0), (1, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (2, 2)],
    [(1, 0), (1, 1), (0, 2), (1, 2)],
];

const L_CELLS: [Cells; 4] = [
    [(2, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (1, 2), (2, 2)],
    [(0, 1), (1, 1), (2, 1), (0, 2)],
    [(0, 0), (1, 0), (1, 1), (1, 2)],
];

/// JLSTZ kicks for a clockwise turn, indexed by the starting rotation
const JLSTZ_RIGHT_KICKS: KickTable = [
    // 0 -> R
    [(-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // R -> 2
    [(1, 0), (1, 1), (0, -2), (1, -2)],
    // 2 -> L
    [(1, 0), (1, -1), (0, 2), (1, 2)],
    // L -> 0
    [(-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

/// JLSTZ kicks for a counter-clockwise turn, indexed by the starting rotation
const JLSTZ_LEFT_KICKS: KickTable = [
    // 0 -> L
    [(1, 0), (1, -1), (0, 2), (1, 2)],
    // R -> 0
    [(1, 0), (1, 1), (0, -2), (1, -2)],
    // 2 -> R
    [(-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // L -> 2
    [(-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

const I_RIGHT_KICKS: KickTable = [
    [(-2, 0), (1, 0), (-2, 1), (1, -2)],
    [(-1, 0), (2, 0), (-1, -2), (2, 1)],
    [(2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(1, 0), (-2, 0), (1, 2), (-2, -1)],
];

const I_LEFT_KICKS: KickTable = [
    [(-1, 0), (2, 0), (-1, -2), (2, 1)],
    [(2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(1, 0), (-2, 0), (1, 2), (-2, -1)],
    [(-2, 0), (1, 0), (-2, 1), (1, -2)],
];

impl ShapeType {
    pub const ALL: [ShapeType; 7] = [
        ShapeType::I,
        ShapeType::O,
        ShapeType::T,
        ShapeType::S,
        ShapeType::Z,
        ShapeType::J,
        ShapeType::L,
    ];

    /// Draw a type uniformly at random
    pub fn random(rng: &mut SimpleRng) -> Self {
        rng.pick(&Self::ALL).unwrap_or(ShapeType::T)
    }

    /// Side length of the bounding frame
    pub fn frame_size(self) -> i32 {
        match self {
            ShapeType::I | ShapeType::O => 4,
            _ => 3,
        }
    }

    fn cells(self) -> &'static [Cells; 4] {
        match self {
            ShapeType::I => &I_CELLS,
            ShapeType::O => &O_CELLS,
            ShapeType::T => &T_CELLS,
            ShapeType::S => &S_CELLS,
            ShapeType::Z => &Z_CELLS,
            ShapeType::J => &J_CELLS,
            ShapeType::L => &L_CELLS,
        }
    }

    /// Solid cells at `rotation`, in row-major order.
    pub fn solid_cells(self, rotation: Rotation) -> [TileVector; 4] {
        let mut cells = self.cells()[rotation.index()].map(|(x, y)| TileVector::new(x, y));
        cells.sort();
        cells
    }

    pub fn solid_blocks_count(self) -> usize {
        self.cells()[0].len()
    }

    /// Whether frame cell (x, y) is solid at `rotation`. False outside the frame.
    pub fn is_solid(self, x: i32, y: i32, rotation: Rotation) -> bool {
        self.cells()[rotation.index()].contains(&(x, y))
    }

    /// Rotation pivot in frame-local tile units
    pub fn rotation_pivot(self) -> RenderVector {
        match self {
            ShapeType::I => RenderVector::new(2.0, 2.0),
            ShapeType::O => RenderVector::new(2.0, 1.0),
            _ => RenderVector::new(1.5, 1.5),
        }
    }

    /// The frame cell whose center is the pivot, if there is one.
    pub fn center_cell(self) -> Option<TileVector> {
        let pivot = self.rotation_pivot();
        let is_center = |v: f64| (v - v.floor() - 0.5).abs() < f64::EPSILON;
        if is_center(pivot.x) && is_center(pivot.y) {
            Some(TileVector::new(pivot.x.floor() as i32, pivot.y.floor() as i32))
        } else {
            None
        }
    }

    /// Offsets to try after a blocked clockwise turn from `rotation`.
    pub fn right_wall_kicks(self, rotation: Rotation) -> &'static [(i32, i32)] {
        match self {
            ShapeType::O => &[],
            ShapeType::I => &I_RIGHT_KICKS[rotation.index()],
            _ => &JLSTZ_RIGHT_KICKS[rotation.index()],
        }
    }

    /// Offsets to try after a blocked counter-clockwise turn from `rotation`.
    pub fn left_wall_kicks(self, rotation: Rotation) -> &'static [(i32, i32)] {
        match self {
            ShapeType::O => &[],
            ShapeType::I => &I_LEFT_KICKS[rotation.index()],
            _ => &JLSTZ_LEFT_KICKS[rotation.index()],
        }
    }

    /// Kick offsets for a turn in `direction`, which must be a quarter turn.
    pub fn wall_kicks(
        self,
        rotation: Rotation,
        direction: Rotation,
    ) -> Result<impl Iterator<Item = TileVector>, FieldError> {
        let kicks = match direction {
            Rotation::Right => self.right_wall_kicks(rotation),
            Rotation::Left => self.left_wall_kicks(rotation),
            other => return Err(FieldError::InvalidRotationDirection(other)),
        };
        Ok(kicks.iter().map(|&(x, y)| TileVector::new(x, y)))
    }

    /// Outline of the solid cells at `rotation`, in frame-local units.
    ///
    /// Vertices run clockwise on screen (y down) with no repeated endpoint
    /// and no collinear points.
    pub fn convex_hull(self, rotation: Rotation) -> Vec<RenderVector> {
        let mut points: Vec<(i32, i32)> = self.cells()[rotation.index()]
            .iter()
            .flat_map(|&(x, y)| [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)])
            .collect();
        points.sort_unstable();
        points.dedup();

        fn cross(o: (i32, i32), a: (i32, i32), b: (i32, i32)) -> i32 {
            (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
        }

        // Andrew's monotone chain
        let mut hull: Vec<(i32, i32)> = Vec::with_capacity(points.len() * 2);
        for &p in points.iter() {
            while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
                hull.pop();
            }
            hull.push(p);
        }
        let lower_len = hull.len() + 1;
        for &p in points.iter().rev().skip(1) {
            while hull.len() >= lower_len
                && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
            {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();

        hull.into_iter()
            .map(|(x, y)| RenderVector::new(x as f64, y as f64))
            .collect()
    }
}
