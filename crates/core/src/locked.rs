//! Locked blocks - the grid of tiles that shapes have landed on
//!
//! Flat row-major storage (`y * width + x`) for cache locality and O(1)
//! lookup. Iteration always runs top to bottom, left to right, which is the
//! order the line-clear scan relies on.
//!
//! Coordinates: (x, y) where x grows to the right and y grows downwards.

use blockfall_types::TileVector;

use crate::block::Block;
use crate::error::FieldError;

/// Read-only view of a tile field, as needed for fit checks.
pub trait TileField {
    fn width(&self) -> i32;

    fn height(&self) -> i32;

    /// Whether `tile` lies inside the field
    fn in_range(&self, tile: TileVector) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width() && tile.y < self.height()
    }

    /// Whether a locked block occupies `tile`
    fn is_locked(&self, tile: TileVector) -> bool;
}

/// The locked grid
#[derive(Debug)]
pub struct LockedBlocks {
    width: i32,
    height: i32,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Option<Block>>,
}

impl LockedBlocks {
    /// Create an empty grid
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        let mut cells = Vec::with_capacity(size);
        cells.resize_with(size, || None);
        Self {
            width,
            height,
            cells,
        }
    }

    /// Calculate flat index from a tile
    #[inline(always)]
    fn index(&self, tile: TileVector) -> Option<usize> {
        if !self.in_range(tile) {
            return None;
        }
        Some((tile.y as usize) * (self.width as usize) + (tile.x as usize))
    }

    fn tile_at(&self, index: usize) -> TileVector {
        let width = self.width as usize;
        TileVector::new((index % width) as i32, (index / width) as i32)
    }

    /// Block stored at `tile`, if any
    pub fn get(&self, tile: TileVector) -> Option<&Block> {
        self.index(tile).and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn get_mut(&mut self, tile: TileVector) -> Option<&mut Block> {
        let idx = self.index(tile)?;
        self.cells[idx].as_mut()
    }

    /// Store `block` at `tile`. Fails if the tile is out of range or taken.
    pub fn insert(&mut self, tile: TileVector, block: Block) -> Result<(), FieldError> {
        let idx = self.index(tile).ok_or(FieldError::OutOfRange(tile))?;
        let cell = &mut self.cells[idx];
        if cell.is_some() {
            return Err(FieldError::Occupied(tile));
        }
        *cell = Some(block);
        Ok(())
    }

    /// Take the block stored at `tile`
    pub fn remove(&mut self, tile: TileVector) -> Option<Block> {
        let idx = self.index(tile)?;
        self.cells[idx].take()
    }

    pub fn contains(&self, tile: TileVector) -> bool {
        self.get(tile).is_some()
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: i32) -> bool {
        if y < 0 || y >= self.height {
            return false;
        }
        let width = self.width as usize;
        let start = y as usize * width;
        self.cells[start..start + width].iter().all(Option::is_some)
    }

    /// All blocks with their slot, top to bottom, left to right
    pub fn iter(&self) -> impl Iterator<Item = (TileVector, &Block)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(idx, cell)| cell.as_ref().map(|b| (self.tile_at(idx), b)))
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut Block> + '_ {
        self.cells.iter_mut().flatten()
    }

    /// Blocks in rows `start_y..=end_y` (clamped to the grid), in scan order
    pub fn rows(&self, start_y: i32, end_y: i32) -> impl Iterator<Item = (TileVector, &Block)> + '_ {
        let width = self.width as usize;
        let first = start_y.clamp(0, self.height) as usize * width;
        let last = (end_y.saturating_add(1)).clamp(0, self.height) as usize * width;
        let last = last.max(first);
        self.cells[first..last]
            .iter()
            .enumerate()
            .filter_map(move |(offset, cell)| {
                cell.as_ref().map(|b| (self.tile_at(first + offset), b))
            })
    }

    /// Number of locked blocks
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }
}

impl TileField for LockedBlocks {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn is_locked(&self, tile: TileVector) -> bool {
        self.contains(tile)
    }
}
