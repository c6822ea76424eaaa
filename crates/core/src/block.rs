//! Block - a single occupied tile
//!
//! Blocks start out inside the active [`Shape`](crate::shape::Shape) and
//! migrate to the locked grid when the shape lands. A block tracks two
//! positions:
//!
//! - its tile coordinate, which is game truth
//! - its [`Pose`], which is where it is drawn relative to its parent
//!
//! The two diverge while animations catch the pose up with the tile.

use blockfall_types::{BlockColor, RenderVector, Rotation, TileVector};

use crate::animation::{
    AcceleratedMoveAnimation, AnimationHandle, AnimationSlots, BlockBreakAnimation, Pose, SlotKey,
};
use crate::error::FieldError;
use crate::state::GameFieldState;

/// What a block's pose is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockParent {
    /// Frame-local coordinates of the active shape
    ActiveShape,
    /// Field coordinates
    Field,
}

/// Animation slots of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAnimation {
    Drop,
    Break,
}

impl SlotKey for BlockAnimation {
    fn slot(self) -> usize {
        match self {
            BlockAnimation::Drop => 0,
            BlockAnimation::Break => 1,
        }
    }
}

#[derive(Debug)]
pub struct Block {
    tile: TileVector,
    pivot: RenderVector,
    rotation: Rotation,
    color: BlockColor,
    parent: BlockParent,
    pose: Pose,
    animations: AnimationSlots<BlockAnimation, 2>,
}

impl Block {
    /// Create a block at `tile` drawn at `coords` relative to `parent`.
    ///
    /// `pivot` is the field-space point the block turns around when its shape
    /// rotates.
    pub fn new(
        tile: TileVector,
        pivot: RenderVector,
        color: BlockColor,
        parent: BlockParent,
        coords: RenderVector,
    ) -> Self {
        Self {
            tile,
            pivot,
            rotation: Rotation::Initial,
            color,
            parent,
            pose: Pose::at(coords),
            animations: AnimationSlots::new(),
        }
    }

    /// A block resting on the field at `tile`.
    pub fn locked(tile: TileVector, color: BlockColor) -> Self {
        let center = tile.to_render() + RenderVector::new(0.5, 0.5);
        Self::new(tile, center, color, BlockParent::Field, tile.to_render())
    }

    pub fn tile(&self) -> TileVector {
        self.tile
    }

    pub fn rotation_pivot(&self) -> RenderVector {
        self.pivot
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn color(&self) -> BlockColor {
        self.color
    }

    pub fn parent(&self) -> BlockParent {
        self.parent
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Move to `tile`, carrying the rotation pivot along.
    pub fn tile_move(&mut self, tile: TileVector) {
        let shift = tile - self.tile;
        self.pivot = self.pivot + shift;
        self.tile = tile;
    }

    pub fn tile_shift(&mut self, delta: TileVector) {
        self.tile_move(self.tile + delta);
    }

    /// Turn the block a quarter around its pivot.
    pub fn rotate(&mut self, direction: Rotation) -> Result<(), FieldError> {
        if !direction.is_quarter_turn() {
            return Err(FieldError::InvalidRotationDirection(direction));
        }
        let half = RenderVector::new(0.5, 0.5);
        let center = self.tile.to_render() + half;
        let rotated = (center - self.pivot).rotate(direction) + self.pivot - half;
        self.tile = rotated.round();
        self.rotation = self.rotation.add(direction);
        Ok(())
    }

    pub fn check_collision(&self, tile: TileVector) -> bool {
        self.tile == tile
    }

    /// Field-parented copy of this block, drawn exactly at its tile.
    pub fn locked_copy(&self) -> Block {
        Block {
            tile: self.tile,
            pivot: self.pivot,
            rotation: self.rotation,
            color: self.color,
            parent: BlockParent::Field,
            pose: Pose::at(self.tile.to_render()),
            animations: AnimationSlots::new(),
        }
    }

    /// Fall from the current pose to the tile under constant acceleration.
    pub fn start_drop_animation(&mut self, on_finished: Option<GameFieldState>) {
        let target = match self.parent {
            BlockParent::Field => self.tile.to_render(),
            // inside a shape the tile moves with the frame, not the block
            BlockParent::ActiveShape => self.pose.coords,
        };
        let animation = AcceleratedMoveAnimation::new(
            self.pose.coords,
            target,
            AcceleratedMoveAnimation::GRAVITY,
        );
        let mut handle = AnimationHandle::new(Box::new(animation));
        if let Some(state) = on_finished {
            handle = handle.with_callback(state);
        }
        self.animations.start(BlockAnimation::Drop, handle);
    }

    /// Fade out, shrink and twist over `duration` ticks.
    pub fn start_break_animation(&mut self, duration: u32, on_finished: Option<GameFieldState>) {
        let animation = BlockBreakAnimation::new(self.pose.angle, self.pose.scale, duration);
        let mut handle = AnimationHandle::new(Box::new(animation));
        if let Some(state) = on_finished {
            handle = handle.with_callback(state);
        }
        self.animations.start(BlockAnimation::Break, handle);
    }

    pub fn is_animating(&self) -> bool {
        self.animations.any_running()
    }

    pub fn is_animating_kind(&self, kind: BlockAnimation) -> bool {
        self.animations.is_running(kind)
    }

    /// Advance animations; completion states are appended to `fired`.
    pub fn tick(&mut self, fired: &mut Vec<GameFieldState>) {
        self.animations.tick(&mut self.pose, fired);
    }

    /// Pose at `interpolation` between this tick and the next.
    pub fn render_pose(&self, interpolation: f64) -> Pose {
        let mut pose = self.pose;
        self.animations.perform(&mut pose, interpolation);
        pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_shift_moves_pivot() {
        let mut block = Block::locked(TileVector::new(2, 3), BlockColor::Red);
        block.tile_shift(TileVector::new(1, 2));
        assert_eq!(block.tile(), TileVector::new(3, 5));
        assert_eq!(block.rotation_pivot(), RenderVector::new(3.5, 5.5));
    }

    #[test]
    fn test_rotate_around_pivot() {
        // T nub at frame (1, 0) turning around (1.5, 1.5)
        let mut block = Block::new(
            TileVector::new(1, 0),
            RenderVector::new(1.5, 1.5),
            BlockColor::Magenta,
            BlockParent::ActiveShape,
            RenderVector::new(1.0, 0.0),
        );
        block.rotate(Rotation::Right).unwrap();
        assert_eq!(block.tile(), TileVector::new(2, 1));
        assert_eq!(block.rotation(), Rotation::Right);

        block.rotate(Rotation::Left).unwrap();
        assert_eq!(block.tile(), TileVector::new(1, 0));
        assert_eq!(block.rotation(), Rotation::Initial);
    }

    #[test]
    fn test_rotate_rejects_half_turn() {
        let mut block = Block::locked(TileVector::new(0, 0), BlockColor::Blue);
        assert_eq!(
            block.rotate(Rotation::UpsideDown),
            Err(FieldError::InvalidRotationDirection(Rotation::UpsideDown))
        );
        assert_eq!(block.tile(), TileVector::new(0, 0));
    }

    #[test]
    fn test_collision_is_tile_equality() {
        let block = Block::locked(TileVector::new(4, 4), BlockColor::Green);
        assert!(block.check_collision(TileVector::new(4, 4)));
        assert!(!block.check_collision(TileVector::new(4, 5)));
    }

    #[test]
    fn test_locked_copy_poses_at_tile() {
        let block = Block::new(
            TileVector::new(5, 7),
            RenderVector::new(5.5, 7.5),
            BlockColor::Orange,
            BlockParent::ActiveShape,
            RenderVector::new(2.0, 1.0),
        );
        let locked = block.locked_copy();
        assert_eq!(locked.parent(), BlockParent::Field);
        assert_eq!(locked.pose().coords, RenderVector::new(5.0, 7.0));
        assert_eq!(locked.color(), BlockColor::Orange);
    }

    #[test]
    fn test_drop_animation_lands_on_tile_and_fires() {
        let mut block = Block::locked(TileVector::new(0, 2), BlockColor::Cyan);
        block.tile_shift(TileVector::new(0, 2));
        block.start_drop_animation(Some(GameFieldState::ShapeSpawnReady));
        assert!(block.is_animating());

        let mut fired = Vec::new();
        for _ in 0..100 {
            block.tick(&mut fired);
        }
        assert_eq!(fired, vec![GameFieldState::ShapeSpawnReady]);
        assert_eq!(block.pose().coords, RenderVector::new(0.0, 4.0));
        assert!(!block.is_animating());
    }

    #[test]
    fn test_break_animation_fades_out() {
        let mut block = Block::locked(TileVector::new(1, 1), BlockColor::Yellow);
        block.start_break_animation(4, None);

        let mut fired = Vec::new();
        block.tick(&mut fired);
        block.tick(&mut fired);
        let midway = block.render_pose(0.0);
        assert!((midway.opacity - 0.5).abs() < 1e-9);

        // rendering is pure
        let again = block.render_pose(0.0);
        assert_eq!(midway, again);
        assert!(block.is_animating_kind(BlockAnimation::Break));
        assert!(fired.is_empty());
    }
}
