//! Shape - the active falling piece
//!
//! A shape owns its four [`Block`]s. Tile operations move the shape's
//! reference tile (the top-left of its frame) together with every block, so
//! the block tiles always equal the solid cells of the type at the current
//! rotation. Fit checks are the caller's job: nothing here consults the
//! field except [`Shape::fits`].
//!
//! Drawing uses two layers:
//! - each block's pose, in frame-local units of the layout the shape was
//!   created in
//! - the shape's own pose (position and angle) on the field
//!
//! Rotating the shape only turns the shape's pose, so blocks keep their
//! frame-local layout until they are locked.

use std::f64::consts::{FRAC_PI_2, TAU};

use arrayvec::ArrayVec;
use blockfall_types::{normalize_angle, BlockColor, RenderVector, Rotation, TileVector, Transform};

use crate::animation::{
    AnimationHandle, AnimationSlots, Axes, MoveAnimation, Pose, RotateAnimation, SlotKey,
};
use crate::block::{Block, BlockParent};
use crate::error::FieldError;
use crate::locked::TileField;
use crate::shape_type::ShapeType;
use crate::state::GameFieldState;

/// Animation slots of the active shape.
///
/// Slot order is also apply order: a wall kick overrides drop and nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeAnimation {
    Rotate,
    Drop,
    LeftRight,
    WallKick,
}

impl ShapeAnimation {
    pub const ALL: [ShapeAnimation; 4] = [
        ShapeAnimation::Rotate,
        ShapeAnimation::Drop,
        ShapeAnimation::LeftRight,
        ShapeAnimation::WallKick,
    ];
}

impl SlotKey for ShapeAnimation {
    fn slot(self) -> usize {
        match self {
            ShapeAnimation::Rotate => 0,
            ShapeAnimation::Drop => 1,
            ShapeAnimation::LeftRight => 2,
            ShapeAnimation::WallKick => 3,
        }
    }
}

#[derive(Debug)]
pub struct Shape {
    kind: ShapeType,
    rotation: Rotation,
    /// Rotation the block layout was built in; the pose angle is relative to it
    base_rotation: Rotation,
    tile: TileVector,
    blocks: ArrayVec<Block, 4>,
    pose: Pose,
    animations: AnimationSlots<ShapeAnimation, 4>,
    /// End angle and direction of the latest rotation tween
    rotation_target: f64,
    rotating_clockwise: bool,
}

impl Shape {
    /// Build a shape of `kind` at `tile`, every block painted `color`.
    pub fn new(kind: ShapeType, tile: TileVector, rotation: Rotation, color: BlockColor) -> Self {
        let pivot = tile.to_render() + kind.rotation_pivot();
        let blocks = kind
            .solid_cells(rotation)
            .iter()
            .map(|&cell| {
                Block::new(
                    tile + cell,
                    pivot,
                    color,
                    BlockParent::ActiveShape,
                    cell.to_render(),
                )
            })
            .collect();

        Self {
            kind,
            rotation,
            base_rotation: rotation,
            tile,
            blocks,
            pose: Pose::at(tile.to_render()),
            animations: AnimationSlots::new(),
            rotation_target: 0.0,
            rotating_clockwise: true,
        }
    }

    /// Whether a shape of `kind` fits at `tile` and `rotation`.
    ///
    /// Every solid cell must be inside the field and not locked, unless the
    /// locked tile is covered by `ignore`.
    pub fn fits<F: TileField + ?Sized>(
        kind: ShapeType,
        tile: TileVector,
        rotation: Rotation,
        field: &F,
        ignore: Option<&Shape>,
    ) -> bool {
        kind.solid_cells(rotation).iter().all(|&cell| {
            let target = tile + cell;
            field.in_range(target)
                && (!field.is_locked(target) || ignore.is_some_and(|s| s.check_collision(target)))
        })
    }

    pub fn kind(&self) -> ShapeType {
        self.kind
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn tile(&self) -> TileVector {
        self.tile
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Move the frame to `tile`, shifting every block by the same amount.
    pub fn tile_move(&mut self, tile: TileVector) {
        let shift = tile - self.tile;
        self.tile = tile;
        for block in self.blocks.iter_mut() {
            block.tile_shift(shift);
        }
    }

    pub fn tile_shift(&mut self, delta: TileVector) {
        self.tile_move(self.tile + delta);
    }

    /// Turn every block a quarter around the pivot.
    pub fn rotate(&mut self, direction: Rotation) -> Result<(), FieldError> {
        if !direction.is_quarter_turn() {
            return Err(FieldError::InvalidRotationDirection(direction));
        }
        for block in self.blocks.iter_mut() {
            block.rotate(direction)?;
        }
        self.rotation = self.rotation.add(direction);
        Ok(())
    }

    /// Whether the shape covers `tile`.
    pub fn check_collision(&self, tile: TileVector) -> bool {
        let local = tile - self.tile;
        self.kind.is_solid(local.x, local.y, self.rotation)
    }

    /// Whether the shape would cover `tile` after moving by `shift` into `rotation`.
    pub fn check_shifted_collision(
        &self,
        tile: TileVector,
        shift: TileVector,
        rotation: Rotation,
    ) -> bool {
        let local = tile - (self.tile + shift);
        self.kind.is_solid(local.x, local.y, rotation)
    }

    pub fn right_wall_kicks(&self) -> &'static [(i32, i32)] {
        self.kind.right_wall_kicks(self.rotation)
    }

    pub fn left_wall_kicks(&self) -> &'static [(i32, i32)] {
        self.kind.left_wall_kicks(self.rotation)
    }

    pub fn wall_kicks(
        &self,
        direction: Rotation,
    ) -> Result<impl Iterator<Item = TileVector>, FieldError> {
        self.kind.wall_kicks(self.rotation, direction)
    }

    /// Placement of frame-local points on the field for a given pose.
    ///
    /// Translate to the pose coordinates, then turn around the pivot.
    pub fn local_transform(&self, pose: &Pose) -> Transform {
        let pivot = pose.coords + self.kind.rotation_pivot();
        Transform::translation(pose.coords).combine(&Transform::rotation(pose.angle, pivot))
    }

    /// Outline of the shape on the field at the current pose.
    pub fn convex_hull(&self) -> Vec<RenderVector> {
        self.convex_hull_at(&self.pose)
    }

    pub fn convex_hull_at(&self, pose: &Pose) -> Vec<RenderVector> {
        let transform = self.local_transform(pose);
        self.kind
            .convex_hull(self.base_rotation)
            .into_iter()
            .map(|p| transform.apply(p))
            .collect()
    }

    /// Fall one row's worth of pose towards the tile over `duration` ticks.
    pub fn start_drop_animation(&mut self, duration: u32, on_finished: Option<GameFieldState>) {
        let animation = MoveAnimation::vertical(self.pose.coords.y, self.tile.y as f64, duration);
        let mut handle = AnimationHandle::new(Box::new(animation));
        if let Some(state) = on_finished {
            handle = handle.with_callback(state);
        }
        self.animations.start(ShapeAnimation::Drop, handle);
    }

    /// Restart an in-flight drop with a new duration, keeping its callbacks.
    ///
    /// Does nothing when no drop is running.
    pub fn restart_drop_animation(&mut self, duration: u32) {
        let Some(previous) = self.animations.interrupt(ShapeAnimation::Drop) else {
            return;
        };
        let animation = MoveAnimation::vertical(self.pose.coords.y, self.tile.y as f64, duration);
        let handle = AnimationHandle::new(Box::new(animation)).with_callbacks(previous.into_callbacks());
        self.animations.start(ShapeAnimation::Drop, handle);
    }

    /// Slide horizontally towards the tile after a left/right nudge.
    pub fn start_user_control_animation(&mut self, duration: u32) {
        let animation =
            MoveAnimation::horizontal(self.pose.coords.x, self.tile.x as f64, duration);
        self.animations
            .start(ShapeAnimation::LeftRight, AnimationHandle::new(Box::new(animation)));
    }

    /// Tween the pose angle after `rotate(direction)` has been applied.
    ///
    /// Chained turns continue from where the previous tween was heading; a
    /// reversal turns back the short way in the new direction.
    pub fn start_rotation_animation(
        &mut self,
        direction: Rotation,
        duration: u32,
    ) -> Result<(), FieldError> {
        let clockwise = match direction {
            Rotation::Right => true,
            Rotation::Left => false,
            other => return Err(FieldError::InvalidRotationDirection(other)),
        };
        let quarter = if clockwise { FRAC_PI_2 } else { -FRAC_PI_2 };

        let target = if !self.animations.is_running(ShapeAnimation::Rotate) {
            let previous = self.rotation.add(direction.inverse());
            self.pose.angle = Rotation::angle_between(self.base_rotation, previous);
            self.pose.angle + quarter
        } else if self.rotating_clockwise != clockwise {
            let goal = Rotation::angle_between(self.base_rotation, self.rotation);
            let mut shift = normalize_angle(goal - self.pose.angle);
            if clockwise && shift < 0.0 {
                shift += TAU;
            }
            if !clockwise && shift > 0.0 {
                shift -= TAU;
            }
            self.pose.angle + shift
        } else {
            self.rotation_target + quarter
        };

        self.rotation_target = target;
        self.rotating_clockwise = clockwise;
        let animation = RotateAnimation::new(self.pose.angle, target, duration);
        self.animations
            .start(ShapeAnimation::Rotate, AnimationHandle::new(Box::new(animation)));
        Ok(())
    }

    /// Slide both axes towards the tile after a wall kick.
    pub fn start_wall_kick_animation(&mut self, duration: u32, on_finished: Option<GameFieldState>) {
        let animation = MoveAnimation::new(
            self.pose.coords,
            self.tile.to_render(),
            Axes::Both,
            duration,
        );
        let mut handle = AnimationHandle::new(Box::new(animation));
        if let Some(state) = on_finished {
            handle = handle.with_callback(state);
        }
        self.animations.start(ShapeAnimation::WallKick, handle);
    }

    /// Stop an animation; its callbacks are discarded.
    pub fn interrupt(&mut self, kind: ShapeAnimation) {
        self.animations.interrupt(kind);
    }

    /// Queue `state` when the `kind` animation completes.
    ///
    /// Returns false when nothing runs in that slot.
    pub fn add_animation_callback(&mut self, kind: ShapeAnimation, state: GameFieldState) -> bool {
        self.animations.add_callback(kind, state)
    }

    /// First running animation, in slot order.
    pub fn running_animation(&self) -> Option<ShapeAnimation> {
        ShapeAnimation::ALL
            .into_iter()
            .find(|kind| self.animations.is_running(*kind))
    }

    pub fn time_left(&self) -> u32 {
        self.animations.time_left()
    }

    /// Advance shape and block animations; completion states go to `fired`.
    pub fn tick(&mut self, fired: &mut Vec<GameFieldState>) {
        self.animations.tick(&mut self.pose, fired);
        for block in self.blocks.iter_mut() {
            block.tick(fired);
        }
    }

    /// Pose at `interpolation` between this tick and the next.
    pub fn render_pose(&self, interpolation: f64) -> Pose {
        let mut pose = self.pose;
        self.animations.perform(&mut pose, interpolation);
        pose
    }

    /// Consume the shape, handing its blocks over to the field.
    pub fn into_locked_blocks(self) -> ArrayVec<Block, 4> {
        self.blocks.iter().map(Block::locked_copy).collect()
    }
}
