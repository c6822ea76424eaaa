//! Game field - the orchestrator
//!
//! Owns the locked grid, the active shape, the state machine and the
//! counters. Two entry points drive it:
//!
//! - [`GameField::control`] applies one input snapshot
//! - [`GameField::tick`] advances animations and applies at most one queued
//!   transition
//!
//! All state changes go through the [`StateQueue`]. Animation completions
//! come back as [`GameFieldState`] values and are offered to the same queue,
//! so the field never calls back into itself.

use blockfall_types::{
    BlockColor, InputKey, InputSnapshot, KeyState, RenderVector, Rotation, TileVector, Transform,
};

use crate::block::{Block, BlockParent};
use crate::config::FieldConfig;
use crate::display::{NextShapeDisplay, ScoreDisplay};
use crate::error::FieldError;
use crate::locked::{LockedBlocks, TileField};
use crate::rng::SimpleRng;
use crate::scoring;
use crate::shape::{Shape, ShapeAnimation};
use crate::shape_type::ShapeType;
use crate::state::{GameFieldState, StateQueue};

/// Tiles diagonal to a cell, used by T-spin detection.
const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Number of rows a single piece can fill.
const LOCK_BAND: i32 = 3;

/// A block ready to draw, in field tile units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedBlock {
    /// Game position of the block
    pub tile: TileVector,
    /// Top-left corner of the drawn block
    pub position: RenderVector,
    pub angle: f64,
    pub opacity: f64,
    pub scale: f64,
    pub color: BlockColor,
    pub parent: BlockParent,
}

#[derive(Debug)]
pub struct GameField<S = (), N = ()> {
    config: FieldConfig,
    locked: LockedBlocks,
    active_shape: Option<Shape>,
    next_shape_type: ShapeType,

    state: GameFieldState,
    /// State to restore on resume
    paused_state: Option<GameFieldState>,
    queue: StateQueue,
    /// Scratch buffer for completions fired during a tick
    fired: Vec<GameFieldState>,

    score: u32,
    level: u32,
    cleared_lines: u32,
    combo: u32,

    last_movement_is_rotation: bool,
    down_held: bool,
    game_over: bool,

    /// Keys of blocks in cleared rows, waiting for their break animation
    broken_blocks: Vec<TileVector>,
    /// Old keys of blocks above cleared rows, top to bottom. Their tiles
    /// already point at the landing spot.
    dropped_blocks: Vec<TileVector>,

    rng: SimpleRng,
    score_display: S,
    next_shape_display: N,
}

impl GameField {
    /// Create a field without displays.
    pub fn new(config: FieldConfig) -> Result<Self, FieldError> {
        Self::with_displays(config, (), ())
    }
}

impl<S: ScoreDisplay, N: NextShapeDisplay> GameField<S, N> {
    pub fn with_displays(
        config: FieldConfig,
        mut score_display: S,
        mut next_shape_display: N,
    ) -> Result<Self, FieldError> {
        config.validate()?;

        let mut rng = SimpleRng::new(config.seed);
        let next_shape_type = ShapeType::random(&mut rng);
        score_display.set_values(0, 1, 0);
        next_shape_display.set_next_shape(next_shape_type);

        Ok(Self {
            locked: LockedBlocks::new(config.width, config.height),
            config,
            active_shape: None,
            next_shape_type,
            state: GameFieldState::Stopped,
            paused_state: None,
            queue: StateQueue::new(),
            fired: Vec::new(),
            score: 0,
            level: 1,
            cleared_lines: 0,
            combo: 0,
            last_movement_is_rotation: false,
            down_held: false,
            game_over: false,
            broken_blocks: Vec::new(),
            dropped_blocks: Vec::new(),
            rng,
            score_display,
            next_shape_display,
        })
    }

    /// Reset the counters and schedule the first spawn.
    pub fn start(&mut self) {
        self.score = 0;
        self.level = 1;
        self.cleared_lines = 0;
        self.combo = 0;
        self.game_over = false;
        self.score_display
            .set_values(self.score, self.level, self.cleared_lines);
        self.queue.offer(GameFieldState::ShapeSpawnReady);
        tracing::info!(seed = self.config.seed, "game started");
    }

    /// Clear the board and go back to `Stopped`.
    pub fn reset(&mut self) {
        self.locked.clear();
        self.active_shape = None;
        self.state = GameFieldState::Stopped;
        self.paused_state = None;
        self.queue.clear();
        self.fired.clear();
        self.score = 0;
        self.level = 1;
        self.cleared_lines = 0;
        self.combo = 0;
        self.last_movement_is_rotation = false;
        self.down_held = false;
        self.game_over = false;
        self.broken_blocks.clear();
        self.dropped_blocks.clear();
        self.score_display
            .set_values(self.score, self.level, self.cleared_lines);
    }

    pub fn pause(&mut self) {
        if self.state == GameFieldState::Paused {
            return;
        }
        self.paused_state = Some(self.state);
        self.state = GameFieldState::Paused;
        tracing::debug!("paused");
    }

    pub fn resume(&mut self) {
        if let Some(state) = self.paused_state.take() {
            self.state = state;
            tracing::debug!(?state, "resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameFieldState::Paused
    }

    // ---- queries ----

    pub fn state(&self) -> GameFieldState {
        self.state
    }

    /// Transitions waiting in the queue, oldest first.
    pub fn pending_states(&self) -> Vec<GameFieldState> {
        self.queue.iter().collect()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn cleared_lines(&self) -> u32 {
        self.cleared_lines
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn next_shape_type(&self) -> ShapeType {
        self.next_shape_type
    }

    pub fn active_shape(&self) -> Option<&Shape> {
        self.active_shape.as_ref()
    }

    pub fn locked_blocks(&self) -> &LockedBlocks {
        &self.locked
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn score_display(&self) -> &S {
        &self.score_display
    }

    pub fn score_display_mut(&mut self) -> &mut S {
        &mut self.score_display
    }

    pub fn next_shape_display(&self) -> &N {
        &self.next_shape_display
    }

    pub fn next_shape_display_mut(&mut self) -> &mut N {
        &mut self.next_shape_display
    }

    // ---- puzzle setup ----

    /// Lock a block at `tile` directly.
    pub fn insert_locked_block(
        &mut self,
        tile: TileVector,
        color: BlockColor,
    ) -> Result<(), FieldError> {
        self.locked.insert(tile, Block::locked(tile, color))
    }

    pub fn set_next_shape_type(&mut self, kind: ShapeType) {
        self.next_shape_type = kind;
        self.next_shape_display.set_next_shape(kind);
    }

    /// Replace the active shape. Fails if the shape does not fit.
    pub fn place_active_shape(
        &mut self,
        kind: ShapeType,
        tile: TileVector,
        rotation: Rotation,
    ) -> Result<(), FieldError> {
        if !Shape::fits(kind, tile, rotation, &self.locked, None) {
            return Err(FieldError::DoesNotFit(tile));
        }
        let color = self.random_color();
        self.active_shape = Some(Shape::new(kind, tile, rotation, color));
        self.last_movement_is_rotation = false;
        Ok(())
    }

    // ---- input ----

    /// Whether input may move the active shape right now.
    fn shape_controllable(&self) -> bool {
        self.state.shape_falling()
            && self.queue.peek().map_or(true, GameFieldState::shape_falling)
            && self.active_shape.is_some()
    }

    /// Apply one input snapshot.
    pub fn control(&mut self, input: &InputSnapshot) -> Result<(), FieldError> {
        if input.is_pressed(InputKey::Pause) {
            if self.is_paused() {
                self.resume();
            } else if self.state != GameFieldState::Stopped {
                self.pause();
            }
        }
        if self.is_paused() {
            return Ok(());
        }

        match input.state(InputKey::Down) {
            KeyState::Pressed => self.down_held = true,
            KeyState::Released => self.down_held = false,
            KeyState::Idle => {}
        }

        let controllable = self.shape_controllable();
        let mut x_shift = 0;
        let mut direction = Rotation::Initial;

        for key in InputKey::ALL {
            match (key, input.state(key)) {
                (InputKey::Down, KeyState::Pressed) if controllable => {
                    self.state = GameFieldState::ShapeForcedDrop;
                    if let Some(shape) = self.active_shape.as_mut() {
                        shape.restart_drop_animation(self.config.forced_drop_ticks);
                    }
                }
                (InputKey::Down, KeyState::Released) if controllable => {
                    self.state = GameFieldState::ShapeSoftDrop;
                    if let Some(shape) = self.active_shape.as_mut() {
                        shape.restart_drop_animation(self.config.soft_drop_ticks);
                    }
                }
                (InputKey::Left, KeyState::Pressed) => x_shift -= 1,
                (InputKey::Right, KeyState::Pressed) => x_shift += 1,
                (InputKey::RotateLeft, KeyState::Pressed) => {
                    direction = direction.add(Rotation::Left)
                }
                (InputKey::RotateRight, KeyState::Pressed) => {
                    direction = direction.add(Rotation::Right)
                }
                _ => {}
            }
        }

        if !controllable {
            return Ok(());
        }
        if x_shift != 0 {
            self.shift_active_shape(x_shift);
        }
        if direction.is_quarter_turn() {
            self.rotate_active_shape(direction)?;
        }
        Ok(())
    }

    fn shift_active_shape(&mut self, x_shift: i32) {
        let shift = TileVector::new(x_shift, 0);
        let fits = self.active_shape.as_ref().is_some_and(|shape| {
            Shape::fits(
                shape.kind(),
                shape.tile() + shift,
                shape.rotation(),
                &self.locked,
                Some(shape),
            )
        });
        if !fits {
            return;
        }
        if let Some(shape) = self.active_shape.as_mut() {
            shape.tile_shift(shift);
            shape.start_user_control_animation(self.config.user_control_ticks);
            self.last_movement_is_rotation = false;
        }
    }

    /// Rotate in place, or through the first wall kick that fits.
    fn rotate_active_shape(&mut self, direction: Rotation) -> Result<(), FieldError> {
        let Some(shape) = self.active_shape.as_ref() else {
            return Ok(());
        };
        let target = shape.rotation().add(direction);
        let in_place = Shape::fits(shape.kind(), shape.tile(), target, &self.locked, Some(shape));
        let kick = if in_place {
            None
        } else {
            shape.wall_kicks(direction)?.find(|&kick| {
                Shape::fits(
                    shape.kind(),
                    shape.tile() + kick,
                    target,
                    &self.locked,
                    Some(shape),
                )
            })
        };

        let duration = self.config.user_control_ticks;
        let Some(shape) = self.active_shape.as_mut() else {
            return Ok(());
        };
        if in_place {
            shape.rotate(direction)?;
            shape.start_rotation_animation(direction, duration)?;
            self.last_movement_is_rotation = true;
        } else if let Some(kick) = kick {
            shape.rotate(direction)?;
            shape.start_rotation_animation(direction, duration)?;
            shape.tile_shift(kick);
            shape.start_wall_kick_animation(duration, Some(GameFieldState::ShapeSoftDrop));
            shape.interrupt(ShapeAnimation::Drop);
            shape.interrupt(ShapeAnimation::LeftRight);
            self.queue.offer(GameFieldState::ShapeWallKicked);
            self.last_movement_is_rotation = true;
            tracing::debug!(kind = ?shape.kind(), ?kick, "wall kick");
        }
        Ok(())
    }

    // ---- simulation ----

    /// Advance one tick.
    pub fn tick(&mut self) -> Result<(), FieldError> {
        if self.is_paused() {
            return Ok(());
        }

        let mut fired = std::mem::take(&mut self.fired);
        if let Some(shape) = self.active_shape.as_mut() {
            shape.tick(&mut fired);
        }
        for block in self.locked.blocks_mut() {
            block.tick(&mut fired);
        }
        for state in fired.drain(..) {
            self.queue.offer(state);
        }
        self.fired = fired;

        match self.queue.poll() {
            Some(next) => self.change_state(next),
            None => Ok(()),
        }
    }

    fn change_state(&mut self, next: GameFieldState) -> Result<(), FieldError> {
        tracing::debug!(from = ?self.state, to = ?next, "state change");
        self.state = next;

        match next {
            GameFieldState::ShapeSpawnReady => {
                self.broken_blocks.clear();
                self.dropped_blocks.clear();
                if self.spawn_active_shape() {
                    self.queue.offer(GameFieldState::ShapeSoftDrop);
                } else {
                    self.queue.offer(GameFieldState::ShapeFell);
                }
            }

            GameFieldState::ShapeSoftDrop | GameFieldState::ShapeForcedDrop => {
                let (state, duration) = if self.down_held {
                    (GameFieldState::ShapeForcedDrop, self.config.forced_drop_ticks)
                } else {
                    (GameFieldState::ShapeSoftDrop, self.config.soft_drop_ticks)
                };
                self.state = state;

                let down = TileVector::new(0, 1);
                let fits = self.active_shape.as_ref().is_some_and(|shape| {
                    Shape::fits(
                        shape.kind(),
                        shape.tile() + down,
                        shape.rotation(),
                        &self.locked,
                        Some(shape),
                    )
                });
                match self.active_shape.as_mut() {
                    Some(shape) if fits => {
                        shape.tile_shift(down);
                        shape.start_drop_animation(duration, Some(state));
                        self.last_movement_is_rotation = false;
                    }
                    _ => {
                        self.queue.offer(GameFieldState::ShapeFell);
                    }
                }
            }

            GameFieldState::ShapeWallKicked => {}

            GameFieldState::ShapeFell => match self.active_shape.as_mut() {
                None => {
                    self.queue.offer(GameFieldState::ShapeLocked);
                }
                Some(shape) => {
                    // lock once every shape animation has settled
                    if let Some(kind) = shape.running_animation() {
                        shape.add_animation_callback(kind, GameFieldState::ShapeFell);
                    } else {
                        self.queue.offer(GameFieldState::ClearingFilledLines);
                    }
                }
            },

            GameFieldState::ShapeLocked => {
                if self.active_shape.is_none() && !self.game_over {
                    self.game_over = true;
                    tracing::info!(score = self.score, lines = self.cleared_lines, "game over");
                }
            }

            GameFieldState::ClearingFilledLines => self.clear_filled_lines()?,

            GameFieldState::DroppingBlocks => self.drop_blocks()?,

            GameFieldState::Stopped | GameFieldState::Paused => {}
        }
        Ok(())
    }

    fn random_color(&mut self) -> BlockColor {
        self.rng.pick(&BlockColor::ALL).unwrap_or_default()
    }

    /// Spawn the lookahead type. Returns false if the spawn tile is blocked.
    fn spawn_active_shape(&mut self) -> bool {
        let kind = self.next_shape_type;
        self.next_shape_type = ShapeType::random(&mut self.rng);
        let color = self.random_color();
        let spawn = self.config.spawn;

        if !Shape::fits(kind, spawn, Rotation::Initial, &self.locked, None) {
            tracing::debug!(?kind, "spawn blocked");
            return false;
        }
        self.active_shape = Some(Shape::new(kind, spawn, Rotation::Initial, color));
        self.last_movement_is_rotation = false;

        self.next_shape_display.set_next_shape(self.next_shape_type);
        self.next_shape_display.start_transition_animation();
        true
    }

    fn clear_filled_lines(&mut self) -> Result<(), FieldError> {
        let Some(shape) = self.active_shape.take() else {
            self.queue.offer(GameFieldState::ShapeSpawnReady);
            return Ok(());
        };
        let (kind, tile, rotation) = (shape.kind(), shape.tile(), shape.rotation());
        for block in shape.into_locked_blocks() {
            self.locked.insert(block.tile(), block)?;
        }

        let tspin = self.detect_tspin(kind, tile, rotation);
        let lines = self.remove_filled_rows(tile.y, tile.y + LOCK_BAND);
        self.update_score(lines, tspin);

        let duration = self.config.block_break_ticks;
        for (i, &key) in self.broken_blocks.iter().enumerate() {
            if let Some(block) = self.locked.get_mut(key) {
                // every break lasts equally long, one completion is enough
                let on_finished = (i == 0).then_some(GameFieldState::DroppingBlocks);
                block.start_break_animation(duration, on_finished);
            }
        }
        if self.broken_blocks.is_empty() {
            self.queue.offer(GameFieldState::ShapeSpawnReady);
        }
        Ok(())
    }

    fn drop_blocks(&mut self) -> Result<(), FieldError> {
        for key in self.broken_blocks.drain(..) {
            self.locked.remove(key);
        }

        for (i, &key) in self.dropped_blocks.iter().enumerate() {
            if let Some(block) = self.locked.get_mut(key) {
                // the highest block falls furthest
                let on_finished = (i == 0).then_some(GameFieldState::ShapeSpawnReady);
                block.start_drop_animation(on_finished);
            }
        }

        // bottom-up so every landing slot is vacated first
        for &key in self.dropped_blocks.iter().rev() {
            if let Some(block) = self.locked.remove(key) {
                self.locked.insert(block.tile(), block)?;
            }
        }

        if self.dropped_blocks.is_empty() {
            self.queue.offer(GameFieldState::ShapeSpawnReady);
        }
        self.dropped_blocks.clear();
        Ok(())
    }

    /// T piece that got here by rotation with at least three blocked diagonals.
    ///
    /// Expects the piece to be locked already.
    fn detect_tspin(&self, kind: ShapeType, tile: TileVector, rotation: Rotation) -> bool {
        if kind != ShapeType::T || !self.last_movement_is_rotation {
            return false;
        }
        let Some(center) = kind.center_cell() else {
            return false;
        };
        let center = tile + center;
        let blocked = DIAGONALS
            .iter()
            .map(|&(dx, dy)| center + TileVector::new(dx, dy))
            .filter(|&corner| {
                let local = corner - tile;
                !self.locked.in_range(corner)
                    || (self.locked.contains(corner) && !kind.is_solid(local.x, local.y, rotation))
            })
            .count();
        scoring::is_tspin_corner_count(blocked)
    }

    /// Find the full rows in `start_y..=end_y` and shift the blocks above them.
    ///
    /// Broken blocks keep their slots until [`GameFieldState::DroppingBlocks`].
    /// Dropped blocks get their landing tile right away but stay keyed at
    /// their old slot until then. Returns the number of cleared rows.
    pub fn remove_filled_rows(&mut self, start_y: i32, end_y: i32) -> u32 {
        let cleared_rows: Vec<i32> = (start_y..=end_y)
            .filter(|&y| self.locked.is_row_full(y))
            .collect();
        let broken: Vec<TileVector> = cleared_rows
            .iter()
            .flat_map(|&y| self.locked.rows(y, y).map(|(key, _)| key))
            .collect();

        let mut dropped = Vec::new();
        if let Some(&lowest) = cleared_rows.last() {
            let candidates: Vec<TileVector> = self
                .locked
                .rows(0, lowest - 1)
                .map(|(key, _)| key)
                .filter(|key| !cleared_rows.contains(&key.y))
                .collect();

            let total = cleared_rows.len();
            let mut rows_left = total;
            for key in candidates {
                // skip to the first cleared row below this block
                while rows_left > 0 && key.y > cleared_rows[total - rows_left] {
                    rows_left -= 1;
                }
                if rows_left == 0 {
                    break;
                }
                if let Some(block) = self.locked.get_mut(key) {
                    block.tile_shift(TileVector::new(0, rows_left as i32));
                }
                dropped.push(key);
            }
        }

        if !cleared_rows.is_empty() {
            tracing::debug!(rows = ?cleared_rows, dropped = dropped.len(), "rows cleared");
        }
        self.broken_blocks = broken;
        self.dropped_blocks = dropped;
        cleared_rows.len() as u32
    }

    fn update_score(&mut self, lines: u32, tspin: bool) {
        self.cleared_lines += lines;
        self.level = scoring::calculate_level(self.cleared_lines);

        let result = scoring::calculate_score(lines, tspin, self.combo);
        self.combo = result.combo;
        self.score += result.score_added;

        if result.score_added > 0 {
            tracing::debug!(
                lines,
                tspin,
                combo = self.combo,
                added = result.score_added,
                "score"
            );
            self.score_display
                .set_values(self.score, self.level, self.cleared_lines);
            self.score_display.start_transition_animation();
        }
    }

    // ---- rendering ----

    /// Shift that keeps the drawn active shape inside the field.
    pub fn shape_fit_shift(&self) -> RenderVector {
        match &self.active_shape {
            Some(shape) => self.fit_shift(&shape.convex_hull()),
            None => RenderVector::ZERO,
        }
    }

    /// Largest correction per axis that brings every hull point into view.
    fn fit_shift(&self, hull: &[RenderVector]) -> RenderVector {
        let (width, height) = (self.locked.width() as f64, self.locked.height() as f64);
        let fit_axis = |value: f64, max: f64, shift: &mut f64| {
            if value < 0.0 && -value > shift.abs() {
                *shift = -value;
            }
            if value > max && (max - value).abs() > shift.abs() {
                *shift = max - value;
            }
        };

        let mut shift = RenderVector::ZERO;
        for point in hull {
            fit_axis(point.x, width, &mut shift.x);
            fit_axis(point.y, height, &mut shift.y);
        }
        shift
    }

    /// Every block as it should be drawn `interpolation` of the way to the
    /// next tick. Locked blocks first, then the active shape.
    pub fn render_blocks(&self, interpolation: f64) -> Vec<RenderedBlock> {
        let half = RenderVector::new(0.5, 0.5);
        let mut rendered = Vec::with_capacity(self.locked.len() + 4);

        for (_, block) in self.locked.iter() {
            let pose = block.render_pose(interpolation);
            rendered.push(RenderedBlock {
                tile: block.tile(),
                position: pose.coords,
                angle: pose.angle,
                opacity: pose.opacity,
                scale: pose.scale,
                color: block.color(),
                parent: block.parent(),
            });
        }

        if let Some(shape) = &self.active_shape {
            let shape_pose = shape.render_pose(interpolation);
            let fit = self.fit_shift(&shape.convex_hull_at(&shape_pose));
            let transform = shape
                .local_transform(&shape_pose)
                .combine(&Transform::translation(fit));

            for block in shape.blocks() {
                let pose = block.render_pose(interpolation);
                let center = transform.apply(pose.coords + half);
                rendered.push(RenderedBlock {
                    tile: block.tile(),
                    position: center - half,
                    angle: pose.angle + shape_pose.angle,
                    opacity: pose.opacity * shape_pose.opacity,
                    scale: pose.scale * shape_pose.scale,
                    color: block.color(),
                    parent: block.parent(),
                });
            }
        }
        rendered
    }
}

impl<S, N> TileField for GameField<S, N> {
    fn width(&self) -> i32 {
        self.locked.width()
    }

    fn height(&self) -> i32 {
        self.locked.height()
    }

    fn is_locked(&self, tile: TileVector) -> bool {
        self.locked.contains(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn field() -> GameField {
        GameField::new(FieldConfig::default()).unwrap()
    }

    /// Start a game and apply the first spawn.
    fn started() -> GameField {
        let mut field = field();
        field.start();
        field.tick().unwrap();
        assert_eq!(field.state(), GameFieldState::ShapeSpawnReady);
        field
    }

    fn fill_row(field: &mut GameField, y: i32, skip: &[i32]) {
        for x in 0..field.width() {
            if !skip.contains(&x) {
                field
                    .insert_locked_block(TileVector::new(x, y), BlockColor::Blue)
                    .unwrap();
            }
        }
    }

    fn press(key: InputKey) -> InputSnapshot {
        InputSnapshot::new().with(key, KeyState::Pressed)
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = FieldConfig {
            width: 2,
            ..FieldConfig::default()
        };
        assert!(matches!(
            GameField::new(config),
            Err(FieldError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_start_spawns_and_queues_soft_drop() {
        let field = started();
        let shape = field.active_shape().unwrap();
        assert_eq!(shape.tile(), TileVector::new(3, 0));
        assert_eq!(shape.rotation(), Rotation::Initial);
        assert_eq!(field.pending_states(), vec![GameFieldState::ShapeSoftDrop]);
    }

    #[test]
    fn test_soft_drop_moves_one_row_per_duration() {
        let mut field = started();
        field
            .place_active_shape(ShapeType::O, TileVector::new(3, 0), Rotation::Initial)
            .unwrap();
        field.tick().unwrap();
        assert_eq!(field.state(), GameFieldState::ShapeSoftDrop);
        assert_eq!(field.active_shape().unwrap().tile(), TileVector::new(3, 1));

        for _ in 0..field.config().soft_drop_ticks {
            field.tick().unwrap();
        }
        assert_eq!(field.active_shape().unwrap().tile(), TileVector::new(3, 2));
    }

    #[test]
    fn test_down_held_switches_to_forced_drop() {
        let mut field = started();
        field.tick().unwrap();
        field.control(&press(InputKey::Down)).unwrap();
        assert_eq!(field.state(), GameFieldState::ShapeForcedDrop);

        let y = field.active_shape().unwrap().tile().y;
        for _ in 0..field.config().forced_drop_ticks {
            field.tick().unwrap();
        }
        assert_eq!(field.state(), GameFieldState::ShapeForcedDrop);
        assert_eq!(field.active_shape().unwrap().tile().y, y + 1);

        field
            .control(&InputSnapshot::new().with(InputKey::Down, KeyState::Released))
            .unwrap();
        assert_eq!(field.state(), GameFieldState::ShapeSoftDrop);
    }

    #[test]
    fn test_shift_respects_walls() {
        let mut field = started();
        field
            .place_active_shape(ShapeType::O, TileVector::new(-1, 5), Rotation::Initial)
            .unwrap();
        field.control(&press(InputKey::Left)).unwrap();
        assert_eq!(field.active_shape().unwrap().tile(), TileVector::new(-1, 5));

        field.control(&press(InputKey::Right)).unwrap();
        assert_eq!(field.active_shape().unwrap().tile(), TileVector::new(0, 5));

        // opposite presses cancel out
        let both = press(InputKey::Left).with(InputKey::Right, KeyState::Pressed);
        field.control(&both).unwrap();
        assert_eq!(field.active_shape().unwrap().tile(), TileVector::new(0, 5));
    }

    #[test]
    fn test_rotation_in_place() {
        let mut field = started();
        field
            .place_active_shape(ShapeType::T, TileVector::new(3, 5), Rotation::Initial)
            .unwrap();
        field.control(&press(InputKey::RotateRight)).unwrap();
        let shape = field.active_shape().unwrap();
        assert_eq!(shape.rotation(), Rotation::Right);
        assert_eq!(shape.tile(), TileVector::new(3, 5));
        assert_eq!(shape.running_animation(), Some(ShapeAnimation::Rotate));
        assert!(field.last_movement_is_rotation);
    }

    #[test]
    fn test_input_ignored_when_not_controllable() {
        let mut field = field();
        field.control(&press(InputKey::Left)).unwrap();
        field.control(&press(InputKey::RotateLeft)).unwrap();
        assert!(field.active_shape().is_none());
        assert_eq!(field.state(), GameFieldState::Stopped);
    }

    #[test]
    fn test_remove_filled_rows_without_full_row() {
        let mut field = field();
        fill_row(&mut field, 19, &[4]);
        field
            .insert_locked_block(TileVector::new(0, 18), BlockColor::Red)
            .unwrap();
        assert_eq!(field.remove_filled_rows(16, 19), 0);
        assert!(field.broken_blocks.is_empty());
        assert!(field.dropped_blocks.is_empty());
        assert_eq!(
            field.locked_blocks().get(TileVector::new(0, 18)).map(Block::tile),
            Some(TileVector::new(0, 18))
        );
    }

    #[test]
    fn test_remove_filled_rows_shifts_by_rows_beneath() {
        let mut field = field();
        fill_row(&mut field, 19, &[]);
        fill_row(&mut field, 17, &[]);
        for (x, y) in [(0, 18), (1, 16), (2, 15)] {
            field
                .insert_locked_block(TileVector::new(x, y), BlockColor::Red)
                .unwrap();
        }

        assert_eq!(field.remove_filled_rows(16, 19), 2);
        assert_eq!(field.broken_blocks.len(), 20);
        assert_eq!(
            field.dropped_blocks,
            vec![
                TileVector::new(2, 15),
                TileVector::new(1, 16),
                TileVector::new(0, 18)
            ]
        );

        // still keyed at the old slot, tile points at the landing spot
        let tile_at = |field: &GameField, x, y| {
            field.locked_blocks().get(TileVector::new(x, y)).map(Block::tile)
        };
        assert_eq!(tile_at(&field, 2, 15), Some(TileVector::new(2, 17)));
        assert_eq!(tile_at(&field, 1, 16), Some(TileVector::new(1, 18)));
        assert_eq!(tile_at(&field, 0, 18), Some(TileVector::new(0, 19)));
    }

    #[test]
    fn test_remove_filled_rows_ignores_full_rows_outside_band() {
        let mut field = field();
        fill_row(&mut field, 19, &[]);
        fill_row(&mut field, 15, &[]);

        assert_eq!(field.remove_filled_rows(16, 19), 1);
        assert_eq!(field.broken_blocks.len(), 10);
        assert!(field.broken_blocks.iter().all(|tile| tile.y == 19));
        // the full row above the band only falls
        assert_eq!(field.dropped_blocks.len(), 10);
        assert_eq!(
            field.locked_blocks().get(TileVector::new(3, 15)).map(Block::tile),
            Some(TileVector::new(3, 16))
        );
    }

    #[test]
    fn test_tspin_needs_rotation_and_three_corners() {
        let mut field = field();
        // corners of a T at (3, 17) pointing down: (3,17) (5,17) (3,19) (5,19)
        for (x, y) in [(3, 17), (3, 19), (5, 19)] {
            field
                .insert_locked_block(TileVector::new(x, y), BlockColor::Red)
                .unwrap();
        }
        let tile = TileVector::new(3, 17);
        assert!(!field.detect_tspin(ShapeType::T, tile, Rotation::UpsideDown));

        field.last_movement_is_rotation = true;
        assert!(field.detect_tspin(ShapeType::T, tile, Rotation::UpsideDown));
        assert!(!field.detect_tspin(ShapeType::J, tile, Rotation::UpsideDown));

        field.locked.remove(TileVector::new(3, 17));
        assert!(!field.detect_tspin(ShapeType::T, tile, Rotation::UpsideDown));
    }

    #[test]
    fn test_tspin_counts_off_field_corners() {
        let mut field = field();
        field.last_movement_is_rotation = true;
        field
            .insert_locked_block(TileVector::new(1, 19), BlockColor::Red)
            .unwrap();
        // T against the left wall pointing right, center (0, 18)
        assert!(field.detect_tspin(ShapeType::T, TileVector::new(-1, 17), Rotation::Right));
    }

    #[test]
    fn test_pause_freezes_ticks() {
        let mut field = started();
        field.control(&press(InputKey::Pause)).unwrap();
        assert!(field.is_paused());

        let pending = field.pending_states();
        let tile = field.active_shape().unwrap().tile();
        for _ in 0..100 {
            field.tick().unwrap();
        }
        assert_eq!(field.pending_states(), pending);
        assert_eq!(field.active_shape().unwrap().tile(), tile);

        // movement is ignored while paused
        field.control(&press(InputKey::Left)).unwrap();
        assert_eq!(field.active_shape().unwrap().tile(), tile);

        field.control(&press(InputKey::Pause)).unwrap();
        assert_eq!(field.state(), GameFieldState::ShapeSpawnReady);
        field.tick().unwrap();
        assert_eq!(field.state(), GameFieldState::ShapeSoftDrop);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut field = started();
        fill_row(&mut field, 19, &[0]);
        field.reset();
        assert_eq!(field.state(), GameFieldState::Stopped);
        assert!(field.active_shape().is_none());
        assert!(field.locked_blocks().is_empty());
        assert!(field.pending_states().is_empty());
        assert_eq!(field.level(), 1);
    }

    #[test]
    fn test_place_active_shape_checks_fit() {
        let mut field = field();
        field
            .insert_locked_block(TileVector::new(4, 1), BlockColor::Red)
            .unwrap();
        assert_eq!(
            field.place_active_shape(ShapeType::T, TileVector::new(3, 0), Rotation::Initial),
            Err(FieldError::DoesNotFit(TileVector::new(3, 0)))
        );
        assert!(field
            .place_active_shape(ShapeType::T, TileVector::new(3, 2), Rotation::Initial)
            .is_ok());
    }

    #[test]
    fn test_render_blocks_is_pure_and_places_shape() {
        let mut field = started();
        field
            .place_active_shape(ShapeType::O, TileVector::new(3, 4), Rotation::Initial)
            .unwrap();
        field
            .insert_locked_block(TileVector::new(0, 19), BlockColor::Green)
            .unwrap();

        let first = field.render_blocks(0.5);
        let second = field.render_blocks(0.5);
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);

        assert_eq!(first[0].parent, BlockParent::Field);
        assert_eq!(first[0].position, RenderVector::new(0.0, 19.0));

        let mut shape_cells: Vec<RenderedBlock> = first[1..].to_vec();
        shape_cells.sort_by_key(|b| b.tile);
        for block in shape_cells {
            assert_eq!(block.parent, BlockParent::ActiveShape);
            let expected = block.tile.to_render();
            assert!((block.position - expected).length() < 1e-9, "{:?}", block);
        }
    }

    #[test]
    fn test_fit_shift_pulls_hull_inside() {
        let field = field();
        let hull = [
            RenderVector::new(-0.5, 2.0),
            RenderVector::new(3.0, 2.0),
            RenderVector::new(1.0, 21.25),
        ];
        assert_eq!(field.fit_shift(&hull), RenderVector::new(0.5, -1.25));
        assert_eq!(field.shape_fit_shift(), RenderVector::ZERO);
    }

    #[derive(Default, Clone)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl ScoreDisplay for Recorder {
        fn set_values(&mut self, score: u32, level: u32, lines: u32) {
            self.0.borrow_mut().push(format!("score {} {} {}", score, level, lines));
        }

        fn start_transition_animation(&mut self) {
            self.0.borrow_mut().push("flash".to_string());
        }
    }

    impl NextShapeDisplay for Recorder {
        fn set_next_shape(&mut self, kind: ShapeType) {
            self.0.borrow_mut().push(format!("next {:?}", kind));
        }

        fn start_transition_animation(&mut self) {
            self.0.borrow_mut().push("next flash".to_string());
        }
    }

    #[test]
    fn test_displays_are_notified() {
        let log = Recorder::default();
        let mut field =
            GameField::with_displays(FieldConfig::default(), log.clone(), log.clone()).unwrap();
        field.start();
        field.tick().unwrap();

        let entries = log.0.borrow().clone();
        assert_eq!(entries[0], "score 0 1 0");
        assert!(entries.iter().any(|e| e == "next flash"));
        assert_eq!(entries.last().map(String::as_str), Some("next flash"));
    }
}
