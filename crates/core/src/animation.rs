//! Animation engine - tick-driven tweens attached to shapes and blocks
//!
//! An [`Animation`] advances one step per field tick and writes its current
//! value into a [`Pose`]. Rendering between ticks passes an interpolation
//! factor in `[0, 1)` so motion stays smooth without touching game state.
//!
//! Every animated object owns an [`AnimationSlots`] map with one slot per
//! animation kind. Starting an animation in a slot replaces whatever ran
//! there before. When an animation finishes, the field states registered
//! as its completion callbacks are reported back to the caller, who offers
//! them to the transition queue.

use std::fmt;
use std::marker::PhantomData;

use blockfall_types::RenderVector;

use crate::state::GameFieldState;

/// Angle a breaking block turns through by the end of its animation
const BREAK_FINAL_ANGLE: f64 = -std::f64::consts::PI / 3.0;

/// Scale a breaking block ends at, relative to its starting scale
const BREAK_SCALE_COEFFICIENT: f64 = 0.3;

/// Visual state written by animations.
///
/// `coords` are in tile units relative to the parent, `angle` in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub coords: RenderVector,
    pub angle: f64,
    pub opacity: f64,
    pub scale: f64,
}

impl Pose {
    pub fn at(coords: RenderVector) -> Self {
        Self {
            coords,
            angle: 0.0,
            opacity: 1.0,
            scale: 1.0,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(RenderVector::ZERO)
    }
}

/// A tween advanced once per tick.
pub trait Animation: fmt::Debug {
    /// Advance by one tick. No-op once finished.
    fn tick(&mut self);

    /// Write the animated value for the current tick plus `interpolation`.
    fn perform(&self, pose: &mut Pose, interpolation: f64);

    fn finished(&self) -> bool;

    /// Ticks remaining until [`Animation::finished`] turns true.
    fn time_left(&self) -> u32;
}

/// Progress in `[0, 1]` of a fixed-length tween.
fn progress(elapsed: u32, duration: u32, interpolation: f64) -> f64 {
    if duration == 0 {
        return 1.0;
    }
    ((elapsed as f64 + interpolation) / duration as f64).clamp(0.0, 1.0)
}

/// Which coordinates a [`MoveAnimation`] drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axes {
    Horizontal,
    Vertical,
    Both,
}

/// Linear movement between two points.
#[derive(Debug, Clone)]
pub struct MoveAnimation {
    from: RenderVector,
    to: RenderVector,
    axes: Axes,
    duration: u32,
    elapsed: u32,
}

impl MoveAnimation {
    pub fn new(from: RenderVector, to: RenderVector, axes: Axes, duration: u32) -> Self {
        Self {
            from,
            to,
            axes,
            duration,
            elapsed: 0,
        }
    }

    pub fn vertical(from: f64, to: f64, duration: u32) -> Self {
        Self::new(
            RenderVector::new(0.0, from),
            RenderVector::new(0.0, to),
            Axes::Vertical,
            duration,
        )
    }

    pub fn horizontal(from: f64, to: f64, duration: u32) -> Self {
        Self::new(
            RenderVector::new(from, 0.0),
            RenderVector::new(to, 0.0),
            Axes::Horizontal,
            duration,
        )
    }
}

impl Animation for MoveAnimation {
    fn tick(&mut self) {
        if !self.finished() {
            self.elapsed += 1;
        }
    }

    fn perform(&self, pose: &mut Pose, interpolation: f64) {
        let p = progress(self.elapsed, self.duration, interpolation);
        let at = self.from + (self.to - self.from) * p;
        match self.axes {
            Axes::Horizontal => pose.coords.x = at.x,
            Axes::Vertical => pose.coords.y = at.y,
            Axes::Both => pose.coords = at,
        }
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn time_left(&self) -> u32 {
        self.duration.saturating_sub(self.elapsed)
    }
}

/// Linear turn between two angles.
#[derive(Debug, Clone)]
pub struct RotateAnimation {
    from: f64,
    to: f64,
    duration: u32,
    elapsed: u32,
}

impl RotateAnimation {
    pub fn new(from: f64, to: f64, duration: u32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0,
        }
    }
}

impl Animation for RotateAnimation {
    fn tick(&mut self) {
        if !self.finished() {
            self.elapsed += 1;
        }
    }

    fn perform(&self, pose: &mut Pose, interpolation: f64) {
        let p = progress(self.elapsed, self.duration, interpolation);
        pose.angle = self.from + (self.to - self.from) * p;
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn time_left(&self) -> u32 {
        self.duration.saturating_sub(self.elapsed)
    }
}

/// Fall from rest under constant acceleration (tiles per tick squared).
#[derive(Debug, Clone)]
pub struct AcceleratedMoveAnimation {
    from: RenderVector,
    to: RenderVector,
    acceleration: f64,
    duration: u32,
    elapsed: u32,
}

impl AcceleratedMoveAnimation {
    /// Acceleration used for falling blocks after a line clear
    pub const GRAVITY: f64 = 1.0 / 32.0;

    pub fn new(from: RenderVector, to: RenderVector, acceleration: f64) -> Self {
        let distance = (to - from).length();
        let duration = if distance <= 0.0 || acceleration <= 0.0 {
            0
        } else {
            (2.0 * distance / acceleration).sqrt().ceil() as u32
        };
        Self {
            from,
            to,
            acceleration,
            duration,
            elapsed: 0,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }
}

impl Animation for AcceleratedMoveAnimation {
    fn tick(&mut self) {
        if !self.finished() {
            self.elapsed += 1;
        }
    }

    fn perform(&self, pose: &mut Pose, interpolation: f64) {
        let delta = self.to - self.from;
        let distance = delta.length();
        if distance <= 0.0 {
            pose.coords = self.to;
            return;
        }
        let t = (self.elapsed as f64 + interpolation).min(self.duration as f64);
        let travelled = (0.5 * self.acceleration * t * t).min(distance);
        pose.coords = self.from + delta * (travelled / distance);
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn time_left(&self) -> u32 {
        self.duration.saturating_sub(self.elapsed)
    }
}

/// Fade out, shrink and twist a block that is being cleared.
#[derive(Debug, Clone)]
pub struct BlockBreakAnimation {
    start_angle: f64,
    start_scale: f64,
    duration: u32,
    elapsed: u32,
}

impl BlockBreakAnimation {
    pub fn new(start_angle: f64, start_scale: f64, duration: u32) -> Self {
        Self {
            start_angle,
            start_scale,
            duration,
            elapsed: 0,
        }
    }
}

impl Animation for BlockBreakAnimation {
    fn tick(&mut self) {
        if !self.finished() {
            self.elapsed += 1;
        }
    }

    fn perform(&self, pose: &mut Pose, interpolation: f64) {
        let p = progress(self.elapsed, self.duration, interpolation);
        pose.opacity = 1.0 - p;
        pose.scale =
            self.start_scale + p * (BREAK_SCALE_COEFFICIENT * self.start_scale - self.start_scale);
        pose.angle = self.start_angle + p * BREAK_FINAL_ANGLE;
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn time_left(&self) -> u32 {
        self.duration.saturating_sub(self.elapsed)
    }
}

/// A running animation plus the states to queue when it completes.
#[derive(Debug)]
pub struct AnimationHandle {
    animation: Box<dyn Animation>,
    callbacks: Vec<GameFieldState>,
}

impl AnimationHandle {
    pub fn new(animation: Box<dyn Animation>) -> Self {
        Self {
            animation,
            callbacks: Vec::new(),
        }
    }

    pub fn with_callback(mut self, state: GameFieldState) -> Self {
        self.callbacks.push(state);
        self
    }

    pub fn with_callbacks(mut self, states: Vec<GameFieldState>) -> Self {
        self.callbacks.extend(states);
        self
    }

    /// Drop the animation, keeping its pending completion states.
    pub fn into_callbacks(self) -> Vec<GameFieldState> {
        self.callbacks
    }

    pub fn time_left(&self) -> u32 {
        self.animation.time_left()
    }
}

/// Maps an animation kind onto a slot index.
pub trait SlotKey: Copy {
    fn slot(self) -> usize;
}

/// One optional [`AnimationHandle`] per animation kind.
///
/// Slots are ticked and performed in index order, so a later slot wins when
/// two animations write the same coordinate.
#[derive(Debug)]
pub struct AnimationSlots<K, const N: usize> {
    slots: [Option<AnimationHandle>; N],
    _kind: PhantomData<K>,
}

impl<K: SlotKey, const N: usize> Default for AnimationSlots<K, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SlotKey, const N: usize> AnimationSlots<K, N> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            _kind: PhantomData,
        }
    }

    /// Replace the slot's animation. The previous one is dropped with its callbacks.
    pub fn start(&mut self, kind: K, handle: AnimationHandle) {
        self.slots[kind.slot()] = Some(handle);
    }

    /// Stop the slot's animation without firing its callbacks.
    pub fn interrupt(&mut self, kind: K) -> Option<AnimationHandle> {
        self.slots[kind.slot()].take()
    }

    /// Attach a completion state to a running animation.
    ///
    /// Returns false when nothing runs in the slot.
    pub fn add_callback(&mut self, kind: K, state: GameFieldState) -> bool {
        match self.slots[kind.slot()].as_mut() {
            Some(handle) => {
                handle.callbacks.push(state);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, kind: K) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn any_running(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Longest remaining time over all slots.
    pub fn time_left(&self) -> u32 {
        self.slots
            .iter()
            .flatten()
            .map(AnimationHandle::time_left)
            .max()
            .unwrap_or(0)
    }

    /// Advance every running animation and apply it to `pose`.
    ///
    /// Finished animations are cleared and their callbacks appended to `fired`.
    pub fn tick(&mut self, pose: &mut Pose, fired: &mut Vec<GameFieldState>) {
        for slot in self.slots.iter_mut() {
            let Some(handle) = slot.as_mut() else {
                continue;
            };
            handle.animation.tick();
            handle.animation.perform(pose, 0.0);
            if handle.animation.finished() {
                if let Some(done) = slot.take() {
                    fired.extend(done.callbacks);
                }
            }
        }
    }

    /// Apply every running animation at `interpolation` without advancing it.
    pub fn perform(&self, pose: &mut Pose, interpolation: f64) {
        for handle in self.slots.iter().flatten() {
            handle.animation.perform(pose, interpolation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Kind {
        A,
        B,
    }

    impl SlotKey for Kind {
        fn slot(self) -> usize {
            self as usize
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_move_animation_reaches_target() {
        let mut anim = MoveAnimation::vertical(0.0, 1.0, 4);
        let mut pose = Pose::default();

        anim.tick();
        anim.perform(&mut pose, 0.0);
        assert!(close(pose.coords.y, 0.25));

        anim.perform(&mut pose, 0.5);
        assert!(close(pose.coords.y, 0.375));

        for _ in 0..10 {
            anim.tick();
        }
        anim.perform(&mut pose, 0.9);
        assert!(anim.finished());
        assert!(close(pose.coords.y, 1.0));
        assert_eq!(anim.time_left(), 0);
    }

    #[test]
    fn test_horizontal_move_leaves_y_alone() {
        let anim = MoveAnimation::horizontal(2.0, 3.0, 2);
        let mut pose = Pose::at(RenderVector::new(2.0, 7.0));
        anim.perform(&mut pose, 1.0);
        assert!(close(pose.coords.x, 2.5));
        assert!(close(pose.coords.y, 7.0));
    }

    #[test]
    fn test_accelerated_move_duration_and_endpoint() {
        let mut anim = AcceleratedMoveAnimation::new(
            RenderVector::new(0.0, 0.0),
            RenderVector::new(0.0, 1.0),
            AcceleratedMoveAnimation::GRAVITY,
        );
        // sqrt(2 * 1 * 32) = 8
        assert_eq!(anim.duration(), 8);

        let mut pose = Pose::default();
        anim.tick();
        anim.perform(&mut pose, 0.0);
        assert!(close(pose.coords.y, 1.0 / 64.0));

        while !anim.finished() {
            anim.tick();
        }
        anim.perform(&mut pose, 0.0);
        assert!(close(pose.coords.y, 1.0));
    }

    #[test]
    fn test_block_break_fades_shrinks_and_twists() {
        let mut anim = BlockBreakAnimation::new(0.0, 1.0, 10);
        let mut pose = Pose::default();
        for _ in 0..5 {
            anim.tick();
        }
        anim.perform(&mut pose, 0.0);
        assert!(close(pose.opacity, 0.5));
        assert!(close(pose.scale, 0.65));
        assert!(close(pose.angle, BREAK_FINAL_ANGLE / 2.0));
    }

    #[test]
    fn test_slots_fire_callbacks_once() {
        let mut slots: AnimationSlots<Kind, 2> = AnimationSlots::new();
        let mut pose = Pose::default();
        let mut fired = Vec::new();

        slots.start(
            Kind::A,
            AnimationHandle::new(Box::new(MoveAnimation::vertical(0.0, 1.0, 2)))
                .with_callback(GameFieldState::ShapeSoftDrop),
        );
        assert!(slots.add_callback(Kind::A, GameFieldState::ShapeFell));
        assert!(!slots.add_callback(Kind::B, GameFieldState::ShapeFell));

        slots.tick(&mut pose, &mut fired);
        assert!(fired.is_empty());
        assert!(slots.is_running(Kind::A));

        slots.tick(&mut pose, &mut fired);
        assert_eq!(
            fired,
            vec![GameFieldState::ShapeSoftDrop, GameFieldState::ShapeFell]
        );
        assert!(!slots.any_running());

        slots.tick(&mut pose, &mut fired);
        assert_eq!(fired.len(), 2);
    }

    #[test]
    fn test_interrupt_discards_callbacks() {
        let mut slots: AnimationSlots<Kind, 2> = AnimationSlots::new();
        let mut pose = Pose::default();
        let mut fired = Vec::new();

        slots.start(
            Kind::B,
            AnimationHandle::new(Box::new(RotateAnimation::new(0.0, 1.0, 1)))
                .with_callback(GameFieldState::DroppingBlocks),
        );
        assert_eq!(slots.time_left(), 1);
        let handle = slots.interrupt(Kind::B);
        assert!(handle.is_some());

        slots.tick(&mut pose, &mut fired);
        assert!(fired.is_empty());
        assert_eq!(pose.angle, 0.0);
    }

    #[test]
    fn test_perform_does_not_advance() {
        let mut slots: AnimationSlots<Kind, 2> = AnimationSlots::new();
        slots.start(
            Kind::A,
            AnimationHandle::new(Box::new(MoveAnimation::horizontal(0.0, 4.0, 4))),
        );
        let mut pose = Pose::default();
        slots.perform(&mut pose, 0.5);
        slots.perform(&mut pose, 0.5);
        assert!(close(pose.coords.x, 0.5));
        assert_eq!(slots.time_left(), 4);
    }
}
