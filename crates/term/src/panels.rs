//! Side panels fed by the field through its display hooks.

use blockfall_core::{NextShapeDisplay, ScoreDisplay, ShapeType};

/// Frames a panel stays highlighted after a change.
pub const FLASH_FRAMES: u32 = 20;

/// Score, level and cleared line counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScorePanel {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    flash: u32,
}

impl ScorePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flashing(&self) -> bool {
        self.flash > 0
    }

    /// Advance the highlight by one rendered frame.
    pub fn tick_frame(&mut self) {
        self.flash = self.flash.saturating_sub(1);
    }
}

impl ScoreDisplay for ScorePanel {
    fn set_values(&mut self, score: u32, level: u32, lines: u32) {
        self.score = score;
        self.level = level;
        self.lines = lines;
    }

    fn start_transition_animation(&mut self) {
        self.flash = FLASH_FRAMES;
    }
}

/// Preview of the piece that spawns next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextPanel {
    pub next: Option<ShapeType>,
    flash: u32,
}

impl NextPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flashing(&self) -> bool {
        self.flash > 0
    }

    pub fn tick_frame(&mut self) {
        self.flash = self.flash.saturating_sub(1);
    }
}

impl NextShapeDisplay for NextPanel {
    fn set_next_shape(&mut self, kind: ShapeType) {
        self.next = Some(kind);
    }

    fn start_transition_animation(&mut self) {
        self.flash = FLASH_FRAMES;
    }
}
