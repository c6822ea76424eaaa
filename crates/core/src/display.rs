//! Display collaborators notified by the field.

use crate::shape_type::ShapeType;

/// Score panel.
pub trait ScoreDisplay {
    fn set_values(&mut self, score: u32, level: u32, lines: u32);

    /// Flash the panel after a change.
    fn start_transition_animation(&mut self);
}

/// Next piece preview.
pub trait NextShapeDisplay {
    fn set_next_shape(&mut self, kind: ShapeType);

    fn start_transition_animation(&mut self);
}

impl ScoreDisplay for () {
    fn set_values(&mut self, _score: u32, _level: u32, _lines: u32) {}

    fn start_transition_animation(&mut self) {}
}

impl NextShapeDisplay for () {
    fn set_next_shape(&mut self, _kind: ShapeType) {}

    fn start_transition_animation(&mut self) {}
}
