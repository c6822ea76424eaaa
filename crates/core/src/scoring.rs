//! Scoring module - line clear, T-spin and combo rules
//!
//! Rules:
//! - Plain clears of 1/2/3/4 rows are worth 1/3/5/8 points.
//! - T-spin clears of 1/2/3 rows are worth 3/7/6 points. The triple is
//!   deliberately lower than the double.
//! - A T-spin (with or without lines) or a 4-row clear extends the combo
//!   chain; anything else breaks it.
//! - Once the chain reaches 2, every clear is worth a flat 12 points.
//! - Displayed score is points times [`POINTS_MULTIPLIER`].
//! - The level is derived from cleared lines and is display only.

/// Factor between rule points and displayed score
pub const POINTS_MULTIPLIER: u32 = 100;

/// Points for a clear while the combo chain is at least [`COMBO_THRESHOLD`]
pub const COMBO_POINTS: u32 = 12;

pub const COMBO_THRESHOLD: u32 = 2;

/// Cleared lines per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Outcome of locking one piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Rule points before the multiplier
    pub points: u32,
    /// Points added to the displayed score
    pub score_added: u32,
    /// Combo counter after this lock
    pub combo: u32,
    pub tspin: bool,
}

/// Rule points for a plain line clear
pub fn line_points(lines: u32) -> u32 {
    match lines {
        0 => 0,
        1..=3 => 2 * lines - 1,
        _ => 2 * lines,
    }
}

/// Rule points for a T-spin line clear
pub fn tspin_points(lines: u32) -> u32 {
    match lines {
        0 => 0,
        1 | 2 => 4 * lines - 1,
        _ => 6,
    }
}

/// Combo counter after a lock
pub fn next_combo(combo: u32, lines: u32, tspin: bool) -> u32 {
    if tspin || lines == 4 {
        combo.saturating_add(1)
    } else {
        0
    }
}

/// Score a lock given the combo counter before it
pub fn calculate_score(lines: u32, tspin: bool, combo: u32) -> ScoreResult {
    let combo = next_combo(combo, lines, tspin);
    let points = if lines == 0 {
        0
    } else if combo >= COMBO_THRESHOLD {
        COMBO_POINTS
    } else if tspin {
        tspin_points(lines)
    } else {
        line_points(lines)
    };

    ScoreResult {
        points,
        score_added: points * POINTS_MULTIPLIER,
        combo,
        tspin,
    }
}

/// Level for a total of cleared lines, starting at 1
pub fn calculate_level(total_lines: u32) -> u32 {
    1 + total_lines / LINES_PER_LEVEL
}

/// Whether enough diagonals around a T center are blocked for a T-spin
pub fn is_tspin_corner_count(blocked_diagonals: usize) -> bool {
    blocked_diagonals >= 3
}
