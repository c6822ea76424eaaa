//! FieldView: maps a [`GameField`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use blockfall_core::types::{BlockColor, Rotation};
use blockfall_core::{GameField, RenderedBlock, ShapeType};

use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::panels::{NextPanel, ScorePanel};

/// Field type drawn by the terminal frontend.
pub type TermField = GameField<ScorePanel, NextPanel>;

const FIELD_BG: Rgb = Rgb::new(30, 30, 40);
const SCREEN_BG: Rgb = Rgb::new(0, 0, 0);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Placement of the field frame inside the viewport.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

pub struct FieldView {
    /// Tile width in terminal columns
    cell_w: u16,
    /// Tile height in terminal rows
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for FieldView {
    fn default() -> Self {
        // Two columns per tile keeps blocks roughly square.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl FieldView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Draw `field` as it looks `interpolation` of the way to its next tick.
    pub fn render_into(
        &self,
        field: &TermField,
        interpolation: f64,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::plain(Rgb::new(220, 220, 220), SCREEN_BG).cell(' '));

        let cols = field.config().width.max(0) as u16;
        let rows = field.config().height.max(0) as u16;
        let frame_w = cols * self.cell_w + 2;
        let frame_h = rows * self.cell_h + 2;
        let frame = Frame {
            x: viewport.width.saturating_sub(frame_w) / 2,
            y: match self.anchor_y {
                AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
                AnchorY::Top => 0,
            },
            w: frame_w,
            h: frame_h,
        };

        self.draw_border(fb, frame, CellStyle::plain(Rgb::new(200, 200, 200), SCREEN_BG));

        let dot = CellStyle::plain(Rgb::new(90, 90, 100), FIELD_BG).dim();
        for y in 0..rows {
            for x in 0..cols {
                self.fill_tile(fb, frame, x, y, '·', dot);
            }
        }

        for block in field.render_blocks(interpolation) {
            self.draw_block(fb, frame, cols, rows, &block);
        }

        self.draw_side_panel(fb, field, viewport, frame);

        if field.is_game_over() {
            self.draw_overlay_text(fb, frame, "GAME OVER");
        } else if field.is_paused() {
            self.draw_overlay_text(fb, frame, "PAUSED");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, field: &TermField, interpolation: f64, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(field, interpolation, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, frame: Frame, style: CellStyle) {
        let Frame { x, y, w, h } = frame;
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);
        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    /// Snap a block to the nearest tile and shade it by opacity and scale.
    fn draw_block(&self, fb: &mut FrameBuffer, frame: Frame, cols: u16, rows: u16, block: &RenderedBlock) {
        let x = block.position.x.round();
        let y = block.position.y.round();
        if x < 0.0 || y < 0.0 || x >= cols as f64 || y >= rows as f64 {
            return;
        }
        let Some(ch) = shade_char(block.opacity * block.scale) else {
            return;
        };

        let fg = color_rgb(block.color).lerp(FIELD_BG, 1.0 - block.opacity);
        let mut style = CellStyle::plain(fg, FIELD_BG).bold();
        if block.scale < 1.0 {
            style = style.dim();
        }
        self.fill_tile(fb, frame, x as u16, y as u16, ch, style);
    }

    fn fill_tile(&self, fb: &mut FrameBuffer, frame: Frame, tile_x: u16, tile_y: u16, ch: char, style: CellStyle) {
        let px = frame.x + 1 + tile_x * self.cell_w;
        let py = frame.y + 1 + tile_y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(&self, fb: &mut FrameBuffer, field: &TermField, viewport: Viewport, frame: Frame) {
        let panel_x = frame.x.saturating_add(frame.w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 10 {
            return;
        }

        let label = CellStyle::plain(Rgb::new(220, 220, 220), SCREEN_BG).bold();
        let value = CellStyle::plain(Rgb::new(200, 200, 200), SCREEN_BG);
        let flash = CellStyle::plain(Rgb::new(255, 230, 120), SCREEN_BG).bold();

        let scores = field.score_display();
        let value_style = if scores.is_flashing() { flash } else { value };
        let mut y = frame.y;
        for (name, number) in [
            ("SCORE", scores.score),
            ("LEVEL", scores.level),
            ("LINES", scores.lines),
        ] {
            fb.put_str(panel_x, y, name, label);
            fb.put_u32(panel_x, y.saturating_add(1), number, value_style);
            y = y.saturating_add(3);
        }

        let next = field.next_shape_display();
        fb.put_str(panel_x, y, "NEXT", if next.is_flashing() { flash } else { label });
        y = y.saturating_add(1);
        let Some(kind) = next.next else {
            fb.put_str(panel_x, y, "-", value);
            return;
        };
        for cell in kind.solid_cells(Rotation::Initial) {
            let px = panel_x + cell.x as u16 * 2;
            let py = y + cell.y as u16;
            fb.fill_rect(px, py, 2, 1, '█', value);
        }
        fb.put_str(panel_x, y.saturating_add(kind.frame_size() as u16), shape_letter(kind), value);
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, frame: Frame, text: &str) {
        let mid_y = frame.y.saturating_add(frame.h / 2);
        let text_w = text.chars().count() as u16;
        let x = frame.x.saturating_add(frame.w.saturating_sub(text_w) / 2);
        fb.put_str(x, mid_y, text, CellStyle::plain(Rgb::new(255, 255, 255), SCREEN_BG).bold());
    }
}

/// Glyph for a block at the given visibility, `None` when invisible.
fn shade_char(visibility: f64) -> Option<char> {
    match visibility {
        v if v >= 0.75 => Some('█'),
        v if v >= 0.5 => Some('▓'),
        v if v >= 0.25 => Some('▒'),
        v if v > 0.0 => Some('░'),
        _ => None,
    }
}

fn color_rgb(color: BlockColor) -> Rgb {
    match color {
        BlockColor::Cyan => Rgb::new(80, 220, 220),
        BlockColor::Yellow => Rgb::new(240, 220, 80),
        BlockColor::Magenta => Rgb::new(200, 120, 220),
        BlockColor::Green => Rgb::new(100, 220, 120),
        BlockColor::Red => Rgb::new(220, 80, 80),
        BlockColor::Blue => Rgb::new(80, 120, 220),
        BlockColor::Orange => Rgb::new(255, 165, 0),
    }
}

fn shape_letter(kind: ShapeType) -> &'static str {
    match kind {
        ShapeType::I => "I",
        ShapeType::O => "O",
        ShapeType::T => "T",
        ShapeType::S => "S",
        ShapeType::Z => "Z",
        ShapeType::J => "J",
        ShapeType::L => "L",
    }
}
