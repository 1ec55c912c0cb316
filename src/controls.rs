use glam::Vec2;

use crate::path::SourceMode;

/// Axis-aligned pixel rectangle. Edges are inclusive for hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x as f32
            && p.x <= (self.x + self.w) as f32
            && p.y >= self.y as f32
            && p.y <= (self.y + self.h) as f32
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.x as f32 + self.w as f32 * 0.5,
            self.y as f32 + self.h as f32 * 0.5,
        )
    }
}

/// Distance of the control strip from the bottom-left corner.
const PANEL_MARGIN: i32 = 10;
const PANEL_W: i32 = 200;
const PANEL_H: i32 = 60;
const BUTTON_W: i32 = 80;
const BUTTON_H: i32 = 40;
const BUTTON_INSET: i32 = 10;
const BUTTON_GAP: i32 = 20;

/// Bottom-left mode toggle: a background strip holding the pointer-follow and
/// replay buttons.
#[derive(Debug, Clone, Copy)]
pub struct ControlPanel {
    pub panel: Rect,
    pub pointer_button: Rect,
    pub replay_button: Rect,
}

impl ControlPanel {
    pub fn new(canvas_h: u32) -> Self {
        let top = canvas_h as i32 - PANEL_H - 2 * PANEL_MARGIN;
        let panel = Rect::new(PANEL_MARGIN, top, PANEL_W, PANEL_H);
        let bx = panel.x + BUTTON_INSET;
        let by = panel.y + BUTTON_INSET;
        Self {
            panel,
            pointer_button: Rect::new(bx, by, BUTTON_W, BUTTON_H),
            replay_button: Rect::new(bx + BUTTON_W + BUTTON_GAP, by, BUTTON_W, BUTTON_H),
        }
    }

    /// Mode selected by a click at `p`, or None if it missed both buttons.
    pub fn hit_test(&self, p: Vec2) -> Option<SourceMode> {
        if self.pointer_button.contains(p) {
            Some(SourceMode::Pointer)
        } else if self.replay_button.contains(p) {
            Some(SourceMode::Replay)
        } else {
            None
        }
    }

    pub fn button(&self, mode: SourceMode) -> Rect {
        match mode {
            SourceMode::Pointer => self.pointer_button,
            SourceMode::Replay => self.replay_button,
        }
    }
}
