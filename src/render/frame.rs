//! CPU-side frame composition: heatmap colorization, control strip, marker.
//! Text is not rasterized here; it is emitted as [`OverlayText`] items for the
//! egui layer to paint on top.

use std::time::Duration;

use glam::Vec2;

use crate::config::Ceiling;
use crate::controls::{ControlPanel, Rect};
use crate::coverage::CoverageTracker;
use crate::heatmap::IntensityGrid;
use crate::path::SourceMode;
use crate::ramp::{ColorRamp, Rgba};

const PANEL_COLOR: Rgba = Rgba::rgb(50, 50, 50);
const BUTTON_ACTIVE: Rgba = Rgba::rgb(100, 255, 100);
const BUTTON_IDLE: Rgba = Rgba::rgb(100, 100, 100);
const BUTTON_DISABLED: Rgba = Rgba::rgb(70, 70, 70);
const MARKER_COLOR: Rgba = Rgba::WHITE;
/// Current-position marker radius in pixels.
const MARKER_RADIUS: i32 = 5;

const STATS_TEXT_SIZE: f32 = 28.0;
const LABEL_TEXT_SIZE: f32 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    Center,
}

/// A text item positioned in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayText {
    pub text: String,
    pub pos: Vec2,
    pub anchor: Anchor,
    pub size: f32,
    pub color: Rgba,
}

/// RGBA8 image, row-major.
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Rgba>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::BLACK; width * height],
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.pixels.as_slice())
    }

    /// Fill `rect` (edges inclusive), clipped to the frame.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = (rect.x + rect.w).min(self.width as i32 - 1);
        let y1 = (rect.y + rect.h).min(self.height as i32 - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }
        for y in y0 as usize..=y1 as usize {
            let row = y * self.width;
            self.pixels[row + x0 as usize..=row + x1 as usize].fill(color);
        }
    }

    /// Filled disc, clipped to the frame.
    pub fn fill_circle(&mut self, center: Vec2, radius: i32, color: Rgba) {
        let reach = radius as f32 + 1.0;
        if !center.is_finite()
            || center.x + reach < 0.0
            || center.y + reach < 0.0
            || center.x - reach > self.width as f32
            || center.y - reach > self.height as f32
        {
            return;
        }
        let cx = center.x.round() as i32;
        let cy = center.y.round() as i32;
        let r2 = radius * radius;
        for dy in -radius..=radius {
            let y = cy + dy;
            if y < 0 || y >= self.height as i32 {
                continue;
            }
            for dx in -radius..=radius {
                let x = cx + dx;
                if x < 0 || x >= self.width as i32 || dx * dx + dy * dy > r2 {
                    continue;
                }
                self.pixels[y as usize * self.width + x as usize] = color;
            }
        }
    }
}

/// Everything `Renderer::draw` reads for one frame.
pub struct DrawInput<'a> {
    pub grid: &'a IntensityGrid,
    pub coverage: &'a CoverageTracker,
    pub elapsed: Duration,
    pub position: Option<Vec2>,
    pub mode: SourceMode,
    pub replay_available: bool,
}

pub struct Renderer {
    ramp: ColorRamp,
    ceiling: Ceiling,
    /// Largest grid peak seen so far (used by `Ceiling::RunningMax`).
    running_max: f32,
    controls: ControlPanel,
    frame: Frame,
    texts: Vec<OverlayText>,
}

impl Renderer {
    pub fn new(width: u32, height: u32, ramp: ColorRamp, ceiling: Ceiling) -> Self {
        Self {
            ramp,
            ceiling,
            running_max: 0.0,
            controls: ControlPanel::new(height),
            frame: Frame::new(width as usize, height as usize),
            texts: Vec::with_capacity(4),
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn texts(&self) -> &[OverlayText] {
        &self.texts
    }

    pub fn controls(&self) -> &ControlPanel {
        &self.controls
    }

    /// Ceiling used for the most recent draw.
    pub fn active_ceiling(&self) -> f32 {
        match self.ceiling {
            Ceiling::Fixed(c) => c,
            Ceiling::RunningMax => self.running_max,
        }
    }

    /// Compose one frame. Reads the grid, never mutates it.
    pub fn draw(&mut self, input: &DrawInput<'_>) {
        if let Some((_, _, peak)) = input.grid.peak() {
            self.running_max = self.running_max.max(peak);
        }
        let ceiling = self.active_ceiling();

        for (px, v) in self.frame.pixels.iter_mut().zip(input.grid.normalize(ceiling)) {
            *px = self.ramp.map(v);
        }

        self.draw_controls(input.mode, input.replay_available);

        if let Some(pos) = input.position {
            if in_canvas(pos, self.frame.width, self.frame.height) {
                self.frame.fill_circle(pos, MARKER_RADIUS, MARKER_COLOR);
            }
        }

        self.texts.clear();
        self.texts.push(OverlayText {
            text: format!("Time: {}s", input.elapsed.as_secs()),
            pos: Vec2::new(10.0, 10.0),
            anchor: Anchor::TopLeft,
            size: STATS_TEXT_SIZE,
            color: Rgba::WHITE,
        });
        self.texts.push(OverlayText {
            text: format!("Coverage: {:.1}%", input.coverage.coverage_percent()),
            pos: Vec2::new(10.0, 50.0),
            anchor: Anchor::TopLeft,
            size: STATS_TEXT_SIZE,
            color: Rgba::WHITE,
        });
        for mode in [SourceMode::Pointer, SourceMode::Replay] {
            self.texts.push(OverlayText {
                text: mode.label().to_string(),
                pos: self.controls.button(mode).center(),
                anchor: Anchor::Center,
                size: LABEL_TEXT_SIZE,
                color: Rgba::BLACK,
            });
        }
    }

    fn draw_controls(&mut self, mode: SourceMode, replay_available: bool) {
        let controls = self.controls;
        self.frame.fill_rect(controls.panel, PANEL_COLOR);
        for m in [SourceMode::Pointer, SourceMode::Replay] {
            let color = if m == mode {
                BUTTON_ACTIVE
            } else if m == SourceMode::Replay && !replay_available {
                BUTTON_DISABLED
            } else {
                BUTTON_IDLE
            };
            self.frame.fill_rect(controls.button(m), color);
        }
    }
}

fn in_canvas(p: Vec2, width: usize, height: usize) -> bool {
    p.x >= 0.0 && p.y >= 0.0 && p.x < width as f32 && p.y < height as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(w: usize, h: usize) -> (IntensityGrid, CoverageTracker) {
        (IntensityGrid::new(w, h), CoverageTracker::new(w, h))
    }

    fn input<'a>(
        grid: &'a IntensityGrid,
        coverage: &'a CoverageTracker,
        position: Option<Vec2>,
        mode: SourceMode,
    ) -> DrawInput<'a> {
        DrawInput {
            grid,
            coverage,
            elapsed: Duration::from_millis(12_700),
            position,
            mode,
            replay_available: true,
        }
    }

    #[test]
    fn empty_grid_is_coldest_color() {
        let (grid, cov) = setup(300, 300);
        let ramp = ColorRamp::generate(64);
        let cold = ramp.map(0.0);
        let mut r = Renderer::new(300, 300, ramp, Ceiling::Fixed(1.0));
        r.draw(&input(&grid, &cov, None, SourceMode::Pointer));
        assert_eq!(r.frame().pixel(150, 50), Some(cold));
    }

    #[test]
    fn hot_cells_use_hot_end() {
        let (mut grid, mut cov) = setup(300, 300);
        grid.stamp(Vec2::new(150.0, 100.0), 4, 2.0, &mut cov);
        let ramp = ColorRamp::generate(64);
        let hot = ramp.map(1.0);
        let mut r = Renderer::new(300, 300, ramp, Ceiling::Fixed(1.0));
        r.draw(&input(&grid, &cov, None, SourceMode::Pointer));
        assert_eq!(r.frame().pixel(152, 100), Some(hot));
    }

    #[test]
    fn marker_drawn_only_in_bounds() {
        let (grid, cov) = setup(300, 300);
        let mut r = Renderer::new(300, 300, ColorRamp::generate(16), Ceiling::Fixed(1.0));
        r.draw(&input(&grid, &cov, Some(Vec2::new(150.0, 40.0)), SourceMode::Pointer));
        assert_eq!(r.frame().pixel(150, 40), Some(Rgba::WHITE));
        assert_eq!(r.frame().pixel(153, 43), Some(Rgba::WHITE));

        r.draw(&input(&grid, &cov, Some(Vec2::new(-20.0, 900.0)), SourceMode::Pointer));
        assert!(r.frame().pixels.iter().all(|&p| p != Rgba::WHITE));

        r.draw(&input(&grid, &cov, Some(Vec2::new(1e30, -1e30)), SourceMode::Pointer));
        assert!(r.frame().pixels.iter().all(|&p| p != Rgba::WHITE));
    }

    #[test]
    fn toggles_reflect_mode() {
        let (grid, cov) = setup(300, 300);
        let mut r = Renderer::new(300, 300, ColorRamp::generate(16), Ceiling::Fixed(1.0));
        let c = *r.controls();
        let p = c.pointer_button.center();
        let q = c.replay_button.center();

        r.draw(&input(&grid, &cov, None, SourceMode::Pointer));
        assert_eq!(r.frame().pixel(p.x as usize, p.y as usize), Some(BUTTON_ACTIVE));
        assert_eq!(r.frame().pixel(q.x as usize, q.y as usize), Some(BUTTON_IDLE));

        r.draw(&input(&grid, &cov, None, SourceMode::Replay));
        assert_eq!(r.frame().pixel(p.x as usize, p.y as usize), Some(BUTTON_IDLE));
        assert_eq!(r.frame().pixel(q.x as usize, q.y as usize), Some(BUTTON_ACTIVE));
    }

    #[test]
    fn disabled_replay_button_is_dimmed() {
        let (grid, cov) = setup(300, 300);
        let mut r = Renderer::new(300, 300, ColorRamp::generate(16), Ceiling::Fixed(1.0));
        let q = r.controls().replay_button.center();
        let mut inp = input(&grid, &cov, None, SourceMode::Pointer);
        inp.replay_available = false;
        r.draw(&inp);
        assert_eq!(r.frame().pixel(q.x as usize, q.y as usize), Some(BUTTON_DISABLED));
    }

    #[test]
    fn stats_text() {
        let (mut grid, mut cov) = setup(100, 100);
        grid.stamp(Vec2::new(50.0, 50.0), 0, 1.0, &mut cov);
        let mut r = Renderer::new(100, 100, ColorRamp::generate(16), Ceiling::Fixed(1.0));
        r.draw(&input(&grid, &cov, None, SourceMode::Pointer));
        let texts: Vec<&str> = r.texts().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Time: 12s", "Coverage: 0.0%", "Mouse", "Replay"]);
    }

    #[test]
    fn running_max_ceiling_never_drops() {
        let (mut grid, mut cov) = setup(50, 50);
        let mut r = Renderer::new(50, 50, ColorRamp::generate(16), Ceiling::RunningMax);
        r.draw(&input(&grid, &cov, None, SourceMode::Pointer));
        assert_eq!(r.active_ceiling(), 0.0);

        grid.stamp(Vec2::new(25.0, 25.0), 2, 3.0, &mut cov);
        r.draw(&input(&grid, &cov, None, SourceMode::Pointer));
        assert_eq!(r.active_ceiling(), 3.0);

        grid.smooth();
        r.draw(&input(&grid, &cov, None, SourceMode::Pointer));
        assert_eq!(r.active_ceiling(), 3.0);
    }

    #[test]
    fn draw_does_not_touch_grid() {
        let (mut grid, mut cov) = setup(40, 40);
        grid.update(Vec2::new(20.0, 20.0), 3, 0.4, &mut cov);
        let before = grid.cells().to_vec();
        let mut r = Renderer::new(40, 40, ColorRamp::generate(16), Ceiling::Fixed(1.0));
        r.draw(&input(&grid, &cov, Some(Vec2::new(20.0, 20.0)), SourceMode::Replay));
        assert_eq!(grid.cells(), before.as_slice());
    }

    #[test]
    fn fill_rect_clips() {
        let mut f = Frame::new(10, 10);
        f.fill_rect(Rect::new(-5, -5, 7, 7), Rgba::WHITE);
        assert_eq!(f.pixel(2, 2), Some(Rgba::WHITE));
        assert_eq!(f.pixel(3, 3), Some(Rgba::BLACK));
        f.fill_rect(Rect::new(20, 20, 5, 5), Rgba::WHITE);
        assert_eq!(f.as_bytes().len(), 400);
    }
}
