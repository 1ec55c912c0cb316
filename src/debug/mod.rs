pub mod ring;
pub mod timer;

use self::ring::RingBuffer;
use self::timer::{TickPhase, PHASE_COUNT};

use crate::path::SourceMode;
use crate::session::Session;

/// Number of frame times kept for the history plot.
const FRAME_HISTORY_LEN: usize = 300;

/// Seconds between FPS log lines.
const LOG_INTERVAL_SECS: f64 = 5.0;

/// Frame statistics and the F12 diagnostics panel state.
pub struct Diagnostics {
    pub visible: bool,
    f12_was_down: bool,

    /// Rolling window of frame times (seconds).
    pub frame_times: RingBuffer<f64>,

    pub fps: f64,
    pub frame_time_avg: f64,
    pub frame_time_min: f64,
    pub frame_time_max: f64,

    frame_count: u64,
    log_timer: f64,
    log_frame_count: u32,
    log_frame_sum: f64,
    log_frame_min: f64,
    log_frame_max: f64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            visible: false,
            f12_was_down: false,
            frame_times: RingBuffer::new(FRAME_HISTORY_LEN),
            fps: 0.0,
            frame_time_avg: 0.0,
            frame_time_min: 0.0,
            frame_time_max: 0.0,
            frame_count: 0,
            log_timer: 0.0,
            log_frame_count: 0,
            log_frame_sum: 0.0,
            log_frame_min: f64::MAX,
            log_frame_max: 0.0,
        }
    }

    /// Record a frame time, update rolling stats, and periodically log.
    pub fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frame_times.push(dt);

        if let Some((avg, min, max)) = self.frame_times.summary() {
            self.frame_time_avg = avg;
            self.frame_time_min = min;
            self.frame_time_max = max;
            self.fps = if avg > 0.0 { 1.0 / avg } else { 0.0 };
        }

        self.log_frame_count += 1;
        self.log_frame_sum += dt;
        self.log_frame_min = self.log_frame_min.min(dt);
        self.log_frame_max = self.log_frame_max.max(dt);
        self.log_timer += dt;

        if self.log_timer >= LOG_INTERVAL_SECS {
            let avg_ms = (self.log_frame_sum / self.log_frame_count as f64) * 1000.0;
            let fps = self.log_frame_count as f64 / self.log_timer;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.log_frame_min * 1000.0,
                self.log_frame_max * 1000.0,
                self.frame_count,
            );
            self.log_timer = 0.0;
            self.log_frame_count = 0;
            self.log_frame_sum = 0.0;
            self.log_frame_min = f64::MAX;
            self.log_frame_max = 0.0;
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Handle F12 toggle. Returns true if visibility changed.
    pub fn poll_toggle(&mut self, f12_down: bool) -> bool {
        // Edge-detect: trigger on press, not hold.
        if f12_down && !self.f12_was_down {
            self.f12_was_down = true;
            self.visible = !self.visible;
            return true;
        }
        if !f12_down {
            self.f12_was_down = false;
        }
        false
    }

    /// Read-only copy of everything the panel shows. None while hidden.
    pub fn snapshot(&self, session: &Session, target_interval: f64) -> Option<DiagnosticsSnapshot> {
        if !self.visible {
            return None;
        }
        Some(DiagnosticsSnapshot {
            fps: self.fps,
            frame_time_avg: self.frame_time_avg,
            frame_time_min: self.frame_time_min,
            frame_time_max: self.frame_time_max,
            frame_times: self.frame_times.iter().copied().collect(),
            target_interval,
            phase_durations: TickPhase::ALL.map(|p| session.timers.get(p)),
            tick_count: session.tick_count(),
            skipped_ticks: session.skipped_ticks(),
            mode: session.mode(),
            replay: session
                .feed()
                .replay()
                .map(|c| (c.index(), c.len(), c.loops())),
            peak: session.grid().peak().map_or(0.0, |(_, _, v)| v),
            total: session.grid().total(),
            ceiling: session.renderer().active_ceiling(),
            coverage_percent: session.coverage().coverage_percent(),
        })
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

pub struct DiagnosticsSnapshot {
    pub fps: f64,
    pub frame_time_avg: f64,
    pub frame_time_min: f64,
    pub frame_time_max: f64,
    pub frame_times: Vec<f64>,
    pub target_interval: f64,
    pub phase_durations: [f64; PHASE_COUNT],
    pub tick_count: u64,
    pub skipped_ticks: u64,
    pub mode: SourceMode,
    /// (index, length, completed loops)
    pub replay: Option<(usize, usize, u64)>,
    pub peak: f32,
    /// Sum of all cell intensities.
    pub total: f64,
    pub ceiling: f32,
    pub coverage_percent: f64,
}

/// Draw the diagnostics window.
pub fn draw_panel(ctx: &egui::Context, s: &DiagnosticsSnapshot) {
    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 220))
        .corner_radius(6.0)
        .inner_margin(10.0);

    egui::Window::new("Diagnostics")
        .default_pos([10.0, 10.0])
        .default_width(320.0)
        .resizable(true)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));

            ui.heading("Performance");
            ui.label(format!(
                "FPS: {:.1} (target {:.0})",
                s.fps,
                1.0 / s.target_interval.max(1e-6)
            ));
            ui.label(format!(
                "Frame: {:.2}ms avg | {:.2} min | {:.2} max",
                s.frame_time_avg * 1000.0,
                s.frame_time_min * 1000.0,
                s.frame_time_max * 1000.0,
            ));
            ui.add_space(4.0);

            ui.heading("Frame Time History");
            if !s.frame_times.is_empty() {
                let max_time = s
                    .frame_times
                    .iter()
                    .copied()
                    .fold(0.0f64, f64::max)
                    .max(s.target_interval * 1.5);

                let (response, painter) =
                    ui.allocate_painter(egui::vec2(300.0, 60.0), egui::Sense::hover());
                let rect = response.rect;

                let bar_width = rect.width() / s.frame_times.len() as f32;
                let target_y =
                    rect.bottom() - (s.target_interval / max_time) as f32 * rect.height();
                // Frames this far over the interval count as late.
                let late = s.target_interval * 1.1;

                for (i, &t) in s.frame_times.iter().enumerate() {
                    let h = (t / max_time) as f32 * rect.height();
                    let x = rect.left() + i as f32 * bar_width;
                    let color = if t > late {
                        egui::Color32::from_rgb(255, 100, 80)
                    } else {
                        egui::Color32::from_rgb(80, 200, 120)
                    };
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(x, rect.bottom() - h),
                            egui::pos2(x + bar_width - 1.0, rect.bottom()),
                        ),
                        0.0,
                        color,
                    );
                }

                painter.line_segment(
                    [
                        egui::pos2(rect.left(), target_y),
                        egui::pos2(rect.right(), target_y),
                    ],
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(255, 255, 100)),
                );
            }
            ui.add_space(4.0);

            ui.heading("Tick Phases");
            let total: f64 = s.phase_durations.iter().sum::<f64>().max(1.0);
            let max_us = s
                .phase_durations
                .iter()
                .copied()
                .fold(0.0f64, f64::max)
                .max(1.0);

            for phase in TickPhase::ALL {
                let us = s.phase_durations[phase as usize];
                let pct = us / total * 100.0;
                let bar_frac = (us / max_us) as f32;

                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(format!("{:<12}", phase.label())).monospace());
                    ui.label(
                        egui::RichText::new(format!("{:>6.0}us ({:>2.0}%)", us, pct)).monospace(),
                    );

                    let (response, painter) =
                        ui.allocate_painter(egui::vec2(80.0, 12.0), egui::Sense::hover());
                    let r = response.rect;
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            r.left_top(),
                            egui::pos2(r.left() + r.width() * bar_frac, r.bottom()),
                        ),
                        2.0,
                        egui::Color32::from_rgb(100, 180, 255),
                    );
                });
            }
            ui.label(
                egui::RichText::new(format!("Total: {:.0}us ({:.2}ms)", total, total / 1000.0))
                    .monospace(),
            );
            ui.add_space(4.0);

            ui.heading("Session");
            ui.label(format!(
                "Ticks: {} | Skipped: {} | Source: {}",
                s.tick_count,
                s.skipped_ticks,
                s.mode.label()
            ));
            match s.replay {
                Some((index, len, loops)) => {
                    ui.label(format!("Replay: row {index}/{len} | loops: {loops}"));
                }
                None => {
                    ui.label("Replay: not loaded");
                }
            }
            ui.label(format!(
                "Peak: {:.3} | Ceiling: {:.3} | Mass: {:.1}",
                s.peak, s.ceiling, s.total
            ));
            ui.label(format!("Coverage: {:.2}%", s.coverage_percent));
            ui.label("F12: Toggle | ESC: Quit");
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_stats() {
        let mut d = Diagnostics::new();
        d.record_frame(0.02);
        d.record_frame(0.04);
        assert!((d.frame_time_avg - 0.03).abs() < 1e-12);
        assert_eq!(d.frame_time_min, 0.02);
        assert_eq!(d.frame_time_max, 0.04);
        assert!((d.fps - 1.0 / 0.03).abs() < 1e-9);
        assert_eq!(d.frame_count(), 2);
    }

    #[test]
    fn toggle_is_edge_triggered() {
        let mut d = Diagnostics::new();
        assert!(d.poll_toggle(true));
        assert!(d.visible);
        // Held key does not flip again.
        assert!(!d.poll_toggle(true));
        assert!(d.visible);
        assert!(!d.poll_toggle(false));
        assert!(d.poll_toggle(true));
        assert!(!d.visible);
    }

    #[test]
    fn hidden_panel_has_no_snapshot() {
        use crate::config::Config;
        let session = Session::new(&Config::default(), None);
        let mut d = Diagnostics::new();
        assert!(d.snapshot(&session, 1.0 / 30.0).is_none());
        d.poll_toggle(true);
        let snap = d.snapshot(&session, 1.0 / 30.0).unwrap();
        assert_eq!(snap.tick_count, 0);
        assert!(snap.replay.is_none());
        assert_eq!(snap.mode, SourceMode::Pointer);
    }
}
