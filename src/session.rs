//! Session state and the per-tick pipeline:
//! input events -> path feed -> intensity grid (+ coverage) -> renderer.
//!
//! Everything here is owned by the event-loop thread. Window events are queued
//! by `push_event` and only applied at the top of the next tick, so a tick never
//! observes a half-applied event.

use std::collections::VecDeque;
use std::time::Duration;

use glam::Vec2;
use instant::Instant;

use crate::config::Config;
use crate::coverage::CoverageTracker;
use crate::debug::timer::{SystemTimers, TickPhase};
use crate::heatmap::IntensityGrid;
use crate::path::{PathFeed, ReplayCursor, SourceMode};
use crate::ramp::ColorRamp;
use crate::render::frame::{DrawInput, Renderer};
use crate::replay::MalformedRecord;

/// Input from the window, in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved(Vec2),
    Click(Vec2),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Session start time; elapsed is read-only and monotonic.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    start: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Grid stamped at this position.
    Stamped(Vec2),
    /// Replay row was malformed; grid left untouched this tick.
    Skipped(MalformedRecord),
    /// Quit was requested; no work done.
    Stopped,
}

pub struct Session {
    radius: u32,
    increment: f32,
    width: u32,
    height: u32,

    grid: IntensityGrid,
    coverage: CoverageTracker,
    feed: PathFeed,
    renderer: Renderer,
    clock: SessionClock,

    pending: VecDeque<InputEvent>,
    state: LoopState,
    tick_count: u64,
    skipped_ticks: u64,
    last_position: Option<Vec2>,

    pub timers: SystemTimers,
}

impl Session {
    /// Build a session. `replay` is None when no replay file could be loaded;
    /// the replay control is then disabled.
    pub fn new(config: &Config, replay: Option<ReplayCursor>) -> Self {
        let (w, h) = (config.width as usize, config.height as usize);
        let start = Vec2::new(config.width as f32 * 0.5, config.height as f32 * 0.5);
        let mut feed = PathFeed::new(start, replay);
        if !feed.set_mode(config.initial_mode) {
            log::warn!("Replay unavailable, starting in pointer mode");
        }

        Self {
            radius: config.radius,
            increment: config.increment,
            width: config.width,
            height: config.height,
            grid: IntensityGrid::new(w, h),
            coverage: CoverageTracker::new(w, h),
            feed,
            renderer: Renderer::new(
                config.width,
                config.height,
                ColorRamp::generate(config.ramp_colors),
                config.ceiling,
            ),
            clock: SessionClock::start(),
            pending: VecDeque::new(),
            state: LoopState::Running,
            tick_count: 0,
            skipped_ticks: 0,
            last_position: None,
            timers: SystemTimers::new(),
        }
    }

    /// Queue an input event for the next tick.
    pub fn push_event(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    /// Run one tick: drain input, pull a position, stamp + smooth, draw.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state == LoopState::Stopped {
            return TickOutcome::Stopped;
        }

        self.timers.begin();
        let quit = self.drain_events();
        self.timers.end(TickPhase::Input);
        if quit {
            log::info!("Quit requested after {} ticks", self.tick_count);
            self.state = LoopState::Stopped;
            return TickOutcome::Stopped;
        }

        self.timers.begin();
        let next = self.feed.next();
        self.timers.end(TickPhase::Source);

        let outcome = match next {
            Ok(pos) => {
                self.timers.begin();
                self.grid
                    .update(pos, self.radius, self.increment, &mut self.coverage);
                self.timers.end(TickPhase::Update);
                self.last_position = Some(pos);
                TickOutcome::Stamped(pos)
            }
            Err(record) => {
                log::warn!("Skipping replay row: {record}");
                self.skipped_ticks += 1;
                TickOutcome::Skipped(record)
            }
        };

        self.timers.begin();
        self.renderer.draw(&DrawInput {
            grid: &self.grid,
            coverage: &self.coverage,
            elapsed: self.clock.elapsed(),
            position: self.last_position,
            mode: self.feed.mode(),
            replay_available: self.feed.has_replay(),
        });
        self.timers.end(TickPhase::Colorize);

        self.tick_count += 1;
        outcome
    }

    /// Apply queued events. Returns true if a quit was among them.
    fn drain_events(&mut self) -> bool {
        let mut quit = false;
        while let Some(event) = self.pending.pop_front() {
            match event {
                InputEvent::PointerMoved(p) => {
                    let p = self.clamp_to_canvas(p);
                    self.feed.set_pointer(p);
                }
                InputEvent::Click(p) => {
                    let p = self.clamp_to_canvas(p);
                    self.feed.set_pointer(p);
                    if let Some(mode) = self.renderer.controls().hit_test(p) {
                        self.switch_mode(mode);
                    }
                }
                InputEvent::Quit => quit = true,
            }
        }
        quit
    }

    fn switch_mode(&mut self, mode: SourceMode) {
        if self.feed.mode() == mode {
            return;
        }
        if self.feed.set_mode(mode) {
            log::info!("Source switched to {}", mode.label());
        } else {
            log::warn!("No replay file loaded; staying in {} mode", self.feed.mode().label());
        }
    }

    fn clamp_to_canvas(&self, p: Vec2) -> Vec2 {
        let max = Vec2::new(
            (self.width.max(1) - 1) as f32,
            (self.height.max(1) - 1) as f32,
        );
        p.clamp(Vec2::ZERO, max)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn mode(&self) -> SourceMode {
        self.feed.mode()
    }

    pub fn grid(&self) -> &IntensityGrid {
        &self.grid
    }

    pub fn coverage(&self) -> &CoverageTracker {
        &self.coverage
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn feed(&self) -> &PathFeed {
        &self.feed
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks
    }

    pub fn last_position(&self) -> Option<Vec2> {
        self.last_position
    }
}
