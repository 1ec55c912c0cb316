use instant::Instant;

/// Which phase of a tick is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TickPhase {
    Input = 0,
    Source = 1,
    Update = 2,
    Colorize = 3,
    Upload = 4,
    Present = 5,
}

pub const PHASE_COUNT: usize = 6;

impl TickPhase {
    pub const ALL: [TickPhase; PHASE_COUNT] = [
        Self::Input,
        Self::Source,
        Self::Update,
        Self::Colorize,
        Self::Upload,
        Self::Present,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Source => "Source",
            Self::Update => "Stamp+Smooth",
            Self::Colorize => "Colorize",
            Self::Upload => "GPU Upload",
            Self::Present => "Present",
        }
    }
}

/// Per-phase timing with exponential moving average smoothing.
#[derive(Debug, Clone)]
pub struct SystemTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; PHASE_COUNT],
    start: Instant,
}

const EMA_ALPHA: f64 = 0.1;

impl SystemTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; PHASE_COUNT],
            start: Instant::now(),
        }
    }

    /// Call before a phase runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a phase finishes.
    pub fn end(&mut self, phase: TickPhase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
    }

    fn record(&mut self, phase: TickPhase, elapsed_us: f64) {
        let idx = phase as usize;
        self.durations_us[idx] =
            self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    pub fn get(&self, phase: TickPhase) -> f64 {
        self.durations_us[phase as usize]
    }
}

impl Default for SystemTimers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_moves_toward_sample() {
        let mut t = SystemTimers::new();
        t.record(TickPhase::Update, 1000.0);
        assert!((t.get(TickPhase::Update) - 100.0).abs() < 1e-9);
        t.record(TickPhase::Update, 1000.0);
        assert!((t.get(TickPhase::Update) - 190.0).abs() < 1e-9);
        assert_eq!(t.get(TickPhase::Source), 0.0);
    }

    #[test]
    fn begin_without_end_records_nothing() {
        let mut t = SystemTimers::new();
        t.begin();
        assert!(t.durations_us.iter().all(|&d| d == 0.0));
        t.begin();
        t.end(TickPhase::Present);
        assert!(t.get(TickPhase::Present) >= 0.0);
        assert_eq!(t.get(TickPhase::Upload), 0.0);
    }

    #[test]
    fn phase_indices_match_table() {
        for (i, phase) in TickPhase::ALL.iter().enumerate() {
            assert_eq!(*phase as usize, i);
        }
    }
}
