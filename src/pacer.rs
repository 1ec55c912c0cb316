use std::time::Duration;

use instant::Instant;

/// Fixed-rate tick scheduler. The event loop sleeps until `deadline()`, then
/// runs one tick and calls `mark_tick`.
pub struct FramePacer {
    interval: Duration,
    next_deadline: Instant,
}

impl FramePacer {
    pub fn new(target_fps: u32, now: Instant) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / target_fps.max(1) as f64),
            next_deadline: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn deadline(&self) -> Instant {
        self.next_deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_deadline
    }

    /// Schedule the next tick one interval after the previous deadline. If we
    /// are already more than an interval late, resync to `now` instead of
    /// bursting to catch up.
    pub fn mark_tick(&mut self, now: Instant) {
        let next = self.next_deadline + self.interval;
        self.next_deadline = if next <= now { now + self.interval } else { next };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_due_immediately() {
        let t0 = Instant::now();
        let pacer = FramePacer::new(30, t0);
        assert!(pacer.is_due(t0));
    }

    #[test]
    fn steady_cadence() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(50, t0);
        assert_eq!(pacer.interval(), Duration::from_millis(20));

        pacer.mark_tick(t0);
        assert_eq!(pacer.deadline(), t0 + Duration::from_millis(20));
        assert!(!pacer.is_due(t0 + Duration::from_millis(19)));
        assert!(pacer.is_due(t0 + Duration::from_millis(20)));

        // Slightly late tick keeps the original grid.
        pacer.mark_tick(t0 + Duration::from_millis(23));
        assert_eq!(pacer.deadline(), t0 + Duration::from_millis(40));
    }

    #[test]
    fn resyncs_after_stall() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(50, t0);
        pacer.mark_tick(t0);
        let late = t0 + Duration::from_millis(500);
        pacer.mark_tick(late);
        assert_eq!(pacer.deadline(), late + Duration::from_millis(20));
    }

    #[test]
    fn zero_fps_is_clamped() {
        let pacer = FramePacer::new(0, Instant::now());
        assert_eq!(pacer.interval(), Duration::from_secs(1));
    }
}
