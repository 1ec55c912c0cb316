/// Rolling history behind the frame-time plot: the last `capacity` samples,
/// oldest dropped first.
pub struct RingBuffer<T> {
    buf: Vec<T>,
    capacity: usize,
    head: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: vec![T::default(); capacity],
            capacity,
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        self.buf[self.head] = value;
        self.head = (self.head + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let start = if self.len < self.capacity { 0 } else { self.head };
        let cap = self.capacity;
        (0..self.len).map(move |i| &self.buf[(start + i) % cap])
    }
}

impl RingBuffer<f64> {
    /// `(avg, min, max)` over the kept samples, or None when empty.
    pub fn summary(&self) -> Option<(f64, f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let (sum, min, max) = self
            .iter()
            .fold((0.0, f64::MAX, f64::MIN), |(s, lo, hi), &t| {
                (s + t, lo.min(t), hi.max(t))
            });
        Some((sum / self.len() as f64, min, max))
    }
}
