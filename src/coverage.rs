/// Set of canvas cells that have ever been stamped.
///
/// Stored as a dense bitmap over the canvas plus a running count of set cells,
/// so inserting is O(1) and the fraction is a single division.
pub struct CoverageTracker {
    visited: Vec<bool>,
    visited_count: usize,
    width: usize,
    height: usize,
}

impl CoverageTracker {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            visited: vec![false; width * height],
            visited_count: 0,
            width,
            height,
        }
    }

    /// Mark a cell as visited. No-op for cells already present or outside the canvas.
    pub fn record(&mut self, px: usize, py: usize) {
        if px >= self.width || py >= self.height {
            return;
        }
        let idx = py * self.width + px;
        if !self.visited[idx] {
            self.visited[idx] = true;
            self.visited_count += 1;
        }
    }

    /// Mark a horizontal run of cells `x0..=x1` on row `py`.
    /// Caller guarantees the run is already clipped to the canvas.
    pub fn record_span(&mut self, py: usize, x0: usize, x1: usize) {
        let row = py * self.width;
        for cell in &mut self.visited[row + x0..=row + x1] {
            if !*cell {
                *cell = true;
                self.visited_count += 1;
            }
        }
    }

    pub fn contains(&self, px: usize, py: usize) -> bool {
        px < self.width && py < self.height && self.visited[py * self.width + px]
    }

    pub fn visited_cells(&self) -> usize {
        self.visited_count
    }

    pub fn total_cells(&self) -> usize {
        self.width * self.height
    }

    /// Fraction of the canvas visited so far, in [0, 1].
    pub fn coverage_fraction(&self) -> f64 {
        let total = self.total_cells();
        if total == 0 {
            return 0.0;
        }
        self.visited_count as f64 / total as f64
    }

    /// Same as [`coverage_fraction`](Self::coverage_fraction), scaled to percent.
    pub fn coverage_percent(&self) -> f64 {
        self.coverage_fraction() * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_empty() {
        let cov = CoverageTracker::new(40, 30);
        assert_eq!(cov.visited_cells(), 0);
        assert_eq!(cov.coverage_fraction(), 0.0);
    }

    #[test]
    fn record_is_idempotent() {
        let mut cov = CoverageTracker::new(10, 10);
        cov.record(3, 4);
        cov.record(3, 4);
        assert_eq!(cov.visited_cells(), 1);
        assert!(cov.contains(3, 4));
        assert!((cov.coverage_fraction() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn out_of_canvas_is_ignored() {
        let mut cov = CoverageTracker::new(10, 10);
        cov.record(10, 0);
        cov.record(0, 10);
        assert_eq!(cov.visited_cells(), 0);
    }

    #[test]
    fn span_counts_only_new_cells() {
        let mut cov = CoverageTracker::new(10, 2);
        cov.record(5, 1);
        cov.record_span(1, 2, 7);
        assert_eq!(cov.visited_cells(), 6);
        cov.record_span(1, 0, 9);
        assert_eq!(cov.visited_cells(), 10);
        assert!((cov.coverage_percent() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn full_canvas_is_one() {
        let mut cov = CoverageTracker::new(4, 3);
        for y in 0..3 {
            cov.record_span(y, 0, 3);
        }
        assert_eq!(cov.coverage_fraction(), 1.0);
    }

    proptest! {
        #[test]
        fn fraction_never_decreases(cells in prop::collection::vec((0usize..20, 0usize..20), 1..200)) {
            let mut cov = CoverageTracker::new(16, 16);
            let mut prev = cov.coverage_fraction();
            for (x, y) in cells {
                cov.record(x, y);
                let now = cov.coverage_fraction();
                prop_assert!(now >= prev);
                prop_assert!((0.0..=1.0).contains(&now));
                prev = now;
            }
        }
    }
}
