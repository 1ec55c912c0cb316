//! Visit-intensity accumulation grid.
//! One cell per canvas pixel; stamped with a disk each tick, then blurred.

use glam::Vec2;

use crate::coverage::CoverageTracker;

/// Gaussian spread (in cells) of the per-tick smoothing pass.
const SMOOTHING_SIGMA: f32 = 1.0;
/// Kernel half-width in cells (5 taps total).
const SMOOTHING_RADIUS: usize = 2;

/// Discrete disk footprint, stored as one horizontal span per row offset.
/// `spans[i] = (dy, half_width)`: cells `dx in -half_width..=half_width` on row `dy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskMask {
    pub radius: u32,
    pub spans: Vec<(i64, i64)>,
}

impl DiskMask {
    pub fn new(radius: u32) -> Self {
        let r = i64::from(radius);
        // Squares of a u32 radius overflow i64 near u32::MAX.
        let r2 = i128::from(r) * i128::from(r);
        let sq = |v: i64| i128::from(v) * i128::from(v);
        let spans = (-r..=r)
            .map(|dy| {
                // Largest dx with dx^2 + dy^2 <= r^2.
                let mut half = ((r2 - sq(dy)) as f64).sqrt() as i64;
                while half > 0 && sq(half) + sq(dy) > r2 {
                    half -= 1;
                }
                while sq(half + 1) + sq(dy) <= r2 {
                    half += 1;
                }
                (dy, half)
            })
            .collect();
        Self { radius, spans }
    }

    /// Number of cells the mask covers (unclipped).
    pub fn area(&self) -> usize {
        self.spans.iter().map(|&(_, h)| (2 * h + 1) as usize).sum()
    }
}

/// Separable 1D Gaussian weights, normalized to sum to 1.
fn gaussian_kernel(sigma: f32, radius: usize) -> Vec<f32> {
    let r = radius as i32;
    let two_sigma2 = 2.0 * sigma * sigma;
    let raw: Vec<f32> = (-r..=r)
        .map(|i| (-((i * i) as f32) / two_sigma2).exp())
        .collect();
    let sum: f32 = raw.iter().sum();
    raw.into_iter().map(|w| w / sum).collect()
}

/// Map a raw intensity into [0, 1] against `ceiling`. Non-positive ceilings map to 0.
#[inline]
pub fn normalize_value(value: f32, ceiling: f32) -> f32 {
    if ceiling <= 0.0 || !ceiling.is_finite() {
        return 0.0;
    }
    (value / ceiling).clamp(0.0, 1.0)
}

pub struct IntensityGrid {
    /// Intensity values, row-major, `width * height`.
    cells: Vec<f32>,
    /// Blur scratch buffer, reused every tick.
    scratch: Vec<f32>,
    width: usize,
    height: usize,
    mask: DiskMask,
    kernel: Vec<f32>,
}

impl IntensityGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![0.0; width * height],
            scratch: vec![0.0; width * height],
            width,
            height,
            mask: DiskMask::new(0),
            kernel: gaussian_kernel(SMOOTHING_SIGMA, SMOOTHING_RADIUS),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    pub fn get(&self, px: usize, py: usize) -> Option<f32> {
        if px < self.width && py < self.height {
            Some(self.cells[py * self.width + px])
        } else {
            None
        }
    }

    /// Stamp a disk at `pos`, then run one smoothing pass.
    pub fn update(
        &mut self,
        pos: Vec2,
        radius: u32,
        increment: f32,
        coverage: &mut CoverageTracker,
    ) {
        self.stamp(pos, radius, increment, coverage);
        self.smooth();
    }

    /// Add `increment` to every cell within `radius` of `pos` (rounded to the
    /// nearest cell). Cells outside the canvas are clipped.
    pub fn stamp(
        &mut self,
        pos: Vec2,
        radius: u32,
        increment: f32,
        coverage: &mut CoverageTracker,
    ) {
        if !pos.is_finite() {
            return;
        }
        // Reject disks that cannot touch the canvas while still in f32, so the
        // integer center below stays small. One cell of slack covers rounding.
        let reach = radius as f32 + 1.0;
        if pos.x + reach < 0.0
            || pos.y + reach < 0.0
            || pos.x - reach > self.width as f32
            || pos.y - reach > self.height as f32
        {
            return;
        }
        if self.mask.radius != radius {
            self.mask = DiskMask::new(radius);
            log::debug!("Stamp mask rebuilt: radius {radius}, {} cells", self.mask.area());
        }

        let cx = pos.x.round() as i64;
        let cy = pos.y.round() as i64;
        let w = self.width as i64;
        let h = self.height as i64;

        for &(dy, half) in &self.mask.spans {
            let py = cy + dy;
            if py < 0 || py >= h {
                continue;
            }
            let x0 = (cx - half).max(0);
            let x1 = (cx + half).min(w - 1);
            if x0 > x1 {
                continue;
            }
            let (py, x0, x1) = (py as usize, x0 as usize, x1 as usize);
            let row = py * self.width;
            for v in &mut self.cells[row + x0..=row + x1] {
                *v += increment;
            }
            coverage.record_span(py, x0, x1);
        }
    }

    /// One separable Gaussian pass over the whole grid.
    /// Samples beyond the edge count as zero, so mass can only leave through
    /// the border and values stay non-negative.
    pub fn smooth(&mut self) {
        let (w, h) = (self.width, self.height);
        if w == 0 || h == 0 {
            return;
        }
        let r = SMOOTHING_RADIUS as isize;

        // Horizontal: cells -> scratch
        for y in 0..h {
            let row = &self.cells[y * w..(y + 1) * w];
            let out = &mut self.scratch[y * w..(y + 1) * w];
            for (x, o) in out.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (k, &wk) in self.kernel.iter().enumerate() {
                    let sx = x as isize + k as isize - r;
                    if sx >= 0 && (sx as usize) < w {
                        acc += wk * row[sx as usize];
                    }
                }
                *o = acc;
            }
        }

        // Vertical: scratch -> cells
        for y in 0..h {
            let out = &mut self.cells[y * w..(y + 1) * w];
            out.fill(0.0);
            for (k, &wk) in self.kernel.iter().enumerate() {
                let sy = y as isize + k as isize - r;
                if sy < 0 || sy as usize >= h {
                    continue;
                }
                let src = &self.scratch[sy as usize * w..(sy as usize + 1) * w];
                for (o, &s) in out.iter_mut().zip(src) {
                    *o += wk * s;
                }
            }
        }
    }

    /// Cells in row-major order, mapped into [0, 1] against `ceiling`.
    pub fn normalize(&self, ceiling: f32) -> impl Iterator<Item = f32> + '_ {
        self.cells.iter().map(move |&v| normalize_value(v, ceiling))
    }

    /// Hottest cell as `(px, py, value)`, or None on an empty canvas.
    pub fn peak(&self) -> Option<(usize, usize, f32)> {
        let (idx, &value) = self
            .cells
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        Some((idx % self.width, idx / self.width, value))
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().map(|&v| v as f64).sum()
    }
}
