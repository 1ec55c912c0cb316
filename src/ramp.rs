use bytemuck::{Pod, Zeroable};

/// Hue at normalized intensity 0 (blue-violet).
const HUE_HIGH: f32 = 0.7;
/// Hue at normalized intensity 1 (red).
const HUE_LOW: f32 = 0.0;
const SATURATION: f32 = 0.8;
const VALUE: f32 = 0.9;

/// One RGBA8 pixel. Layout matches `wgpu::TextureFormat::Rgba8Unorm`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba([r, g, b, 255])
    }
}

/// Precomputed hue gradient used to colorize normalized intensity.
pub struct ColorRamp {
    colors: Vec<Rgba>,
}

impl ColorRamp {
    /// Build `count` colors sweeping hue from `HUE_HIGH` down to `HUE_LOW`.
    /// A `count` of 0 is treated as 1.
    pub fn generate(count: usize) -> Self {
        let count = count.max(1);
        let steps = (count - 1).max(1) as f32;
        let colors = (0..count)
            .map(|i| {
                let t = i as f32 / steps;
                let hue = HUE_HIGH + (HUE_LOW - HUE_HIGH) * t;
                hsv_to_rgb(hue, SATURATION, VALUE)
            })
            .collect();
        Self { colors }
    }

    /// Color for a normalized intensity. Input is clamped to [0, 1].
    #[inline]
    pub fn map(&self, normalized: f32) -> Rgba {
        let last = self.colors.len() - 1;
        let t = if normalized.is_nan() { 0.0 } else { normalized.clamp(0.0, 1.0) };
        let idx = ((t * last as f32) as usize).min(last);
        self.colors[idx]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }
}

/// HSV in [0, 1] to an opaque RGBA8 color.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgba {
    let h = (h % 1.0 + 1.0) % 1.0;
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match i as i32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgba::rgb(
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}
