//! HSL colors and hue cycling for particle layers

use serde::Deserialize;

/// Color as (hue, saturation, lightness), each component in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Same saturation and lightness, different hue.
    pub fn with_hue(self, h: f32) -> Self {
        Self { h, ..self }
    }

    /// Convert to linear RGB components in [0, 1].
    ///
    /// Hue wraps into [0, 1); saturation and lightness are clamped.
    pub fn to_rgb(self) -> [f32; 3] {
        let h = self.h.rem_euclid(1.0);
        let s = self.s.clamp(0.0, 1.0);
        let l = self.l.clamp(0.0, 1.0);

        if s == 0.0 {
            return [l, l, l];
        }

        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;

        [
            hue_to_rgb(q, p, h + 1.0 / 3.0),
            hue_to_rgb(q, p, h),
            hue_to_rgb(q, p, h - 1.0 / 3.0),
        ]
    }

    /// RGBA with the given alpha, ready for GPU uniforms.
    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.to_rgb();
        [r, g, b, alpha]
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Display hue for a layer at elapsed-time scalar `t`.
///
/// `((base + t) mod 360) / 360`, always in [0, 1). Computed in f64 because
/// `t` is derived from wall-clock milliseconds and is large.
///
/// `t` grows by 0.05 per second, so a full cycle takes two hours; wrapping
/// with `fract(base + t)` instead would cycle every 20 seconds.
pub fn cycled_hue(base: f32, t: f64) -> f32 {
    let wrapped = (base as f64 + t).rem_euclid(360.0);
    let hue = (wrapped / 360.0) as f32;
    // f64 -> f32 rounding can land exactly on 1.0
    if hue >= 1.0 {
        0.0
    } else {
        hue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rgb_eq(actual: [f32; 3], expected: [f32; 3]) {
        for i in 0..3 {
            assert!(
                (actual[i] - expected[i]).abs() < 1e-5,
                "channel {}: {:?} != {:?}",
                i,
                actual,
                expected
            );
        }
    }

    #[test]
    fn primary_hues() {
        assert_rgb_eq(Hsl::new(0.0, 1.0, 0.5).to_rgb(), [1.0, 0.0, 0.0]);
        assert_rgb_eq(Hsl::new(1.0 / 3.0, 1.0, 0.5).to_rgb(), [0.0, 1.0, 0.0]);
        assert_rgb_eq(Hsl::new(2.0 / 3.0, 1.0, 0.5).to_rgb(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn zero_saturation_is_grey() {
        assert_rgb_eq(Hsl::new(0.42, 0.0, 0.3).to_rgb(), [0.3, 0.3, 0.3]);
    }

    #[test]
    fn hue_one_equals_hue_zero() {
        assert_rgb_eq(Hsl::new(1.0, 0.2, 0.5).to_rgb(), Hsl::new(0.0, 0.2, 0.5).to_rgb());
    }

    #[test]
    fn layer_base_color() {
        // hsl(0.0, 0.2, 0.5): p = 0.6, q = 0.4
        assert_rgb_eq(Hsl::new(1.0, 0.2, 0.5).to_rgb(), [0.6, 0.4, 0.4]);
    }

    #[test]
    fn cycled_hue_wraps_past_360() {
        // 0.9 + t = 361 wraps to 1
        let t = 361.0 - 0.9f32 as f64;
        let hue = cycled_hue(0.9, t);
        assert!((hue - 1.0 / 360.0).abs() < 1e-6, "hue = {}", hue);
    }

    #[test]
    fn cycled_hue_always_in_unit_range() {
        let mut t = 0.0f64;
        while t < 5_000.0 {
            for base in [1.0f32, 0.95, 0.9, 0.85, 0.8] {
                let hue = cycled_hue(base, t);
                assert!((0.0..1.0).contains(&hue), "base={} t={} hue={}", base, t, hue);
            }
            t += 7.3;
        }
    }

    #[test]
    fn cycled_hue_with_wall_clock_magnitude() {
        // Date.now() * 0.00005 in 2026 is roughly 8.9e7
        let t = 1_790_000_000_000.0 * 0.00005;
        let hue = cycled_hue(1.0, t);
        assert!((0.0..1.0).contains(&hue));
    }
}
