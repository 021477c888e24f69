//! RGB helpers for brightness matching and linear blending

use image::{Rgb, RgbaImage};

/// Brightness as the HSB value channel, `max(r, g, b)` in `[0, 255]`
pub fn brightness(color: Rgb<u8>) -> f64 {
    let [r, g, b] = color.0;
    f64::from(r.max(g).max(b))
}

/// Linear per-channel interpolation from `a` toward `b`
///
/// `t = 0` returns `a`, `t = 1` returns `b`. Channels are rounded and clamped.
pub fn blend(a: Rgb<u8>, b: Rgb<u8>, t: f64) -> Rgb<u8> {
    let mix = |from: u8, to: u8| {
        let from = f64::from(from);
        let to = f64::from(to);
        channel((to - from).mul_add(t, from))
    };

    Rgb([mix(a.0[0], b.0[0]), mix(a.0[1], b.0[1]), mix(a.0[2], b.0[2])])
}

/// Gray tone of the given level
pub fn gray(level: f64) -> Rgb<u8> {
    let value = channel(level);
    Rgb([value, value, value])
}

/// Mean brightness over every pixel of a tile image
///
/// Alpha is ignored. An empty image has brightness 0.
pub fn average_brightness(image: &RgbaImage) -> f64 {
    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return 0.0;
    }

    let total: f64 = image
        .pixels()
        .map(|pixel| brightness(Rgb([pixel.0[0], pixel.0[1], pixel.0[2]])))
        .sum();

    total / pixel_count as f64
}

fn channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}
