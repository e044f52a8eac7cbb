//! Ordered-dither post pass: luma, contrast, Bayer 8x8 posterize, then a
//! vertical gradient and a phosphor tint.
use crate::core::math::{clamp, lerp};
use crate::render::framebuffer::{Color, Framebuffer};

const BAYER_8: [[u8; 8]; 8] = [
    [0, 48, 12, 60, 3, 51, 15, 63],
    [32, 16, 44, 28, 35, 19, 47, 31],
    [8, 56, 4, 52, 11, 59, 7, 55],
    [40, 24, 36, 20, 43, 27, 39, 23],
    [2, 50, 14, 62, 1, 49, 13, 61],
    [34, 18, 46, 30, 33, 17, 45, 29],
    [10, 58, 6, 54, 9, 57, 5, 53],
    [42, 26, 38, 22, 41, 25, 37, 21],
];

const TINT: (f32, f32, f32) = (1.0, 1.0, 0.35);
const GRAD_TOP: f32 = 0.90;
const GRAD_BOTTOM: f32 = 1.05;

/// Threshold in (0, 1) for pixel (x, y).
#[inline]
pub fn bayer_threshold(x: usize, y: usize) -> f32 {
    (BAYER_8[y % 8][x % 8] as f32 + 0.5) / 64.0
}

/// Rec. 709 luma in [0, 1] with the readability contrast curve applied.
#[inline]
pub fn contrast_luma(c: Color) -> f32 {
    let l = (c.r as f32 * 0.2126 + c.g as f32 * 0.7152 + c.b as f32 * 0.0722) / 255.0;
    clamp((l - 0.08) * 1.18, 0.0, 1.0)
}

/// Quantizes `luma` to one of `levels` evenly spaced bands, choosing between
/// the two nearest with `threshold`. `levels <= 2` is plain 1-bit.
pub fn quantize(luma: f32, threshold: f32, levels: u32) -> u8 {
    let q = if levels <= 2 {
        if luma > threshold { 1.0 } else { 0.0 }
    } else {
        let step = 1.0 / (levels - 1) as f32;
        let base = (luma / step).floor() * step;
        let next = clamp(base + step, 0.0, 1.0);
        let frac = (luma - base) / step;
        if frac > threshold { next } else { base }
    };
    (q * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Rewrites the whole frame in place. Output is always opaque.
pub fn dither_to_monochrome(fb: &mut Framebuffer, levels: u32) {
    let (w, h) = (fb.width, fb.height);
    for y in 0..h {
        let gy = if h <= 1 { 1.0 } else { y as f32 / (h - 1) as f32 };
        let grad = lerp(GRAD_TOP, GRAD_BOTTOM, gy);
        for x in 0..w {
            let i = y * w + x;
            let v = quantize(contrast_luma(fb.color_buffer[i]), bayer_threshold(x, y), levels) as f32;
            let ch = |tint: f32| (v * tint * grad).round().clamp(0.0, 255.0) as u8;
            fb.color_buffer[i] = Color::new(ch(TINT.0), ch(TINT.1), ch(TINT.2), 255);
        }
    }
}
