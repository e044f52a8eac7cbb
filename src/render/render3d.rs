//! Scene pass: background gradient, flat-shaded walls and animated portal
//! doors, one column per depth-buffer entry.
use crate::core::dungeon::Tile;
use crate::core::math::clamp;
use crate::render::casters::{ColumnHit, Side};
use crate::render::framebuffer::{Color, Framebuffer};

/// Fog never takes more than this much light away.
pub const FOG_CAP: f32 = 0.88;
/// Y-side walls are drawn at this fraction of X-side brightness.
pub const SIDE_SHADE: f32 = 0.82;
const WALL_BASE: f32 = 110.0;

#[inline]
pub fn fog_shade(dist: f32, fog: f32) -> f32 {
    1.0 - clamp(dist * fog, 0.0, FOG_CAP)
}

/// Vertical extent of a wall at `dist`: (height, first row, last row).
/// Height is `screen_h / dist`, clamped to the screen, centred on the horizon.
pub fn wall_strip(screen_h: usize, dist: f32) -> (usize, usize, usize) {
    let line_h = ((screen_h as f32 / dist).floor() as usize).min(screen_h);
    let mid = screen_h / 2;
    let start = mid.saturating_sub(line_h / 2);
    let end = (mid + line_h / 2).min(screen_h.saturating_sub(1));
    (line_h, start, end)
}

fn paint_background(fb: &mut Framebuffer) {
    let h = fb.height;
    let denom = h.saturating_sub(1).max(1) as f32;
    for y in 0..h {
        let t = y as f32 / denom;
        // techo se aclara hacia arriba, suelo hacia abajo
        let v = if y < h / 2 { 18.0 + 26.0 * (1.0 - t) } else { 12.0 + 22.0 * t };
        fb.fill_row(y, Color::gray(v as u8));
    }
}

/// Animated door surface keyed on screen position and time. Locked doors
/// swirl magenta/purple, open ones cyan/green.
pub fn portal_color(x: usize, y: usize, dist: f32, locked: bool, time_sec: f32) -> Color {
    let t = time_sec;
    let nx = x as f32 * 0.045;
    let ny = y as f32 * 0.07;

    let swirl = (nx + t * 3.0 + (ny - t * 2.2).sin() * 1.6).sin();
    let scan = (ny * 2.8 + t * 7.0).sin();
    let ring = ((nx * nx + ny * ny) * 0.35 - t * 4.0).sin();

    let fade = 1.0 / (1.0 + dist * 0.22);
    let pulse = 0.55 + 0.45 * (t * 3.8 - dist * 0.55).sin();
    let strobe = 0.65 + 0.35 * (t * 12.0 + nx * 2.0 - ny * 1.5).sin();

    let half = |s: f32| 0.5 + 0.5 * s;
    let (r, g, b) = if locked {
        (130.0 + 95.0 * half(swirl), 25.0 + 70.0 * half(scan), 150.0 + 85.0 * half(ring))
    } else {
        (60.0 + 70.0 * half(ring), 120.0 + 95.0 * half(swirl), 140.0 + 95.0 * half(scan))
    };

    // diagonal "stairs" so the door reads even when the animation is subtle
    let stairs = if ((x >> 2) + (y >> 2)) & 7 == 0 { 1.45 } else { 1.0 };
    let pop = 1.0 + 0.35 * half(swirl);
    let mul = pulse * strobe * (0.60 + 1.10 * fade) * stairs * pop;

    Color::from_f32(r * mul, g * mul, b * mul)
}

/// Paints background and walls for every column in `zbuffer`.
pub fn render_scene(fb: &mut Framebuffer, zbuffer: &[ColumnHit], fog: f32, time_sec: f32) {
    paint_background(fb);

    let h = fb.height;
    for (x, hit) in zbuffer.iter().enumerate().take(fb.width) {
        let (_, y0, y1) = wall_strip(h, hit.dist);
        let shade = fog_shade(hit.dist, fog);
        let side_mul = if hit.side == Side::Y { SIDE_SHADE } else { 1.0 };

        if hit.tile.is_door() {
            let locked = hit.tile == Tile::DoorLocked;
            for y in y0..=y1 {
                let c = portal_color(x, y, hit.dist, locked, time_sec);
                fb.set_pixel(x, y, c.scale(shade * side_mul));
            }
        } else {
            let v = (WALL_BASE * shade * side_mul).floor().clamp(0.0, 255.0) as u8;
            let c = Color::gray(v);
            for y in y0..=y1 {
                fb.set_pixel(x, y, c);
            }
        }
    }
}
