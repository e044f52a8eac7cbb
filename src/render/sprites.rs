//! Billboard sprites and the first-person weapon overlay.
//!
//! Exposes:
//! - `draw_order`: living sprites sorted far to near
//! - `render_sprites`: painter's-algorithm billboards, depth tested per column
//!   against the wall buffer
//! - `render_weapon`: bottom-centre overlay, textured or procedural blade
use std::f32::consts::{FRAC_PI_2, PI};

use crate::core::math::{Vec2, angle_diff, clamp};
use crate::render::View;
use crate::render::casters::ColumnHit;
use crate::render::framebuffer::{Color, Framebuffer};
use crate::render::render3d::fog_shade;
use crate::render::textures::{SpriteShape, Texture};

/// Texels with less alpha than this are skipped entirely.
const ALPHA_CUTOFF: u8 = 12;
/// Sprites may stand this far behind the wall depth and still draw.
const DEPTH_BIAS: f32 = 0.1;
/// Cull margin, as a fraction of the FOV (wider than the half-FOV frustum).
const CULL_FOV: f32 = 0.65;
const SIZE_FACTOR: f32 = 0.62;

/// What the compositor needs to know about one entity this frame.
#[derive(Copy, Clone, Debug)]
pub struct Billboard<'a> {
    pub pos: Vec2,
    pub alive: bool,
    /// 0 = none, 1 = fully white.
    pub hit_flash: f32,
    pub shape: SpriteShape<'a>,
}

/// (index into `sprites`, distance to `eye`) for every living sprite,
/// farthest first.
pub fn draw_order(eye: Vec2, sprites: &[Billboard<'_>]) -> Vec<(usize, f32)> {
    let mut order: Vec<(usize, f32)> = sprites
        .iter()
        .enumerate()
        .filter(|(_, s)| s.alive)
        .map(|(i, s)| (i, eye.dist(s.pos)))
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));
    order
}

/// Blob silhouette in sprite UV space: a body and head with two eye holes.
fn blob_mask(u: f32, v: f32) -> bool {
    let cx = u - 0.5;
    let cy = v - 0.5;
    let circle = |ox: f32, oy: f32, r2: f32| {
        let dx = cx - ox;
        let dy = cy - oy;
        dx * dx + dy * dy < r2
    };
    let body = circle(0.0, 0.0, 0.22) || circle(0.0, -0.18, 0.18);
    let eyes = circle(-0.13, 0.02, 0.006) || circle(0.13, 0.02, 0.006);
    body && !eyes
}

pub fn render_sprites(fb: &mut Framebuffer, zbuffer: &[ColumnHit], view: &View, sprites: &[Billboard<'_>]) {
    let w = fb.width as i32;
    let h = fb.height as i32;
    let tan_half = (view.fov * 0.5).tan();

    for (i, dist) in draw_order(view.pos, sprites) {
        let s = &sprites[i];
        if dist < 0.001 || dist > view.max_dist { continue; }

        let rel = angle_diff(view.pos.angle_to(s.pos), view.angle);
        if rel.abs() > view.fov * CULL_FOV || rel.abs() >= FRAC_PI_2 - 0.01 { continue; }

        let screen_x = (0.5 + rel.tan() / tan_half * 0.5) * (w - 1) as f32;
        // same axis the wall buffer is measured along
        let depth = dist * rel.cos();
        let size = clamp(h as f32 / depth * SIZE_FACTOR, 2.0, h as f32 * 2.0);
        let sx0 = (screen_x - size / 2.0).floor() as i32;
        let sx1 = (screen_x + size / 2.0).floor() as i32;
        let sy0 = (h as f32 / 2.0 - size / 2.0).floor() as i32;
        let sy1 = (h as f32 / 2.0 + size / 2.0).floor() as i32;
        let span_x = (sx1 - sx0).max(1) as f32;
        let span_y = (sy1 - sy0).max(1) as f32;

        let shade = fog_shade(depth, view.fog);
        let flash = clamp(s.hit_flash, 0.0, 1.0);

        for x in sx0.max(0)..=sx1.min(w - 1) {
            // test de profundidad con muros
            if let Some(col) = zbuffer.get(x as usize) {
                if col.dist < depth - DEPTH_BIAS { continue; }
            }
            let u = (x - sx0) as f32 / span_x;

            for y in sy0.max(0)..=sy1.min(h - 1) {
                let v = (y - sy0) as f32 / span_y;
                let src = match s.shape {
                    SpriteShape::Textured(tex) => {
                        let c = tex.sample(u, v);
                        if c.a < ALPHA_CUTOFF { continue; }
                        c
                    }
                    SpriteShape::Procedural => {
                        if !blob_mask(u, v) { continue; }
                        Color::gray(200)
                    }
                };
                let lit = src.scale(shade).lerp(Color::WHITE, flash);
                fb.blend_pixel(x as usize, y as usize, lit);
            }
        }
    }
}

/// Weapon overlay. `swing_t` in [0, 1] drives a small vertical bob.
pub fn render_weapon(fb: &mut Framebuffer, tex: Option<&Texture>, swing_t: f32) {
    match tex {
        Some(tex) => draw_weapon_texture(fb, tex, swing_t),
        None => draw_fallback_blade(fb, swing_t),
    }
}

fn draw_weapon_texture(fb: &mut Framebuffer, tex: &Texture, swing_t: f32) {
    let w = fb.width as i32;
    let h = fb.height as i32;
    let t = clamp(swing_t, 0.0, 1.0);
    let bob = (t * PI).sin() * 6.0;

    // fit into ~85% of the screen height without exceeding 95% of its width
    let target_h = h as f32 * 0.85;
    let scale = ((w as f32 * 0.95) / tex.width() as f32).min(target_h / tex.height() as f32);
    let draw_w = ((tex.width() as f32 * scale) as i32).max(1);
    let draw_h = ((tex.height() as f32 * scale) as i32).max(1);

    let x0 = (w - draw_w) / 2;
    let y0 = h - draw_h + bob as i32;

    for y in 0..draw_h {
        let py = y0 + y;
        if py < 0 || py >= h { continue; }
        let v = y as f32 / (draw_h - 1).max(1) as f32;
        for x in 0..draw_w {
            let px = x0 + x;
            if px < 0 || px >= w { continue; }
            let u = x as f32 / (draw_w - 1).max(1) as f32;
            let c = tex.sample(u, v);
            if c.a < ALPHA_CUTOFF { continue; }
            fb.blend_pixel(px as usize, py as usize, c);
        }
    }
}

/// Tapered blade with a cross-guard block, right of centre.
fn draw_fallback_blade(fb: &mut Framebuffer, swing_t: f32) {
    let w = fb.width as i32;
    let h = fb.height as i32;
    let sway = (clamp(swing_t, 0.0, 1.0) * PI).sin() * 10.0;

    const BLADE_H: i32 = 70;
    const BLADE_W: i32 = 10;
    let x0 = (w / 2) as f32 + 40.0 + sway;
    let y0 = (h - 1) as f32 - 10.0 - sway;

    for y in 0..BLADE_H {
        let taper = y as f32 / BLADE_H as f32;
        for x in 0..BLADE_W {
            let xf = x as f32;
            if xf < BLADE_W as f32 * 0.2 * taper || xf > BLADE_W as f32 * (1.0 - 0.2 * taper) { continue; }
            fb.set_pixel_i((x0 + xf) as i32, (y0 - y as f32) as i32, Color::gray(220));
        }
    }
    for y in 0..14 {
        for x in 0..6 {
            fb.set_pixel_i((x0 + 2.0 + x as f32) as i32, (y0 + 2.0 + y as f32) as i32, Color::gray(150));
        }
    }
}
