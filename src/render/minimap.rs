//! Top-down map overlay, drawn straight into the framebuffer after post.
use crate::core::dungeon::{Tile, TileGrid};
use crate::core::math::Vec2;
use crate::render::framebuffer::{Color, Framebuffer};

/// Screen offset of the map's top-left corner.
pub const ORIGIN: (usize, usize) = (4, 4);
const OPACITY: u8 = 242;

pub fn tile_shade(tile: Tile) -> u8 {
    match tile {
        Tile::Wall => 5,
        Tile::Floor => 40,
        Tile::DoorLocked => 90,
        Tile::DoorOpen => 140,
    }
}

fn draw_cell(fb: &mut Framebuffer, xo: usize, yo: usize, cell: usize, color: Color) {
    for y in yo..yo + cell {
        for x in xo..xo + cell {
            fb.blend_pixel(x, y, color);
        }
    }
}

fn draw_marker(fb: &mut Framebuffer, p: Vec2, cell: usize, color: Color) {
    let cx = ORIGIN.0 as f32 + p.x * cell as f32;
    let cy = ORIGIN.1 as f32 + p.y * cell as f32;
    let (x0, y0) = ((cx - 1.0).floor() as i32, (cy - 1.0).floor() as i32);
    for dy in 0..2 {
        for dx in 0..2 {
            fb.set_pixel_i(x0 + dx, y0 + dy, color);
        }
    }
}

/// `cell` is the side of one tile in framebuffer pixels.
pub fn render_minimap(fb: &mut Framebuffer, grid: &TileGrid, player: Vec2, enemies: &[Vec2], cell: usize) {
    let cell = cell.max(1);
    for (x, y, tile) in grid.iter() {
        let v = tile_shade(tile);
        let color = Color::new(v, v, v, OPACITY);
        draw_cell(fb, ORIGIN.0 + x * cell, ORIGIN.1 + y * cell, cell, color);
    }
    for &e in enemies {
        draw_marker(fb, e, cell, Color::gray(200));
    }
    draw_marker(fb, player, cell, Color::WHITE);
}
