//! Software renderer.
//!
//! Re-exports:
//! - `framebuffer`: RGBA pixel buffer
//! - `textures`: immutable RGBA textures and sprite shapes
//! - `casters`: DDA column caster and line of sight
//! - `render3d`: background, walls and portal doors
//! - `sprites`: billboards and weapon overlay
//! - `post`: ordered-dither monochrome pass
//! - `minimap`: top-down overlay

pub mod framebuffer;
pub mod textures;
pub mod casters;
pub mod render3d;
pub mod sprites;
pub mod post;
pub mod minimap;

use crate::core::dungeon::TileGrid;
use crate::core::game::Game;
use crate::core::math::Vec2;
use casters::ColumnHit;
use framebuffer::Framebuffer;
use sprites::Billboard;
use textures::{Texture, TextureSet};

/// Camera for one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct View {
    pub pos: Vec2,
    pub angle: f32,
    pub fov: f32,
    pub max_dist: f32,
    pub fog: f32,
}

/// Everything one frame reads. Nothing in here is mutated by rendering.
pub struct Frame<'a> {
    pub grid: &'a TileGrid,
    pub view: View,
    pub sprites: &'a [Billboard<'a>],
    pub weapon: Option<&'a Texture>,
    pub swing_t: f32,
    pub time_sec: f32,
    /// `Some(levels)` runs the dither pass.
    pub dither: Option<u32>,
    pub minimap: bool,
}

/// Owns the framebuffer and the per-column depth buffer.
pub struct Renderer {
    pub fb: Framebuffer,
    pub zbuffer: Vec<ColumnHit>,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { fb: Framebuffer::new(width, height), zbuffer: Vec::with_capacity(width) }
    }

    /// cast -> walls -> sprites -> weapon -> dither -> minimap
    pub fn render(&mut self, frame: &Frame<'_>) {
        let v = &frame.view;
        casters::cast_columns(frame.grid, v.pos, v.angle, self.fb.width, v.fov, v.max_dist, &mut self.zbuffer);

        render3d::render_scene(&mut self.fb, &self.zbuffer, v.fog, frame.time_sec);
        sprites::render_sprites(&mut self.fb, &self.zbuffer, v, frame.sprites);
        sprites::render_weapon(&mut self.fb, frame.weapon, frame.swing_t);

        if let Some(levels) = frame.dither {
            post::dither_to_monochrome(&mut self.fb, levels);
        }

        if frame.minimap {
            let enemies: Vec<Vec2> = frame.sprites.iter().filter(|s| s.alive).map(|s| s.pos).collect();
            let cell = (self.fb.height / 2 / frame.grid.height().max(1)).max(1);
            minimap::render_minimap(&mut self.fb, frame.grid, v.pos, &enemies, cell);
        }
    }

    /// Renders the current state of `game`.
    pub fn render_game(&mut self, game: &Game, textures: &TextureSet, time_sec: f32) {
        let rc = &game.config().render;
        let shape = textures.enemy_shape();
        let sprites: Vec<Billboard<'_>> = game
            .enemies
            .iter()
            .map(|e| Billboard { pos: e.pos, alive: e.alive, hit_flash: e.hit_flash, shape })
            .collect();

        let frame = Frame {
            grid: &game.dungeon.grid,
            view: View {
                pos: game.player.pos,
                angle: game.player.a,
                fov: rc.fov,
                max_dist: rc.max_dist,
                fog: rc.fog,
            },
            sprites: &sprites,
            weapon: textures.weapon(game.is_swinging()),
            swing_t: game.swing_t(),
            time_sec,
            dither: game.enable_dither.then_some(rc.dither_levels),
            minimap: game.show_map,
        };
        self.render(&frame);
    }
}
