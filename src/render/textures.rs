//! Immutable RGBA textures handed in by a loader, plus the slots the
//! renderer looks them up from. Missing textures are not errors: sprites and
//! the weapon fall back to procedural shapes.
use crate::error::{Error, Result};
use crate::render::framebuffer::Color;

/// A decoded RGBA8 image. Never mutated after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    w: u32,
    h: u32,
    px: Vec<Color>,
}

impl Texture {
    pub fn from_colors(w: u32, h: u32, px: Vec<Color>) -> Result<Self> {
        if w == 0 || h == 0 || px.len() != (w as usize) * (h as usize) {
            return Err(Error::TextureSize { width: w, height: h, len: px.len() * 4 });
        }
        Ok(Self { w, h, px })
    }

    /// `bytes` is row-major RGBA8, `w * h * 4` long.
    pub fn from_rgba(w: u32, h: u32, bytes: &[u8]) -> Result<Self> {
        if w == 0 || h == 0 || bytes.len() != (w as usize) * (h as usize) * 4 {
            return Err(Error::TextureSize { width: w, height: h, len: bytes.len() });
        }
        let px = bytes
            .chunks_exact(4)
            .map(|p| Color::new(p[0], p[1], p[2], p[3]))
            .collect();
        Ok(Self { w, h, px })
    }

    #[inline] pub fn width(&self) -> u32 { self.w }
    #[inline] pub fn height(&self) -> u32 { self.h }

    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Color {
        let xi = x.min(self.w - 1) as usize;
        let yi = y.min(self.h - 1) as usize;
        self.px[yi * self.w as usize + xi]
    }

    /// Nearest-neighbour lookup with `u`, `v` in [0, 1].
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let x = (u * (self.w - 1) as f32).clamp(0.0, (self.w - 1) as f32) as u32;
        let y = (v * (self.h - 1) as f32).clamp(0.0, (self.h - 1) as f32) as u32;
        self.texel(x, y)
    }
}

/// How a billboard is drawn, decided once per sprite per frame.
#[derive(Copy, Clone, Debug)]
pub enum SpriteShape<'a> {
    Textured(&'a Texture),
    /// Blob silhouette drawn from circles.
    Procedural,
}

impl<'a> SpriteShape<'a> {
    pub fn from_texture(tex: Option<&'a Texture>) -> Self {
        match tex {
            Some(t) => SpriteShape::Textured(t),
            None => SpriteShape::Procedural,
        }
    }
}

/// Every texture the game can use; any of them may be absent.
#[derive(Default)]
pub struct TextureSet {
    pub enemy: Option<Texture>,
    pub player_walk: Option<Texture>,
    pub player_punch: Option<Texture>,
}

impl TextureSet {
    /// First-person overlay: punch while a swing is active, walk otherwise.
    pub fn weapon(&self, swinging: bool) -> Option<&Texture> {
        if swinging && self.player_punch.is_some() {
            self.player_punch.as_ref()
        } else {
            self.player_walk.as_ref()
        }
    }

    pub fn enemy_shape(&self) -> SpriteShape<'_> {
        SpriteShape::from_texture(self.enemy.as_ref())
    }
}
