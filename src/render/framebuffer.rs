//! CPU framebuffer (RGBA8) at the fixed internal resolution.

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLANK: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn gray(v: u8) -> Self {
        Self::new(v, v, v, 255)
    }

    /// Opaque color from float channels; clamps to 0..=255 and truncates.
    #[inline]
    pub fn from_f32(r: f32, g: f32, b: f32) -> Self {
        let q = |v: f32| -> u8 { v.clamp(0.0, 255.0) as u8 };
        Self::new(q(r), q(g), q(b), 255)
    }

    /// Multiplies RGB by `k`, keeps alpha.
    #[inline]
    pub fn scale(self, k: f32) -> Self {
        let mul = |v: u8| -> u8 { (v as f32 * k).clamp(0.0, 255.0) as u8 };
        Self::new(mul(self.r), mul(self.g), mul(self.b), self.a)
    }

    /// Moves RGB towards `other` by `t` in [0, 1], keeps alpha.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let f = |x: u8, y: u8| -> u8 { ((x as f32) * (1.0 - t) + (y as f32) * t) as u8 };
        Self::new(f(self.r, other.r), f(self.g, other.g), f(self.b, other.b), self.a)
    }
}

pub struct Framebuffer {
    pub color_buffer: Vec<Color>,
    pub width: usize,
    pub height: usize,
    pub background_color: Color,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let bg = Color::BLACK;
        Self {
            color_buffer: vec![bg; width * height],
            width,
            height,
            background_color: bg,
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.color_buffer.fill(self.background_color);
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.color_buffer[y * self.width + x] = color;
        }
    }

    /// Signed variant for callers that project off-screen.
    #[inline]
    pub fn set_pixel_i(&mut self, x: i32, y: i32, color: Color) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            return self.color_buffer[y * self.width + x];
        }
        self.background_color
    }

    /// Straight-alpha "over" onto an opaque destination. Output is always opaque.
    #[inline]
    pub fn blend_pixel(&mut self, x: usize, y: usize, src: Color) {
        if x >= self.width || y >= self.height || src.a == 0 {
            return;
        }
        let i = y * self.width + x;
        if src.a == 255 {
            self.color_buffer[i] = Color::new(src.r, src.g, src.b, 255);
            return;
        }
        let dst = self.color_buffer[i];
        let a = src.a as f32 / 255.0;
        let inv = 1.0 - a;
        let mix = |s: u8, d: u8| -> u8 { (s as f32 * a + d as f32 * inv) as u8 };
        self.color_buffer[i] = Color::new(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b), 255);
    }

    /// Fills the whole row `y` with one color.
    pub fn fill_row(&mut self, y: usize, color: Color) {
        if y < self.height {
            let row = y * self.width;
            self.color_buffer[row..row + self.width].fill(color);
        }
    }

    /// Packed RGBA8 bytes, row-major, ready for a GPU texture upload.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.color_buffer.iter().flat_map(|c| [c.r, c.g, c.b, c.a]).collect()
    }
}
