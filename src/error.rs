//! Crate error type. Only the edges (config files, external pixel buffers,
//! audio) can fail; generation and rendering always produce something.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("texture {width}x{height} expects width*height*4 RGBA bytes, got {len}")]
    TextureSize { width: u32, height: u32, len: usize },

    #[error("audio: {0}")]
    Audio(String),
}

pub type Result<T> = std::result::Result<T, Error>;
