//! The Data Dungeon: a software raycaster dungeon crawler.
//!
//! The library is the engine (floor generation, gameplay, the per-frame
//! render pipeline); the `window` feature adds the desktop frontend binary.

pub mod config;
pub mod error;
pub mod core;
pub mod render;

pub use config::Config;
pub use error::{Error, Result};
