//! World data and gameplay.
//!
//! Re-exports:
//! - `math`: scalar/angle helpers and `Vec2`
//! - `dungeon`: tile grid, floor generator, exit door
//! - `player`: player pose and sliding movement
//! - `enemy`: enemy state and chase AI
//! - `game`: runs, floors, melee, intents

pub mod math;
pub mod dungeon;
pub mod player;
pub mod enemy;
pub mod game;
