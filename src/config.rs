//! Game configuration. Defaults are the tuned values the game ships with;
//! a JSON file may override any subset of them.
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest grid the generator will build (border + a room + margins).
pub const MIN_GRID: usize = 7;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub render: RenderConfig,
    pub gameplay: GameplayConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    pub room_tries: u32,
    pub room_min: usize,
    pub room_max: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 48,
            height: 48,
            room_tries: 140,
            room_min: 4,
            room_max: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub internal_width: usize,
    pub internal_height: usize,
    /// Window pixels per internal pixel.
    pub scale: u32,
    pub fov: f32,
    pub max_dist: f32,
    /// Higher => foggier.
    pub fog: f32,
    pub enable_dither: bool,
    /// 2 => 1-bit, 3..5 => posterized.
    pub dither_levels: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            internal_width: 320,
            internal_height: 200,
            scale: 3,
            fov: FRAC_PI_3, // 60°
            max_dist: 24.0,
            fog: 0.085,
            enable_dither: true,
            dither_levels: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    pub move_speed: f32,  // tiles/sec
    pub turn_speed: f32,  // rad/sec (keyboard)
    pub mouse_sensitivity: f32,
    pub player_hp: i32,
    pub player_radius: f32,

    pub base_enemies: u32,
    pub enemy_growth: u32,
    pub enemy_speed: f32,
    pub enemy_speed_per_floor: f32,
    pub enemy_hp: i32,
    pub enemy_attack_interval: f32,
    pub enemy_sight: f32,
    pub enemy_spawn_clearance: f32,

    pub swing_cooldown: f32,
    pub swing_active: f32,
    pub sword_range: f32,
    pub swing_arc: f32,
    pub damage: i32,
    pub knockback: f32,

    pub door_trigger_radius: f32,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            move_speed: 3.2,
            turn_speed: 2.2,
            mouse_sensitivity: 0.0022,
            player_hp: 5,
            player_radius: 0.22,
            base_enemies: 6,
            enemy_growth: 2,
            enemy_speed: 1.2,
            enemy_speed_per_floor: 0.06,
            enemy_hp: 2,
            enemy_attack_interval: 0.55,
            enemy_sight: 10.0,
            enemy_spawn_clearance: 9.0,
            swing_cooldown: 0.42,
            swing_active: 0.16,
            sword_range: 1.55,
            swing_arc: FRAC_PI_2, // 90°
            damage: 1,
            knockback: 0.16,
            door_trigger_radius: 0.7,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Like `load`, but a missing file just means "use the defaults".
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let g = &self.generator;
        if g.width < MIN_GRID || g.height < MIN_GRID {
            return Err(invalid(format!(
                "grid {}x{} is smaller than {MIN_GRID}x{MIN_GRID}",
                g.width, g.height
            )));
        }
        if g.room_min == 0 || g.room_min > g.room_max {
            return Err(invalid(format!(
                "room size range {}..={} is empty",
                g.room_min, g.room_max
            )));
        }

        let r = &self.render;
        if r.internal_width == 0 || r.internal_height == 0 {
            return Err(invalid("internal resolution must be non-zero".into()));
        }
        if !(r.fov > 0.0 && r.fov < std::f32::consts::PI) {
            return Err(invalid(format!("fov {} must be in (0, pi)", r.fov)));
        }
        if r.max_dist <= 0.0 {
            return Err(invalid("max_dist must be positive".into()));
        }
        if r.dither_levels < 2 {
            return Err(invalid("dither_levels must be at least 2".into()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> Error {
    Error::InvalidConfig(msg)
}
