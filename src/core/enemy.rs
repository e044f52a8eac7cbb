//! Enemy state and chase AI.
use crate::core::dungeon::TileGrid;
use crate::core::math::Vec2;
use crate::core::player::try_move_with_slide;
use crate::render::casters::raycast_los;

/// Hit flash fades out at this rate (per second).
const FLASH_DECAY: f32 = 6.0;
/// Closer than this to the target the enemy stops and attacks.
const REACH: f32 = 0.35;

/// Per-floor enemy behaviour.
#[derive(Copy, Clone, Debug)]
pub struct EnemyTuning {
    pub speed: f32,
    pub sight: f32,
    pub attack_interval: f32,
    pub radius: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnemyAction {
    /// Dead, or the target is out of sight.
    Idle,
    Chase,
    /// In reach; `true` on the tick an attack lands.
    Attack(bool),
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub pos: Vec2,
    pub hp: i32,
    pub alive: bool,
    pub hit_flash: f32,
    attack_timer: f32,
}

impl Enemy {
    pub fn new(x: f32, y: f32, hp: i32) -> Self {
        Self { pos: Vec2::new(x, y), hp, alive: true, hit_flash: 0.0, attack_timer: 0.0 }
    }

    pub fn sees(&self, grid: &TileGrid, target: Vec2, range: f32) -> bool {
        raycast_los(grid, self.pos, target, range)
    }

    pub fn update(&mut self, grid: &TileGrid, target: Vec2, tuning: &EnemyTuning, dt: f32) -> EnemyAction {
        if !self.alive {
            return EnemyAction::Idle;
        }
        self.hit_flash = (self.hit_flash - dt * FLASH_DECAY).max(0.0);

        if !self.sees(grid, target, tuning.sight) {
            return EnemyAction::Idle;
        }

        let dx = target.x - self.pos.x;
        let dy = target.y - self.pos.y;
        let d = dx.hypot(dy);

        if d < REACH {
            self.attack_timer -= dt;
            if self.attack_timer <= 0.0 {
                self.attack_timer = tuning.attack_interval;
                return EnemyAction::Attack(true);
            }
            return EnemyAction::Attack(false);
        }

        let step = tuning.speed * dt / d;
        try_move_with_slide(&mut self.pos, dx * step, dy * step, tuning.radius, |x, y| {
            grid.tile_at(x, y).is_walkable()
        });
        EnemyAction::Chase
    }

    /// Applies one melee hit arriving along `heading`. The knockback only
    /// happens if the enemy's new tile is walkable. Returns `true` on the
    /// killing blow.
    pub fn take_hit(&mut self, grid: &TileGrid, damage: i32, heading: f32, knockback: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.hp -= damage;
        self.hit_flash = 1.0;

        let pushed = Vec2::new(self.pos.x + heading.cos() * knockback, self.pos.y + heading.sin() * knockback);
        if grid.tile_at(pushed.x, pushed.y).is_walkable() {
            self.pos = pushed;
        }

        if self.hp <= 0 {
            self.alive = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hall() -> TileGrid {
        TileGrid::from_rows(&[
            "##########",
            "#........#",
            "#####.####",
            "#........#",
            "##########",
        ])
    }

    fn tuning() -> EnemyTuning {
        EnemyTuning { speed: 1.2, sight: 10.0, attack_interval: 0.55, radius: 0.22 }
    }

    #[test]
    fn chases_only_with_line_of_sight() {
        let grid = hall();
        let mut e = Enemy::new(8.5, 1.5, 2);
        assert_eq!(e.update(&grid, Vec2::new(1.5, 1.5), &tuning(), 0.5), EnemyAction::Chase);
        assert!((e.pos.x - 7.9).abs() < 1e-4);

        let mut hidden = Enemy::new(8.5, 3.5, 2);
        assert_eq!(hidden.update(&grid, Vec2::new(1.5, 1.5), &tuning(), 0.5), EnemyAction::Idle);
        assert_eq!(hidden.pos, Vec2::new(8.5, 3.5));
    }

    #[test]
    fn attacks_on_contact_then_waits_for_the_interval() {
        let grid = hall();
        let target = Vec2::new(4.5, 1.5);
        let mut e = Enemy::new(4.3, 1.5, 2);
        let t = tuning();
        assert_eq!(e.update(&grid, target, &t, 0.1), EnemyAction::Attack(true));
        assert_eq!(e.update(&grid, target, &t, 0.3), EnemyAction::Attack(false));
        assert_eq!(e.update(&grid, target, &t, 0.3), EnemyAction::Attack(true));
    }

    #[test]
    fn hits_flash_push_back_and_kill() {
        let grid = hall();
        let mut e = Enemy::new(3.5, 1.5, 2);
        assert!(!e.take_hit(&grid, 1, 0.0, 0.16));
        assert_eq!(e.hit_flash, 1.0);
        assert!((e.pos.x - 3.66).abs() < 1e-4);

        e.update(&grid, Vec2::new(3.7, 3.5), &tuning(), 0.1);
        assert!((e.hit_flash - 0.4).abs() < 1e-4);

        assert!(e.take_hit(&grid, 1, 0.0, 0.16));
        assert!(!e.alive);
        assert!(!e.take_hit(&grid, 1, 0.0, 0.16));
        assert_eq!(e.update(&grid, Vec2::new(3.7, 1.5), &tuning(), 0.1), EnemyAction::Idle);
    }

    #[test]
    fn knockback_never_enters_walls() {
        let grid = hall();
        let mut e = Enemy::new(1.5, 1.5, 5);
        e.take_hit(&grid, 1, std::f32::consts::PI, 0.6);
        assert_eq!(e.pos, Vec2::new(1.5, 1.5));
    }
}
