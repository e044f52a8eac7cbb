//! Gameplay layer: runs, floors, melee, enemies and the exit door.
//!
//! The frontend turns device input into `Intents` once per frame and calls
//! `Game::update`; everything here is deterministic for a given seed and
//! sequence of intents.
use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{Config, GameplayConfig};
use crate::core::dungeon::{self, Dungeon, Tile};
use crate::core::enemy::{Enemy, EnemyAction, EnemyTuning};
use crate::core::math::{Vec2, angle_diff};
use crate::core::player::Player;
use crate::render::casters::raycast_los;

/// Longest step the simulation takes in one update.
pub const MAX_DT: f32 = 0.033;
/// Extra reach granted to the melee line-of-sight check.
const SWING_LOS_SLACK: f32 = 0.2;

/// One frame of player input, already decoded from the device.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Intents {
    /// +1 forward, -1 back.
    pub forward: f32,
    /// +1 right, -1 left.
    pub strafe: f32,
    /// Keyboard turn, +1 clockwise (towards +y).
    pub turn: f32,
    /// Raw horizontal mouse movement in pixels.
    pub mouse_dx: f32,
    pub attack: bool,
    pub restart: bool,
    pub toggle_map: bool,
    pub toggle_dither: bool,
}

/// Things the frontend may want to react to (sound, screen shake).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    FloorStarted(u32),
    Swing,
    EnemyHit,
    EnemyKilled,
    PlayerHurt,
    DoorUnlocked,
    Died,
}

/// Centre-screen message.
#[derive(Clone, Debug, PartialEq)]
pub struct Banner {
    pub title: String,
    pub detail: String,
    /// Seconds left on screen. Infinite for the death screen.
    pub ttl: f32,
}

pub struct Game {
    cfg: Config,
    rng: ChaCha8Rng,

    pub floor: u32,
    pub score: u32,
    pub dungeon: Dungeon,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub dead: bool,

    pub show_map: bool,
    pub enable_dither: bool,

    swing_cooldown: f32,
    swing_timer: f32,
    moving: bool,
    banner: Option<Banner>,
}

impl Game {
    pub fn new(cfg: Config, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let dungeon = dungeon::generate(&cfg.generator, &mut rng);
        let gp = &cfg.gameplay;
        let player = Player::new(dungeon.spawn.x, dungeon.spawn.y, 0.0, gp.player_hp, gp.player_radius);
        let enable_dither = cfg.render.enable_dither;

        let mut game = Self {
            cfg,
            rng,
            floor: 1,
            score: 0,
            dungeon,
            player,
            enemies: Vec::new(),
            dead: false,
            show_map: false,
            enable_dither,
            swing_cooldown: 0.0,
            swing_timer: 0.0,
            moving: false,
            banner: None,
        };
        game.enter_floor(true);
        game
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    fn gameplay(&self) -> &GameplayConfig {
        &self.cfg.gameplay
    }

    /// Fresh run from floor 1.
    pub fn start_run(&mut self) {
        self.floor = 1;
        self.score = 0;
        self.dead = false;
        log::info!("new run");
        self.next_floor(true);
    }

    /// Generates a new floor and drops the player at its spawn.
    pub fn next_floor(&mut self, reset_hp: bool) {
        self.dungeon = dungeon::generate(&self.cfg.generator, &mut self.rng);
        self.enter_floor(reset_hp);
    }

    fn enter_floor(&mut self, reset_hp: bool) {
        let spawn = self.dungeon.spawn;
        self.player.pos = spawn;
        self.player.a = 0.0;
        self.player.turn(self.rng.gen_range(0.0..TAU));
        if reset_hp {
            self.player.hp = self.gameplay().player_hp;
        }

        let gp = self.gameplay();
        let count = gp.base_enemies + (self.floor - 1) * gp.enemy_growth;
        self.spawn_enemies(count as usize);

        self.swing_cooldown = 0.0;
        self.swing_timer = 0.0;

        log::info!(
            "floor {}: {} enemies, door at ({}, {})",
            self.floor,
            self.enemies.len(),
            self.dungeon.door.tx,
            self.dungeon.door.ty
        );
        self.show_banner(format!("Sector {}", self.floor), "Clear all enemies to unlock the exit node", 0.9);
    }

    /// Places up to `n` enemies on random Floor tiles far enough from the
    /// player. Gives up after `n * 40` rejected picks.
    fn spawn_enemies(&mut self, n: usize) {
        self.enemies.clear();
        let grid = &self.dungeon.grid;
        let (w, h) = (grid.width(), grid.height());
        let hp = self.cfg.gameplay.enemy_hp + (self.floor as i32 - 1) / 4;
        let clearance = self.cfg.gameplay.enemy_spawn_clearance;

        let mut tries = n * 40;
        while self.enemies.len() < n && tries > 0 {
            tries -= 1;
            let rx = self.rng.gen_range(1..w - 1);
            let ry = self.rng.gen_range(1..h - 1);
            if grid.get(rx as i32, ry as i32) != Tile::Floor { continue; }
            let pos = Vec2::new(rx as f32 + 0.5, ry as f32 + 0.5);
            if pos.dist(self.player.pos) < clearance { continue; }
            self.enemies.push(Enemy::new(pos.x, pos.y, hp));
        }
        if self.enemies.len() < n {
            log::warn!("only {} of {n} enemies found room on floor {}", self.enemies.len(), self.floor);
        }
    }

    pub fn enemies_remaining(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    pub fn is_swinging(&self) -> bool {
        self.swing_timer > 0.0
    }

    /// Swing phase in [0, 1]: 1 as the swing starts, 0 when idle.
    pub fn swing_t(&self) -> f32 {
        if self.swing_timer > 0.0 {
            self.swing_timer / self.gameplay().swing_active
        } else {
            0.0
        }
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    fn show_banner(&mut self, title: impl Into<String>, detail: impl Into<String>, ttl: f32) {
        self.banner = Some(Banner { title: title.into(), detail: detail.into(), ttl });
    }

    pub fn update(&mut self, dt: f32, input: &Intents) -> Vec<GameEvent> {
        let dt = dt.clamp(0.0, MAX_DT);
        let mut events = Vec::new();

        if input.restart {
            self.start_run();
            events.push(GameEvent::FloorStarted(self.floor));
        }
        if input.toggle_map { self.show_map = !self.show_map; }
        if input.toggle_dither { self.enable_dither = !self.enable_dither; }

        if let Some(b) = &mut self.banner {
            b.ttl -= dt;
        }
        if self.banner.as_ref().is_some_and(|b| b.ttl <= 0.0) {
            self.banner = None;
        }

        if self.dead {
            return events;
        }

        self.swing_cooldown = (self.swing_cooldown - dt).max(0.0);
        self.swing_timer = (self.swing_timer - dt).max(0.0);

        if input.attack {
            self.swing(&mut events);
        }
        self.move_player(dt, input, &mut events);
        self.update_enemies(dt, &mut events);
        events
    }

    fn move_player(&mut self, dt: f32, input: &Intents, events: &mut Vec<GameEvent>) {
        let gp = &self.cfg.gameplay;
        self.player.turn(input.turn * gp.turn_speed * dt + input.mouse_dx * gp.mouse_sensitivity);

        let grid = &self.dungeon.grid;
        self.moving = input.forward != 0.0 || input.strafe != 0.0;
        self.player.walk(input.forward, input.strafe, gp.move_speed, dt, |x, y| grid.tile_at(x, y).is_walkable());

        if self.dungeon.is_door_open() && self.player.pos.dist(self.dungeon.door.pos) < gp.door_trigger_radius {
            self.floor += 1;
            self.score = self.score.max(self.floor - 1);
            self.next_floor(false);
            events.push(GameEvent::FloorStarted(self.floor));
        }
    }

    fn update_enemies(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        let gp = &self.cfg.gameplay;
        let tuning = EnemyTuning {
            speed: gp.enemy_speed + (self.floor - 1) as f32 * gp.enemy_speed_per_floor,
            sight: gp.enemy_sight,
            attack_interval: gp.enemy_attack_interval,
            radius: gp.player_radius,
        };

        let target = self.player.pos;
        let mut hits = 0;
        for e in self.enemies.iter_mut() {
            if e.update(&self.dungeon.grid, target, &tuning, dt) == EnemyAction::Attack(true) {
                hits += 1;
            }
        }

        for _ in 0..hits {
            if self.dead { break; }
            self.player.hp -= 1;
            events.push(GameEvent::PlayerHurt);
            let hp = self.player.hp;
            self.show_banner("Ouch!", format!("HP: {hp}"), 0.3);
            if self.player.hp <= 0 {
                self.die();
                events.push(GameEvent::Died);
            }
        }

        if self.enemies_remaining() == 0 && self.dungeon.unlock_door() {
            log::info!("floor {} cleared, exit unlocked", self.floor);
            self.show_banner("ACCESS GRANTED", "Find the exit node", 0.9);
            events.push(GameEvent::DoorUnlocked);
        }
    }

    /// Starts a melee swing if off cooldown. Every living enemy inside the
    /// range and arc, with a clear line, takes damage and is knocked back.
    fn swing(&mut self, events: &mut Vec<GameEvent>) {
        if self.swing_cooldown > 0.0 {
            return;
        }
        let gp = &self.cfg.gameplay;
        self.swing_cooldown = gp.swing_cooldown;
        self.swing_timer = gp.swing_active;
        events.push(GameEvent::Swing);

        let p = self.player.pos;
        for e in self.enemies.iter_mut().filter(|e| e.alive) {
            if p.dist(e.pos) > gp.sword_range { continue; }
            let ang_to = p.angle_to(e.pos);
            if angle_diff(ang_to, self.player.a).abs() > gp.swing_arc / 2.0 { continue; }
            if !raycast_los(&self.dungeon.grid, p, e.pos, gp.sword_range + SWING_LOS_SLACK) { continue; }

            events.push(GameEvent::EnemyHit);
            if e.take_hit(&self.dungeon.grid, gp.damage, ang_to, gp.knockback) {
                events.push(GameEvent::EnemyKilled);
            }
        }
    }

    fn die(&mut self) {
        self.dead = true;
        let cleared = self.floor - 1;
        self.score = self.score.max(cleared);
        log::info!("player died on floor {}, {cleared} sectors cleared", self.floor);
        self.show_banner("FATAL ERROR", format!("Sectors cleared: {cleared}. Press R to reboot"), f32::INFINITY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        let mut cfg = Config::default();
        cfg.generator.width = 32;
        cfg.generator.height = 32;
        cfg
    }

    fn idle() -> Intents {
        Intents::default()
    }

    /// First enemy, moved `dist` along the player's heading.
    fn enemy_in_front(game: &mut Game, dist: f32) -> usize {
        let p = game.player.pos;
        let a = game.player.a;
        if game.enemies.is_empty() {
            game.enemies.push(Enemy::new(0.0, 0.0, 2));
        }
        let i = 0;
        game.enemies[i].pos = Vec2::new(p.x + a.cos() * dist, p.y + a.sin() * dist);
        i
    }

    #[test]
    fn new_game_starts_on_floor_one_with_enemies_away_from_spawn() {
        let game = Game::new(small_config(), 7);
        assert_eq!(game.floor, 1);
        assert_eq!(game.player.hp, 5);
        assert!(!game.dead);
        assert_eq!(game.dungeon.door_tile(), Tile::DoorLocked);
        assert!(game.enemies.len() <= 6);
        for e in &game.enemies {
            assert!(e.pos.dist(game.player.pos) >= 9.0);
            assert_eq!(game.dungeon.grid.tile_at(e.pos.x, e.pos.y), Tile::Floor);
            assert_eq!(e.hp, 2);
        }
        assert_eq!(game.banner().unwrap().title, "Sector 1");
    }

    #[test]
    fn same_seed_same_run() {
        let a = Game::new(small_config(), 99);
        let b = Game::new(small_config(), 99);
        assert_eq!(a.dungeon.grid, b.dungeon.grid);
        assert_eq!(a.player.a, b.player.a);
        let pa: Vec<Vec2> = a.enemies.iter().map(|e| e.pos).collect();
        let pb: Vec<Vec2> = b.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn swing_hits_enemy_in_front_and_respects_cooldown() {
        let mut game = Game::new(small_config(), 3);
        let i = enemy_in_front(&mut game, 0.8);
        let hp0 = game.enemies[i].hp;

        let attack = Intents { attack: true, ..idle() };
        let ev = game.update(0.01, &attack);
        assert!(ev.contains(&GameEvent::Swing));
        assert!(ev.contains(&GameEvent::EnemyHit));
        assert_eq!(game.enemies[i].hp, hp0 - 1);
        assert!(game.is_swinging());
        assert!(game.swing_t() > 0.9);

        // still cooling down
        let ev = game.update(0.01, &attack);
        assert!(!ev.contains(&GameEvent::Swing));
    }

    #[test]
    fn swing_misses_enemies_behind() {
        let mut game = Game::new(small_config(), 3);
        let i = enemy_in_front(&mut game, -0.8);
        let hp0 = game.enemies[i].hp;
        let ev = game.update(0.01, &Intents { attack: true, ..idle() });
        assert!(!ev.contains(&GameEvent::EnemyHit));
        assert_eq!(game.enemies[i].hp, hp0);
    }

    #[test]
    fn clearing_the_floor_unlocks_the_door_once() {
        let mut game = Game::new(small_config(), 11);
        for e in game.enemies.iter_mut() {
            e.alive = false;
        }
        let ev = game.update(0.01, &idle());
        assert!(ev.contains(&GameEvent::DoorUnlocked));
        assert!(game.dungeon.is_door_open());
        assert_eq!(game.banner().unwrap().title, "ACCESS GRANTED");

        let ev = game.update(0.01, &idle());
        assert!(!ev.contains(&GameEvent::DoorUnlocked));
        assert!(game.dungeon.is_door_open());
    }

    #[test]
    fn touching_the_open_door_goes_down_a_floor() {
        let mut game = Game::new(small_config(), 5);
        for e in game.enemies.iter_mut() {
            e.alive = false;
        }
        game.update(0.01, &idle());
        assert!(game.dungeon.is_door_open());

        game.player.pos = game.dungeon.door.pos;
        let ev = game.update(0.01, &idle());
        assert!(ev.contains(&GameEvent::FloorStarted(2)));
        assert_eq!(game.floor, 2);
        assert_eq!(game.score, 1);
        assert_eq!(game.dungeon.door_tile(), Tile::DoorLocked);
        assert_eq!(game.player.pos, game.dungeon.spawn);
    }

    #[test]
    fn enemies_wear_the_player_down_and_death_freezes_the_run() {
        let mut game = Game::new(small_config(), 21);
        let i = enemy_in_front(&mut game, 0.1);
        game.enemies.truncate(i + 1);
        game.player.hp = 2;

        let mut died = false;
        for _ in 0..100 {
            if game.update(0.03, &idle()).contains(&GameEvent::Died) {
                died = true;
                break;
            }
        }
        assert!(died);
        assert!(game.dead);
        assert_eq!(game.player.hp, 0);
        assert_eq!(game.banner().unwrap().title, "FATAL ERROR");

        // nothing moves once dead, restart brings it back
        let pos = game.player.pos;
        game.update(0.03, &Intents { forward: 1.0, ..idle() });
        assert_eq!(game.player.pos, pos);

        let ev = game.update(0.03, &Intents { restart: true, ..idle() });
        assert!(ev.contains(&GameEvent::FloorStarted(1)));
        assert!(!game.dead);
        assert_eq!(game.player.hp, 5);
    }

    #[test]
    fn toggles_flip_flags() {
        let mut game = Game::new(small_config(), 1);
        let dither = game.enable_dither;
        game.update(0.01, &Intents { toggle_map: true, toggle_dither: true, ..idle() });
        assert!(game.show_map);
        assert_eq!(game.enable_dither, !dither);
    }

    #[test]
    fn enemy_hp_grows_every_fourth_floor() {
        let mut game = Game::new(small_config(), 2);
        game.floor = 5;
        game.next_floor(false);
        assert!(game.enemies.iter().all(|e| e.hp == 3));
    }
}
