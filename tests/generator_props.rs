//! Floor generator properties over random seeds and shapes.

use std::collections::VecDeque;

use data_dungeon::config::GeneratorConfig;
use data_dungeon::core::dungeon::{Tile, TileGrid, generate};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn shape() -> impl Strategy<Value = GeneratorConfig> {
    (7usize..56, 7usize..56, 0u32..160, 1usize..6, 0usize..7).prop_map(|(width, height, room_tries, room_min, extra)| {
        GeneratorConfig { width, height, room_tries, room_min, room_max: room_min + extra }
    })
}

/// Walkable tiles reachable from (sx, sy), doors included.
fn flood(grid: &TileGrid, sx: usize, sy: usize) -> Vec<bool> {
    let w = grid.width();
    let mut seen = vec![false; w * grid.height()];
    let mut q = VecDeque::from([(sx as i32, sy as i32)]);
    seen[sy * w + sx] = true;
    while let Some((x, y)) = q.pop_front() {
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let (nx, ny) = (x + dx, y + dy);
            if grid.get(nx, ny) == Tile::Wall { continue; }
            let i = ny as usize * w + nx as usize;
            if !seen[i] {
                seen[i] = true;
                q.push_back((nx, ny));
            }
        }
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn border_ring_is_always_wall(cfg in shape(), seed in any::<u64>()) {
        let d = generate(&cfg, &mut ChaCha8Rng::seed_from_u64(seed));
        let g = &d.grid;
        for (x, y, t) in g.iter() {
            if x == 0 || y == 0 || x + 1 == g.width() || y + 1 == g.height() {
                prop_assert_eq!(t, Tile::Wall, "border tile ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn exactly_one_locked_door(cfg in shape(), seed in any::<u64>()) {
        let d = generate(&cfg, &mut ChaCha8Rng::seed_from_u64(seed));
        prop_assert_eq!(d.grid.count(Tile::DoorLocked), 1);
        prop_assert_eq!(d.grid.count(Tile::DoorOpen), 0);
        prop_assert_eq!(d.door_tile(), Tile::DoorLocked);
        if let Some((ox, oy)) = d.door.outside {
            prop_assert_eq!(d.grid.get(ox as i32, oy as i32), Tile::Floor);
        }
    }

    #[test]
    fn every_floor_tile_is_reachable_from_spawn(cfg in shape(), seed in any::<u64>()) {
        let d = generate(&cfg, &mut ChaCha8Rng::seed_from_u64(seed));
        for (x, y, t) in d.grid.iter() {
            if t == Tile::Floor {
                prop_assert!(d.distances.get(x, y).is_some(), "floor ({}, {}) unreachable", x, y);
            }
        }
    }

    #[test]
    fn door_is_reachable_by_walking(cfg in shape(), seed in any::<u64>()) {
        let d = generate(&cfg, &mut ChaCha8Rng::seed_from_u64(seed));
        let start = d.grid.iter().find(|&(_, _, t)| t == Tile::Floor);
        prop_assume!(start.is_some() && d.door.outside.is_some());
        let (sx, sy, _) = start.unwrap();
        let seen = flood(&d.grid, sx, sy);
        prop_assert!(seen[d.door.ty * d.grid.width() + d.door.tx]);
    }

    #[test]
    fn rooms_keep_a_wall_between_them(cfg in shape(), seed in any::<u64>()) {
        let d = generate(&cfg, &mut ChaCha8Rng::seed_from_u64(seed));
        prop_assert!(!d.rooms.is_empty());
        for (i, a) in d.rooms.iter().enumerate() {
            for b in &d.rooms[i + 1..] {
                prop_assert!(!a.overlaps_inflated(b), "{:?} touches {:?}", a, b);
            }
        }
        let spawn_room = d.rooms[0];
        prop_assert!(spawn_room.contains(d.spawn.x as usize, d.spawn.y as usize));
    }

    #[test]
    fn exit_room_is_the_farthest_reachable(cfg in shape(), seed in any::<u64>()) {
        let d = generate(&cfg, &mut ChaCha8Rng::seed_from_u64(seed));
        let exit = d.rooms[d.exit_room];
        if let Some(best) = d.distances.get(exit.cx(), exit.cy()) {
            for r in &d.rooms {
                if let Some(dist) = d.distances.get(r.cx(), r.cy()) {
                    prop_assert!(dist <= best);
                }
            }
        }
    }
}
