//! Tile grid and procedural floor generation.
//!
//! A floor is a ring-walled grid of rectangular rooms chained together by
//! L-shaped corridors. The exit is a single locked door on the room farthest
//! (by walking distance) from spawn.
use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{GeneratorConfig, MIN_GRID};
use crate::core::math::Vec2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    Wall,
    Floor,
    DoorLocked,
    DoorOpen,
}

impl Tile {
    /// Blocks movement and sight.
    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Wall | Tile::DoorLocked)
    }

    #[inline]
    pub fn is_door(self) -> bool {
        matches!(self, Tile::DoorLocked | Tile::DoorOpen)
    }

    #[inline]
    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Floor | Tile::DoorOpen)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize, fill: Tile) -> Self {
        Self { width, height, tiles: vec![fill; width * height] }
    }

    /// Builds a grid from ASCII rows: `#` wall, `.` floor, `D` locked door,
    /// `O` open door. Anything else is wall; short rows are padded with wall.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(width, height, Tile::Wall);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let t = match ch {
                    '.' => Tile::Floor,
                    'D' => Tile::DoorLocked,
                    'O' => Tile::DoorOpen,
                    _ => Tile::Wall,
                };
                grid.set(x, y, t);
            }
        }
        grid
    }

    #[inline] pub fn width(&self) -> usize { self.width }
    #[inline] pub fn height(&self) -> usize { self.height }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Out-of-bounds reads are walls.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Tile {
        if self.in_bounds(x, y) {
            self.tiles[y as usize * self.width + x as usize]
        } else {
            Tile::Wall
        }
    }

    /// Tile under a continuous world position (tile units).
    #[inline]
    pub fn tile_at(&self, wx: f32, wy: f32) -> Tile {
        self.get(wx.floor() as i32, wy.floor() as i32)
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x] = tile;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        let w = self.width;
        self.tiles.iter().enumerate().map(move |(i, &t)| (i % w, i / w, t))
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    fn carve_rect(&mut self, x: usize, y: usize, w: usize, h: usize, tile: Tile) {
        for j in y..y + h {
            for i in x..x + w {
                self.set(i, j, tile);
            }
        }
    }

    /// Interior test used when digging: never touches the outer ring.
    #[inline]
    fn is_interior(&self, x: usize, y: usize) -> bool {
        x >= 1 && y >= 1 && x + 1 < self.width && y + 1 < self.height
    }

    fn dig_h(&mut self, ax: usize, bx: usize, y: usize) {
        for x in ax.min(bx)..=ax.max(bx) {
            if self.is_interior(x, y) { self.set(x, y, Tile::Floor); }
        }
    }

    fn dig_v(&mut self, ay: usize, by: usize, x: usize) {
        for y in ay.min(by)..=ay.max(by) {
            if self.is_interior(x, y) { self.set(x, y, Tile::Floor); }
        }
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let ch = match self.tiles[y * self.width + x] {
                    Tile::Wall => '#',
                    Tile::Floor => '.',
                    Tile::DoorLocked => 'D',
                    Tile::DoorOpen => 'O',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Room {
    #[inline] pub fn cx(&self) -> usize { self.x + self.w / 2 }
    #[inline] pub fn cy(&self) -> usize { self.y + self.h / 2 }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    /// Overlap test with both rectangles grown by one tile on every side,
    /// so accepted rooms never share a wall.
    pub fn overlaps_inflated(&self, other: &Room) -> bool {
        // inflated a: [x-1, x+w+1), compare on half-open spans
        let (ax0, ax1) = (self.x as i64 - 1, (self.x + self.w) as i64 + 1);
        let (ay0, ay1) = (self.y as i64 - 1, (self.y + self.h) as i64 + 1);
        let (bx0, bx1) = (other.x as i64 - 1, (other.x + other.w) as i64 + 1);
        let (by0, by1) = (other.y as i64 - 1, (other.y + other.h) as i64 + 1);
        !(ax1 <= bx0 || bx1 <= ax0 || ay1 <= by0 || by1 <= ay0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Door {
    pub tx: usize,
    pub ty: usize,
    /// Tile centre, for proximity checks.
    pub pos: Vec2,
    /// Floor tile on the far side of the door. `None` for the centre fallback.
    pub outside: Option<(usize, usize)>,
}

impl Door {
    fn at(tx: usize, ty: usize, outside: Option<(usize, usize)>) -> Self {
        Self { tx, ty, pos: Vec2::new(tx as f32 + 0.5, ty as f32 + 0.5), outside }
    }
}

/// Walking distance (4-connected, Floor only) from the spawn tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceMap {
    width: usize,
    height: usize,
    cells: Vec<Option<u32>>,
}

impl DistanceMap {
    /// `None` when unreachable or out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height { self.cells[y * self.width + x] } else { None }
    }

    pub fn max(&self) -> Option<u32> {
        self.cells.iter().flatten().copied().max()
    }
}

fn bfs_distances(grid: &TileGrid, sx: usize, sy: usize) -> DistanceMap {
    let (w, h) = (grid.width(), grid.height());
    let mut cells = vec![None; w * h];
    let mut q = VecDeque::new();
    if sx < w && sy < h {
        cells[sy * w + sx] = Some(0u32);
        q.push_back((sx, sy));
    }
    let dirs = [(1i32, 0i32), (-1, 0), (0, 1), (0, -1)];
    while let Some((x, y)) = q.pop_front() {
        let cd = cells[y * w + x].unwrap_or(0);
        for (dx, dy) in dirs {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if grid.get(nx, ny) != Tile::Floor { continue; }
            let (nx, ny) = (nx as usize, ny as usize);
            if cells[ny * w + nx].is_some() { continue; }
            cells[ny * w + nx] = Some(cd + 1);
            q.push_back((nx, ny));
        }
    }
    DistanceMap { width: w, height: h, cells }
}

/// Closest Floor tile to (x, y) by grid steps, ignoring walls on the way.
fn nearest_floor(grid: &TileGrid, x: usize, y: usize) -> Option<(usize, usize)> {
    let (w, h) = (grid.width(), grid.height());
    if x >= w || y >= h { return None; }
    let mut seen = vec![false; w * h];
    let mut q = VecDeque::from([(x, y)]);
    seen[y * w + x] = true;
    while let Some((cx, cy)) = q.pop_front() {
        if grid.get(cx as i32, cy as i32) == Tile::Floor {
            return Some((cx, cy));
        }
        for (dx, dy) in [(1i32, 0i32), (-1, 0), (0, 1), (0, -1)] {
            let nx = cx as i32 + dx;
            let ny = cy as i32 + dy;
            if !grid.in_bounds(nx, ny) { continue; }
            let i = ny as usize * w + nx as usize;
            if seen[i] { continue; }
            seen[i] = true;
            q.push_back((nx as usize, ny as usize));
        }
    }
    None
}

#[derive(Clone, Debug)]
pub struct Dungeon {
    pub grid: TileGrid,
    /// In creation order; `rooms[0]` is the spawn room.
    pub rooms: Vec<Room>,
    pub exit_room: usize,
    pub spawn: Vec2,
    pub door: Door,
    pub distances: DistanceMap,
}

impl Dungeon {
    pub fn door_tile(&self) -> Tile {
        self.grid.get(self.door.tx as i32, self.door.ty as i32)
    }

    pub fn is_door_open(&self) -> bool {
        self.door_tile() == Tile::DoorOpen
    }

    /// Flips the exit door Locked -> Open. Returns `true` only on the call that
    /// performs the transition; an open door stays open.
    pub fn unlock_door(&mut self) -> bool {
        if self.door_tile() != Tile::DoorLocked {
            return false;
        }
        self.grid.set(self.door.tx, self.door.ty, Tile::DoorOpen);
        true
    }
}

fn dig_corridor<R: Rng>(grid: &mut TileGrid, a: (usize, usize), b: (usize, usize), rng: &mut R) {
    let ((ax, ay), (bx, by)) = (a, b);
    if rng.gen_bool(0.5) {
        grid.dig_h(ax, bx, ay);
        grid.dig_v(ay, by, bx);
    } else {
        grid.dig_v(ay, by, ax);
        grid.dig_h(ax, bx, by);
    }
}

/// Generates one floor. Never fails: an empty room list falls back to a small
/// room near the corner, and a door with no valid wall spot goes on the exit
/// room's centre tile.
pub fn generate<R: Rng>(cfg: &GeneratorConfig, rng: &mut R) -> Dungeon {
    let width = cfg.width.max(MIN_GRID);
    let height = cfg.height.max(MIN_GRID);
    let room_min = cfg.room_min.min(cfg.room_max).max(1);
    let room_max = cfg.room_min.max(cfg.room_max).max(1);

    let mut grid = TileGrid::new(width, height, Tile::Wall);
    let mut rooms: Vec<Room> = Vec::new();

    for _ in 0..cfg.room_tries {
        let w = rng.gen_range(room_min..=room_max);
        let h = rng.gen_range(room_min..=room_max);
        // room + 1-tile margin must sit strictly inside the border
        if w + 3 > width || h + 3 > height { continue; }
        let x = rng.gen_range(1..=width - w - 2);
        let y = rng.gen_range(1..=height - h - 2);
        let room = Room { x, y, w, h };
        if rooms.iter().any(|r| r.overlaps_inflated(&room)) { continue; }

        grid.carve_rect(x, y, w, h, Tile::Floor);
        if let Some(prev) = rooms.last() {
            dig_corridor(&mut grid, (prev.cx(), prev.cy()), (room.cx(), room.cy()), rng);
        }
        rooms.push(room);
    }

    if rooms.is_empty() {
        log::warn!("no room fit in {width}x{height} after {} tries, using fallback room", cfg.room_tries);
        let room = Room { x: 2, y: 2, w: 4.min(width - 4), h: 4.min(height - 4) };
        grid.carve_rect(room.x, room.y, room.w, room.h, Tile::Floor);
        rooms.push(room);
    }

    let start = rooms[0];
    let spawn = Vec2::new(start.cx() as f32 + 0.5, start.cy() as f32 + 0.5);
    let (sx, sy) = nearest_floor(&grid, start.cx(), start.cy()).unwrap_or((start.cx(), start.cy()));
    let distances = bfs_distances(&grid, sx, sy);

    let mut exit_room: Option<(u32, usize)> = None;
    for (i, r) in rooms.iter().enumerate() {
        let Some(d) = distances.get(r.cx(), r.cy()) else { continue };
        if exit_room.map_or(true, |(best, _)| d > best) {
            exit_room = Some((d, i));
        }
    }
    let exit_room = match exit_room {
        Some((_, i)) => i,
        None => {
            log::warn!("no room reachable from spawn, exit falls back to the last room");
            rooms.len() - 1
        }
    };

    let door = place_door(&mut grid, &rooms[exit_room], rng);
    log::debug!(
        "floor {width}x{height}: {} rooms, exit room #{exit_room}, door at ({}, {}), max walk {:?}",
        rooms.len(),
        door.tx,
        door.ty,
        distances.max()
    );

    Dungeon { grid, rooms, exit_room, spawn, door, distances }
}

/// Puts the locked exit door in a wall tile bordering `room` whose inner
/// neighbour and outer neighbour are both Floor, so it joins the room to an
/// existing corridor. Falls back to the room centre.
pub fn place_door<R: Rng>(grid: &mut TileGrid, room: &Room, rng: &mut R) -> Door {
    // (wall x, wall y, inner x, inner y)
    let mut candidates: Vec<(i32, i32, i32, i32)> = Vec::with_capacity(2 * (room.w + room.h));
    let (rx, ry) = (room.x as i32, room.y as i32);
    let (rw, rh) = (room.w as i32, room.h as i32);
    for x in rx..rx + rw {
        candidates.push((x, ry - 1, x, ry)); // north
        candidates.push((x, ry + rh, x, ry + rh - 1)); // south
    }
    for y in ry..ry + rh {
        candidates.push((rx - 1, y, rx, y)); // west
        candidates.push((rx + rw, y, rx + rw - 1, y)); // east
    }
    candidates.shuffle(rng);

    let (w, h) = (grid.width() as i32, grid.height() as i32);
    for (cx, cy, nx, ny) in candidates {
        if cx < 1 || cy < 1 || cx >= w - 1 || cy >= h - 1 { continue; }
        if grid.get(cx, cy) != Tile::Wall { continue; }
        if grid.get(nx, ny) != Tile::Floor { continue; }
        // one step further out, through the wall
        let (ox, oy) = (cx + (cx - nx), cy + (cy - ny));
        if !grid.in_bounds(ox, oy) || grid.get(ox, oy) != Tile::Floor { continue; }

        grid.set(cx as usize, cy as usize, Tile::DoorLocked);
        return Door::at(cx as usize, cy as usize, Some((ox as usize, oy as usize)));
    }

    log::warn!("no wall spot for the exit door around room at ({}, {}), using its centre", room.x, room.y);
    grid.set(room.cx(), room.cy(), Tile::DoorLocked);
    Door::at(room.cx(), room.cy(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn floor(seed: u64) -> Dungeon {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate(&GeneratorConfig::default(), &mut rng)
    }

    #[test]
    fn border_is_always_wall() {
        for seed in 0..20 {
            let d = floor(seed);
            let (w, h) = (d.grid.width(), d.grid.height());
            for (x, y, t) in d.grid.iter() {
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    assert_eq!(t, Tile::Wall, "seed {seed}: border tile ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn every_floor_tile_is_reachable_from_spawn() {
        for seed in 0..20 {
            let d = floor(seed);
            for (x, y, t) in d.grid.iter() {
                if t == Tile::Floor {
                    assert!(d.distances.get(x, y).is_some(), "seed {seed}: ({x},{y}) unreachable\n{}", d.grid);
                }
            }
        }
    }

    #[test]
    fn exactly_one_locked_door_on_the_farthest_room() {
        for seed in 0..20 {
            let d = floor(seed);
            assert_eq!(d.grid.count(Tile::DoorLocked), 1, "seed {seed}");
            assert_eq!(d.grid.count(Tile::DoorOpen), 0);
            assert_eq!(d.door_tile(), Tile::DoorLocked);

            let exit = &d.rooms[d.exit_room];
            let exit_d = d.distances.get(exit.cx(), exit.cy()).unwrap();
            for r in &d.rooms {
                if let Some(rd) = d.distances.get(r.cx(), r.cy()) {
                    assert!(rd <= exit_d);
                }
            }
        }
    }

    #[test]
    fn door_connects_room_to_floor_outside() {
        for seed in 0..20 {
            let d = floor(seed);
            let Some((ox, oy)) = d.door.outside else { continue };
            assert_eq!(d.grid.get(ox as i32, oy as i32), Tile::Floor);
            let exit = &d.rooms[d.exit_room];
            assert!(!exit.contains(d.door.tx, d.door.ty));
        }
    }

    #[test]
    fn rooms_never_touch() {
        let d = floor(7);
        assert!(d.rooms.len() > 1);
        for (i, a) in d.rooms.iter().enumerate() {
            for b in &d.rooms[i + 1..] {
                assert!(!a.overlaps_inflated(b), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn spawn_sits_on_floor_in_first_room() {
        let d = floor(3);
        assert_eq!(d.grid.tile_at(d.spawn.x, d.spawn.y), Tile::Floor);
        assert!(d.rooms[0].contains(d.spawn.x as usize, d.spawn.y as usize));
        assert_eq!(d.distances.get(d.spawn.x as usize, d.spawn.y as usize), Some(0));
    }

    #[test]
    fn same_seed_same_floor() {
        assert_eq!(floor(42).grid, floor(42).grid);
        assert_ne!(floor(42).grid, floor(43).grid);
    }

    #[test]
    fn door_on_north_wall_opens_onto_corridor() {
        // 10x10, one room with a single corridor tile above its north wall
        let mut grid = TileGrid::from_rows(&[
            "##########",
            "##########",
            "####.#####",
            "##########",
            "###....###",
            "###....###",
            "###....###",
            "##########",
            "##########",
            "##########",
        ]);
        let room = Room { x: 3, y: 4, w: 4, h: 3 };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let door = place_door(&mut grid, &room, &mut rng);

        assert_eq!(door.ty, room.y - 1);
        assert_eq!(door.tx, 4);
        assert_eq!(grid.get(door.tx as i32, door.ty as i32 - 1), Tile::Floor);
        assert_eq!(grid.get(door.tx as i32, door.ty as i32), Tile::DoorLocked);
        assert_eq!(door.outside, Some((4, 2)));
        assert_eq!(door.pos, Vec2::new(4.5, 3.5));
    }

    #[test]
    fn door_without_corridor_falls_back_to_centre() {
        let mut grid = TileGrid::from_rows(&[
            "##########",
            "##########",
            "##########",
            "##########",
            "###....###",
            "###....###",
            "###....###",
            "##########",
            "##########",
            "##########",
        ]);
        let room = Room { x: 3, y: 4, w: 4, h: 3 };
        let door = place_door(&mut grid, &room, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!((door.tx, door.ty), (5, 5));
        assert_eq!(door.outside, None);
        assert_eq!(grid.get(5, 5), Tile::DoorLocked);
    }

    #[test]
    fn impossible_rooms_degrade_to_fallback_room() {
        let cfg = GeneratorConfig { width: 10, height: 10, room_tries: 50, room_min: 20, room_max: 30 };
        let d = generate(&cfg, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(d.rooms.len(), 1);
        assert_eq!(d.exit_room, 0);
        assert_eq!(d.grid.count(Tile::DoorLocked), 1);
        assert!(d.grid.count(Tile::Floor) > 0);
    }

    #[test]
    fn door_unlocks_exactly_once() {
        let mut d = floor(11);
        assert!(!d.is_door_open());
        assert!(d.unlock_door());
        assert!(d.is_door_open());
        assert!(!d.unlock_door());
        assert!(d.is_door_open());
        assert_eq!(d.grid.count(Tile::DoorOpen), 1);
        assert_eq!(d.grid.count(Tile::DoorLocked), 0);
    }

    #[test]
    fn out_of_bounds_reads_are_walls() {
        let grid = TileGrid::new(4, 4, Tile::Floor);
        assert_eq!(grid.get(-1, 0), Tile::Wall);
        assert_eq!(grid.get(0, 4), Tile::Wall);
        assert_eq!(grid.tile_at(1.5, 1.5), Tile::Floor);
        assert_eq!(grid.tile_at(-0.5, 1.5), Tile::Wall);
    }
}
