//! Grid raycasting: one DDA ray per screen column, plus a cheap
//! point-to-point line-of-sight test for gameplay.
use crate::core::dungeon::{Tile, TileGrid};
use crate::core::math::Vec2;

/// Which grid boundary the ray crossed last.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// Stepped along x (hit a vertical grid line).
    X,
    /// Stepped along y (hit a horizontal grid line). Drawn darker.
    Y,
}

/// One depth-buffer entry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColumnHit {
    /// Distance to the hit, never below 1e-4. Along the ray for `cast_ray`,
    /// along the camera axis (perpendicular) once stored by `cast_columns`.
    pub dist: f32,
    pub side: Side,
    pub tile: Tile,
    /// Fractional position along the wall face, [0, 1).
    pub wall_x: f32,
    pub ray_angle: f32,
}

const MIN_DIST: f32 = 0.0001;

#[inline]
fn nonzero(v: f32) -> f32 {
    if v == 0.0 { 1e-9 } else { v }
}

/// Camera-plane offset in [-1, 1] for column `x` of `columns`.
#[inline]
pub fn camera_x(x: usize, columns: usize) -> f32 {
    if columns <= 1 {
        return 0.0;
    }
    2.0 * x as f32 / (columns - 1) as f32 - 1.0
}

/// Casts one ray and returns what it hit. A ray that runs out of step budget
/// (`max_dist * 4` cells) reports a wall where it stopped.
pub fn cast_ray(grid: &TileGrid, pos: Vec2, ray_angle: f32, max_dist: f32) -> ColumnHit {
    let dir_x = ray_angle.cos();
    let dir_y = ray_angle.sin();

    let mut map_x = pos.x.floor() as i32;
    let mut map_y = pos.y.floor() as i32;

    let delta_x = (1.0 / nonzero(dir_x)).abs();
    let delta_y = (1.0 / nonzero(dir_y)).abs();

    let (step_x, mut side_x) = if dir_x < 0.0 {
        (-1, (pos.x - map_x as f32) * delta_x)
    } else {
        (1, (map_x as f32 + 1.0 - pos.x) * delta_x)
    };
    let (step_y, mut side_y) = if dir_y < 0.0 {
        (-1, (pos.y - map_y as f32) * delta_y)
    } else {
        (1, (map_y as f32 + 1.0 - pos.y) * delta_y)
    };

    let mut side = Side::X;
    let mut tile = Tile::Wall;
    let mut budget = (max_dist * 4.0).max(1.0) as u32;
    let mut hit = false;

    while budget > 0 {
        budget -= 1;
        if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            side = Side::X;
        } else {
            side_y += delta_y;
            map_y += step_y;
            side = Side::Y;
        }
        // fuera del mapa: cuenta como pared
        if !grid.in_bounds(map_x, map_y) {
            tile = Tile::Wall;
            hit = true;
            break;
        }
        tile = grid.get(map_x, map_y);
        if tile.is_solid() || tile == Tile::DoorOpen {
            hit = true;
            break;
        }
    }
    if !hit {
        tile = Tile::Wall;
    }

    // distance along the (unit) ray to the crossed boundary
    let t = match side {
        Side::X => (map_x as f32 - pos.x + (1 - step_x) as f32 / 2.0) / nonzero(dir_x),
        Side::Y => (map_y as f32 - pos.y + (1 - step_y) as f32 / 2.0) / nonzero(dir_y),
    };
    let dist = t.max(MIN_DIST);

    let mut wall_x = match side {
        Side::X => pos.y + dist * dir_y,
        Side::Y => pos.x + dist * dir_x,
    };
    wall_x -= wall_x.floor();

    ColumnHit { dist, side, tile, wall_x, ray_angle }
}

/// Fills `zbuffer` with one hit per column. Ray angles use
/// `atan(camera_x * tan(fov/2))` so the projection stays rectilinear, and the
/// stored distance is projected onto the view axis to avoid fisheye.
pub fn cast_columns(
    grid: &TileGrid,
    pos: Vec2,
    angle: f32,
    columns: usize,
    fov: f32,
    max_dist: f32,
    zbuffer: &mut Vec<ColumnHit>,
) {
    let tan_half = (fov * 0.5).tan();
    zbuffer.clear();
    zbuffer.extend((0..columns).map(|x| {
        let offset = (camera_x(x, columns) * tan_half).atan();
        let mut hit = cast_ray(grid, pos, angle + offset, max_dist);
        hit.dist = (hit.dist * offset.cos()).max(MIN_DIST);
        hit
    }));
}

/// Line of sight between two points by sampling the segment 10 times per
/// tile. Fails past `max_dist`, off the grid, or on any solid sample.
///
/// Point sampling can slip through the corner of a wall when the segment
/// grazes it; gameplay tolerances are coarse enough that this is accepted.
pub fn raycast_los(grid: &TileGrid, from: Vec2, to: Vec2, max_dist: f32) -> bool {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dist = dx.hypot(dy);
    if dist > max_dist {
        return false;
    }
    let steps = (dist * 10.0).ceil() as u32;
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let x = (from.x + dx * t).floor() as i32;
        let y = (from.y + dy * t).floor() as i32;
        if !grid.in_bounds(x, y) || grid.get(x, y).is_solid() {
            return false;
        }
    }
    true
}
