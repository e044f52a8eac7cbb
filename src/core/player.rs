use crate::core::math::{Vec2, wrap_angle};

pub struct Player {
    pub pos: Vec2,
    pub a: f32,       // heading (yaw), (-pi, pi]
    pub hp: i32,
    pub radius: f32,  // collision probe distance
}

impl Player {
    pub fn new(x: f32, y: f32, angle: f32, hp: i32, radius: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            a: wrap_angle(angle),
            hp,
            radius,
        }
    }

    pub fn turn(&mut self, da: f32) {
        self.a = wrap_angle(self.a + da);
    }

    /// Walks along the heading (`forward`) and its right-hand normal
    /// (`strafe`), both in [-1, 1]. Returns whether the player moved at all.
    pub fn walk<F>(&mut self, forward: f32, strafe: f32, speed: f32, dt: f32, walkable: F) -> bool
    where
        F: Fn(f32, f32) -> bool,
    {
        if forward == 0.0 && strafe == 0.0 {
            return false;
        }
        let (s, c) = self.a.sin_cos();
        // right-hand normal is heading + pi/2
        let vx = (c * forward - s * strafe) * speed;
        let vy = (s * forward + c * strafe) * speed;
        try_move_with_slide(&mut self.pos, vx * dt, vy * dt, self.radius, walkable)
    }
}

/// Axis-separated move: x and y are tried independently so the mover slides
/// along walls. Each axis probes `r` ahead and behind on that axis only.
pub fn try_move_with_slide<F>(pos: &mut Vec2, dx: f32, dy: f32, r: f32, walkable: F) -> bool
where
    F: Fn(f32, f32) -> bool,
{
    let mut moved = false;
    let nx = pos.x + dx;
    if dx != 0.0 && walkable(nx + r, pos.y) && walkable(nx - r, pos.y) {
        pos.x = nx;
        moved = true;
    }
    let ny = pos.y + dy;
    if dy != 0.0 && walkable(pos.x, ny + r) && walkable(pos.x, ny - r) {
        pos.y = ny;
        moved = true;
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dungeon::TileGrid;

    fn room() -> TileGrid {
        TileGrid::from_rows(&[
            "#####",
            "#...#",
            "#...#",
            "#####",
        ])
    }

    #[test]
    fn walks_forward_and_strafes_right() {
        let grid = room();
        let free = |x: f32, y: f32| grid.tile_at(x, y).is_walkable();

        let mut p = Player::new(2.5, 1.5, 0.0, 5, 0.22);
        assert!(p.walk(1.0, 0.0, 1.0, 0.5, free));
        assert!((p.pos.x - 3.0).abs() < 1e-5 && (p.pos.y - 1.5).abs() < 1e-5);

        // facing +x, right is +y
        assert!(p.walk(0.0, 1.0, 1.0, 0.5, free));
        assert!((p.pos.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn slides_along_walls_instead_of_stopping() {
        let grid = room();
        let free = |x: f32, y: f32| grid.tile_at(x, y).is_walkable();
        let mut pos = Vec2::new(1.5, 1.5);
        // x blocked by the west wall, y free
        assert!(try_move_with_slide(&mut pos, -0.4, 0.3, 0.22, free));
        assert_eq!(pos.x, 1.5);
        assert!((pos.y - 1.8).abs() < 1e-5);

        // fully blocked
        let mut corner = Vec2::new(1.3, 1.3);
        assert!(!try_move_with_slide(&mut corner, -0.2, -0.2, 0.22, free));
    }

    #[test]
    fn turning_wraps() {
        let mut p = Player::new(0.0, 0.0, 3.0, 5, 0.22);
        p.turn(1.0);
        assert!(p.a < 0.0 && p.a > -std::f32::consts::PI);
        assert!(!p.walk(0.0, 0.0, 3.2, 0.1, |_, _| true));
    }
}
