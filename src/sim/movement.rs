//! Unit movement on the terrain bitmap: walking, jumping and settling
//!
//! A unit stands when the cell at its feet row is solid and the cell above is
//! empty. All functions are pure queries over the terrain; the engine applies
//! the returned positions.

use glam::Vec2;

use super::state::{Facing, Unit, UnitId};
use super::terrain::TerrainField;
use crate::consts::*;

/// Feet height where a unit at `x` comes to rest when let go at `feet_y`
///
/// Drops to the first solid cell at or below the feet, or lifts an embedded
/// unit to the top of the solid run it is stuck in. With no ground below the
/// result lies past the bottom edge, so the unit is picked up as fallen out.
pub fn resting_y(terrain: &TerrainField, x: f32, feet_y: f32) -> f32 {
    let col = (x.floor() as i32).clamp(0, terrain.width() as i32 - 1);
    let row = feet_y.floor() as i32;

    if terrain.is_solid(col, row - 1) {
        let mut top = row - 1;
        while top > 0 && terrain.is_solid(col, top - 1) {
            top -= 1;
        }
        return top as f32;
    }

    let ground = terrain.ground_below(col, row);
    if ground >= terrain.height() {
        terrain.height() as f32 + UNIT_HEIGHT
    } else {
        ground as f32
    }
}

/// Presentation time for a vertical drop
pub fn fall_duration_ms(distance: f32) -> u64 {
    (distance.abs() / FALL_SPEED * 1000.0).round() as u64
}

/// Below the bottom edge
pub fn is_out_of_bounds(unit: &Unit, terrain: &TerrainField) -> bool {
    unit.pos.y > terrain.height() as f32
}

/// Any solid cell in the body column above `feet` (feet row excluded)
fn body_blocked(terrain: &TerrainField, feet: Vec2) -> bool {
    let col = feet.x.floor() as i32;
    let row = feet.y.floor() as i32;
    (1..=UNIT_HEIGHT as i32).any(|dy| terrain.is_solid(col, row - dy))
}

/// Next position after one walking step, or `None` when the step is refused
///
/// Drops and rises up to `MAX_STEP_UP` are always taken. Steeper rises need
/// the gradient over `SLOPE_BASELINE` to stay under `MAX_SLOPE_DEG` and a free
/// body column above the destination.
pub fn walk_step(terrain: &TerrainField, pos: Vec2, direction: Facing) -> Option<Vec2> {
    let nx = pos.x + direction.sign() * MOVE_STEP;
    if nx < 0.0 || nx >= terrain.width() as f32 {
        return None;
    }

    let dest_y = resting_y(terrain, nx, pos.y);
    let rise = pos.y - dest_y;
    if rise <= MAX_STEP_UP {
        return Some(Vec2::new(nx, dest_y));
    }

    let far_x = (pos.x + direction.sign() * SLOPE_BASELINE).clamp(0.0, terrain.width() as f32 - 1.0);
    let far_rise = pos.y - resting_y(terrain, far_x, pos.y);
    let max_gradient = MAX_SLOPE_DEG.to_radians().tan();
    if rise.max(far_rise) / SLOPE_BASELINE > max_gradient {
        return None;
    }

    let dest = Vec2::new(nx, dest_y);
    if body_blocked(terrain, dest) {
        return None;
    }
    Some(dest)
}

/// Planned jump
#[derive(Debug, Clone, PartialEq)]
pub struct JumpPath {
    /// Clear arc samples, starting at the take-off point
    pub arc: Vec<Vec2>,
    /// Where the unit ends up after falling from the last clear sample
    pub landing: Vec2,
    pub duration_ms: u64,
}

/// Fixed parabolic hop in the facing direction
///
/// The arc is cut at the first sample where the body would overlap terrain;
/// the unit then drops straight down from the last clear sample. Horizontal
/// travel is clamped to the field.
pub fn jump_path(terrain: &TerrainField, pos: Vec2, facing: Facing) -> JumpPath {
    let max_x = terrain.width() as f32 - 1.0;
    let dx = JUMP_DX * facing.sign();

    let mut arc = vec![pos];
    for i in 1..=JUMP_STEPS {
        let t = i as f32 / JUMP_STEPS as f32;
        let p = Vec2::new(
            (pos.x + dx * t).clamp(0.0, max_x),
            pos.y - 4.0 * JUMP_APEX * t * (1.0 - t),
        );
        if body_blocked(terrain, p) {
            break;
        }
        arc.push(p);
    }

    let last = arc.last().copied().unwrap_or(pos);
    let landing = Vec2::new(last.x, resting_y(terrain, last.x, last.y));
    let airborne = JUMP_DURATION_MS * (arc.len() as u64 - 1) / u64::from(JUMP_STEPS);

    JumpPath {
        arc,
        landing,
        duration_ms: airborne + fall_duration_ms(landing.y - last.y),
    }
}

/// Drop every living unit onto the surface under it
///
/// Returns `(unit, from, to)` for each unit that moved, in unit order.
pub fn settle_units(terrain: &TerrainField, units: &mut [Unit]) -> Vec<(UnitId, Vec2, Vec2)> {
    let mut moved = Vec::new();
    for unit in units.iter_mut().filter(|u| u.is_alive()) {
        let y = resting_y(terrain, unit.pos.x, unit.pos.y);
        if y != unit.pos.y {
            let from = unit.pos;
            unit.pos.y = y;
            moved.push((unit.id, from, unit.pos));
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 200x150 field, flat ground at row 100
    fn flat() -> TerrainField {
        let mut t = TerrainField::new(200, 150).unwrap();
        fill(&mut t, 0..200, 100..150);
        t
    }

    fn fill(t: &mut TerrainField, xs: std::ops::Range<i32>, ys: std::ops::Range<i32>) {
        for y in ys {
            for x in xs.clone() {
                t.set_pixel(x, y, true);
            }
        }
    }

    #[test]
    fn test_resting_y() {
        let mut t = flat();
        assert_eq!(resting_y(&t, 50.0, 100.0), 100.0);
        assert_eq!(resting_y(&t, 50.0, 40.0), 100.0);
        // Embedded in the ground: lifted to the surface
        assert_eq!(resting_y(&t, 50.0, 120.0), 100.0);
        // Hole through to the bottom: past the edge
        for y in 100..150 {
            t.set_pixel(10, y, false);
        }
        assert_eq!(resting_y(&t, 10.5, 100.0), 150.0 + UNIT_HEIGHT);
    }

    #[test]
    fn test_walk_flat() {
        let t = flat();
        let to = walk_step(&t, Vec2::new(50.0, 100.0), Facing::Right).unwrap();
        assert_eq!(to, Vec2::new(52.0, 100.0));
        let to = walk_step(&t, Vec2::new(50.0, 100.0), Facing::Left).unwrap();
        assert_eq!(to, Vec2::new(48.0, 100.0));
    }

    #[test]
    fn test_walk_stays_inside_field() {
        let t = flat();
        assert!(walk_step(&t, Vec2::new(199.0, 100.0), Facing::Right).is_none());
        assert!(walk_step(&t, Vec2::new(1.0, 100.0), Facing::Left).is_none());
    }

    #[test]
    fn test_walk_small_step_and_ledge() {
        let mut t = flat();
        // 3 px step: always fine
        fill(&mut t, 54..200, 97..100);
        assert_eq!(walk_step(&t, Vec2::new(52.0, 100.0), Facing::Right), Some(Vec2::new(54.0, 97.0)));

        // 4 px ledge over a gentle baseline
        let mut t = flat();
        fill(&mut t, 54..200, 96..100);
        assert_eq!(walk_step(&t, Vec2::new(52.0, 100.0), Facing::Right), Some(Vec2::new(54.0, 96.0)));
    }

    #[test]
    fn test_walk_blocked_by_wall() {
        let mut t = flat();
        fill(&mut t, 54..200, 0..100);
        assert!(walk_step(&t, Vec2::new(52.0, 100.0), Facing::Right).is_none());
        // Walking away is fine
        assert!(walk_step(&t, Vec2::new(52.0, 100.0), Facing::Left).is_some());
    }

    #[test]
    fn test_walk_blocked_by_overhang() {
        let mut t = flat();
        fill(&mut t, 54..200, 96..100);
        fill(&mut t, 54..200, 80..86);
        assert!(walk_step(&t, Vec2::new(52.0, 100.0), Facing::Right).is_none());
    }

    #[test]
    fn test_walk_off_edge_drops() {
        let mut t = flat();
        fill(&mut t, 0..52, 90..100);
        let to = walk_step(&t, Vec2::new(50.0, 90.0), Facing::Right).unwrap();
        assert_eq!(to, Vec2::new(52.0, 100.0));
    }

    #[test]
    fn test_jump_flat() {
        let t = flat();
        let path = jump_path(&t, Vec2::new(50.0, 100.0), Facing::Right);
        assert_eq!(path.arc.len() as u32, JUMP_STEPS + 1);
        assert!((path.landing.x - 100.0).abs() < 1e-3);
        assert_eq!(path.landing.y, 100.0);
        assert_eq!(path.duration_ms, JUMP_DURATION_MS);
        // Apex halfway
        let mid = path.arc[JUMP_STEPS as usize / 2];
        assert!((mid.y - (100.0 - JUMP_APEX)).abs() < 1e-3);
    }

    #[test]
    fn test_jump_truncated_by_wall() {
        let mut t = flat();
        fill(&mut t, 70..200, 0..100);
        let path = jump_path(&t, Vec2::new(50.0, 100.0), Facing::Right);
        assert!((path.arc.len() as u32) < JUMP_STEPS + 1);
        assert!(path.landing.x < 70.0);
        assert_eq!(path.landing.y, 100.0);
    }

    #[test]
    fn test_jump_clamped_at_edge() {
        let t = flat();
        let path = jump_path(&t, Vec2::new(190.0, 100.0), Facing::Right);
        assert_eq!(path.landing, Vec2::new(199.0, 100.0));
        let path = jump_path(&t, Vec2::new(10.0, 100.0), Facing::Left);
        assert_eq!(path.landing, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_settle_after_excavation() {
        let mut t = flat();
        let mut units = vec![
            Unit::new(0, 0, 1, Vec2::new(50.0, 100.0), 100),
            Unit::new(1, 1, 1, Vec2::new(150.0, 100.0), 100),
        ];
        t.excavate(Vec2::new(50.0, 100.0), 20.0);
        let moved = settle_units(&t, &mut units);
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].0, 0);
        assert_eq!(units[0].pos.y, 121.0);
        assert_eq!(units[1].pos.y, 100.0);
        assert!(!is_out_of_bounds(&units[0], &t));
    }
}
