//! Collision geometry
//!
//! Pure, stateless helpers: segment tests against unit boxes (so fast shots
//! cannot tunnel through a unit inside one step), segment marching against the
//! terrain bitmap, and surface normals for bounce reflection.

use glam::Vec2;

use super::terrain::TerrainField;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Grow on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }
}

/// Where a segment first enters a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Fraction along the segment, in [0, 1]
    pub t: f32,
    pub point: Vec2,
}

/// Segment vs. box (slab method). A segment starting inside hits at t = 0.
pub fn segment_aabb_intersection(from: Vec2, to: Vec2, aabb: &Aabb) -> Option<SegmentHit> {
    let d = to - from;
    let mut t_min = 0.0_f32;
    let mut t_max = 1.0_f32;

    for axis in 0..2 {
        let (o, dir, lo, hi) = (from[axis], d[axis], aabb.min[axis], aabb.max[axis]);
        if dir.abs() < f32::EPSILON {
            // Parallel: must already lie within the slab
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir;
        let mut t0 = (lo - o) * inv;
        let mut t1 = (hi - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    Some(SegmentHit {
        t: t_min,
        point: from + d * t_min,
    })
}

/// Segment vs. segment; returns the fraction along `a` and the crossing point
pub fn segment_segment_intersection(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> Option<SegmentHit> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denom = r.perp_dot(s);
    if denom.abs() < f32::EPSILON {
        // Parallel or collinear: treated as no crossing
        return None;
    }
    let qp = b0 - a0;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(SegmentHit {
            t,
            point: a0 + r * t,
        })
    } else {
        None
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Surface normal at a solid cell from its 4-neighbor pattern
///
/// Points from solid toward empty. Falls back to straight up when the
/// pattern is symmetric (fully enclosed or isolated cell).
pub fn terrain_normal(terrain: &TerrainField, x: i32, y: i32) -> Vec2 {
    let solid = |dx: i32, dy: i32| if terrain.is_solid(x + dx, y + dy) { 1.0 } else { 0.0 };
    let n = Vec2::new(solid(-1, 0) - solid(1, 0), solid(0, -1) - solid(0, 1));
    if n == Vec2::ZERO {
        Vec2::NEG_Y
    } else {
        n.normalize()
    }
}

/// Contact found by marching a segment through the terrain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainContact {
    /// First sampled point inside a solid cell
    pub point: Vec2,
    /// Last sampled point that was still in empty space
    pub last_free: Vec2,
}

/// Walk `from -> to` in steps of at most one pixel and report the first solid sample
///
/// `from` itself is assumed free and is not tested.
pub fn first_solid_along(terrain: &TerrainField, from: Vec2, to: Vec2) -> Option<TerrainContact> {
    let delta = to - from;
    let samples = delta.length().ceil().max(1.0) as u32;
    let mut last_free = from;
    for i in 1..=samples {
        let p = from + delta * (i as f32 / samples as f32);
        if terrain.is_solid_at(p) {
            return Some(TerrainContact {
                point: p,
                last_free,
            });
        }
        last_free = p;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec2::new(10.0, 10.0), Vec2::new(20.0, 20.0))
    }

    #[test]
    fn test_segment_crossing_box() {
        // Long segment passes straight through; both endpoints are outside
        let hit = segment_aabb_intersection(Vec2::new(0.0, 15.0), Vec2::new(100.0, 15.0), &unit_box())
            .unwrap();
        assert!((hit.t - 0.1).abs() < 1e-5);
        assert!((hit.point.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_segment_missing_box() {
        assert!(
            segment_aabb_intersection(Vec2::new(0.0, 0.0), Vec2::new(100.0, 5.0), &unit_box())
                .is_none()
        );
        // Stops short
        assert!(
            segment_aabb_intersection(Vec2::new(0.0, 15.0), Vec2::new(9.0, 15.0), &unit_box())
                .is_none()
        );
        // Vertical segment beside the box
        assert!(
            segment_aabb_intersection(Vec2::new(25.0, 0.0), Vec2::new(25.0, 40.0), &unit_box())
                .is_none()
        );
    }

    #[test]
    fn test_segment_starting_inside() {
        let hit = segment_aabb_intersection(Vec2::new(15.0, 15.0), Vec2::new(50.0, 50.0), &unit_box())
            .unwrap();
        assert_eq!(hit.t, 0.0);
    }

    #[test]
    fn test_segment_segment() {
        let hit = segment_segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        )
        .unwrap();
        assert!((hit.point - Vec2::new(5.0, 5.0)).length() < 1e-4);

        assert!(
            segment_segment_intersection(
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(10.0, 1.0),
            )
            .is_none()
        );
    }

    #[test]
    fn test_reflect_velocity() {
        // Falling onto a floor (normal pointing up)
        let reflected = reflect_velocity(Vec2::new(30.0, 100.0), Vec2::NEG_Y);
        assert!((reflected - Vec2::new(30.0, -100.0)).length() < 1e-4);
    }

    #[test]
    fn test_terrain_normals() {
        let mut t = TerrainField::new(20, 20).unwrap();
        for y in 10..20 {
            for x in 0..20 {
                t.set_pixel(x, y, true);
            }
        }
        // Flat surface: up
        assert_eq!(terrain_normal(&t, 5, 10), Vec2::NEG_Y);
        // Buried cell: symmetric, defaults to up
        assert_eq!(terrain_normal(&t, 5, 15), Vec2::NEG_Y);

        // Face of a cliff rising on the right: normal points left
        for y in 5..10 {
            for x in 12..20 {
                t.set_pixel(x, y, true);
            }
        }
        assert_eq!(terrain_normal(&t, 12, 7), Vec2::NEG_X);

        // Corner of the cliff top: diagonal, unit length
        let n = terrain_normal(&t, 12, 5);
        assert!(n.x < 0.0 && n.y < 0.0);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_first_solid_along_does_not_tunnel() {
        let mut t = TerrainField::new(100, 100).unwrap();
        // One-pixel wall
        for y in 0..100 {
            t.set_pixel(50, y, true);
        }
        // 80 px in one step would skip the wall with endpoint sampling
        let contact = first_solid_along(&t, Vec2::new(10.5, 20.5), Vec2::new(90.5, 20.5)).unwrap();
        assert_eq!(contact.point.x.floor(), 50.0);
        assert!(!t.is_solid_at(contact.last_free));
        assert!(first_solid_along(&t, Vec2::new(10.5, 20.5), Vec2::new(40.5, 20.5)).is_none());
    }
}
