//! Ballistic trajectory simulation
//!
//! Steps a point projectile at a fixed 1/60 s timestep (semi-implicit Euler)
//! against the terrain bitmap and the living units. The whole flight is
//! computed up front; the engine replays it on its own clock.
//!
//! Per step, in priority order:
//! 1. leaving the field (left, right or bottom edge) ends the shot
//! 2. terrain contact bounces (if the weapon can) or impacts
//! 3. unit contact, for impact-fused weapons past the grace radius

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{first_solid_along, reflect_velocity, segment_aabb_intersection, terrain_normal};
use super::state::{Unit, UnitId};
use super::terrain::TerrainField;
use super::weapons::WeaponArchetype;
use crate::consts::*;
use crate::{aim_direction, ms_to_steps, steps_to_ms};

/// What happened at a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleEvent {
    Start,
    Flight,
    Bounce,
    Impact,
    HitUnit,
    Offscreen,
    Stopped,
}

impl SampleEvent {
    /// Ends the trajectory
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SampleEvent::Impact | SampleEvent::HitUnit | SampleEvent::Offscreen | SampleEvent::Stopped
        )
    }
}

/// One recorded step; sample `k` is taken after `k` steps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub pos: Vec2,
    /// Velocity after this step (post-reflection on bounces)
    pub vel: Vec2,
    /// Simulated seconds since launch
    pub t: f32,
    pub event: SampleEvent,
}

/// Full outcome of a launch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotResult {
    pub origin: Vec2,
    pub samples: Vec<TrajectorySample>,
    /// Terrain or unit contact point (none when the shot left the field or came to rest)
    pub impact: Option<Vec2>,
    pub hit_unit: Option<UnitId>,
    pub bounces: u32,
    /// Straight-line distance origin -> impact (0 without impact)
    pub distance: f32,
    /// Highest point reached, measured upward from the origin
    pub apex_height: f32,
    /// Simulated seconds until the last sample
    pub elapsed: f32,
    /// Integration steps taken
    pub steps: u32,
    /// Terminal tag
    pub end: SampleEvent,
}

impl ShotResult {
    /// Flight time in engine milliseconds
    pub fn flight_ms(&self) -> u64 {
        steps_to_ms(self.steps)
    }

    /// Where the projectile sits at the end of the recorded flight
    pub fn final_position(&self) -> Vec2 {
        self.samples.last().map_or(self.origin, |s| s.pos)
    }

    pub fn left_field(&self) -> bool {
        self.end == SampleEvent::Offscreen
    }

    /// Projectile position `ms` after launch, in flight or at rest.
    /// `None` once it has left the field.
    pub fn position_at_ms(&self, ms: u64) -> Option<Vec2> {
        let step = ms_to_steps(ms) as usize;
        let sample = self.samples.get(step).or(self.samples.last())?;
        if sample.event == SampleEvent::Offscreen {
            None
        } else {
            Some(sample.pos)
        }
    }
}

/// Simulate a launch from `origin` at `angle_deg` (0 = right, 90 = up) and
/// `power` in [0, 1]
pub fn simulate_shot(
    origin: Vec2,
    angle_deg: f32,
    power: f32,
    weapon: &WeaponArchetype,
    terrain: &TerrainField,
    units: &[Unit],
) -> ShotResult {
    let speed = power.clamp(0.0, 1.0) * weapon.max_velocity;
    let mut vel = aim_direction(angle_deg) * speed;
    let mut pos = origin;
    let mut min_y = origin.y;

    let mut samples = Vec::with_capacity(256);
    samples.push(TrajectorySample {
        pos,
        vel,
        t: 0.0,
        event: SampleEvent::Start,
    });

    let mut impact = None;
    let mut hit_unit = None;
    let mut bounces = 0;
    let mut end = SampleEvent::Stopped;
    let mut steps = 0;

    let field_w = terrain.width() as f32;
    let field_h = terrain.height() as f32;

    'flight: for step in 1..=MAX_SIM_STEPS {
        steps = step;
        let t = step as f32 * SIM_DT;

        vel.y += weapon.gravity * SIM_DT;
        let prev = pos;
        let next = pos + vel * SIM_DT;

        // 1. Out of bounds (above the top is allowed)
        if next.x < 0.0 || next.x > field_w || next.y > field_h {
            samples.push(TrajectorySample {
                pos: next,
                vel,
                t,
                event: SampleEvent::Offscreen,
            });
            end = SampleEvent::Offscreen;
            break;
        }

        // 2. Terrain
        if let Some(contact) = first_solid_along(terrain, prev, next) {
            let can_bounce =
                weapon.bounces && bounces < weapon.max_bounces && !weapon.explode_on_impact;
            if can_bounce {
                let cell = contact.point.floor();
                let normal = terrain_normal(terrain, cell.x as i32, cell.y as i32);
                vel = reflect_velocity(vel, normal) * weapon.bounce_decay;
                pos = contact.last_free + normal * BOUNCE_EPSILON;
                bounces += 1;
                min_y = min_y.min(pos.y);

                let event = if vel.length() < MIN_BOUNCE_SPEED {
                    SampleEvent::Stopped
                } else {
                    SampleEvent::Bounce
                };
                samples.push(TrajectorySample { pos, vel, t, event });
                if event == SampleEvent::Stopped {
                    end = event;
                    break;
                }
                continue;
            }

            impact = Some(contact.point);
            samples.push(TrajectorySample {
                pos: contact.point,
                vel,
                t,
                event: SampleEvent::Impact,
            });
            end = SampleEvent::Impact;
            break;
        }

        pos = next;
        min_y = min_y.min(pos.y);

        // 3. Units: test the whole step segment so fast shots cannot skip a box
        if weapon.explode_on_impact && pos.distance(origin) > GRACE_RADIUS {
            for unit in units.iter().filter(|u| u.is_alive()) {
                let bounds = unit.bounds().expanded(PROJECTILE_RADIUS);
                if let Some(hit) = segment_aabb_intersection(prev, pos, &bounds) {
                    impact = Some(hit.point);
                    hit_unit = Some(unit.id);
                    samples.push(TrajectorySample {
                        pos: hit.point,
                        vel,
                        t,
                        event: SampleEvent::HitUnit,
                    });
                    end = SampleEvent::HitUnit;
                    break 'flight;
                }
            }
        }

        samples.push(TrajectorySample {
            pos,
            vel,
            t,
            event: SampleEvent::Flight,
        });
    }

    // Step cap reached without a terminal event: the projectile stays where it is
    if let Some(last) = samples.last_mut()
        && !last.event.is_terminal()
        && last.event != SampleEvent::Start
    {
        last.event = SampleEvent::Stopped;
    }

    let elapsed = samples.last().map_or(0.0, |s| s.t);
    let distance = impact.map_or(0.0, |p: Vec2| p.distance(origin));

    log::debug!(
        "Shot from ({:.1}, {:.1}) at {:.1}° power {:.2}: {:?} after {} steps, {} bounces",
        origin.x,
        origin.y,
        angle_deg,
        power,
        end,
        steps,
        bounces
    );

    ShotResult {
        origin,
        samples,
        impact,
        hit_unit,
        bounces,
        distance,
        apex_height: origin.y - min_y,
        elapsed,
        steps,
        end,
    }
}
