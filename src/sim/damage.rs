//! Explosion damage and knockback

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Unit, UnitId};
use super::weapons::WeaponArchetype;
use crate::consts::*;

/// Knockback motion for the presentation layer to interpolate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knockback {
    pub from: Vec2,
    pub to: Vec2,
    pub duration_ms: u64,
}

/// Per-unit result of one explosion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageReport {
    pub unit: UnitId,
    /// Health removed
    pub damage: u32,
    pub distance: f32,
    /// Falloff percent at this distance (before the weapon's base damage)
    pub percent: f32,
    pub knockback_multiplier: f32,
    pub knockback: Knockback,
    pub killed: bool,
}

/// Falloff curve: 100 within 5 px of the center, then linear down to 20 at the radius
pub fn distance_to_damage_percent(distance: f32, radius: f32) -> f32 {
    if distance <= FULL_DAMAGE_DISTANCE {
        return 100.0;
    }
    if radius <= 0.0 {
        return 0.0;
    }
    (100.0 - distance * (DAMAGE_FALLOFF / radius)).max(0.0)
}

/// Health removed from a unit with `max_health` by an explosion of
/// `base_damage` percent at falloff `percent`
pub fn damage_for(max_health: u32, base_damage: f32, percent: f32) -> u32 {
    let effective = f64::from(base_damage) * f64::from(percent) / 100.0;
    (f64::from(max_health) * effective / 100.0).ceil().max(0.0) as u32
}

/// Knockback displacement away from `center`, clamped to the field
pub fn knockback_target(pos: Vec2, center: Vec2, percent: f32, multiplier: f32, field: Vec2) -> Vec2 {
    let magnitude = percent / 100.0 * BASE_KNOCKBACK * multiplier;
    let direction = (pos - center).normalize_or_zero();
    (pos + direction * magnitude).clamp(Vec2::ZERO, field)
}

/// Damage and push every living unit within `radius` of `center`
///
/// `field` is the (width, height) bound for knockback. Reports come back in
/// unit order; units taking zero damage are left untouched and unreported.
pub fn apply_explosion(
    center: Vec2,
    radius: f32,
    weapon: &WeaponArchetype,
    units: &mut [Unit],
    field: Vec2,
) -> Vec<DamageReport> {
    let mut reports = Vec::new();

    for unit in units.iter_mut().filter(|u| u.is_alive()) {
        let distance = unit.pos.distance(center);
        if distance > radius {
            continue;
        }

        let percent = distance_to_damage_percent(distance, radius);
        let damage = damage_for(unit.max_health, weapon.base_damage, percent);
        if damage == 0 {
            continue;
        }

        let applied = unit.take_damage(damage);
        let from = unit.pos;
        let to = knockback_target(from, center, percent, weapon.knockback_multiplier, field);
        unit.pos = to;

        log::debug!(
            "Unit {} hit by {} at {:.1} px: {}% falloff, {} damage",
            unit.id,
            weapon.name,
            distance,
            percent,
            applied
        );

        reports.push(DamageReport {
            unit: unit.id,
            damage: applied,
            distance,
            percent,
            knockback_multiplier: weapon.knockback_multiplier,
            knockback: Knockback {
                from,
                to,
                duration_ms: KNOCKBACK_DURATION_MS,
            },
            killed: !unit.is_alive(),
        });
    }

    reports
}
