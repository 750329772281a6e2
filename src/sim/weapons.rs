//! Weapon archetypes
//!
//! Static, data-driven table. Behavior differences between weapons come from
//! these records only; nothing in the engine matches on a specific weapon.

use serde::{Deserialize, Serialize};

/// Weapon identifier (stable order for inventories and menus)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    DungBall,
    Pistol,
    Grenade,
    Dynamite,
    Bazooka,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 5] = [
        WeaponKind::DungBall,
        WeaponKind::Pistol,
        WeaponKind::Grenade,
        WeaponKind::Dynamite,
        WeaponKind::Bazooka,
    ];

    /// Archetype record for this weapon
    pub fn archetype(self) -> &'static WeaponArchetype {
        match self {
            WeaponKind::DungBall => &CATALOG[0],
            WeaponKind::Pistol => &CATALOG[1],
            WeaponKind::Grenade => &CATALOG[2],
            WeaponKind::Dynamite => &CATALOG[3],
            WeaponKind::Bazooka => &CATALOG[4],
        }
    }
}

/// How a weapon leaves the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchKind {
    /// Parabolic arc
    Throw,
    /// Fast, flat trajectory
    Shoot,
    /// Dropped at the unit's feet with a fuse; no trajectory
    Place,
}

/// Ammo count with an unlimited sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ammo {
    Unlimited,
    Limited(u32),
}

impl Ammo {
    pub fn is_available(self) -> bool {
        match self {
            Ammo::Unlimited => true,
            Ammo::Limited(n) => n > 0,
        }
    }
}

/// Immutable weapon record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponArchetype {
    pub kind: WeaponKind,
    pub name: &'static str,
    /// Percent of max health dealt at the explosion center
    pub base_damage: f32,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Launch speed at full power (px/s)
    pub max_velocity: f32,
    pub explosion_radius: f32,
    pub bounces: bool,
    /// Speed multiplier applied on each bounce
    pub bounce_decay: f32,
    pub max_bounces: u32,
    pub launch: LaunchKind,
    pub explode_on_impact: bool,
    pub delayed_explosion: bool,
    /// Fuse length, counted from launch or placement
    pub explosion_delay_ms: u64,
    pub knockback_multiplier: f32,
    pub max_ammo: Ammo,
    pub starting_ammo: Ammo,
}

/// The weapon table, indexed in `WeaponKind` order
pub static CATALOG: [WeaponArchetype; 5] = [
    WeaponArchetype {
        kind: WeaponKind::DungBall,
        name: "Dung Ball",
        base_damage: 30.0,
        gravity: 980.0,
        max_velocity: 800.0,
        explosion_radius: 40.0,
        bounces: false,
        bounce_decay: 0.0,
        max_bounces: 0,
        launch: LaunchKind::Throw,
        explode_on_impact: true,
        delayed_explosion: false,
        explosion_delay_ms: 0,
        knockback_multiplier: 1.0,
        max_ammo: Ammo::Unlimited,
        starting_ammo: Ammo::Unlimited,
    },
    WeaponArchetype {
        kind: WeaponKind::Pistol,
        name: "Pistol",
        base_damage: 45.0,
        gravity: 245.0,
        max_velocity: 1500.0,
        explosion_radius: 20.0,
        bounces: false,
        bounce_decay: 0.0,
        max_bounces: 0,
        launch: LaunchKind::Shoot,
        explode_on_impact: true,
        delayed_explosion: false,
        explosion_delay_ms: 0,
        knockback_multiplier: 0.5,
        max_ammo: Ammo::Limited(20),
        starting_ammo: Ammo::Limited(10),
    },
    WeaponArchetype {
        kind: WeaponKind::Grenade,
        name: "Grenade",
        base_damage: 65.0,
        gravity: 980.0,
        max_velocity: 700.0,
        explosion_radius: 60.0,
        bounces: true,
        bounce_decay: 0.6,
        max_bounces: 5,
        launch: LaunchKind::Throw,
        explode_on_impact: false,
        delayed_explosion: true,
        explosion_delay_ms: 5_000,
        knockback_multiplier: 2.0,
        max_ammo: Ammo::Limited(3),
        starting_ammo: Ammo::Limited(3),
    },
    WeaponArchetype {
        kind: WeaponKind::Dynamite,
        name: "Dynamite",
        base_damage: 75.0,
        gravity: 0.0,
        max_velocity: 0.0,
        explosion_radius: 70.0,
        bounces: false,
        bounce_decay: 0.0,
        max_bounces: 0,
        launch: LaunchKind::Place,
        explode_on_impact: false,
        delayed_explosion: true,
        explosion_delay_ms: 5_000,
        knockback_multiplier: 2.5,
        max_ammo: Ammo::Limited(5),
        starting_ammo: Ammo::Limited(5),
    },
    WeaponArchetype {
        kind: WeaponKind::Bazooka,
        name: "Bazooka",
        base_damage: 85.0,
        gravity: 120.0,
        max_velocity: 2000.0,
        explosion_radius: 80.0,
        bounces: false,
        bounce_decay: 0.0,
        max_bounces: 0,
        launch: LaunchKind::Shoot,
        explode_on_impact: true,
        delayed_explosion: false,
        explosion_delay_ms: 0,
        knockback_multiplier: 3.0,
        max_ammo: Ammo::Limited(3),
        starting_ammo: Ammo::Limited(3),
    },
];
