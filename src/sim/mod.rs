//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Integer engine clock; no wall-clock reads
//! - Stable iteration order (units in creation order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod damage;
pub mod events;
pub mod inventory;
pub mod movement;
pub mod replay;
pub mod rng;
pub mod schedule;
pub mod state;
pub mod terrain;
pub mod trajectory;
pub mod turn;
pub mod weapons;

pub use collision::{Aabb, SegmentHit, segment_aabb_intersection, segment_segment_intersection};
pub use damage::{DamageReport, Knockback, apply_explosion, distance_to_damage_percent};
pub use events::{EventSink, LogSink, MatchEvent};
pub use inventory::Inventory;
pub use replay::{Action, ActionLog, LoggedAction, replay};
pub use rng::DeterministicRng;
pub use state::{
    Facing, MatchOutcome, MatchState, TEAM_COUNT, TeamId, TurnPhase, Unit, UnitId,
};
pub use terrain::{Cell, TerrainField};
pub use trajectory::{SampleEvent, ShotResult, TrajectorySample, simulate_shot};
pub use turn::{ActionRejected, TurnEngine};
pub use weapons::{Ammo, CATALOG, LaunchKind, WeaponArchetype, WeaponKind};
