//! Result events emitted by the engine
//!
//! Observers (rendering, audio, replay capture) consume these and never feed
//! anything back into the match. Motion is described as endpoints plus a
//! duration; interpolation belongs to the observer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::damage::DamageReport;
use super::state::{MatchOutcome, TeamId, UnitId};
use super::terrain::Cell;
use super::trajectory::ShotResult;
use super::weapons::WeaponKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    TurnChanged {
        turn: u32,
        team: TeamId,
        unit: UnitId,
        /// Per-turn seed for cosmetic randomness
        turn_seed: i64,
    },
    /// A projectile was launched; the full flight is known up front
    ShotResolved {
        at_ms: u64,
        unit: UnitId,
        weapon: WeaponKind,
        angle: f32,
        power: f32,
        shot: ShotResult,
    },
    ChargePlaced {
        at_ms: u64,
        unit: UnitId,
        weapon: WeaponKind,
        pos: Vec2,
        fuse_ms: u64,
    },
    ExplosionResolved {
        at_ms: u64,
        weapon: WeaponKind,
        center: Vec2,
        radius: f32,
        damages: Vec<DamageReport>,
        /// Terrain cells removed by the blast
        cleared: Vec<Cell>,
    },
    /// Shot left the field or fizzled without a target
    NoTargetHit {
        at_ms: u64,
        weapon: WeaponKind,
    },
    UnitMoved {
        unit: UnitId,
        from: Vec2,
        to: Vec2,
    },
    UnitJumped {
        unit: UnitId,
        from: Vec2,
        to: Vec2,
        duration_ms: u64,
    },
    /// Dropped onto newly exposed terrain
    UnitSettled {
        unit: UnitId,
        from: Vec2,
        to: Vec2,
        duration_ms: u64,
    },
    UnitDied {
        unit: UnitId,
        team: TeamId,
    },
    UnitFellOut {
        unit: UnitId,
        team: TeamId,
    },
    TimeoutPenalty {
        unit: UnitId,
        damage: u32,
    },
    MatchEnded {
        outcome: MatchOutcome,
        turn: u32,
    },
}

/// Event observer
pub trait EventSink {
    fn on_event(&mut self, event: &MatchEvent);
}

/// Collecting sink
impl EventSink for Vec<MatchEvent> {
    fn on_event(&mut self, event: &MatchEvent) {
        self.push(event.clone());
    }
}

/// Forwards every event to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn on_event(&mut self, event: &MatchEvent) {
        match event {
            MatchEvent::TurnChanged { turn, team, unit, .. } => {
                log::info!("Turn {}: team {} plays unit {}", turn, team, unit);
            }
            MatchEvent::ShotResolved { unit, weapon, shot, .. } => {
                log::info!(
                    "Unit {} fired {:?}: {:?} after {} ms",
                    unit,
                    weapon,
                    shot.end,
                    shot.flight_ms()
                );
            }
            MatchEvent::ExplosionResolved { weapon, center, damages, cleared, .. } => {
                log::info!(
                    "{:?} exploded at ({:.0}, {:.0}): {} units hit, {} cells cleared",
                    weapon,
                    center.x,
                    center.y,
                    damages.len(),
                    cleared.len()
                );
            }
            MatchEvent::UnitDied { unit, team } => log::info!("Unit {} (team {}) died", unit, team),
            MatchEvent::UnitFellOut { unit, team } => {
                log::info!("Unit {} (team {}) fell out of the field", unit, team);
            }
            MatchEvent::TimeoutPenalty { unit, damage } => {
                log::info!("Unit {} timed out: {} self-damage", unit, damage);
            }
            MatchEvent::MatchEnded { outcome, turn } => {
                log::info!("Match ended on turn {}: {:?}", turn, outcome);
            }
            other => log::debug!("{:?}", other),
        }
    }
}
