//! Match state and core simulation types
//!
//! All state the engine owns lives in one `MatchState` value. Units are never
//! removed from the collection; dead units stay for scoring and history.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::inventory::Inventory;
use super::rng::DeterministicRng;
use super::terrain::TerrainField;
use super::trajectory::ShotResult;
use super::weapons::WeaponKind;
use crate::consts::*;

pub type UnitId = u32;
/// Team index: 0 or 1
pub type TeamId = usize;

pub const TEAM_COUNT: usize = 2;

/// Which way a unit looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1 for left, +1 for right
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Default aim angle when a turn starts
    pub fn default_aim(self) -> f32 {
        match self {
            Facing::Left => 135.0,
            Facing::Right => 45.0,
        }
    }
}

/// A combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub team: TeamId,
    /// 1-based turn-order slot within the team
    pub element: u32,
    /// Feet position (bottom center of the collision box)
    pub pos: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub facing: Facing,
    /// Holds the current turn
    pub active: bool,
    pub inventory: Inventory,
}

impl Unit {
    pub fn new(id: UnitId, team: TeamId, element: u32, pos: Vec2, max_health: u32) -> Self {
        Self {
            id,
            team,
            element,
            pos,
            health: max_health,
            max_health,
            facing: if team == 0 { Facing::Right } else { Facing::Left },
            active: false,
            inventory: Inventory::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Subtract health; returns the amount actually removed
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.health);
        self.health -= applied;
        applied
    }

    /// Lethal damage regardless of current health
    pub fn kill(&mut self) {
        self.health = 0;
    }

    /// Collision box
    pub fn bounds(&self) -> Aabb {
        Aabb::new(
            Vec2::new(self.pos.x - UNIT_WIDTH / 2.0, self.pos.y - UNIT_HEIGHT),
            Vec2::new(self.pos.x + UNIT_WIDTH / 2.0, self.pos.y),
        )
    }

    /// Launch point for shots (body center)
    pub fn muzzle(&self) -> Vec2 {
        self.pos - Vec2::new(0.0, UNIT_HEIGHT / 2.0)
    }
}

/// Turn phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Free aim: move, jump, aim, pick a weapon
    Aiming,
    /// Holding fire to build power; timer frozen
    Charging,
    /// Projectile in flight
    Shooting,
    /// Fuse burning after a placement or a delayed throw; the unit may move
    Escaping,
    /// Resolved; waiting for the next turn to start
    Animating,
    /// Match over
    Ended,
}

/// Result of a finished match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Winner(TeamId),
    Draw,
}

/// Aiming countdown that can be frozen and resumed without losing time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnTimer {
    budget_ms: u64,
    started_at: u64,
    /// Remaining time captured when paused
    paused_remaining: Option<u64>,
}

impl TurnTimer {
    pub fn new(budget_ms: u64, now: u64) -> Self {
        Self {
            budget_ms,
            started_at: now,
            paused_remaining: None,
        }
    }

    pub fn remaining(&self, now: u64) -> u64 {
        match self.paused_remaining {
            Some(remaining) => remaining,
            None => self
                .budget_ms
                .saturating_sub(now.saturating_sub(self.started_at)),
        }
    }

    pub fn pause(&mut self, now: u64) {
        if self.paused_remaining.is_none() {
            self.paused_remaining = Some(self.remaining(now));
        }
    }

    /// Recompute the start reference so elapsed time is preserved exactly
    pub fn resume(&mut self, now: u64) {
        if let Some(remaining) = self.paused_remaining.take() {
            let elapsed = self.budget_ms - remaining;
            self.started_at = now - elapsed;
        }
    }

    /// Absolute expiry time while running
    pub fn deadline(&self) -> Option<u64> {
        match self.paused_remaining {
            Some(_) => None,
            None => Some(self.started_at.saturating_add(self.budget_ms)),
        }
    }
}

/// Turn bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnState {
    /// Global turn counter, starting at 1, bumped when play returns to team 0
    pub turn: u32,
    pub team: TeamId,
    /// Per-team round-robin pointer (0 = no unit has acted yet)
    pub current_element: [u32; TEAM_COUNT],
    pub phase: TurnPhase,
    pub active_unit: Option<UnitId>,
    pub timer: TurnTimer,
    /// Set while the weapon menu is open; freezes the timer
    pub inventory_open: bool,
    /// Charge start time while in `Charging`
    pub charging_since: Option<u64>,
    /// Current aim angle, degrees
    pub aim_angle: f32,
    /// Per-turn seed drawn from the match RNG
    pub turn_seed: i64,
    /// Re-entrancy guard: a resolution is in flight until the next turn starts
    pub ending: bool,
}

impl TurnState {
    pub fn new(budget_ms: u64) -> Self {
        Self {
            turn: 1,
            team: 0,
            current_element: [0; TEAM_COUNT],
            phase: TurnPhase::Animating,
            active_unit: None,
            timer: TurnTimer::new(budget_ms, 0),
            inventory_open: false,
            charging_since: None,
            aim_angle: Facing::Right.default_aim(),
            turn_seed: 0,
            ending: false,
        }
    }
}

/// Projectile or placed charge waiting to resolve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PendingExplosive {
    /// Launched shot; resolves on impact or, for fused weapons, on fuse expiry
    InFlight {
        weapon: WeaponKind,
        shot: ShotResult,
        launched_at: u64,
    },
    /// Fused charge sitting at a fixed point
    Placed {
        weapon: WeaponKind,
        pos: Vec2,
        placed_at: u64,
    },
}

/// Complete match state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Match seed for reproducibility
    pub seed: i64,
    pub rng: DeterministicRng,
    pub terrain: TerrainField,
    /// Units in creation order (stable iteration order)
    pub units: Vec<Unit>,
    pub turn: TurnState,
    pub pending: Option<PendingExplosive>,
    pub outcome: Option<MatchOutcome>,
    /// Engine clock (ms since match start)
    pub now_ms: u64,
}

impl MatchState {
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn active_unit(&self) -> Option<&Unit> {
        self.turn.active_unit.and_then(|id| self.unit(id))
    }

    pub fn alive_count(&self, team: TeamId) -> usize {
        self.units
            .iter()
            .filter(|u| u.team == team && u.is_alive())
            .count()
    }
}

/// Round-robin pick for `team` starting at element `from`
///
/// Checks for a living unit before touching the team's maximum element, so an
/// empty or wiped-out team yields `None`. Dead or missing elements are skipped
/// and the scan wraps at the maximum.
pub fn select_round_robin(units: &[Unit], team: TeamId, from: u32) -> Option<(UnitId, u32)> {
    if !units.iter().any(|u| u.team == team && u.is_alive()) {
        return None;
    }
    let max_element = units
        .iter()
        .filter(|u| u.team == team)
        .map(|u| u.element)
        .max()?
        .max(1);

    let mut candidate = from.clamp(1, max_element);
    for _ in 0..max_element {
        if let Some(unit) = units
            .iter()
            .find(|u| u.team == team && u.element == candidate && u.is_alive())
        {
            return Some((unit.id, candidate));
        }
        candidate = candidate % max_element + 1;
    }
    None
}

/// Step a round-robin pointer forward, wrapping at `max_element`
pub fn advance_element(current: u32, max_element: u32) -> u32 {
    if max_element == 0 {
        return 0;
    }
    current % max_element + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(elements: &[(u32, bool)]) -> Vec<Unit> {
        elements
            .iter()
            .enumerate()
            .map(|(i, &(element, alive))| {
                let mut u = Unit::new(i as u32, 0, element, Vec2::ZERO, 100);
                if !alive {
                    u.kill();
                }
                u
            })
            .collect()
    }

    #[test]
    fn test_round_robin_skips_dead_forever() {
        let units = team(&[(1, true), (2, false), (3, true)]);
        let max = 3;
        let mut pointer = 0;
        let mut picked = Vec::new();
        for _ in 0..8 {
            pointer = advance_element(pointer, max);
            let (_, element) = select_round_robin(&units, 0, pointer).unwrap();
            pointer = element;
            picked.push(element);
        }
        assert_eq!(picked, vec![1, 3, 1, 3, 1, 3, 1, 3]);
    }

    #[test]
    fn test_round_robin_sole_survivor() {
        let units = team(&[(1, false), (2, true)]);
        for from in 1..=2 {
            assert_eq!(select_round_robin(&units, 0, from), Some((1, 2)));
        }
    }

    #[test]
    fn test_round_robin_eliminated_team() {
        let units = team(&[(1, false), (2, false)]);
        assert_eq!(select_round_robin(&units, 0, 1), None);
        // No units at all for team 1
        assert_eq!(select_round_robin(&units, 1, 1), None);
    }

    #[test]
    fn test_timer_pause_preserves_elapsed() {
        let mut timer = TurnTimer::new(10_000, 1_000);
        assert_eq!(timer.remaining(4_000), 7_000);
        timer.pause(4_000);
        assert_eq!(timer.remaining(9_000), 7_000);
        assert_eq!(timer.deadline(), None);
        timer.resume(9_000);
        assert_eq!(timer.remaining(9_000), 7_000);
        assert_eq!(timer.deadline(), Some(16_000));
        assert_eq!(timer.remaining(20_000), 0);
    }

    #[test]
    fn test_unit_damage_and_bounds() {
        let mut u = Unit::new(0, 1, 1, Vec2::new(100.0, 50.0), 100);
        assert_eq!(u.facing, Facing::Left);
        assert_eq!(u.take_damage(30), 30);
        assert_eq!(u.take_damage(500), 70);
        assert!(!u.is_alive());
        let b = u.bounds();
        assert_eq!(b.min, Vec2::new(84.0, 26.0));
        assert_eq!(b.max, Vec2::new(116.0, 50.0));
    }
}
