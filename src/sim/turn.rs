//! Turn engine: the match state machine
//!
//! Owns the `MatchState`, the timer queue and the event buffer. Time only moves
//! through `advance`/`advance_to`, and every due item (scheduled task, aiming
//! deadline, charge deadline) is handled at its exact timestamp, so the result
//! of a match depends on the seed and the timed action list only.
//!
//! Phase flow per turn:
//! `Aiming` -> (`Charging`) -> `Shooting` | `Escaping` -> `Animating` -> next turn,
//! or `Ended` once a team has no living units.

use glam::Vec2;
use thiserror::Error;

use super::damage::apply_explosion;
use super::events::{EventSink, MatchEvent};
use super::movement::{fall_duration_ms, is_out_of_bounds, jump_path, settle_units, walk_step};
use super::replay::{Action, ActionLog, LoggedAction};
use super::rng::DeterministicRng;
use super::schedule::{Task, TimerQueue};
use super::state::{
    Facing, MatchOutcome, MatchState, PendingExplosive, TEAM_COUNT, TeamId, TurnPhase, TurnState,
    TurnTimer, Unit, UnitId, advance_element, select_round_robin,
};
use super::terrain::TerrainField;
use super::trajectory::simulate_shot;
use super::weapons::{LaunchKind, WeaponKind};
use crate::consts::*;
use crate::settings::{ConfigError, MatchSettings};

/// Why an intent was refused. Refusals leave the match untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("the match is over")]
    MatchOver,
    #[error("unit does not hold the turn")]
    NotYourTurn,
    #[error("not allowed in the current phase")]
    WrongPhase,
    #[error("weapon has no ammo")]
    WeaponUnavailable,
    #[error("weapon menu is open")]
    InventoryOpen,
    #[error("movement blocked by terrain")]
    Blocked,
}

pub struct TurnEngine {
    state: MatchState,
    settings: MatchSettings,
    queue: TimerQueue,
    events: Vec<MatchEvent>,
    log: ActionLog,
}

impl TurnEngine {
    /// Generate terrain from the seed, spawn both teams and start turn 1
    pub fn new(seed: i64, settings: MatchSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut rng = DeterministicRng::new(seed);
        let terrain =
            TerrainField::generate_hilly(settings.width, settings.height, &settings.terrain, &mut rng)?;
        let units = spawn_units(&settings, &terrain);
        Ok(Self::build(seed, settings, rng, terrain, units))
    }

    /// Spawn both teams on a prepared terrain
    pub fn with_terrain(
        seed: i64,
        settings: MatchSettings,
        terrain: TerrainField,
    ) -> Result<Self, ConfigError> {
        let units = spawn_units(&settings, &terrain);
        Self::with_units(seed, settings, terrain, units)
    }

    /// Start from prepared terrain and units
    pub fn with_units(
        seed: i64,
        settings: MatchSettings,
        terrain: TerrainField,
        units: Vec<Unit>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        if terrain.width() != settings.width || terrain.height() != settings.height {
            return Err(ConfigError::InvalidDimensions {
                width: terrain.width(),
                height: terrain.height(),
            });
        }
        if let Some(unit) = units.iter().find(|u| u.team >= TEAM_COUNT || u.element == 0) {
            return Err(ConfigError::InvalidTeamLayout(format!(
                "unit {} has team {} element {}",
                unit.id, unit.team, unit.element
            )));
        }
        Ok(Self::build(seed, settings, DeterministicRng::new(seed), terrain, units))
    }

    fn build(
        seed: i64,
        settings: MatchSettings,
        rng: DeterministicRng,
        terrain: TerrainField,
        units: Vec<Unit>,
    ) -> Self {
        log::info!(
            "Match {} on a {}x{} field with {} units",
            seed,
            terrain.width(),
            terrain.height(),
            units.len()
        );
        let state = MatchState {
            seed,
            rng,
            terrain,
            units,
            turn: TurnState::new(settings.turn_time_ms),
            pending: None,
            outcome: None,
            now_ms: 0,
        };
        let mut engine = Self {
            state,
            log: ActionLog::new(seed, settings.clone()),
            settings,
            queue: TimerQueue::new(),
            events: Vec::new(),
        };

        let max = engine.max_element(0);
        engine.state.turn.current_element[0] = advance_element(0, max);
        engine.start_turn();
        engine
    }

    // === Queries ===

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn now_ms(&self) -> u64 {
        self.state.now_ms
    }

    pub fn phase(&self) -> TurnPhase {
        self.state.turn.phase
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.state.outcome
    }

    pub fn is_over(&self) -> bool {
        self.state.outcome.is_some()
    }

    pub fn active_unit(&self) -> Option<&Unit> {
        self.state.active_unit()
    }

    pub fn units(&self) -> &[Unit] {
        &self.state.units
    }

    pub fn terrain(&self) -> &TerrainField {
        &self.state.terrain
    }

    /// Aiming time left this turn
    pub fn remaining_turn_ms(&self) -> u64 {
        self.state.turn.timer.remaining(self.state.now_ms)
    }

    /// Accepted intents so far
    pub fn action_log(&self) -> &ActionLog {
        &self.log
    }

    /// Hand out buffered events, oldest first
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forward buffered events to an observer
    pub fn dispatch(&mut self, sink: &mut impl EventSink) {
        for event in self.events.drain(..) {
            sink.on_event(&event);
        }
    }

    // === Time ===

    pub fn advance(&mut self, dt_ms: u64) {
        self.advance_to(self.state.now_ms.saturating_add(dt_ms));
    }

    /// Run the clock forward, handling every due item at its own timestamp
    pub fn advance_to(&mut self, target_ms: u64) {
        if target_ms < self.state.now_ms {
            return;
        }
        while let Some(due) = self.next_deadline() {
            if due > target_ms {
                break;
            }
            self.state.now_ms = due.max(self.state.now_ms);
            self.run_next_due();
            self.check_fallen();
        }
        self.state.now_ms = target_ms;
        self.check_fallen();
    }

    /// Run scheduled work until a turn is waiting for input or the match is over
    pub fn advance_until_idle(&mut self) {
        while !self.is_over() {
            match self.queue.next_due() {
                Some(due) => self.advance_to(due),
                None => break,
            }
        }
    }

    fn aim_deadline(&self) -> Option<u64> {
        match self.state.turn.phase {
            TurnPhase::Aiming => self.state.turn.timer.deadline(),
            _ => None,
        }
    }

    fn charge_deadline(&self) -> Option<u64> {
        match self.state.turn.phase {
            TurnPhase::Charging => self
                .state
                .turn
                .charging_since
                .map(|since| since.saturating_add(self.settings.max_charge_ms)),
            _ => None,
        }
    }

    fn next_deadline(&self) -> Option<u64> {
        [self.queue.next_due(), self.aim_deadline(), self.charge_deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    /// Handle one due item; queue tasks go before timer deadlines at equal times
    fn run_next_due(&mut self) {
        let now = self.state.now_ms;
        if let Some((_, task)) = self.queue.pop_due(now) {
            self.run_task(task);
        } else if self.aim_deadline().is_some_and(|d| d <= now) {
            self.timeout();
        } else if self.charge_deadline().is_some_and(|d| d <= now) {
            self.auto_release();
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::StartTurn => self.start_turn(),
            Task::ResolveShot => self.resolve_shot(),
            Task::Detonate => self.detonate_fuse(),
            Task::ShotLost => {
                if let Some(PendingExplosive::InFlight { weapon, .. }) = self.state.pending.take() {
                    self.no_target(weapon);
                }
                self.end_turn();
            }
        }
    }

    // === Turn flow ===

    fn max_element(&self, team: TeamId) -> u32 {
        self.state
            .units
            .iter()
            .filter(|u| u.team == team)
            .map(|u| u.element)
            .max()
            .unwrap_or(0)
    }

    fn emit(&mut self, event: MatchEvent) {
        self.events.push(event);
    }

    fn start_turn(&mut self) {
        if self.is_over() {
            return;
        }
        let now = self.state.now_ms;
        let team = self.state.turn.team;
        self.state.turn.ending = false;

        let from = self.state.turn.current_element[team];
        let Some((unit_id, element)) = select_round_robin(&self.state.units, team, from) else {
            log::info!("Team {} has no units left", team);
            let outcome = self.decide_outcome().unwrap_or(MatchOutcome::Winner(1 - team));
            self.finish(outcome);
            return;
        };

        self.state.turn.current_element[team] = element;
        let mut facing = Facing::Right;
        for unit in &mut self.state.units {
            unit.active = unit.id == unit_id;
            if unit.active {
                facing = unit.facing;
            }
        }

        let turn_seed = self.state.rng.next_int(1, 999_999_999);
        let turn = &mut self.state.turn;
        turn.active_unit = Some(unit_id);
        turn.phase = TurnPhase::Aiming;
        turn.timer = TurnTimer::new(self.settings.turn_time_ms, now);
        turn.inventory_open = false;
        turn.charging_since = None;
        turn.aim_angle = facing.default_aim();
        turn.turn_seed = turn_seed;

        let turn_number = turn.turn;
        self.emit(MatchEvent::TurnChanged {
            turn: turn_number,
            team,
            unit: unit_id,
            turn_seed,
        });
    }

    /// Winner by survivors once either team is wiped out
    fn decide_outcome(&self) -> Option<MatchOutcome> {
        let alive = [self.state.alive_count(0), self.state.alive_count(1)];
        if alive[0] > 0 && alive[1] > 0 {
            None
        } else if alive[0] > alive[1] {
            Some(MatchOutcome::Winner(0))
        } else if alive[1] > alive[0] {
            Some(MatchOutcome::Winner(1))
        } else {
            Some(MatchOutcome::Draw)
        }
    }

    fn finish(&mut self, outcome: MatchOutcome) {
        self.state.outcome = Some(outcome);
        self.state.turn.phase = TurnPhase::Ended;
        self.state.turn.active_unit = None;
        self.state.pending = None;
        self.queue = TimerQueue::new();
        for unit in &mut self.state.units {
            unit.active = false;
        }
        let turn = self.state.turn.turn;
        log::info!("Match over on turn {}: {:?}", turn, outcome);
        self.emit(MatchEvent::MatchEnded { outcome, turn });
    }

    /// Close the current turn; returns `false` when a resolution is already in flight
    fn end_turn(&mut self) -> bool {
        if self.state.turn.ending {
            log::warn!(
                "Turn {} for team {} is already ending; ignoring",
                self.state.turn.turn,
                self.state.turn.team
            );
            return false;
        }
        if self.is_over() {
            return false;
        }
        self.state.turn.ending = true;

        if let Some(id) = self.state.turn.active_unit.take()
            && let Some(unit) = self.state.unit_mut(id)
        {
            unit.active = false;
        }
        self.state.turn.inventory_open = false;
        self.state.turn.charging_since = None;
        self.state.pending = None;

        if let Some(outcome) = self.decide_outcome() {
            self.finish(outcome);
            return true;
        }

        let next = (self.state.turn.team + 1) % TEAM_COUNT;
        self.state.turn.team = next;
        if next == 0 {
            self.state.turn.turn += 1;
        }
        let max = self.max_element(next);
        let pointer = &mut self.state.turn.current_element[next];
        *pointer = advance_element(*pointer, max);

        self.state.turn.phase = TurnPhase::Animating;
        let start_at = self.state.now_ms.saturating_add(self.settings.turn_delay_ms);
        self.queue.schedule(start_at, Task::StartTurn);
        true
    }

    fn timeout(&mut self) {
        let Some((id, max_health)) = self
            .state
            .active_unit()
            .map(|u| (u.id, u.max_health))
        else {
            self.end_turn();
            return;
        };
        let penalty = self.settings.timeout_penalty(max_health);
        let Some(unit) = self.state.unit_mut(id) else {
            return;
        };
        let damage = unit.take_damage(penalty);
        let (alive, team) = (unit.is_alive(), unit.team);
        log::info!("Unit {} ran out of time: {} self-damage", id, damage);

        self.emit(MatchEvent::TimeoutPenalty { unit: id, damage });
        if !alive {
            self.emit(MatchEvent::UnitDied { unit: id, team });
        }
        self.end_turn();
    }

    fn auto_release(&mut self) {
        let angle = self.state.turn.aim_angle;
        let launched = match self.selected_weapon() {
            Some(weapon) => self.launch(weapon, angle, 1.0),
            None => Err(ActionRejected::NotYourTurn),
        };
        if let Err(reason) = launched {
            log::debug!("Charged shot failed: {}", reason);
            self.end_turn();
        }
    }

    /// Kill units below the field; an active unit lost while aiming ends the turn
    fn check_fallen(&mut self) {
        let mut fallen = Vec::new();
        for unit in &mut self.state.units {
            if unit.is_alive() && is_out_of_bounds(unit, &self.state.terrain) {
                unit.kill();
                fallen.push((unit.id, unit.team));
            }
        }
        if fallen.is_empty() {
            return;
        }

        let mut lost_active = false;
        for (unit, team) in fallen {
            log::info!("Unit {} fell out of the field", unit);
            self.emit(MatchEvent::UnitFellOut { unit, team });
            self.emit(MatchEvent::UnitDied { unit, team });
            lost_active |= self.state.turn.active_unit == Some(unit);
        }

        if lost_active
            && matches!(self.state.turn.phase, TurnPhase::Aiming | TurnPhase::Charging)
        {
            self.end_turn();
        }
    }

    // === Shot resolution ===

    fn selected_weapon(&self) -> Option<WeaponKind> {
        self.state.active_unit().map(|u| u.inventory.selected())
    }

    fn launch(&mut self, weapon: WeaponKind, angle: f32, power: f32) -> Result<(), ActionRejected> {
        let now = self.state.now_ms;
        let id = self.state.turn.active_unit.ok_or(ActionRejected::NotYourTurn)?;
        let unit = self.state.unit_mut(id).ok_or(ActionRejected::NotYourTurn)?;
        if !unit.inventory.use_ammo(weapon) {
            return Err(ActionRejected::WeaponUnavailable);
        }
        let (feet, muzzle) = (unit.pos, unit.muzzle());

        self.state.turn.charging_since = None;
        self.state.turn.timer.pause(now);
        self.state.turn.aim_angle = angle;

        let archetype = weapon.archetype();
        if archetype.launch == LaunchKind::Place {
            let fuse_ms = archetype.explosion_delay_ms;
            self.state.turn.phase = TurnPhase::Escaping;
            self.state.pending = Some(PendingExplosive::Placed {
                weapon,
                pos: feet,
                placed_at: now,
            });
            self.queue.schedule(now.saturating_add(fuse_ms), Task::Detonate);
            self.emit(MatchEvent::ChargePlaced {
                at_ms: now,
                unit: id,
                weapon,
                pos: feet,
                fuse_ms,
            });
            return Ok(());
        }

        let shot = simulate_shot(
            muzzle,
            angle,
            power,
            archetype,
            &self.state.terrain,
            &self.state.units,
        );
        self.emit(MatchEvent::ShotResolved {
            at_ms: now,
            unit: id,
            weapon,
            angle,
            power,
            shot: shot.clone(),
        });

        if archetype.delayed_explosion && !archetype.explode_on_impact {
            // Fuse counts from launch, whatever the projectile is doing
            self.state.turn.phase = TurnPhase::Escaping;
            self.queue
                .schedule(now.saturating_add(archetype.explosion_delay_ms), Task::Detonate);
        } else {
            let task = if shot.left_field() {
                Task::ShotLost
            } else {
                Task::ResolveShot
            };
            self.state.turn.phase = TurnPhase::Shooting;
            self.queue.schedule(now.saturating_add(shot.flight_ms()), task);
        }
        self.state.pending = Some(PendingExplosive::InFlight {
            weapon,
            shot,
            launched_at: now,
        });
        Ok(())
    }

    fn resolve_shot(&mut self) {
        match self.state.pending.take() {
            Some(PendingExplosive::InFlight { weapon, shot, .. }) => match shot.impact {
                Some(center) => self.explode(weapon, center),
                None => {
                    self.no_target(weapon);
                    self.end_turn();
                }
            },
            other => {
                self.state.pending = other;
                log::warn!("Shot resolution without a projectile in flight");
            }
        }
    }

    fn detonate_fuse(&mut self) {
        let now = self.state.now_ms;
        match self.state.pending.take() {
            Some(PendingExplosive::Placed { weapon, pos, .. }) => self.explode(weapon, pos),
            Some(PendingExplosive::InFlight {
                weapon,
                shot,
                launched_at,
            }) => match shot.position_at_ms(now - launched_at) {
                Some(pos) => self.explode(weapon, pos),
                None => {
                    self.no_target(weapon);
                    self.end_turn();
                }
            },
            None => log::warn!("Fuse ran out with nothing to detonate"),
        }
    }

    fn no_target(&mut self, weapon: WeaponKind) {
        log::debug!("{:?} hit nothing", weapon);
        let at_ms = self.state.now_ms;
        self.emit(MatchEvent::NoTargetHit { at_ms, weapon });
    }

    /// Damage, knockback, crater, settle, then close the turn
    fn explode(&mut self, weapon: WeaponKind, center: Vec2) {
        let archetype = weapon.archetype();
        let radius = archetype.explosion_radius;
        let field = Vec2::new(
            self.state.terrain.width() as f32,
            self.state.terrain.height() as f32,
        );

        let damages = apply_explosion(center, radius, archetype, &mut self.state.units, field);
        let cleared = self.state.terrain.excavate(center, radius);
        log::debug!(
            "{} exploded at ({:.1}, {:.1}): {} hit, {} cells cleared",
            archetype.name,
            center.x,
            center.y,
            damages.len(),
            cleared.len()
        );

        let killed: Vec<(UnitId, TeamId)> = damages
            .iter()
            .filter(|d| d.killed)
            .filter_map(|d| self.state.unit(d.unit).map(|u| (u.id, u.team)))
            .collect();

        let at_ms = self.state.now_ms;
        self.emit(MatchEvent::ExplosionResolved {
            at_ms,
            weapon,
            center,
            radius,
            damages,
            cleared,
        });

        for (unit, from, to) in settle_units(&self.state.terrain, &mut self.state.units) {
            self.emit(MatchEvent::UnitSettled {
                unit,
                from,
                to,
                duration_ms: fall_duration_ms(to.y - from.y),
            });
        }
        for (unit, team) in killed {
            log::info!("Unit {} was killed", unit);
            self.emit(MatchEvent::UnitDied { unit, team });
        }
        self.check_fallen();
        self.end_turn();
    }

    // === Intents ===

    /// Validate, run and record an intent from `actor`
    pub fn apply(&mut self, actor: UnitId, action: &Action) -> Result<(), ActionRejected> {
        let result = self.perform(actor, action);
        match result {
            Ok(()) => {
                self.log.actions.push(LoggedAction {
                    actor,
                    action: action.clone(),
                    time_offset_ms: self.state.now_ms,
                });
                self.check_fallen();
            }
            Err(reason) => log::debug!("Unit {} {:?} rejected: {}", actor, action, reason),
        }
        result
    }

    pub fn aim(&mut self, actor: UnitId, delta_deg: f32) -> Result<(), ActionRejected> {
        self.apply(actor, &Action::Aim { delta: delta_deg })
    }

    pub fn open_inventory(&mut self, actor: UnitId) -> Result<(), ActionRejected> {
        self.apply(actor, &Action::OpenInventory)
    }

    pub fn close_inventory(&mut self, actor: UnitId) -> Result<(), ActionRejected> {
        self.apply(actor, &Action::CloseInventory)
    }

    pub fn select_weapon(&mut self, actor: UnitId, weapon: WeaponKind) -> Result<(), ActionRejected> {
        self.apply(actor, &Action::SelectWeapon { weapon })
    }

    pub fn begin_charge(&mut self, actor: UnitId) -> Result<(), ActionRejected> {
        self.apply(actor, &Action::BeginCharge)
    }

    pub fn release_charge(&mut self, actor: UnitId) -> Result<(), ActionRejected> {
        self.apply(actor, &Action::ReleaseCharge)
    }

    pub fn fire(
        &mut self,
        actor: UnitId,
        angle: f32,
        power: f32,
        weapon: WeaponKind,
    ) -> Result<(), ActionRejected> {
        self.apply(actor, &Action::Fire { angle, power, weapon })
    }

    pub fn walk(&mut self, actor: UnitId, direction: Facing) -> Result<(), ActionRejected> {
        self.apply(actor, &Action::Walk { direction })
    }

    pub fn jump(&mut self, actor: UnitId) -> Result<(), ActionRejected> {
        self.apply(actor, &Action::Jump)
    }

    fn require(&self, actor: UnitId, phases: &[TurnPhase]) -> Result<(), ActionRejected> {
        if self.is_over() {
            return Err(ActionRejected::MatchOver);
        }
        if self.state.turn.active_unit != Some(actor)
            || !self.state.unit(actor).is_some_and(|u| u.is_alive())
        {
            return Err(ActionRejected::NotYourTurn);
        }
        if !phases.contains(&self.state.turn.phase) {
            return Err(ActionRejected::WrongPhase);
        }
        Ok(())
    }

    fn require_menu_closed(&self) -> Result<(), ActionRejected> {
        if self.state.turn.inventory_open {
            Err(ActionRejected::InventoryOpen)
        } else {
            Ok(())
        }
    }

    fn perform(&mut self, actor: UnitId, action: &Action) -> Result<(), ActionRejected> {
        let now = self.state.now_ms;
        match *action {
            Action::Aim { delta } => {
                self.require(actor, &[TurnPhase::Aiming, TurnPhase::Charging])?;
                self.require_menu_closed()?;
                let angle = &mut self.state.turn.aim_angle;
                *angle = (*angle + delta).clamp(MIN_AIM_ANGLE, MAX_AIM_ANGLE);
                Ok(())
            }
            Action::OpenInventory => {
                self.require(actor, &[TurnPhase::Aiming])?;
                if self.state.turn.inventory_open {
                    return Err(ActionRejected::WrongPhase);
                }
                self.state.turn.inventory_open = true;
                self.state.turn.timer.pause(now);
                Ok(())
            }
            Action::CloseInventory => {
                self.require(actor, &[TurnPhase::Aiming])?;
                if !self.state.turn.inventory_open {
                    return Err(ActionRejected::WrongPhase);
                }
                self.state.turn.inventory_open = false;
                self.state.turn.timer.resume(now);
                Ok(())
            }
            Action::SelectWeapon { weapon } => {
                self.require(actor, &[TurnPhase::Aiming])?;
                let unit = self.state.unit_mut(actor).ok_or(ActionRejected::NotYourTurn)?;
                if unit.inventory.select_weapon(weapon) {
                    Ok(())
                } else {
                    Err(ActionRejected::WeaponUnavailable)
                }
            }
            Action::BeginCharge => {
                self.require(actor, &[TurnPhase::Aiming])?;
                self.require_menu_closed()?;
                let usable = self
                    .state
                    .unit(actor)
                    .is_some_and(|u| u.inventory.can_use(u.inventory.selected()));
                if !usable {
                    return Err(ActionRejected::WeaponUnavailable);
                }
                self.state.turn.phase = TurnPhase::Charging;
                self.state.turn.charging_since = Some(now);
                self.state.turn.timer.pause(now);
                Ok(())
            }
            Action::ReleaseCharge => {
                self.require(actor, &[TurnPhase::Charging])?;
                let since = self.state.turn.charging_since.unwrap_or(now);
                let held = now.saturating_sub(since) as f32;
                let power = (held / self.settings.max_charge_ms.max(1) as f32).min(1.0);
                let weapon = self.selected_weapon().ok_or(ActionRejected::NotYourTurn)?;
                let angle = self.state.turn.aim_angle;
                self.launch(weapon, angle, power)
            }
            Action::Fire {
                angle,
                power,
                weapon,
            } => {
                self.require(actor, &[TurnPhase::Aiming])?;
                self.require_menu_closed()?;
                let usable = self.state.unit(actor).is_some_and(|u| u.inventory.can_use(weapon));
                if !usable {
                    return Err(ActionRejected::WeaponUnavailable);
                }
                let angle = angle.clamp(MIN_AIM_ANGLE, MAX_AIM_ANGLE);
                self.launch(weapon, angle, power.clamp(0.0, 1.0))
            }
            Action::Walk { direction } => {
                self.require(actor, &[TurnPhase::Aiming, TurnPhase::Escaping])?;
                self.require_menu_closed()?;
                let terrain = &self.state.terrain;
                let unit = self.state.units.iter_mut().find(|u| u.id == actor);
                let unit = unit.ok_or(ActionRejected::NotYourTurn)?;
                let to = walk_step(terrain, unit.pos, direction).ok_or(ActionRejected::Blocked)?;
                let from = unit.pos;
                unit.pos = to;
                unit.facing = direction;
                self.emit(MatchEvent::UnitMoved { unit: actor, from, to });
                Ok(())
            }
            Action::Jump => {
                self.require(actor, &[TurnPhase::Aiming, TurnPhase::Escaping])?;
                self.require_menu_closed()?;
                let terrain = &self.state.terrain;
                let unit = self.state.units.iter_mut().find(|u| u.id == actor);
                let unit = unit.ok_or(ActionRejected::NotYourTurn)?;
                let path = jump_path(terrain, unit.pos, unit.facing);
                let from = unit.pos;
                unit.pos = path.landing;
                self.emit(MatchEvent::UnitJumped {
                    unit: actor,
                    from,
                    to: path.landing,
                    duration_ms: path.duration_ms,
                });
                Ok(())
            }
        }
    }
}

/// Mirrored spawn rows: team 0 from the left margin, team 1 ending at the right margin
pub fn spawn_units(settings: &MatchSettings, terrain: &TerrainField) -> Vec<Unit> {
    let n = settings.units_per_team;
    let row = (n.saturating_sub(1)) as f32 * settings.spawn_spacing;
    let starts = [
        settings.spawn_margin,
        terrain.width() as f32 - settings.spawn_margin - row,
    ];

    let mut units = Vec::with_capacity(n as usize * TEAM_COUNT);
    for (team, start) in starts.into_iter().enumerate() {
        for slot in 0..n {
            let x = start + slot as f32 * settings.spawn_spacing;
            let y = terrain.ground_y(x.floor() as i32) as f32;
            let id = units.len() as UnitId;
            units.push(Unit::new(id, team, slot + 1, Vec2::new(x, y), settings.max_health));
        }
    }
    units
}
