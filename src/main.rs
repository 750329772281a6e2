//! Crater Duel headless runner
//!
//! Plays a seeded bot-vs-bot match on a fixed frame loop, logs the event
//! stream, then replays the recorded action log and checks it lands on the
//! same outcome.
//!
//! Usage: `crater-duel [seed] [settings.json] [--log]`

use std::process::ExitCode;

use rand::Rng;

use crater_duel::MatchSettings;
use crater_duel::sim::{
    DeterministicRng, Facing, LogSink, TurnEngine, TurnPhase, UnitId, WeaponKind, replay,
};

/// Frame length of the driving loop; outcomes do not depend on it
const FRAME_MS: u64 = 16;
/// Give up on matches that stall (one hour of match time)
const MAX_MATCH_MS: u64 = 3_600_000;

struct Args {
    seed: i64,
    settings: Option<String>,
    print_log: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        seed: 1,
        settings: None,
        print_log: false,
    };
    for arg in std::env::args().skip(1) {
        if arg == "--log" {
            args.print_log = true;
        } else if let Ok(seed) = arg.parse() {
            args.seed = seed;
        } else {
            args.settings = Some(arg);
        }
    }
    args
}

/// What the bot does with its turn
struct Plan {
    steps: u32,
    direction: Facing,
    aim_delta: f32,
    weapon: WeaponKind,
    charge_ms: u64,
}

fn plan_turn(engine: &TurnEngine, unit: UnitId, rng: &mut DeterministicRng) -> Plan {
    let usable: Vec<WeaponKind> = engine
        .units()
        .iter()
        .find(|u| u.id == unit)
        .map(|u| {
            u.inventory
                .entries()
                .filter(|&(_, _, usable)| usable)
                .map(|(kind, _, _)| kind)
                .collect()
        })
        .unwrap_or_default();
    let weapon = rng.choose(&usable).copied().unwrap_or(WeaponKind::DungBall);

    Plan {
        steps: rng.random_range(0..12),
        direction: if rng.random_bool(0.5) { Facing::Left } else { Facing::Right },
        aim_delta: rng.random_range(-25.0f32..25.0),
        weapon,
        charge_ms: rng.random_range(600..2_000),
    }
}

/// Walk, aim, pick a weapon and start charging
fn begin_turn(engine: &mut TurnEngine, unit: UnitId, plan: &Plan) {
    for _ in 0..plan.steps {
        if engine.walk(unit, plan.direction).is_err() {
            break;
        }
    }
    if let Err(reason) = engine.aim(unit, plan.aim_delta) {
        log::warn!("Bot could not aim: {}", reason);
    }
    if let Err(reason) = engine.select_weapon(unit, plan.weapon) {
        log::debug!("Bot could not select {:?}: {}", plan.weapon, reason);
        if let Err(reason) = engine.select_weapon(unit, WeaponKind::DungBall) {
            log::warn!("Bot could not select a fallback weapon: {}", reason);
        }
    }
    if let Err(reason) = engine.begin_charge(unit) {
        log::warn!("Bot could not charge: {}", reason);
    }
}

fn run(args: &Args) -> Result<(), crater_duel::ConfigError> {
    let settings = match &args.settings {
        Some(path) => MatchSettings::load(path)?,
        None => MatchSettings::default(),
    };

    let mut engine = TurnEngine::new(args.seed, settings)?;
    let mut bot = DeterministicRng::new(args.seed.wrapping_add(1));
    let mut sink = LogSink;
    let mut planned: Option<(u32, usize)> = None;
    let mut release_at: Option<u64> = None;

    while !engine.is_over() && engine.now_ms() < MAX_MATCH_MS {
        let turn = (engine.state().turn.turn, engine.state().turn.team);
        let active = engine.active_unit().map(|u| u.id);

        match (engine.phase(), active) {
            (TurnPhase::Aiming, Some(unit)) if planned != Some(turn) => {
                planned = Some(turn);
                let plan = plan_turn(&engine, unit, &mut bot);
                begin_turn(&mut engine, unit, &plan);
                release_at = Some(engine.now_ms() + plan.charge_ms);
            }
            (TurnPhase::Charging, Some(unit)) => {
                if release_at.is_some_and(|t| engine.now_ms() >= t) {
                    release_at = None;
                    if let Err(reason) = engine.release_charge(unit) {
                        log::warn!("Bot could not release: {}", reason);
                    }
                }
            }
            _ => {}
        }

        engine.advance(FRAME_MS);
        engine.dispatch(&mut sink);
    }

    match engine.outcome() {
        Some(outcome) => log::info!("Outcome: {:?} after {} ms", outcome, engine.now_ms()),
        None => log::warn!("Match did not finish within {} ms", MAX_MATCH_MS),
    }

    let mut replayed = replay(engine.action_log())?;
    replayed.advance_to(engine.now_ms());
    if replayed.outcome() == engine.outcome() && replayed.units() == engine.units() {
        log::info!("Replay of {} actions matches", engine.action_log().actions.len());
    } else {
        log::error!("Replay diverged from the live match");
    }

    if args.print_log {
        println!("{}", engine.action_log().to_json()?);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = parse_args();
    log::info!("Crater Duel (headless) seed {}", args.seed);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
