//! End-to-end match scenarios driven through the public engine API

use glam::Vec2;

use crater_duel::MatchSettings;
use crater_duel::sim::{
    MatchEvent, MatchOutcome, SampleEvent, TerrainField, TurnEngine, TurnPhase, Unit, WeaponKind,
};

/// Ground surface at `ground(x)` for every column
fn terrain_with(settings: &MatchSettings, ground: impl Fn(u32) -> u32) -> TerrainField {
    let mut t = TerrainField::new(settings.width, settings.height).unwrap();
    for x in 0..settings.width {
        for y in ground(x)..settings.height {
            t.set_pixel(x as i32, y as i32, true);
        }
    }
    t
}

fn turn_changes(events: &[MatchEvent]) -> Vec<(usize, u32)> {
    events
        .iter()
        .filter_map(|e| match e {
            MatchEvent::TurnChanged { team, unit, .. } => Some((*team, *unit)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_sole_survivor_keeps_every_turn() {
    let settings = MatchSettings::default();
    let terrain = terrain_with(&settings, |_| 500);
    let mut dead = Unit::new(1, 0, 2, Vec2::new(180.0, 500.0), 100);
    dead.kill();
    let units = vec![
        Unit::new(0, 0, 1, Vec2::new(100.0, 500.0), 100),
        dead,
        Unit::new(2, 1, 1, Vec2::new(620.0, 500.0), 100),
        Unit::new(3, 1, 2, Vec2::new(700.0, 500.0), 100),
    ];
    let mut engine = TurnEngine::with_units(3, settings, terrain, units).unwrap();

    // Three full rounds of timeouts
    engine.advance(3 * 22_000);
    let changes = turn_changes(&engine.drain_events());
    let team0: Vec<u32> = changes.iter().filter(|c| c.0 == 0).map(|c| c.1).collect();
    let team1: Vec<u32> = changes.iter().filter(|c| c.0 == 1).map(|c| c.1).collect();
    assert_eq!(team0, vec![0, 0, 0, 0]);
    assert_eq!(team1, vec![2, 3, 2]);
}

#[test]
fn test_timeout_penalty_rounds_up_and_advances() {
    let mut settings = MatchSettings::default();
    settings.max_health = 90;
    let terrain = terrain_with(&settings, |_| 500);
    let mut engine = TurnEngine::with_terrain(11, settings, terrain).unwrap();
    engine.drain_events();

    engine.advance(9_999);
    assert_eq!(engine.phase(), TurnPhase::Aiming);
    assert_eq!(engine.units()[0].health, 90);

    engine.advance(1);
    assert_eq!(engine.units()[0].health, 90 - 23);
    assert_eq!(engine.phase(), TurnPhase::Animating);

    engine.advance(1_000);
    let events = engine.drain_events();
    assert_eq!(events[0], MatchEvent::TimeoutPenalty { unit: 0, damage: 23 });
    assert!(matches!(
        events.last(),
        Some(MatchEvent::TurnChanged { turn: 1, team: 1, unit: 2, .. })
    ));
}

#[test]
fn test_grenade_bounces_on_slope_and_explodes_on_fuse() {
    let settings = MatchSettings::default();
    // Falls away to the right: one pixel down every two columns
    let terrain = terrain_with(&settings, |x| 300 + x / 2);
    let mut engine = TurnEngine::with_terrain(5, settings, terrain).unwrap();
    let shooter = engine.active_unit().unwrap().id;

    engine.advance(1_234);
    engine
        .fire(shooter, 60.0, 0.5, WeaponKind::Grenade)
        .unwrap();
    assert_eq!(engine.phase(), TurnPhase::Escaping);

    let events = engine.drain_events();
    let shot = events
        .iter()
        .find_map(|e| match e {
            MatchEvent::ShotResolved { shot, .. } => Some(shot.clone()),
            _ => None,
        })
        .unwrap();

    // Bounce keeps `decay` of the speed the projectile arrived with
    let grenade = WeaponKind::Grenade.archetype();
    let k = shot
        .samples
        .iter()
        .position(|s| s.event == SampleEvent::Bounce)
        .expect("grenade should bounce on the slope");
    let arriving = shot.samples[k - 1].vel + Vec2::new(0.0, grenade.gravity / 60.0);
    let leaving = shot.samples[k].vel;
    let expected = arriving.length() * grenade.bounce_decay;
    assert!((leaving.length() - expected).abs() < 1e-2 * expected);

    engine.advance(4_999);
    assert_eq!(engine.phase(), TurnPhase::Escaping);
    engine.advance(1);

    let events = engine.drain_events();
    let (at_ms, center) = events
        .iter()
        .find_map(|e| match e {
            MatchEvent::ExplosionResolved { at_ms, center, .. } => Some((*at_ms, *center)),
            _ => None,
        })
        .unwrap();
    assert_eq!(at_ms, 1_234 + 5_000);
    assert_eq!(Some(center), shot.position_at_ms(5_000));
}

#[test]
fn test_direct_hit_ends_match() {
    let mut settings = MatchSettings::default();
    settings.units_per_team = 1;
    let terrain = terrain_with(&settings, |_| 500);
    let mut target = Unit::new(1, 1, 1, Vec2::new(200.0, 500.0), 100);
    target.health = 10;
    let units = vec![Unit::new(0, 0, 1, Vec2::new(100.0, 500.0), 100), target];
    let mut engine = TurnEngine::with_units(9, settings, terrain, units).unwrap();

    engine.fire(0, 5.0, 1.0, WeaponKind::Bazooka).unwrap();
    engine.advance_until_idle();

    assert_eq!(engine.outcome(), Some(MatchOutcome::Winner(0)));
    assert_eq!(engine.phase(), TurnPhase::Ended);
    assert_eq!(engine.units()[0].health, 100);
    assert!(!engine.units()[1].is_alive());

    let events = engine.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        MatchEvent::ShotResolved { shot, .. } if shot.hit_unit == Some(1)
    )));
    assert!(events.contains(&MatchEvent::UnitDied { unit: 1, team: 1 }));
    assert!(matches!(
        events.last(),
        Some(MatchEvent::MatchEnded { outcome: MatchOutcome::Winner(0), .. })
    ));
    assert!(engine.jump(0).is_err());
}

#[test]
fn test_crater_drops_units_before_next_turn() {
    let mut settings = MatchSettings::default();
    settings.units_per_team = 1;
    let terrain = terrain_with(&settings, |_| 500);
    let units = vec![
        Unit::new(0, 0, 1, Vec2::new(100.0, 500.0), 100),
        Unit::new(1, 1, 1, Vec2::new(700.0, 500.0), 100),
    ];
    let mut engine = TurnEngine::with_units(2, settings, terrain, units).unwrap();

    // Dynamite at the shooter's own feet
    engine.fire(0, 90.0, 0.0, WeaponKind::Dynamite).unwrap();
    engine.advance(5_000);

    let unit = &engine.units()[0];
    assert!(unit.is_alive());
    assert!(unit.pos.y > 500.0);
    // Standing on solid ground again
    assert!(engine.terrain().is_solid(unit.pos.x as i32, unit.pos.y as i32));
    let events = engine.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, MatchEvent::UnitSettled { unit: 0, .. })));
}
