use std::path::PathBuf;

use engine::AppPaths;

use super::*;
use crate::effects::PROJECTILE_SPEED;
use crate::entity::DASH_START;
use crate::level::{GridPos, MapFormatError};

const FLOOR_ROW: i32 = 10;
const PLAYER_COLUMN: i32 = 2;
const PLAYER_START: Vec2 = Vec2::new(32.0, 144.0);
const DISPLAY: Vec2 = Vec2::new(640.0, 480.0);

fn level(player_column: Option<i32>, enemies: &[GridPos]) -> Tilemap {
    let mut map = Tilemap::new(16);
    for x in -10..40 {
        map.insert(TileKind::Stone, 1, GridPos::new(x, FLOOR_ROW));
    }
    if let Some(column) = player_column {
        map.insert(
            TileKind::Spawners,
            PLAYER_SPAWNER,
            GridPos::new(column, FLOOR_ROW - 1),
        );
    }
    for &pos in enemies {
        map.insert(TileKind::Spawners, ENEMY_SPAWNER, pos);
    }
    map
}

/// An enemy parked on a high ledge, far outside the player's shooting band,
/// so the level never completes on its own.
fn with_sentry(mut map: Tilemap) -> Tilemap {
    for x in 30..35 {
        map.insert(TileKind::Stone, 1, GridPos::new(x, 3));
    }
    map.insert(TileKind::Spawners, ENEMY_SPAWNER, GridPos::new(32, 2));
    map
}

fn guarded_level() -> Tilemap {
    with_sentry(level(Some(PLAYER_COLUMN), &[]))
}

fn config(level_count: usize, seed: u64) -> GameConfig {
    let mut config = GameConfig::new(AppPaths::under_root(PathBuf::from("unused")), seed);
    config.level_count = level_count;
    config
}

fn try_session(levels: Vec<Tilemap>) -> Result<SessionState, LevelLoadError> {
    let config = config(levels.len(), 42);
    SessionState::new(
        GameAssets::placeholder(),
        Box::new(MemoryLevels::new(levels)),
        &config,
        DISPLAY,
    )
}

fn session(levels: Vec<Tilemap>) -> SessionState {
    match try_session(levels) {
        Ok(session) => session,
        Err(err) => panic!("session should load: {err}"),
    }
}

fn idle() -> InputSnapshot {
    InputSnapshot::empty()
}

fn tick(session: &mut SessionState, input: &InputSnapshot) {
    if let Err(err) = session.tick(input) {
        panic!("tick failed: {err}");
    }
}

#[test]
fn shipped_levels_load_with_actors() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..");
    let paths = AppPaths::under_root(root);
    let mut config = GameConfig::new(paths, 5);

    for index in 0..config.level_count {
        config.start_level = index;
        let session = match SessionState::new(
            GameAssets::placeholder(),
            Box::new(DirectoryLevels::new(config.maps_dir())),
            &config,
            DISPLAY,
        ) {
            Ok(session) => session,
            Err(err) => panic!("level {index} should load: {err}"),
        };
        assert_eq!(session.level(), index);
        assert!(session.total_enemies() > 0, "level {index} has no enemies");
        assert!(session.tilemap().solid_check(
            session.player().body.rect().center() + Vec2::new(0.0, 16.0)
        ));
    }
}

#[test]
fn level_load_places_actors_and_resets_counters() {
    let session = session(vec![level(Some(PLAYER_COLUMN), &[GridPos::new(6, 9)])]);

    assert_eq!(session.player().body.pos, PLAYER_START);
    assert_eq!(session.enemies().len(), 1);
    assert_eq!(session.enemies()[0].body.pos, Vec2::new(96.0, 144.0));
    assert_eq!(session.total_enemies(), 1);
    assert_eq!(session.transition(), -TRANSITION_TICKS);
    assert_eq!(session.dead(), 0);
    assert_eq!(session.scroll(), Vec2::ZERO);
    assert!(session
        .tilemap()
        .tile_at(GridPos::new(PLAYER_COLUMN, FLOOR_ROW - 1))
        .is_none());
}

#[test]
fn tree_tiles_become_leaf_spawners_and_stay_in_map() {
    let mut map = guarded_level();
    map.insert(TileKind::LargeDecor, 2, GridPos::new(5, 7));
    map.insert(TileKind::LargeDecor, 1, GridPos::new(8, 7));
    let session = session(vec![map]);

    assert_eq!(session.leaf_spawners(), &[Rect::new(84.0, 116.0, 23.0, 13.0)]);
    assert!(session.tilemap().tile_at(GridPos::new(5, 7)).is_some());
}

#[test]
fn leaves_fall_from_trees_eventually() {
    let mut map = guarded_level();
    map.insert(TileKind::LargeDecor, 2, GridPos::new(5, 7));
    let mut session = session(vec![map]);

    let mut saw_leaf = false;
    for _ in 0..5_000 {
        tick(&mut session, &idle());
        if session
            .particles()
            .iter()
            .any(|particle| particle.kind == ParticleKind::Leaf)
        {
            saw_leaf = true;
            break;
        }
    }
    assert!(saw_leaf);
}

#[test]
fn missing_player_spawner_rejects_level() {
    let result = try_session(vec![with_sentry(level(None, &[]))]);
    assert!(matches!(
        result,
        Err(LevelLoadError::Format {
            source: MapFormatError::MissingPlayerSpawner,
            ..
        })
    ));
}

#[test]
fn resting_player_reports_floor_contact_on_alternate_ticks() {
    let mut session = session(vec![guarded_level()]);

    // Standing exactly on the floor with no fall speed moves nothing, so no
    // flag is set and gravity adds 0.1. That 0.1 pushes into the floor on the
    // next tick, which sets `down` and zeroes the fall speed again.
    tick(&mut session, &idle());
    let body = &session.player().body;
    assert!(!body.collisions.down);
    assert!((body.velocity.y - 0.1).abs() < 1e-6);

    tick(&mut session, &idle());
    let player = session.player();
    assert_eq!(player.body.pos, PLAYER_START);
    assert!(player.body.collisions.down);
    assert_eq!(player.body.velocity.y, 0.0);

    for _ in 0..60 {
        tick(&mut session, &idle());
        let body = &session.player().body;
        assert_eq!(body.pos, PLAYER_START);
        if body.collisions.down {
            assert_eq!(body.velocity.y, 0.0);
        }
    }
}

#[test]
fn free_fall_accumulates_linearly() {
    let mut map = with_sentry(level(None, &[]));
    map.insert(TileKind::Spawners, PLAYER_SPAWNER, GridPos::new(PLAYER_COLUMN, 0));
    let mut session = session(vec![map]);

    for _ in 0..10 {
        tick(&mut session, &idle());
    }
    let body = &session.player().body;
    assert!((body.velocity.y - 1.0).abs() < 1e-5);
    assert!(!body.collisions.down);
}

#[test]
fn camera_eases_toward_player_center() {
    let mut session = session(vec![guarded_level()]);
    tick(&mut session, &idle());

    // Player center (40, 152) minus half the display, one twentieth of the way.
    assert!((session.scroll().x - -14.0).abs() < 1e-4);
    assert!((session.scroll().y - -4.4).abs() < 1e-4);
    assert_eq!(session.render_scroll(), Vec2::new(-14.0, -4.0));
}

#[test]
fn movement_input_applies_on_the_next_tick() {
    let mut session = session(vec![guarded_level()]);
    let right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);

    tick(&mut session, &right);
    assert_eq!(session.player().body.pos.x, PLAYER_START.x);

    tick(&mut session, &idle());
    assert_eq!(session.player().body.pos.x, PLAYER_START.x + 1.0);
}

#[test]
fn jump_cue_plays_only_while_charges_remain() {
    let mut session = session(vec![guarded_level()]);
    let jump = InputSnapshot::empty().with_action_pressed(InputAction::Jump);

    for _ in 0..3 {
        tick(&mut session, &jump);
    }
    assert_eq!(session.drain_cues(), vec![SoundCue::Jump, SoundCue::Jump]);
    assert_eq!(session.player().jumps(), 0);
    assert!(session.drain_cues().is_empty());
}

#[test]
fn repeated_dash_press_is_ignored_while_dashing() {
    let mut session = session(vec![guarded_level()]);
    let dash = InputSnapshot::empty().with_action_pressed(InputAction::Dash);

    tick(&mut session, &dash);
    tick(&mut session, &dash);
    assert_eq!(session.drain_cues(), vec![SoundCue::Dash]);
    assert_eq!(session.player().dashing(), DASH_START - 1);
}

#[test]
fn cleared_level_advances_only_after_transition_passes_thirty() {
    let mut session = session(vec![level(Some(PLAYER_COLUMN), &[]), guarded_level()]);

    let mut last_transition = session.transition();
    for _ in 0..200 {
        tick(&mut session, &idle());
        if session.level() == 1 {
            break;
        }
        last_transition = session.transition();
    }
    assert_eq!(session.level(), 1);
    assert_eq!(last_transition, TRANSITION_TICKS);
    assert_eq!(session.total_enemies(), 1);
    assert!(session.transition() < 0);
}

#[test]
fn clearing_last_level_shows_win_screen_and_freezes() {
    let mut session = session(vec![level(Some(PLAYER_COLUMN), &[])]);

    for _ in 0..200 {
        tick(&mut session, &idle());
        if session.is_won() {
            break;
        }
    }
    assert!(session.is_won());
    let frozen = session.transition();
    tick(&mut session, &idle());
    assert_eq!(session.transition(), frozen);

    let mut surface = Surface::new(640, 480);
    session.render(&mut surface);
    assert_eq!(surface.pixel(0, 0), Some(BLACK));
    assert!(surface
        .pixels()
        .chunks_exact(4)
        .any(|px| px == WHITE.as_slice()));
}

#[test]
fn death_reloads_level_after_forty_ticks() {
    let mut session = session(vec![guarded_level()]);
    session.dead = 1;
    session.player.body.pos = Vec2::new(200.0, 20.0);
    session
        .projectiles
        .push(Projectile::new(Vec2::new(300.0, 40.0), -PROJECTILE_SPEED));
    session.sparks.push(Spark::new(Vec2::new(10.0, 10.0), 0.0, 50.0));

    let mut last_dead = session.dead();
    let mut saw_iris_closing = false;
    for _ in 0..100 {
        let before = session.transition();
        tick(&mut session, &idle());
        if session.dead() == 0 {
            break;
        }
        if session.dead() >= DEATH_IRIS_TICK && session.transition() > before {
            saw_iris_closing = true;
        }
        last_dead = session.dead();
    }

    assert_eq!(last_dead, DEATH_RELOAD_TICK);
    assert!(saw_iris_closing);
    assert_eq!(session.dead(), 0);
    assert_eq!(session.player().body.pos, PLAYER_START);
    assert_eq!(session.enemies().len(), session.total_enemies());
    assert!(session.projectiles().is_empty());
    assert!(session.sparks().is_empty());
    assert!(session.particles().is_empty());
}

#[test]
fn dash_through_enemy_kills_it() {
    let mut session = session(vec![
        level(Some(PLAYER_COLUMN), &[GridPos::new(4, 9)]),
        guarded_level(),
    ]);
    let dash = InputSnapshot::empty().with_action_pressed(InputAction::Dash);

    tick(&mut session, &dash);
    for _ in 0..15 {
        if session.enemies().is_empty() {
            break;
        }
        tick(&mut session, &idle());
    }

    assert!(session.enemies().is_empty());
    assert_eq!(session.total_enemies(), 1);
    let cues = session.drain_cues();
    assert_eq!(cues.first(), Some(&SoundCue::Dash));
    assert!(cues.contains(&SoundCue::Hit));
    assert!(session.sparks().len() >= 32);
}

#[test]
fn projectile_hit_kills_player_with_burst() {
    let mut session = session(vec![guarded_level()]);
    session
        .projectiles
        .push(Projectile::new(Vec2::new(38.5, 152.0), PROJECTILE_SPEED));

    tick(&mut session, &idle());

    assert_eq!(session.dead(), 1);
    assert!(session.projectiles().is_empty());
    assert_eq!(session.drain_cues(), vec![SoundCue::Hit]);
    assert_eq!(session.sparks().len(), 30);
    assert_eq!(session.particles().len(), 30);
}

#[test]
fn dashing_player_ignores_projectiles() {
    let mut session = session(vec![guarded_level()]);
    session.player.dash();
    session
        .projectiles
        .push(Projectile::new(Vec2::new(38.5, 152.0), PROJECTILE_SPEED));

    tick(&mut session, &idle());

    assert_eq!(session.dead(), 0);
    assert_eq!(session.projectiles().len(), 1);
}

#[test]
fn projectile_hitting_tile_leaves_sparks() {
    let mut session = session(vec![guarded_level()]);
    session
        .projectiles
        .push(Projectile::new(Vec2::new(100.0, 161.0), PROJECTILE_SPEED));

    tick(&mut session, &idle());

    assert!(session.projectiles().is_empty());
    assert_eq!(session.sparks().len(), 4);
    assert!(session
        .sparks()
        .iter()
        .all(|spark| (spark.angle - PI).abs() <= 0.5));
}

#[test]
fn same_seed_and_input_replays_identically() {
    let mut map = guarded_level();
    map.insert(TileKind::LargeDecor, 2, GridPos::new(5, 7));
    let mut a = session(vec![map.clone()]);
    let mut b = session(vec![map]);
    let right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);

    for step in 0..300 {
        let input = if step % 50 < 20 { right } else { idle() };
        tick(&mut a, &input);
        tick(&mut b, &input);
    }

    assert_eq!(a.player().body.pos, b.player().body.pos);
    assert_eq!(a.particles().len(), b.particles().len());
    assert_eq!(a.enemies()[0].body.pos, b.enemies()[0].body.pos);
    assert_eq!(a.enemies()[0].walking(), b.enemies()[0].walking());
}

#[test]
fn fresh_level_renders_closed_iris_under_hud() {
    let mut session = session(vec![guarded_level()]);
    let mut surface = Surface::new(640, 480);
    session.render(&mut surface);

    assert_eq!(surface.pixel(320, 240), Some(BLACK));
    assert_eq!(surface.pixel(10, 10), Some(WHITE));

    for _ in 0..30 {
        tick(&mut session, &idle());
    }
    assert_eq!(session.transition(), 0);
    let mut surface = Surface::new(640, 480);
    session.render(&mut surface);
    assert!(surface
        .pixels()
        .chunks_exact(4)
        .any(|px| px == [40, 48, 72, 255].as_slice()));
}
