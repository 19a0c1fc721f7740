use super::*;

use crate::constants::{ASTEROID_SPEED_MIN, INITIAL_ASTEROID_SIZES, TRANSMISSION_LABEL};
use crate::render::{Color, Material};

const FIRE: FrameInput = FrameInput {
    move_x: 0.0,
    move_y: 0.0,
    fire_held: true,
};

/// Running stage with a single parked asteroid well away from the ship.
fn quiet_game(seed: u32) -> Game {
    let mut game = Game::new(GameConfig::with_seed(seed));
    game.state = GameState::AsteroidStage;
    let mut asteroid = game.shaped_asteroid(0.04);
    asteroid.pos = Vec2::new(-0.6, -0.4);
    game.asteroids.push(asteroid);
    game
}

fn parked_asteroid(game: &mut Game, size: f32, pos: Vec2) -> Asteroid {
    let mut asteroid = game.shaped_asteroid(size);
    asteroid.pos = pos;
    asteroid
}

#[test]
fn photon_splits_large_asteroid_into_three() {
    let mut game = quiet_game(7);
    game.asteroids.clear();
    let target = parked_asteroid(&mut game, 0.07, Vec2::new(0.0, 0.3));
    game.asteroids.push(target);

    game.submit_input(FIRE);
    game.step_ticks(1.0);
    assert_eq!(game.photons.len(), 1);
    let photon_size = game.photons[0].size;

    game.submit_input(FrameInput::IDLE);
    let mut hit = false;
    for _ in 0..60 {
        game.step_ticks(1.0);
        if game.photons.is_empty() {
            hit = true;
            break;
        }
    }
    assert!(hit, "photon never reached the asteroid");

    let SplitOutcome::Children { count, size } = split_outcome(0.07) else {
        panic!("0.07 must split");
    };
    assert_eq!(game.asteroids.len(), count);
    for child in &game.asteroids {
        assert_eq!(child.size, size);
        assert_eq!(child.coords.len(), 12);
        assert!(child.vel.x.abs() >= ASTEROID_SPEED_MIN);
        assert!(child.vel.y.abs() >= ASTEROID_SPEED_MIN);
    }

    let expected_dust = pair_burst_count(0.07, 0.07) + count * pair_burst_count(size, 0.07);
    assert_eq!(game.dust.len(), expected_dust);
    assert_eq!(game.residue.len(), residue_burst_count(photon_size));
    assert_eq!(game.state, GameState::AsteroidStage);
    assert_eq!(game.collected_score, 0);
}

#[test]
fn small_asteroid_shatters_into_debris() {
    let mut game = quiet_game(11);
    let parent = parked_asteroid(&mut game, 0.03, Vec2::new(0.4, 0.2));

    game.spawn_debris(&parent);

    assert!((2..=3).contains(&game.debris.len()));
    for debris in &game.debris {
        assert_eq!(debris.size, 0.015);
        assert!(debris.lifetime >= 175.0 && debris.lifetime <= DEBRIS_LIFETIME_MAX);
        let reach = parent.size * 1.001;
        assert!(debris.pos.distance_sq(parent.pos) <= reach * reach);
        assert_eq!(debris.score(), 15);
    }
}

#[test]
fn photon_shatters_small_asteroid_into_debris() {
    let mut game = quiet_game(43);
    let target = parked_asteroid(&mut game, 0.024, Vec2::new(0.0, 0.3));
    game.asteroids.push(target);
    assert_eq!(split_outcome(0.024), SplitOutcome::Debris);

    game.submit_input(FIRE);
    game.step_ticks(1.0);
    let photon_size = game.photons[0].size;

    game.submit_input(FrameInput::IDLE);
    for _ in 0..60 {
        game.step_ticks(1.0);
        if game.photons.is_empty() {
            break;
        }
    }
    assert!(game.photons.is_empty(), "photon never reached the asteroid");

    assert_eq!(game.asteroids.len(), 1, "only the parked rock is left");
    assert_eq!(game.asteroids[0].size, 0.04);
    assert!((2..=3).contains(&game.debris.len()));
    for debris in &game.debris {
        assert_eq!(debris.size, 0.012);
        assert_eq!(debris.score(), 15);
    }
    assert_eq!(game.residue.len(), residue_burst_count(photon_size));
    assert_eq!(game.dust.len(), pair_burst_count(0.024, 0.024));
    assert_eq!(game.state, GameState::AsteroidStage);
}

#[test]
fn collecting_debris_scores_and_clears_the_stage() {
    let mut game = quiet_game(3);
    game.asteroids.clear();
    let ship_pos = game.ship.pos;
    let parent = parked_asteroid(&mut game, 0.03, ship_pos);
    game.spawn_debris(&parent);
    let pieces = game.debris.len() as u32;

    game.step_ticks(1.0);

    assert!(game.debris.is_empty());
    assert_eq!(game.collected_score, 15 * pieces);
    assert_eq!(game.free_score_gains.len(), pieces as usize);
    assert!(game.free_score_gains.iter().all(|gain| gain.score == 15));
    assert_eq!(game.state, GameState::TransmissionAnimation);
}

#[test]
fn stage_clears_on_the_tick_the_last_debris_burns_out() {
    let mut game = quiet_game(5);
    game.asteroids.clear();
    let parent = parked_asteroid(&mut game, 0.03, Vec2::new(0.5, 0.3));
    game.spawn_debris(&parent);
    game.debris.truncate(1);
    game.debris[0].lifetime = 3.0;

    game.step_ticks(1.0);
    game.step_ticks(1.0);
    assert_eq!(game.state, GameState::AsteroidStage);
    assert_eq!(game.debris.len(), 1);

    game.step_ticks(1.0);
    assert!(game.debris.is_empty());
    assert_eq!(game.collected_score, 0);
    assert!((10..=20).contains(&game.dust.len()));
    assert_eq!(game.state, GameState::TransmissionAnimation);
    assert!(game.transmission.is_some());
}

#[test]
fn held_fire_shoots_once_and_photons_are_capped() {
    let mut game = quiet_game(9);

    for _ in 0..5 {
        game.submit_input(FIRE);
        game.step_ticks(1.0);
    }
    assert_eq!(game.photons.len(), 1);

    for _ in 0..12 {
        game.submit_input(FrameInput::IDLE);
        game.step_ticks(1.0);
        game.submit_input(FIRE);
        game.step_ticks(1.0);
    }
    assert_eq!(game.photons.len(), PHOTON_LIMIT);
}

#[test]
fn ship_damage_does_not_restack() {
    let mut game = quiet_game(13);
    let beside = game.ship.pos + Vec2::new(0.01, 0.0);
    let rock = parked_asteroid(&mut game, 0.04, beside);
    game.asteroids.push(rock);
    let heading = game.ship.phi;

    game.step_ticks(1.0);
    assert_eq!(game.ship.damaged, SHIP_DAMAGE_TICKS);
    assert!(game.ship.vel.x < 0.0, "pushed away from the rock");
    assert_ne!(game.ship.phi, heading);

    game.step_ticks(1.0);
    assert_eq!(game.ship.damaged, SHIP_DAMAGE_TICKS);

    game.step_ticks(1.0);
    assert_eq!(game.ship.damaged, SHIP_DAMAGE_TICKS - 1);
    assert_eq!(game.asteroids.len(), 2, "ship contact never breaks asteroids");
}

#[test]
fn dead_centre_knockback_stays_finite() {
    let mut game = quiet_game(17);
    let ship_pos = game.ship.pos;
    let rock = parked_asteroid(&mut game, 0.05, ship_pos);
    game.asteroids.push(rock);

    game.step_ticks(1.0);

    assert!(game.ship.vel.is_finite());
    assert!(game.ship.pos.is_finite());
    assert!(game.ship.vel.x > 0.0);
    assert!(game.validate_invariants().is_ok());
}

#[test]
fn ship_wraps_to_the_opposite_edge() {
    let mut game = quiet_game(19);
    let margin = game.ship.size;
    game.ship.pos = Vec2::new(game.bounds.x_max + margin + 0.001, 0.0);

    game.step_ticks(1.0);

    let expected = game.bounds.x_min - margin + 0.001;
    assert!((game.ship.pos.x - expected).abs() < 1e-4);
    assert_eq!(game.ship.pos.y, 0.0);
}

#[test]
fn unlinking_pauses_and_input_resumes() {
    let mut game = Game::new(GameConfig::with_seed(23));
    game.start_game();
    assert_eq!(game.state, GameState::AsteroidStage);
    assert_eq!(game.asteroids.len(), 3);

    assert!(game.unlink_player());
    assert_eq!(game.state, GameState::PausedAsteroid);
    let frozen: Vec<Vec2> = game.asteroids.iter().map(|asteroid| asteroid.pos).collect();

    game.submit_input(FrameInput::new(1.0, 0.0, true));
    game.step_ticks(1.0);
    assert_eq!(game.state, GameState::PausedAsteroid);
    let after: Vec<Vec2> = game.asteroids.iter().map(|asteroid| asteroid.pos).collect();
    assert_eq!(frozen, after);

    game.link_player();
    game.submit_input(FrameInput::new(1.0, 0.0, false));
    game.step_ticks(1.0);
    assert_eq!(game.state, GameState::AsteroidStage);
}

#[test]
fn inactive_game_starts_on_first_input() {
    let mut game = Game::new(GameConfig::with_seed(29));
    game.step_ticks(1.0);
    assert_eq!(game.state, GameState::Inactive);
    assert!(game.asteroids.is_empty());

    assert!(game.unlink_player());
    assert_eq!(game.state, GameState::Inactive);
    game.link_player();

    game.submit_input(FrameInput::new(0.0, 1.0, false));
    game.step_ticks(1.0);
    assert_eq!(game.state, GameState::AsteroidStage);
    assert_eq!(game.asteroids.len(), INITIAL_ASTEROID_SIZES.len());
}

#[test]
fn transmission_runs_to_finished() {
    let mut game = quiet_game(31);
    game.asteroids.clear();

    game.step_ticks(1.0);
    assert_eq!(game.state, GameState::TransmissionAnimation);
    assert!(!game.unlink_player());

    let budget = game
        .transmission
        .as_ref()
        .map(|transmission| transmission.timeline().total())
        .unwrap_or_default() as usize
        + 16;
    for _ in 0..budget {
        if game.state == GameState::Finished {
            break;
        }
        game.step_ticks(1.0);
    }

    assert_eq!(game.state, GameState::Finished);
    assert!(game.transmission.as_ref().is_some_and(Transmission::is_finished));
    assert!(game.unlink_player());
    assert_eq!(game.state, GameState::Finished);
}

#[test]
fn long_scripted_run_keeps_invariants() {
    let mut game = Game::new(GameConfig::with_seed(0x5EED));

    for frame in 0..3_000u32 {
        let turn = if (frame / 90) % 2 == 0 { 1.0 } else { -1.0 };
        let thrust = if frame % 40 < 10 { 1.0 } else { 0.0 };
        game.submit_input(FrameInput::new(turn, thrust, frame % 7 == 0));
        game.step_ticks(1.0);
        assert_eq!(game.validate_invariants(), Ok(()), "frame {frame}");
    }
    assert_eq!(game.frame_count, 3_000);
}

#[test]
fn tick_ignores_non_finite_durations() {
    let mut game = quiet_game(37);
    game.ship.vel = Vec2::new(0.5, 0.0);
    let start = game.ship.pos;

    game.tick(f32::NAN);
    game.tick(-1.0);

    assert_eq!(game.ship.pos, start);
    assert_eq!(game.frame_count, 2);
}

#[test]
fn draw_commands_follow_game_state() {
    let mut game = quiet_game(41);
    let commands = game.draw_commands();
    assert!(commands.iter().any(|command| matches!(
        command,
        DrawCommand::FilledPolygon {
            material: Material::Black,
            ..
        }
    )));
    assert!(!commands
        .iter()
        .any(|command| matches!(command, DrawCommand::Text { .. })));

    game.asteroids.clear();
    for _ in 0..200 {
        game.step_ticks(1.0);
    }
    let commands = game.draw_commands();
    assert!(commands.iter().any(|command| matches!(
        command,
        DrawCommand::Text { text, .. } if text == TRANSMISSION_LABEL
    )));
}

fn drawn_digits(game: &Game) -> Vec<(u8, Color)> {
    game.draw_commands()
        .into_iter()
        .filter_map(|command| match command {
            DrawCommand::Digit(glyph) => Some((glyph.value, glyph.color)),
            _ => None,
        })
        .collect()
}

fn decimal(value: u32) -> Vec<u8> {
    value.to_string().bytes().map(|byte| byte - b'0').collect()
}

#[test]
fn linked_score_gains_show_the_live_debris_score() {
    let mut game = quiet_game(53);
    let parent = parked_asteroid(&mut game, 0.03, Vec2::new(0.4, 0.2));
    game.spawn_debris(&parent);
    game.step_ticks(1.0);
    assert!(!game.debris.is_empty());

    let expected: Vec<u8> = game
        .debris
        .iter()
        .flat_map(|debris| decimal(debris.score()))
        .collect();
    let drawn = drawn_digits(&game);
    assert_eq!(
        drawn.iter().map(|(value, _)| *value).collect::<Vec<_>>(),
        expected
    );
    assert!(drawn.iter().all(|(_, color)| *color == Color::WHITE));

    for debris in &mut game.debris {
        debris.lifetime = 42.0;
    }
    game.step_ticks(1.0);
    let drawn = drawn_digits(&game);
    assert_eq!(drawn.len(), game.debris.len());
    assert!(drawn.iter().all(|(value, _)| *value == 5));
    assert!(drawn.iter().all(|(_, color)| *color != Color::GREEN));
}

#[test]
fn collected_score_gains_are_drawn_green_and_frozen() {
    let mut game = quiet_game(59);
    let ship_pos = game.ship.pos;
    let parent = parked_asteroid(&mut game, 0.03, ship_pos);
    game.spawn_debris(&parent);
    let pieces = game.debris.len();

    game.step_ticks(1.0);
    assert!(game.debris.is_empty());
    assert_eq!(game.free_score_gains.len(), pieces);

    for _ in 0..5 {
        game.step_ticks(1.0);
    }
    let drawn = drawn_digits(&game);
    let expected: Vec<u8> = (0..pieces).flat_map(|_| decimal(15)).collect();
    assert_eq!(
        drawn.iter().map(|(value, _)| *value).collect::<Vec<_>>(),
        expected
    );
    assert!(drawn.iter().all(|(_, color)| *color == Color::GREEN));
}

#[test]
fn checked_step_reports_violation_instead_of_committing() {
    let mut game = Game::new(GameConfig::with_seed(61));
    game.ship.damaged = SHIP_DAMAGE_TICKS + 5;
    let mut live = LiveGame { game };

    let violation = match live.step_checked(FIXED_DT) {
        Err(violation) => violation,
        Ok(()) => panic!("out-of-range damage must be rejected"),
    };
    assert_eq!(violation.rule, RuleCode::ShipDamageRange);
    assert_eq!(violation.frame_count, 1);
    assert_eq!(live.frame_count(), 0);
}
