use crate::pilot::{create_pilot, Pilot};
use anyhow::{anyhow, Result};
use asteroids_canvas_core::constants::FIXED_DT;
use asteroids_canvas_core::input::{decode_input_byte, encode_input_byte};
use asteroids_canvas_core::render::DrawCommand;
use asteroids_canvas_core::sim::ReplayResult;
use asteroids_canvas_core::{replay, GameConfig, GameState, LiveGame};
use serde::Serialize;
use tracing::debug;

#[derive(Clone, Debug, Serialize)]
pub struct SessionMetrics {
    pub pilot_id: String,
    pub seed: u32,
    pub max_frames: u32,
    pub frame_count: u32,
    pub collected_score: u32,
    pub final_rng_state: u32,
    pub final_state: GameState,
    /// First frame after which the transmission was playing.
    pub stage_cleared_frame: Option<u32>,
    pub finished_frame: Option<u32>,
    pub action_frames: u32,
    pub turn_frames: u32,
    pub thrust_frames: u32,
    pub fire_frames: u32,
    pub peak_asteroids: usize,
    pub peak_particles: usize,
}

#[derive(Clone, Debug)]
pub struct SessionArtifact {
    pub metrics: SessionMetrics,
    /// One encoded byte per simulated frame.
    pub inputs: Vec<u8>,
}

pub fn run_session(
    pilot_id: &str,
    config: &GameConfig,
    max_frames: u32,
) -> Result<SessionArtifact> {
    let mut pilot = create_pilot(pilot_id).ok_or_else(|| anyhow!("unknown pilot '{pilot_id}'"))?;
    run_pilot(pilot.as_mut(), config, max_frames)
}

/// Drives one game until it finishes or `max_frames` run out, checking every tick.
pub fn run_pilot(
    pilot: &mut dyn Pilot,
    config: &GameConfig,
    max_frames: u32,
) -> Result<SessionArtifact> {
    if max_frames == 0 {
        return Err(anyhow!("max_frames must be > 0"));
    }

    pilot.reset(config.seed);
    let mut game =
        LiveGame::new(config.clone()).map_err(|err| anyhow!("invalid game config: {err}"))?;
    game.validate()
        .map_err(|rule| anyhow!("initial invariant failure: {rule}"))?;

    let mut inputs = Vec::with_capacity(max_frames as usize);
    let mut stage_cleared_frame = None;
    let mut peak_asteroids = 0;
    let mut peak_particles = 0;

    while game.frame_count() < max_frames && game.game_state() != GameState::Finished {
        let snapshot = game.snapshot();
        peak_asteroids = peak_asteroids.max(snapshot.asteroids.len());
        peak_particles = peak_particles.max(snapshot.dust.len() + snapshot.residue.len());

        // the byte is what gets replayed, so feed the game its decoded form
        let byte = encode_input_byte(pilot.next_input(&snapshot));
        inputs.push(byte);
        game.submit_input(decode_input_byte(byte));
        game.step_checked(FIXED_DT)
            .map_err(|violation| anyhow!("invariant failure at {violation}"))?;

        if stage_cleared_frame.is_none() && game.is_stage_cleared() {
            stage_cleared_frame = Some(game.frame_count());
            debug!(pilot = pilot.id(), frame = game.frame_count(), "stage cleared");
        }
    }

    let result = game.result();
    let finished_frame = game.is_transmission_finished().then_some(result.frame_count);

    let mut action_frames = 0u32;
    let mut turn_frames = 0u32;
    let mut thrust_frames = 0u32;
    let mut fire_frames = 0u32;
    for byte in &inputs {
        if *byte != 0 {
            action_frames += 1;
        }
        if (*byte & 0x03) != 0 {
            turn_frames += 1;
        }
        if (*byte & 0x0C) != 0 {
            thrust_frames += 1;
        }
        if (*byte & 0x10) != 0 {
            fire_frames += 1;
        }
    }

    Ok(SessionArtifact {
        metrics: SessionMetrics {
            pilot_id: pilot.id().to_string(),
            seed: config.seed,
            max_frames,
            frame_count: result.frame_count,
            collected_score: result.collected_score,
            final_rng_state: result.rng_state,
            final_state: result.game_state,
            stage_cleared_frame,
            finished_frame,
            action_frames,
            turn_frames,
            thrust_frames,
            fire_frames,
            peak_asteroids,
            peak_particles,
        },
        inputs,
    })
}

/// Replays a recorded input byte stream against `config`.
pub fn replay_inputs(config: &GameConfig, bytes: &[u8]) -> Result<ReplayResult> {
    let inputs: Vec<_> = bytes.iter().copied().map(decode_input_byte).collect();
    replay(config, &inputs).map_err(|err| anyhow!("invalid game config: {err}"))
}

/// Draw commands after running `pilot_id` for `frame` frames.
pub fn frame_commands(pilot_id: &str, config: &GameConfig, frame: u32) -> Result<Vec<DrawCommand>> {
    let mut pilot = create_pilot(pilot_id).ok_or_else(|| anyhow!("unknown pilot '{pilot_id}'"))?;
    pilot.reset(config.seed);
    let mut game =
        LiveGame::new(config.clone()).map_err(|err| anyhow!("invalid game config: {err}"))?;

    while game.frame_count() < frame {
        let input = pilot.next_input(&game.snapshot());
        game.step(input);
    }
    Ok(game.draw_commands())
}
