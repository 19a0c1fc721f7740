use core::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::constants::{
    ASTEROID_SIZE_MIN, ASTEROID_VARIANCE_MAX, ASTEROID_VARIANCE_MIN, FIXED_DT, PARTICLE_BURST_CAP,
    SPLIT_SCALE_PAIR, SPLIT_SCALE_TRIPLE,
};
use crate::entities::{
    Asteroid, BackgroundStar, Debris, Particle, Photon, ScoreGain, Ship,
};
use crate::error::{ConfigError, RuleCode};
use crate::geometry::Bounds;
use crate::input::{DirectionFlags, FireLatch, FrameInput};
use crate::render::DrawCommand;
use crate::rng::SeededRng;
use crate::transmission::{Transmission, TransmissionState};

mod game;

use game::Game;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum GameState {
    /// Waiting for the first input after creation.
    #[default]
    Inactive,
    AsteroidStage,
    /// The player left mid-stage; everything is frozen until they give input again.
    PausedAsteroid,
    TransmissionAnimation,
    Finished,
}

impl GameState {
    /// States in which entities move and collide.
    pub fn is_running(self) -> bool {
        matches!(
            self,
            Self::AsteroidStage | Self::TransmissionAnimation | Self::Finished
        )
    }
}

/// How a photon hit resolves an asteroid of a given size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SplitOutcome {
    Children { count: usize, size: f32 },
    Debris,
}

pub fn split_outcome(parent_size: f32) -> SplitOutcome {
    let mut size = parent_size * SPLIT_SCALE_PAIR;
    let mut count = 2;
    if size > ASTEROID_SIZE_MIN * 2.0 {
        size = parent_size * SPLIT_SCALE_TRIPLE;
        count = 3;
    }

    if size > ASTEROID_SIZE_MIN {
        SplitOutcome::Children { count, size }
    } else {
        SplitOutcome::Debris
    }
}

/// Dust particles released between two bodies of the given sizes.
pub fn pair_burst_count(size_a: f32, size_b: f32) -> usize {
    capped_burst((size_a + size_b) * crate::constants::DUST_PER_UNIT)
}

/// Residue particles released by a photon of the given radius.
pub fn residue_burst_count(photon_size: f32) -> usize {
    capped_burst(photon_size * crate::constants::RESIDUE_PER_UNIT)
}

#[inline]
fn capped_burst(raw: f32) -> usize {
    (raw.floor().max(0.0) as usize).min(PARTICLE_BURST_CAP)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReplayResult {
    pub frame_count: u32,
    pub rng_state: u32,
    pub game_state: GameState,
    pub collected_score: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReplayCheckpoint {
    pub frame_count: u32,
    pub rng_state: u32,
    pub game_state: GameState,
    pub collected_score: u32,
    pub asteroids: usize,
    pub photons: usize,
    pub debris: usize,
    pub free_score_gains: usize,
    pub dust: usize,
    pub residue: usize,
    pub ship_x: f32,
    pub ship_y: f32,
    pub ship_vx: f32,
    pub ship_vy: f32,
    pub ship_phi: f32,
    pub ship_damaged: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickViolation {
    pub frame_count: u32,
    pub rule: RuleCode,
}

impl fmt::Display for TickViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {}: {}", self.frame_count, self.rule)
    }
}

impl std::error::Error for TickViolation {}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ShipSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub phi: f32,
    pub size: f32,
    pub damaged: u32,
    pub current_flicker: f32,
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AsteroidSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub phi: f32,
    pub dphi: f32,
    pub size: f32,
    pub vertex_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PhotonSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DebrisSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub phi: f32,
    pub delta: f32,
    pub size: f32,
    pub lifetime: f32,
    /// Live value of the linked score gain.
    pub score: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoreGainSnapshot {
    pub x: f32,
    pub y: f32,
    pub dy: f32,
    pub lifetime: f32,
    pub score: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ParticleSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub lifetime: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub frame_count: u32,
    pub rng_state: u32,
    pub game_state: GameState,
    pub player_linked: bool,
    pub collected_score: u32,
    pub bounds: Bounds,
    pub transmission_state: Option<TransmissionState>,
    pub transmission_time: Option<f32>,
    pub ship: ShipSnapshot,
    pub asteroids: Vec<AsteroidSnapshot>,
    pub photons: Vec<PhotonSnapshot>,
    pub debris: Vec<DebrisSnapshot>,
    pub free_score_gains: Vec<ScoreGainSnapshot>,
    pub dust: Vec<ParticleSnapshot>,
    pub residue: Vec<ParticleSnapshot>,
    pub star_count: usize,
}

/// Host-facing handle on one running game.
#[derive(Clone)]
pub struct LiveGame {
    game: Game,
}

pub fn replay(config: &GameConfig, inputs: &[FrameInput]) -> Result<ReplayResult, ConfigError> {
    let mut game = LiveGame::new(config.clone())?;

    for input in inputs {
        game.step(*input);
    }

    Ok(game.result())
}

/// Replays `inputs` and samples a checkpoint before the first frame, every `sample_every`
/// frames and after the last one.
pub fn replay_with_checkpoints(
    config: &GameConfig,
    inputs: &[FrameInput],
    sample_every: u32,
) -> Result<Vec<ReplayCheckpoint>, ConfigError> {
    let mut game = LiveGame::new(config.clone())?;
    let stride = if sample_every == 0 { 1 } else { sample_every };
    let total_frames = inputs.len() as u32;
    let mut checkpoints = vec![game.checkpoint()];

    for (index, input) in inputs.iter().enumerate() {
        game.step(*input);
        let frame = (index + 1) as u32;
        if frame % stride == 0 || frame == total_frames {
            checkpoints.push(game.checkpoint());
        }
    }

    Ok(checkpoints)
}

impl LiveGame {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            game: Game::new(config),
        })
    }

    /// Spawns the opening asteroids. Does nothing once the game has left `Inactive`.
    pub fn start_game(&mut self) {
        self.game.start_game();
    }

    pub fn submit_input(&mut self, input: FrameInput) {
        self.game.submit_input(input);
    }

    /// Advances the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.game.tick(dt);
    }

    /// One fixed 60 Hz frame with `input`.
    #[inline]
    pub fn step(&mut self, input: FrameInput) {
        self.submit_input(input);
        self.tick(FIXED_DT);
    }

    /// Runs the tick on a copy first and only commits it when every invariant still holds.
    pub fn step_checked(&mut self, dt: f32) -> Result<(), TickViolation> {
        let mut next = self.game.clone();
        next.tick_unchecked(dt);
        if let Err(rule) = next.validate_invariants() {
            warn!(frame = next.frame_count(), %rule, "tick rejected");
            return Err(TickViolation {
                frame_count: next.frame_count(),
                rule,
            });
        }
        self.game = next;
        Ok(())
    }

    /// True once both asteroids and debris ran out and the transmission took over.
    pub fn is_stage_cleared(&self) -> bool {
        matches!(
            self.game.state(),
            GameState::TransmissionAnimation | GameState::Finished
        )
    }

    pub fn is_transmission_finished(&self) -> bool {
        self.game
            .transmission()
            .is_some_and(|transmission| transmission.is_finished())
    }

    pub fn link_player(&mut self) {
        self.game.link_player();
    }

    /// Returns false while the transmission is playing; the player cannot leave then.
    pub fn unlink_player(&mut self) -> bool {
        self.game.unlink_player()
    }

    pub fn is_player_linked(&self) -> bool {
        self.game.is_player_linked()
    }

    #[inline]
    pub fn game_state(&self) -> GameState {
        self.game.state()
    }

    #[inline]
    pub fn collected_score(&self) -> u32 {
        self.game.collected_score()
    }

    #[inline]
    pub fn frame_count(&self) -> u32 {
        self.game.frame_count()
    }

    pub fn config(&self) -> &GameConfig {
        self.game.config()
    }

    pub fn transmission(&self) -> Option<&Transmission> {
        self.game.transmission()
    }

    #[inline]
    pub fn snapshot(&self) -> WorldSnapshot {
        self.game.world_snapshot()
    }

    #[inline]
    pub fn checkpoint(&self) -> ReplayCheckpoint {
        self.game.checkpoint()
    }

    #[inline]
    pub fn result(&self) -> ReplayResult {
        self.game.result()
    }

    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        self.game.draw_commands()
    }

    #[inline]
    pub fn validate(&self) -> Result<(), RuleCode> {
        self.game.validate_invariants()
    }
}
