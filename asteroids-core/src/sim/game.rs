use super::*;

use core::f32::consts::{PI, TAU};

use crate::constants::{
    ASTEROID_SIZE_MIN, DEBRIS_LIFETIME_MAX, PHOTON_LIMIT, SCORE_GAIN_LIFETIME, SHIP_DAMAGE_TICKS,
    SHIP_FLICKER_DRAIN, TICKS_PER_SECOND, VELOCITY_DECAY,
};
use crate::geometry::{asteroid_vertex_count, wrap_angle, Vec2};
use crate::render::{self, Scene};
use crate::transmission::TransmissionStep;

mod collision;
mod spawn;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub(super) struct Game {
    config: GameConfig,
    bounds: Bounds,
    state: GameState,
    player_linked: bool,
    directions: DirectionFlags,
    fire_latch: FireLatch,
    pending_shot: bool,
    ship: Ship,
    asteroids: Vec<Asteroid>,
    photons: Vec<Photon>,
    debris: Vec<Debris>,
    free_score_gains: Vec<ScoreGain>,
    dust: Vec<Particle>,
    residue: Vec<Particle>,
    stars: Vec<BackgroundStar>,
    transmission: Option<Transmission>,
    collected_score: u32,
    prune_mask: u8,
    frame_count: u32,
    rng: SeededRng,
}

const PRUNE_ASTEROIDS: u8 = 1 << 0;
const PRUNE_PHOTONS: u8 = 1 << 1;
const PRUNE_DEBRIS: u8 = 1 << 2;
const PRUNE_SCORE_GAINS: u8 = 1 << 3;
const PRUNE_DUST: u8 = 1 << 4;
const PRUNE_RESIDUE: u8 = 1 << 5;

const PHOTON_VEC_CAPACITY: usize = PHOTON_LIMIT;
const ASTEROID_VEC_CAPACITY: usize = 32;

impl Game {
    pub(super) fn new(config: GameConfig) -> Self {
        let bounds = config.bounds();
        let mut game = Self {
            rng: SeededRng::new(config.seed),
            config,
            bounds,
            state: GameState::Inactive,
            player_linked: true,
            directions: DirectionFlags::default(),
            fire_latch: FireLatch::default(),
            pending_shot: false,
            ship: Ship::at(Vec2::new(
                bounds.x_min + bounds.width() / 2.0,
                bounds.y_min + bounds.height() / 2.0,
            )),
            asteroids: Vec::with_capacity(ASTEROID_VEC_CAPACITY),
            photons: Vec::with_capacity(PHOTON_VEC_CAPACITY),
            debris: Vec::new(),
            free_score_gains: Vec::new(),
            dust: Vec::new(),
            residue: Vec::new(),
            stars: Vec::new(),
            transmission: None,
            collected_score: 0,
            prune_mask: 0,
            frame_count: 0,
        };

        game.spawn_stars();
        game
    }

    #[inline]
    pub(super) fn state(&self) -> GameState {
        self.state
    }

    #[inline]
    pub(super) fn frame_count(&self) -> u32 {
        self.frame_count
    }

    #[inline]
    pub(super) fn collected_score(&self) -> u32 {
        self.collected_score
    }

    #[inline]
    pub(super) fn is_player_linked(&self) -> bool {
        self.player_linked
    }

    pub(super) fn config(&self) -> &GameConfig {
        &self.config
    }

    pub(super) fn transmission(&self) -> Option<&Transmission> {
        self.transmission.as_ref()
    }

    pub(super) fn start_game(&mut self) {
        match self.state {
            GameState::Inactive => {
                self.state = GameState::AsteroidStage;
                self.spawn_opening_asteroids();
                debug!(frame = self.frame_count, "game started");
            }
            GameState::PausedAsteroid => self.resume(),
            _ => {}
        }
    }

    fn resume(&mut self) {
        self.state = GameState::AsteroidStage;
        debug!(frame = self.frame_count, "game resumed");
    }

    pub(super) fn submit_input(&mut self, input: FrameInput) {
        if !self.player_linked {
            return;
        }

        self.directions = DirectionFlags::from_axes(input.move_x, input.move_y);
        if self.fire_latch.advance(input.fire_held) {
            self.pending_shot = true;
        }
    }

    pub(super) fn link_player(&mut self) {
        self.player_linked = true;
        debug!(frame = self.frame_count, "player linked");
    }

    pub(super) fn unlink_player(&mut self) -> bool {
        if self.state == GameState::TransmissionAnimation {
            return false;
        }

        self.player_linked = false;
        self.directions = DirectionFlags::default();
        self.fire_latch = FireLatch::default();
        self.pending_shot = false;

        if self.state == GameState::AsteroidStage {
            self.state = GameState::PausedAsteroid;
            debug!(frame = self.frame_count, "game paused");
        }
        true
    }

    pub(super) fn tick(&mut self, dt: f32) {
        self.step_ticks(sanitize_dt(dt) * TICKS_PER_SECOND);
    }

    /// Same as [`Game::tick`] without the debug invariant assertion, for callers that
    /// check the invariants themselves and report the violation.
    pub(super) fn tick_unchecked(&mut self, dt: f32) {
        self.advance(sanitize_dt(dt) * TICKS_PER_SECOND);
    }

    /// One simulation step measured in 60 Hz ticks.
    pub(super) fn step_ticks(&mut self, dt: f32) {
        self.advance(dt);
        debug_assert!(
            self.validate_invariants().is_ok(),
            "invariant violated at frame {}: {:?}",
            self.frame_count,
            self.validate_invariants()
        );
    }

    fn advance(&mut self, dt: f32) {
        self.frame_count = self.frame_count.wrapping_add(1);

        let wants_to_play = self.pending_shot || self.directions.any();
        match self.state {
            GameState::Inactive if wants_to_play => self.start_game(),
            GameState::PausedAsteroid if wants_to_play => self.resume(),
            _ => {}
        }

        if self.state.is_running() {
            self.update_stars(dt);
            self.update_ship(dt);
            if self.pending_shot {
                self.fire_photon();
            }
            self.update_photons(dt);
            self.update_asteroids(dt);
            self.update_dust(dt);
            self.update_residue(dt);
            self.update_debris(dt);
            self.update_score_gains(dt);

            self.resolve_collisions();
            self.prune_inactive_entities();
        }
        self.pending_shot = false;

        if self.state == GameState::AsteroidStage
            && self.asteroids.is_empty()
            && self.debris.is_empty()
        {
            self.begin_transmission();
        }

        if self.state == GameState::TransmissionAnimation {
            self.update_transmission(dt);
        }
    }

    fn begin_transmission(&mut self) {
        self.transmission = Some(Transmission::new(&self.config, &mut self.rng));
        self.state = GameState::TransmissionAnimation;
        debug!(frame = self.frame_count, "stage cleared, starting transmission");
    }

    fn update_transmission(&mut self, dt: f32) {
        let Some(transmission) = self.transmission.as_mut() else {
            return;
        };

        match transmission.advance(dt) {
            TransmissionStep::Holding => {}
            TransmissionStep::Advanced(next) => {
                debug!(frame = self.frame_count, state = ?next, "transmission advanced");
            }
            TransmissionStep::Completed => {
                self.state = GameState::Finished;
                debug!(frame = self.frame_count, "transmission finished");
            }
        }
    }

    fn update_stars(&mut self, dt: f32) {
        for star in &mut self.stars {
            star.flicker += star.flicker_rate * dt;
            if star.flicker > PI {
                star.flicker -= PI;
            }
        }
    }

    fn update_ship(&mut self, dt: f32) {
        let directions = self.directions;
        let ship = &mut self.ship;

        if directions.left != directions.right {
            let turn = TAU / ship.turn_speed * dt;
            let signed = if directions.right { turn } else { -turn };
            ship.phi = wrap_angle(ship.phi + signed);
        }

        if directions.up || directions.down {
            let push = (directions.up as i32 - directions.down as i32) as f32;
            let thrust = Vec2::from_heading(ship.phi) * push;
            // per-tick blend, compounded so longer frames land where repeated ticks would
            let blend = 1.0 - (1.0 - ship.control).powf(dt);
            ship.vel = ship.vel.lerp(thrust, blend);
        }

        ship.pos += ship.vel * (ship.speed * dt);
        ship.pos = self.bounds.wrap(ship.pos, ship.size);

        if ship.damaged > 0 {
            ship.current_flicker -= SHIP_FLICKER_DRAIN * dt;
            while ship.current_flicker <= 0.0 && ship.damaged > 0 {
                ship.current_flicker += ship.flicker_rate;
                ship.damaged -= 1;
            }
        }
    }

    fn update_photons(&mut self, dt: f32) {
        let bounds = self.bounds;
        for photon in &mut self.photons {
            photon.pos += photon.vel * dt;
            if bounds.is_outside(photon.pos, photon.size) {
                photon.active = false;
                self.prune_mask |= PRUNE_PHOTONS;
            }
        }
    }

    fn update_asteroids(&mut self, dt: f32) {
        let bounds = self.bounds;
        for asteroid in &mut self.asteroids {
            asteroid.pos += asteroid.vel * dt;
            asteroid.phi = wrap_angle(asteroid.phi + asteroid.dphi * dt);
            asteroid.pos = bounds.wrap(asteroid.pos, asteroid.size * ASTEROID_VARIANCE_MAX);
        }
    }

    fn update_dust(&mut self, dt: f32) {
        if step_particles(&mut self.dust, self.bounds, dt) {
            self.prune_mask |= PRUNE_DUST;
        }
    }

    fn update_residue(&mut self, dt: f32) {
        if step_particles(&mut self.residue, self.bounds, dt) {
            self.prune_mask |= PRUNE_RESIDUE;
        }
    }

    fn update_debris(&mut self, dt: f32) {
        let decay = VELOCITY_DECAY.powf(dt);
        let mut expired = Vec::new();

        for debris in &mut self.debris {
            debris.lifetime -= dt;
            debris.pos += debris.vel * dt;
            debris.phi = wrap_angle(debris.phi + debris.dphi * dt);
            debris.delta = wrap_angle(debris.delta + debris.ddelta * dt);
            debris.vel = debris.vel * decay;
            debris.dphi *= decay;
            debris.ddelta *= decay;

            if debris.lifetime <= 0.0 {
                debris.active = false;
                expired.push(debris.pos);
            } else if self.bounds.is_outside(debris.pos, ASTEROID_SIZE_MIN) {
                debris.active = false;
            } else {
                debris.score_gain.pos = debris.pos;
                debris.score_gain.dy = debris.vel.y;
                debris.score_gain.score = debris.score();
                continue;
            }
            self.prune_mask |= PRUNE_DEBRIS;
        }

        for pos in expired {
            self.emit_point_dust(pos);
        }
    }

    fn update_score_gains(&mut self, dt: f32) {
        let decay = VELOCITY_DECAY.powf(dt);
        let bounds = self.bounds;
        for gain in &mut self.free_score_gains {
            gain.pos.y += gain.dy * dt;
            gain.dy *= decay;
            gain.lifetime -= dt;

            if bounds.is_outside(gain.pos, 0.0) || gain.lifetime < 0.0 {
                gain.active = false;
                self.prune_mask |= PRUNE_SCORE_GAINS;
            }
        }
    }

    fn prune_inactive_entities(&mut self) {
        if self.prune_mask == 0 {
            return;
        }

        if (self.prune_mask & PRUNE_ASTEROIDS) != 0 {
            self.asteroids.retain(|entry| entry.active);
        }
        if (self.prune_mask & PRUNE_PHOTONS) != 0 {
            self.photons.retain(|entry| entry.active);
        }
        if (self.prune_mask & PRUNE_DEBRIS) != 0 {
            self.debris.retain(|entry| entry.active);
        }
        if (self.prune_mask & PRUNE_SCORE_GAINS) != 0 {
            self.free_score_gains.retain(|entry| entry.active);
        }
        if (self.prune_mask & PRUNE_DUST) != 0 {
            self.dust.retain(|entry| entry.active);
        }
        if (self.prune_mask & PRUNE_RESIDUE) != 0 {
            self.residue.retain(|entry| entry.active);
        }

        self.prune_mask = 0;
    }

    pub(super) fn validate_invariants(&self) -> Result<(), RuleCode> {
        let ship = &self.ship;
        if !(ship.phi.is_finite() && (0.0..TAU).contains(&ship.phi)) {
            return Err(RuleCode::ShipHeadingRange);
        }
        if !ship.pos.is_finite() || !ship.vel.is_finite() || !ship.current_flicker.is_finite() {
            return Err(RuleCode::ShipNonFinite);
        }
        if ship.damaged > SHIP_DAMAGE_TICKS {
            return Err(RuleCode::ShipDamageRange);
        }

        if self.photons.len() > PHOTON_LIMIT {
            return Err(RuleCode::PhotonLimit);
        }
        for photon in &self.photons {
            if !photon.active
                || !photon.pos.is_finite()
                || !photon.vel.is_finite()
                || photon.size <= 0.0
                || self.bounds.is_outside(photon.pos, photon.size)
            {
                return Err(RuleCode::PhotonState);
            }
        }

        for asteroid in &self.asteroids {
            if asteroid.coords.is_empty()
                || asteroid.coords.len() != asteroid_vertex_count(asteroid.size)
            {
                return Err(RuleCode::AsteroidVertexCount);
            }
            if !asteroid.active
                || asteroid.size <= ASTEROID_SIZE_MIN
                || !asteroid.pos.is_finite()
                || !asteroid.vel.is_finite()
                || !(0.0..TAU).contains(&asteroid.phi)
            {
                return Err(RuleCode::AsteroidState);
            }
        }

        for debris in &self.debris {
            if !debris.active
                || !(debris.lifetime > 0.0 && debris.lifetime <= DEBRIS_LIFETIME_MAX)
                || !debris.pos.is_finite()
                || !debris.vel.is_finite()
            {
                return Err(RuleCode::DebrisState);
            }
        }

        for gain in &self.free_score_gains {
            if !gain.active
                || !(0.0..=SCORE_GAIN_LIFETIME).contains(&gain.lifetime)
                || !gain.pos.is_finite()
            {
                return Err(RuleCode::ScoreGainState);
            }
        }

        for particle in self.dust.iter().chain(&self.residue) {
            if !particle.active
                || !(0.0..=particle.initial_lifetime).contains(&particle.lifetime)
                || !particle.pos.is_finite()
                || !particle.vel.is_finite()
            {
                return Err(RuleCode::ParticleState);
            }
        }

        match (self.state, &self.transmission) {
            (GameState::TransmissionAnimation | GameState::Finished, Some(transmission)) => {
                let limit = transmission.timeline().duration(transmission.state());
                if !(0.0..=limit).contains(&transmission.current_time()) {
                    return Err(RuleCode::TransmissionTiming);
                }
            }
            (GameState::TransmissionAnimation | GameState::Finished, None) => {
                return Err(RuleCode::TransmissionTiming);
            }
            (_, Some(_)) => return Err(RuleCode::TransmissionTiming),
            (_, None) => {}
        }

        Ok(())
    }

    pub(super) fn checkpoint(&self) -> ReplayCheckpoint {
        ReplayCheckpoint {
            frame_count: self.frame_count,
            rng_state: self.rng.state(),
            game_state: self.state,
            collected_score: self.collected_score,
            asteroids: self.asteroids.len(),
            photons: self.photons.len(),
            debris: self.debris.len(),
            free_score_gains: self.free_score_gains.len(),
            dust: self.dust.len(),
            residue: self.residue.len(),
            ship_x: self.ship.pos.x,
            ship_y: self.ship.pos.y,
            ship_vx: self.ship.vel.x,
            ship_vy: self.ship.vel.y,
            ship_phi: self.ship.phi,
            ship_damaged: self.ship.damaged,
        }
    }

    pub(super) fn result(&self) -> ReplayResult {
        ReplayResult {
            frame_count: self.frame_count,
            rng_state: self.rng.state(),
            game_state: self.state,
            collected_score: self.collected_score,
        }
    }

    pub(super) fn world_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            frame_count: self.frame_count,
            rng_state: self.rng.state(),
            game_state: self.state,
            player_linked: self.player_linked,
            collected_score: self.collected_score,
            bounds: self.bounds,
            transmission_state: self.transmission.as_ref().map(Transmission::state),
            transmission_time: self.transmission.as_ref().map(Transmission::current_time),
            ship: Self::ship_snapshot(&self.ship),
            asteroids: self.asteroids.iter().map(Self::asteroid_snapshot).collect(),
            photons: self
                .photons
                .iter()
                .map(|photon| PhotonSnapshot {
                    x: photon.pos.x,
                    y: photon.pos.y,
                    vx: photon.vel.x,
                    vy: photon.vel.y,
                    size: photon.size,
                })
                .collect(),
            debris: self.debris.iter().map(Self::debris_snapshot).collect(),
            free_score_gains: self
                .free_score_gains
                .iter()
                .map(|gain| ScoreGainSnapshot {
                    x: gain.pos.x,
                    y: gain.pos.y,
                    dy: gain.dy,
                    lifetime: gain.lifetime,
                    score: gain.score,
                })
                .collect(),
            dust: self.dust.iter().map(Self::particle_snapshot).collect(),
            residue: self.residue.iter().map(Self::particle_snapshot).collect(),
            star_count: self.stars.len(),
        }
    }

    fn ship_snapshot(ship: &Ship) -> ShipSnapshot {
        ShipSnapshot {
            x: ship.pos.x,
            y: ship.pos.y,
            vx: ship.vel.x,
            vy: ship.vel.y,
            phi: ship.phi,
            size: ship.size,
            damaged: ship.damaged,
            current_flicker: ship.current_flicker,
            visible: ship.is_visible(),
        }
    }

    fn asteroid_snapshot(asteroid: &Asteroid) -> AsteroidSnapshot {
        AsteroidSnapshot {
            x: asteroid.pos.x,
            y: asteroid.pos.y,
            vx: asteroid.vel.x,
            vy: asteroid.vel.y,
            phi: asteroid.phi,
            dphi: asteroid.dphi,
            size: asteroid.size,
            vertex_count: asteroid.coords.len(),
        }
    }

    fn debris_snapshot(debris: &Debris) -> DebrisSnapshot {
        DebrisSnapshot {
            x: debris.pos.x,
            y: debris.pos.y,
            vx: debris.vel.x,
            vy: debris.vel.y,
            phi: debris.phi,
            delta: debris.delta,
            size: debris.size,
            lifetime: debris.lifetime,
            score: debris.score(),
        }
    }

    fn particle_snapshot(particle: &Particle) -> ParticleSnapshot {
        ParticleSnapshot {
            x: particle.pos.x,
            y: particle.pos.y,
            vx: particle.vel.x,
            vy: particle.vel.y,
            lifetime: particle.lifetime,
        }
    }

    pub(super) fn draw_commands(&self) -> Vec<DrawCommand> {
        let transmission = match self.state {
            GameState::TransmissionAnimation | GameState::Finished => self.transmission.as_ref(),
            _ => None,
        };
        render::export(&Scene {
            field: self.bounds,
            text_size: self.config.text_size,
            frame_count: self.frame_count,
            ship: &self.ship,
            asteroids: &self.asteroids,
            photons: &self.photons,
            debris: &self.debris,
            free_score_gains: &self.free_score_gains,
            dust: &self.dust,
            residue: &self.residue,
            stars: &self.stars,
            transmission,
        })
    }
}

/// Ages and moves decorative particles. Returns true when any of them expired or left the field.
fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

fn step_particles(particles: &mut [Particle], bounds: Bounds, dt: f32) -> bool {
    let decay = VELOCITY_DECAY.powf(dt);
    let mut pruned = false;
    for particle in particles {
        particle.lifetime -= dt;
        if particle.lifetime < 0.0 {
            particle.active = false;
            pruned = true;
            continue;
        }

        particle.pos += particle.vel * dt;
        particle.vel = particle.vel * decay;
        if bounds.is_outside(particle.pos, 0.0) {
            particle.active = false;
            pruned = true;
        }
    }
    pruned
}
