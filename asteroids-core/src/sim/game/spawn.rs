//! Entity factories. Every random draw goes through the game generator in a fixed order so a
//! seed and an input sequence always reproduce the same world.

use super::*;

use crate::constants::{
    ASTEROID_CHILD_SPIN_LIMIT, ASTEROID_SPEED_MAX, ASTEROID_SPEED_MIN, ASTEROID_SPIN_MAX,
    CHILD_PARENT_VELOCITY_SHARE, CHILD_PHOTON_VELOCITY_SHARE, CHILD_RADIAL_PUSH, DEBRIS_COUNT_MAX,
    DEBRIS_COUNT_MIN, DEBRIS_EXTENT_MAX, DEBRIS_EXTENT_MIN, DEBRIS_LIFETIME_MIN,
    DEBRIS_SPIN_MAX, DUST_LEAD_TICKS, DUST_LIFETIME, DUST_POINT_COUNT_MAX, DUST_POINT_COUNT_MIN,
    DUST_POINT_LIFETIME, INITIAL_ASTEROID_SIZES, PHOTON_EDGES_PER_UNIT, PHOTON_OUTLINE_JITTER,
    PHOTON_SHIP_VELOCITY_SHARE, PHOTON_SIZE_MAX, PHOTON_SIZE_MIN, PHOTON_SPEED,
    RESIDUE_LIFETIME_MAX, RESIDUE_LIFETIME_MIN, STAR_FLICKER_RATE_MAX, STAR_FLICKER_RATE_MIN,
    STAR_GRID_SPACING,
};
use crate::entities::debris_score;

const CHILD_SPIN_SHARE_MIN: f32 = 0.5;
const CHILD_SPIN_SHARE_MAX: f32 = 1.4;
const DEBRIS_SPEED_SHARE_MIN: f32 = 0.4;
const DEBRIS_SPEED_SHARE_MAX: f32 = 0.75;
const DEBRIS_FAN_JITTER_MIN: f32 = 0.8;
const DEBRIS_FAN_JITTER_MAX: f32 = 1.2;
const DUST_FIRST_BODY_SHARE: f32 = 0.3;
const DUST_SECOND_BODY_SHARE: f32 = 0.7;
const DUST_SPEED_SPREAD_MIN: f32 = -0.25;
const DUST_SPEED_SPREAD_MAX: f32 = 1.3;
const DUST_LIFETIME_SPREAD_MIN: f32 = 0.75;
const DUST_LIFETIME_SPREAD_MAX: f32 = 1.25;
const POINT_DUST_LIFETIME_SPREAD: f32 = 0.2;
const POINT_DUST_SPEED_DIVISOR: f32 = 10.0;
const RESIDUE_PHOTON_SHARE_MIN: f32 = 0.6;
const RESIDUE_PHOTON_SHARE_MAX: f32 = 0.9;
const RESIDUE_ASTEROID_SHARE_MIN: f32 = 0.1;
const RESIDUE_ASTEROID_SHARE_MAX: f32 = 0.4;
const RESIDUE_CROSS_JITTER: f32 = 0.2;

impl Game {
    pub(super) fn spawn_stars(&mut self) {
        let bounds = self.bounds;
        let mut column = 0;
        loop {
            let x = bounds.x_min + column as f32 * STAR_GRID_SPACING;
            if x >= bounds.x_max {
                break;
            }
            let mut row = 0;
            loop {
                let y = bounds.y_min + row as f32 * STAR_GRID_SPACING;
                if y >= bounds.y_max {
                    break;
                }
                let pos = Vec2::new(
                    x + self.rng.range(0.0, STAR_GRID_SPACING),
                    y + self.rng.range(0.0, STAR_GRID_SPACING),
                );
                let flicker = self.rng.range(0.0, -PI);
                let flicker_rate = self.rng.range(STAR_FLICKER_RATE_MIN, STAR_FLICKER_RATE_MAX);
                self.stars.push(BackgroundStar {
                    pos,
                    flicker,
                    flicker_rate,
                });
                row += 1;
            }
            column += 1;
        }
    }

    pub(super) fn spawn_opening_asteroids(&mut self) {
        for size in INITIAL_ASTEROID_SIZES {
            let asteroid = self.edge_asteroid(size);
            self.asteroids.push(asteroid);
        }
    }

    /// Asteroid entering from the bottom or left edge, drifting fast enough to come on screen.
    fn edge_asteroid(&mut self, size: f32) -> Asteroid {
        let mut asteroid = self.shaped_asteroid(size);
        let margin = size * ASTEROID_VARIANCE_MAX;
        let bounds = self.bounds;

        asteroid.pos = if self.rng.coin_flip() {
            Vec2::new(
                self.rng.range(bounds.x_min, bounds.x_max),
                bounds.y_min - margin,
            )
        } else {
            Vec2::new(
                bounds.x_min - margin,
                self.rng.range(bounds.y_min, bounds.y_max),
            )
        };

        let min_speed = ASTEROID_SPEED_MIN * 3.0;
        let max_speed = ASTEROID_SPEED_MAX / 5.0;
        asteroid.vel = Vec2::new(
            self.rng.signed_range(min_speed, max_speed),
            self.rng.signed_range(min_speed, max_speed),
        );
        asteroid.phi = wrap_angle(self.rng.range(0.0, TAU));
        asteroid.dphi = self.rng.range(-ASTEROID_SPIN_MAX, ASTEROID_SPIN_MAX);
        asteroid
    }

    /// Stationary asteroid at the origin with a fresh random outline.
    pub(super) fn shaped_asteroid(&mut self, size: f32) -> Asteroid {
        let vertex_count = asteroid_vertex_count(size);
        let coords = (0..vertex_count)
            .map(|index| {
                let theta = TAU * index as f32 / vertex_count as f32;
                let radius = size * self.rng.range(ASTEROID_VARIANCE_MIN, ASTEROID_VARIANCE_MAX);
                Vec2::from_heading(theta) * radius
            })
            .collect();

        Asteroid {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            phi: 0.0,
            dphi: 0.0,
            size,
            coords,
            active: true,
        }
    }

    /// Child `index` of `count`, fanned around the photon's travel direction.
    pub(super) fn child_asteroid(
        &mut self,
        parent: &Asteroid,
        photon_vel: Vec2,
        index: usize,
        count: usize,
        size: f32,
    ) -> Asteroid {
        let mut child = self.shaped_asteroid(size);

        let heading = photon_vel.x.atan2(photon_vel.y);
        let angle = heading + PI / 2.0 - index as f32 * PI / (count as f32 + 1.0);
        let offset = Vec2::from_heading(angle) * (size + parent.size);
        child.pos = parent.pos + offset;

        child.dphi = (parent.dphi
            * self.rng.range(CHILD_SPIN_SHARE_MIN, CHILD_SPIN_SHARE_MAX))
        .clamp(-ASTEROID_CHILD_SPIN_LIMIT, ASTEROID_CHILD_SPIN_LIMIT);

        // offset is never zero: it spans both radii
        let outward = offset * (1.0 / offset.length());
        let vel = outward * (CHILD_RADIAL_PUSH * size)
            + parent.vel * (CHILD_PARENT_VELOCITY_SHARE * parent.size)
            + photon_vel * CHILD_PHOTON_VELOCITY_SHARE;
        child.vel = Vec2::new(escape_speed(vel.x), escape_speed(vel.y));
        child
    }

    pub(super) fn fire_photon(&mut self) {
        if self.photons.len() >= PHOTON_LIMIT {
            debug!(frame = self.frame_count, "too many photons in play");
            return;
        }

        let heading = Vec2::from_heading(self.ship.phi);
        let size = self.rng.range(PHOTON_SIZE_MIN, PHOTON_SIZE_MAX);
        let outline = render::photon_outline(
            size,
            PHOTON_EDGES_PER_UNIT,
            PHOTON_OUTLINE_JITTER,
            &mut self.rng,
        );

        self.photons.push(Photon {
            pos: self.ship.pos + heading * size,
            vel: heading * PHOTON_SPEED + self.ship.vel * PHOTON_SHIP_VELOCITY_SHARE,
            size,
            outline,
            active: true,
        });
    }

    pub(super) fn spawn_debris(&mut self, parent: &Asteroid) {
        let count = self.rng.range(DEBRIS_COUNT_MIN, DEBRIS_COUNT_MAX).floor() as usize;
        let size = parent.size / 2.0;

        for index in 0..count {
            let mut extents = [0.0; 6];
            for extent in &mut extents {
                *extent = size * self.rng.range(DEBRIS_EXTENT_MIN, DEBRIS_EXTENT_MAX);
            }

            let pos = parent.pos + self.rng.point_in_circle() * parent.size;
            let phi = self.rng.range(0.0, TAU);
            let dphi = self.rng.range(-DEBRIS_SPIN_MAX, DEBRIS_SPIN_MAX);
            let delta = self.rng.range(0.0, TAU);
            let ddelta = self.rng.range(-DEBRIS_SPIN_MAX, DEBRIS_SPIN_MAX);
            let lifetime = self
                .rng
                .range(DEBRIS_LIFETIME_MIN, DEBRIS_LIFETIME_MAX)
                .floor();

            let share = self.rng.range(DEBRIS_SPEED_SHARE_MIN, DEBRIS_SPEED_SHARE_MAX);
            let fan = index as f32 * self.rng.range(DEBRIS_FAN_JITTER_MIN, DEBRIS_FAN_JITTER_MAX)
                * TAU
                / count as f32;
            let vel = parent.vel * share + Vec2::from_heading(fan) * ASTEROID_SPEED_MIN;

            self.debris.push(Debris {
                pos,
                vel,
                phi,
                delta,
                dphi,
                ddelta,
                size,
                extents,
                lifetime,
                score_gain: ScoreGain {
                    pos,
                    dy: vel.y,
                    lifetime: SCORE_GAIN_LIFETIME,
                    score: debris_score(lifetime),
                    active: true,
                },
                active: true,
            });
        }
    }

    /// Dust released between two bodies, drifting mostly with the second one.
    pub(super) fn emit_pair_dust(&mut self, first: &Asteroid, second: &Asteroid) {
        let center = first.pos.lerp(second.pos, 0.5);
        let drift = first.vel * DUST_FIRST_BODY_SHARE + second.vel * DUST_SECOND_BODY_SHARE;
        let spread = first.size * ASTEROID_VARIANCE_MIN + second.size;

        for _ in 0..pair_burst_count(first.size, second.size) {
            let vel = Vec2::new(
                drift.x * self.rng.range(DUST_SPEED_SPREAD_MIN, DUST_SPEED_SPREAD_MAX),
                drift.y * self.rng.range(DUST_SPEED_SPREAD_MIN, DUST_SPEED_SPREAD_MAX),
            );
            let scatter = Vec2::new(
                spread * self.rng.range(-1.0, 1.0),
                spread * self.rng.range(-1.0, 1.0),
            );
            let lifetime = (DUST_LIFETIME
                * self.rng.range(DUST_LIFETIME_SPREAD_MIN, DUST_LIFETIME_SPREAD_MAX))
            .floor();

            self.dust.push(Particle {
                pos: center + scatter + vel * DUST_LEAD_TICKS,
                vel,
                lifetime,
                initial_lifetime: lifetime,
                active: true,
            });
        }
    }

    /// Small puff left behind when a piece of debris burns out.
    pub(super) fn emit_point_dust(&mut self, pos: Vec2) {
        let count = self.rng.range(DUST_POINT_COUNT_MIN, DUST_POINT_COUNT_MAX).ceil() as usize;
        let max_speed = ASTEROID_SPEED_MAX / POINT_DUST_SPEED_DIVISOR;

        for _ in 0..count {
            let vel = Vec2::new(
                self.rng.range(-max_speed, max_speed),
                self.rng.range(-max_speed, max_speed),
            );
            let scatter = self.rng.point_in_circle() * ASTEROID_SIZE_MIN;
            let lifetime = DUST_POINT_LIFETIME
                * self.rng.range(
                    1.0 - POINT_DUST_LIFETIME_SPREAD,
                    1.0 + POINT_DUST_LIFETIME_SPREAD,
                );

            self.dust.push(Particle {
                pos: pos + scatter,
                vel,
                lifetime,
                initial_lifetime: lifetime,
                active: true,
            });
        }
    }

    /// Glowing fragments of a spent photon, partly carried along by the asteroid it hit.
    pub(super) fn emit_residue(
        &mut self,
        photon_pos: Vec2,
        photon_vel: Vec2,
        photon_size: f32,
        asteroid_vel: Vec2,
    ) {
        for _ in 0..residue_burst_count(photon_size) {
            let pos = photon_pos + self.rng.point_in_circle() * photon_size;
            let mut vel = photon_vel
                * self.rng.range(RESIDUE_PHOTON_SHARE_MIN, RESIDUE_PHOTON_SHARE_MAX)
                + asteroid_vel
                    * self.rng.range(RESIDUE_ASTEROID_SHARE_MIN, RESIDUE_ASTEROID_SHARE_MAX);
            vel.x += photon_vel.y * self.rng.range(-RESIDUE_CROSS_JITTER, RESIDUE_CROSS_JITTER);
            vel.y += photon_vel.x * self.rng.range(-RESIDUE_CROSS_JITTER, RESIDUE_CROSS_JITTER);
            let lifetime = self.rng.range(RESIDUE_LIFETIME_MIN, RESIDUE_LIFETIME_MAX);

            self.residue.push(Particle {
                pos,
                vel,
                lifetime,
                initial_lifetime: lifetime,
                active: true,
            });
        }
    }
}

/// Pushes a slow velocity component up to the minimum asteroid speed, keeping its sign.
fn escape_speed(component: f32) -> f32 {
    if component.abs() < ASTEROID_SPEED_MIN {
        ASTEROID_SPEED_MIN.copysign(component)
    } else {
        component
    }
}
