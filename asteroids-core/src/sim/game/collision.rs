use super::*;

use crate::constants::{SHIP_KNOCKBACK_SCALE, SHIP_KNOCKBACK_SPIN_MAX, SHIP_KNOCKBACK_SPIN_MIN};
use crate::geometry::{line_circle_collision, segments_intersect};

/// Broad-phase reach of an asteroid, in multiples of its base size.
const ASTEROID_REACH: f32 = ASTEROID_VARIANCE_MAX;
/// Everything inside this many base sizes is solid rock.
const ASTEROID_CORE: f32 = ASTEROID_VARIANCE_MIN;

impl Game {
    pub(super) fn resolve_collisions(&mut self) {
        self.collide_photons_with_asteroids();
        self.collide_ship_with_asteroids();
        self.collect_debris();
    }

    /// Children spawned here are appended past `initial_len` and wait for the next tick.
    fn collide_photons_with_asteroids(&mut self) {
        let initial_len = self.asteroids.len();

        for asteroid_index in 0..initial_len {
            if !self.asteroids[asteroid_index].active {
                continue;
            }

            let hit = {
                let asteroid = &self.asteroids[asteroid_index];
                self.photons
                    .iter()
                    .position(|photon| photon.active && photon_hits(asteroid, photon))
            };

            if let Some(photon_index) = hit {
                self.damage_asteroid(asteroid_index, photon_index);
            }
        }
    }

    fn damage_asteroid(&mut self, asteroid_index: usize, photon_index: usize) {
        let parent = self.asteroids[asteroid_index].clone();
        let (photon_pos, photon_vel, photon_size) = {
            let photon = &self.photons[photon_index];
            (photon.pos, photon.vel, photon.size)
        };

        self.asteroids[asteroid_index].active = false;
        self.photons[photon_index].active = false;
        self.prune_mask |= PRUNE_ASTEROIDS | PRUNE_PHOTONS;

        match split_outcome(parent.size) {
            SplitOutcome::Children { count, size } => {
                for index in 0..count {
                    let child = self.child_asteroid(&parent, photon_vel, index, count, size);
                    self.emit_pair_dust(&child, &parent);
                    self.asteroids.push(child);
                }
                debug!(
                    frame = self.frame_count,
                    size = parent.size,
                    children = count,
                    "asteroid split"
                );
            }
            SplitOutcome::Debris => {
                self.spawn_debris(&parent);
                debug!(
                    frame = self.frame_count,
                    size = parent.size,
                    "asteroid shattered into debris"
                );
            }
        }

        self.emit_residue(photon_pos, photon_vel, photon_size, parent.vel);
        self.emit_pair_dust(&parent, &parent);
    }

    fn collide_ship_with_asteroids(&mut self) {
        let hull = self.ship.hull(1.0);

        for asteroid_index in 0..self.asteroids.len() {
            let asteroid = &self.asteroids[asteroid_index];
            if !asteroid.active {
                continue;
            }

            let distance_sq = self.ship.pos.distance_sq(asteroid.pos);
            let core = ASTEROID_CORE * asteroid.size;
            if distance_sq <= core * core {
                let (size, center) = (asteroid.size, asteroid.pos);
                self.damage_ship();
                self.knock_back_ship(center, size);
                continue;
            }

            let reach = ASTEROID_REACH * asteroid.size + self.ship.size;
            if distance_sq <= reach * reach && hull_touches(&hull, asteroid) {
                self.damage_ship();
            }
        }
    }

    fn damage_ship(&mut self) {
        if self.ship.damaged > 0 {
            return;
        }

        self.ship.damaged = SHIP_DAMAGE_TICKS;
        self.ship.current_flicker = self.ship.flicker_rate;
        debug!(frame = self.frame_count, "ship damaged");
    }

    fn knock_back_ship(&mut self, asteroid_pos: Vec2, asteroid_size: f32) {
        let away = self.ship.pos - asteroid_pos;
        // atan2(0, 0) is 0, so a dead-centre hit still pushes along +x
        let angle = away.y.atan2(away.x);
        let impulse = SHIP_KNOCKBACK_SCALE * asteroid_size;
        self.ship.vel += Vec2::new(angle.cos(), angle.sin()) * impulse;

        let spin = asteroid_size * self.rng.range(SHIP_KNOCKBACK_SPIN_MIN, SHIP_KNOCKBACK_SPIN_MAX);
        self.ship.phi = wrap_angle(self.ship.phi + spin);
    }

    fn collect_debris(&mut self) {
        let reach_sq = self.ship.size * self.ship.size;

        for debris in &mut self.debris {
            if !debris.active || self.ship.pos.distance_sq(debris.pos) > reach_sq {
                continue;
            }

            let score = debris.score();
            debris.active = false;
            self.prune_mask |= PRUNE_DEBRIS;
            self.collected_score = self.collected_score.saturating_add(score);

            let mut gain = debris.score_gain;
            gain.score = score;
            gain.active = true;
            self.free_score_gains.push(gain);

            debug!(
                frame = self.frame_count,
                score,
                total = self.collected_score,
                "debris collected"
            );
        }
    }
}

/// Three-tier photon test: broad radius, solid core, then the outline edges.
fn photon_hits(asteroid: &Asteroid, photon: &Photon) -> bool {
    let distance_sq = asteroid.pos.distance_sq(photon.pos);

    let reach = ASTEROID_REACH * asteroid.size + photon.size;
    if distance_sq > reach * reach {
        return false;
    }

    let core = ASTEROID_CORE * asteroid.size + photon.size;
    if distance_sq <= core * core {
        return true;
    }

    let vertex_count = asteroid.coords.len();
    if vertex_count == 0 {
        return false;
    }
    let mut previous = asteroid.vertex(vertex_count - 1, 1.0);
    for index in 0..vertex_count {
        let current = asteroid.vertex(index, 1.0);
        if line_circle_collision(photon.pos, photon.size, previous, current) {
            return true;
        }
        previous = current;
    }
    false
}

fn hull_touches(hull: &[Vec2; 3], asteroid: &Asteroid) -> bool {
    let outline = asteroid.outline(1.0);
    let Some(&last) = outline.last() else {
        return false;
    };

    let mut previous = last;
    for &current in &outline {
        for edge in 0..hull.len() {
            let a = hull[edge];
            let b = hull[(edge + 1) % hull.len()];
            if segments_intersect(a, b, previous, current) {
                return true;
            }
        }
        previous = current;
    }
    false
}
