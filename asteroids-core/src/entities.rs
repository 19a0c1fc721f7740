//! Plain entity records owned by the simulation.
//!
//! Every population carries an `active` flag; the tick pipeline clears it and
//! compacts the collections once the tick's collision pass has finished.

use crate::constants::{
    DEBRIS_FULL_SCORE, DEBRIS_FULL_SCORE_LIFETIME, SHIP_CONTROL, SHIP_FLICKER_RATE, SHIP_SIZE,
    SHIP_SPEED, SHIP_TURN_SPEED,
};
use crate::geometry::{ship_hull, Vec2};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Ship {
    pub(crate) pos: Vec2,
    pub(crate) vel: Vec2,
    pub(crate) phi: f32,
    pub(crate) size: f32,
    pub(crate) speed: f32,
    pub(crate) control: f32,
    pub(crate) turn_speed: f32,
    pub(crate) damaged: u32,
    pub(crate) flicker_rate: f32,
    pub(crate) current_flicker: f32,
}

impl Ship {
    pub(crate) fn at(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            phi: 0.0,
            size: SHIP_SIZE,
            speed: SHIP_SPEED,
            control: SHIP_CONTROL,
            turn_speed: SHIP_TURN_SPEED,
            damaged: 0,
            flicker_rate: SHIP_FLICKER_RATE,
            current_flicker: 0.0,
        }
    }

    pub(crate) fn hull(&self, scale: f32) -> [Vec2; 3] {
        ship_hull(self.pos, self.phi, self.size, scale)
    }

    /// The ship blinks out on odd damage counts.
    pub(crate) fn is_visible(&self) -> bool {
        self.damaged % 2 == 0
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Asteroid {
    pub(crate) pos: Vec2,
    pub(crate) vel: Vec2,
    pub(crate) phi: f32,
    pub(crate) dphi: f32,
    pub(crate) size: f32,
    /// Local vertex offsets at `phi == 0`, fixed at creation.
    pub(crate) coords: Vec<Vec2>,
    pub(crate) active: bool,
}

impl Asteroid {
    /// World position of vertex `index`, scaled about the centre by `scale`.
    pub(crate) fn vertex(&self, index: usize, scale: f32) -> Vec2 {
        let local = self.coords[index];
        let (sin, cos) = self.phi.sin_cos();
        let rotated = Vec2::new(
            local.x * cos + local.y * sin,
            local.y * cos - local.x * sin,
        );
        self.pos + rotated * scale
    }

    pub(crate) fn outline(&self, scale: f32) -> Vec<Vec2> {
        (0..self.coords.len())
            .map(|index| self.vertex(index, scale))
            .collect()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Photon {
    pub(crate) pos: Vec2,
    pub(crate) vel: Vec2,
    pub(crate) size: f32,
    pub(crate) outline: Vec<Vec2>,
    pub(crate) active: bool,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ScoreGain {
    pub(crate) pos: Vec2,
    pub(crate) dy: f32,
    pub(crate) lifetime: f32,
    pub(crate) score: u32,
    pub(crate) active: bool,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Debris {
    pub(crate) pos: Vec2,
    pub(crate) vel: Vec2,
    pub(crate) phi: f32,
    pub(crate) delta: f32,
    pub(crate) dphi: f32,
    pub(crate) ddelta: f32,
    pub(crate) size: f32,
    /// Octahedron half-axes: +y, +x, -x, +z, -z, -y.
    pub(crate) extents: [f32; 6],
    pub(crate) lifetime: f32,
    /// Linked gain; it follows this debris until collected or discarded with it.
    pub(crate) score_gain: ScoreGain,
    pub(crate) active: bool,
}

impl Debris {
    pub(crate) fn score(&self) -> u32 {
        debris_score(self.lifetime)
    }

    /// Octahedron corners after yaw (`phi`) and roll (`delta`), dropped onto the play plane.
    pub(crate) fn projected_corners(&self) -> [Vec2; 6] {
        let [up, right, left, front, back, down] = self.extents;
        let local = [
            [0.0, up, 0.0],
            [right, 0.0, 0.0],
            [-left, 0.0, 0.0],
            [0.0, 0.0, front],
            [0.0, 0.0, -back],
            [0.0, -down, 0.0],
        ];
        let (sin_yaw, cos_yaw) = self.phi.sin_cos();
        let (sin_roll, cos_roll) = self.delta.sin_cos();
        local.map(|[x, y, z]| {
            // roll about x, then yaw about the view axis
            let ry = y * cos_roll - z * sin_roll;
            let px = x * cos_yaw - ry * sin_yaw;
            let py = x * sin_yaw + ry * cos_yaw;
            self.pos + Vec2::new(px, py)
        })
    }
}

/// Triangles of the debris octahedron as corner indices.
pub(crate) const DEBRIS_FACES: [[usize; 3]; 8] = [
    [0, 3, 1],
    [0, 1, 4],
    [0, 2, 3],
    [0, 4, 2],
    [5, 1, 3],
    [5, 4, 1],
    [5, 3, 2],
    [5, 2, 4],
];

/// Dust and photon residue share one record.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Particle {
    pub(crate) pos: Vec2,
    pub(crate) vel: Vec2,
    pub(crate) lifetime: f32,
    pub(crate) initial_lifetime: f32,
    pub(crate) active: bool,
}

impl Particle {
    pub(crate) fn remaining_fraction(&self) -> f32 {
        if self.initial_lifetime > 0.0 {
            (self.lifetime / self.initial_lifetime).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct BackgroundStar {
    pub(crate) pos: Vec2,
    pub(crate) flicker: f32,
    pub(crate) flicker_rate: f32,
}

/// Points awarded for collecting a piece of debris with `lifetime` ticks left.
pub fn debris_score(lifetime: f32) -> u32 {
    if lifetime > DEBRIS_FULL_SCORE_LIFETIME {
        DEBRIS_FULL_SCORE
    } else {
        (lifetime / 10.0).ceil().max(0.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debris_score_tracks_lifetime() {
        assert_eq!(debris_score(50.0), 5);
        assert_eq!(debris_score(200.0), 15);
        assert_eq!(debris_score(150.0), 15);
        assert_eq!(debris_score(151.0), 15);
        assert_eq!(debris_score(41.0), 5);
        assert_eq!(debris_score(0.5), 1);
        assert_eq!(debris_score(0.0), 0);
    }

    #[test]
    fn asteroid_vertices_rotate_with_heading() {
        let mut asteroid = Asteroid {
            pos: Vec2::new(0.1, 0.2),
            vel: Vec2::ZERO,
            phi: 0.0,
            dphi: 0.0,
            size: 0.04,
            coords: vec![Vec2::new(0.0, 0.1)],
            active: true,
        };
        let upright = asteroid.vertex(0, 1.0);
        assert!((upright.x - 0.1).abs() < 1e-6 && (upright.y - 0.3).abs() < 1e-6);

        asteroid.phi = core::f32::consts::FRAC_PI_2;
        let turned = asteroid.vertex(0, 1.0);
        assert!((turned.x - 0.2).abs() < 1e-6 && (turned.y - 0.2).abs() < 1e-6);
    }
}
