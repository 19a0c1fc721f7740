use asteroids_canvas_core::sim::WorldSnapshot;
use asteroids_canvas_core::FrameInput;
use core::f32::consts::{PI, TAU};

/// Scripted stand-in for a player, fed one snapshot per frame.
pub trait Pilot {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn reset(&mut self, seed: u32);
    fn next_input(&mut self, world: &WorldSnapshot) -> FrameInput;
}

pub fn pilot_ids() -> &'static [&'static str] {
    &["idle", "sweeper", "hunter"]
}

pub fn create_pilot(id: &str) -> Option<Box<dyn Pilot + Send>> {
    match id {
        "idle" => Some(Box::new(IdlePilot)),
        "sweeper" => Some(Box::new(SweeperPilot::default())),
        "hunter" => Some(Box::new(HunterPilot::default())),
        _ => None,
    }
}

pub fn describe_pilots() -> Vec<(&'static str, &'static str)> {
    pilot_ids()
        .iter()
        .filter_map(|id| create_pilot(id))
        .map(|pilot| (pilot.id(), pilot.description()))
        .collect()
}

pub struct IdlePilot;

impl Pilot for IdlePilot {
    fn id(&self) -> &'static str {
        "idle"
    }

    fn description(&self) -> &'static str {
        "never touches the controls"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, _world: &WorldSnapshot) -> FrameInput {
        FrameInput::IDLE
    }
}

/// Spins in place and taps fire on a fixed beat.
#[derive(Default)]
pub struct SweeperPilot {
    beat: u32,
}

impl Pilot for SweeperPilot {
    fn id(&self) -> &'static str {
        "sweeper"
    }

    fn description(&self) -> &'static str {
        "turns steadily and fires every eighth frame"
    }

    fn reset(&mut self, seed: u32) {
        self.beat = seed % 8;
    }

    fn next_input(&mut self, world: &WorldSnapshot) -> FrameInput {
        let fire = (world.frame_count + self.beat) % 8 == 0;
        FrameInput::new(1.0, 0.0, fire)
    }
}

const AIM_DEAD_ZONE: f32 = 0.05;
const AIM_FIRE_WINDOW: f32 = 0.15;
const CHASE_WINDOW: f32 = 0.3;

/// Turns onto the nearest asteroid and shoots it; flies onto debris to collect it.
#[derive(Default)]
pub struct HunterPilot {
    cooldown: u32,
}

impl Pilot for HunterPilot {
    fn id(&self) -> &'static str {
        "hunter"
    }

    fn description(&self) -> &'static str {
        "aims at the closest target, shoots rocks and collects debris"
    }

    fn reset(&mut self, _seed: u32) {
        self.cooldown = 0;
    }

    fn next_input(&mut self, world: &WorldSnapshot) -> FrameInput {
        let ship = world.ship;
        let Some(target) = nearest_target(world) else {
            return FrameInput::IDLE;
        };

        let desired = (target.x - ship.x).atan2(target.y - ship.y);
        let error = heading_error(desired, ship.phi);
        let turn = if error.abs() < AIM_DEAD_ZONE {
            0.0
        } else {
            error.signum()
        };

        let thrust = if target.is_debris && error.abs() < CHASE_WINDOW {
            1.0
        } else {
            0.0
        };

        self.cooldown = self.cooldown.saturating_sub(1);
        let mut fire = false;
        if !target.is_debris && error.abs() < AIM_FIRE_WINDOW && self.cooldown == 0 {
            fire = true;
            self.cooldown = 4;
        }
        FrameInput::new(turn, thrust, fire)
    }
}

#[derive(Clone, Copy, Debug)]
struct Target {
    x: f32,
    y: f32,
    is_debris: bool,
}

fn nearest_target(world: &WorldSnapshot) -> Option<Target> {
    let ship = world.ship;
    let rocks = world.asteroids.iter().map(|a| Target {
        x: a.x,
        y: a.y,
        is_debris: false,
    });
    let pieces = world.debris.iter().map(|d| Target {
        x: d.x,
        y: d.y,
        is_debris: true,
    });
    let distance_sq = |t: &Target| (t.x - ship.x).powi(2) + (t.y - ship.y).powi(2);
    rocks
        .chain(pieces)
        .min_by(|a, b| distance_sq(a).total_cmp(&distance_sq(b)))
}

/// Signed turn from `current` to `desired`, folded into [-π, π].
fn heading_error(desired: f32, current: f32) -> f32 {
    let mut error = (desired - current).rem_euclid(TAU);
    if error > PI {
        error -= TAU;
    }
    error
}
