//! Gameplay tuning values.
//!
//! Distances are world units, velocities are units per tick and every timer
//! counts 60 Hz ticks unless noted otherwise.

use core::f32::consts::PI;

// Timing
pub const TICKS_PER_SECOND: f32 = 60.0;
pub const FIXED_DT: f32 = 1.0 / TICKS_PER_SECOND;

// Field defaults (world units)
pub const DEFAULT_FIELD_WIDTH: f32 = 1.55;
pub const DEFAULT_FIELD_HEIGHT: f32 = 1.0;
/// Largest accepted field side in either direction.
pub const FIELD_SIDE_MAX: f32 = 16.0;
pub const DEFAULT_TEXT_SIZE: f32 = 0.008;

// Ship
pub const SHIP_SIZE: f32 = 0.05;
pub const SHIP_SPEED: f32 = 0.005;
pub const SHIP_CONTROL: f32 = 0.05;
pub const SHIP_TURN_SPEED: f32 = 90.0;
pub const SHIP_FLICKER_RATE: f32 = 1.0;
pub const SHIP_FLICKER_DRAIN: f32 = 0.5;
pub const SHIP_DAMAGE_TICKS: u32 = 60; // flicker toggles, not frames
pub const SHIP_BACK_POINT_SCALE: f32 = 0.6;
pub const SHIP_BACK_POINT_ANGLE: f32 = PI * 3.0 / 4.0; // 135 degrees
pub const SHIP_KNOCKBACK_SCALE: f32 = 2.0;
pub const SHIP_KNOCKBACK_SPIN_MIN: f32 = 0.5;
pub const SHIP_KNOCKBACK_SPIN_MAX: f32 = 2.0;

// Photons
pub const PHOTON_LIMIT: usize = 10;
pub const PHOTON_SPEED: f32 = 0.01;
pub const PHOTON_SIZE_MIN: f32 = 0.0175;
pub const PHOTON_SIZE_MAX: f32 = 0.0275;
pub const PHOTON_SHIP_VELOCITY_SHARE: f32 = 0.005;
pub const PHOTON_EDGES_PER_UNIT: f32 = 500.0;
pub const PHOTON_OUTLINE_JITTER: f32 = 0.1;

// Asteroids
pub const INITIAL_ASTEROID_SIZES: [f32; 3] = [0.04, 0.05, 0.07];
pub const ASTEROID_SIZE_MIN: f32 = 0.02;
pub const ASTEROID_VARIANCE_MIN: f32 = 2.0;
pub const ASTEROID_VARIANCE_MAX: f32 = 3.0;
pub const ASTEROID_SPEED_MIN: f32 = 0.00075;
pub const ASTEROID_SPEED_MAX: f32 = 0.025;
pub const ASTEROID_SPIN_MAX: f32 = 0.075;
pub const ASTEROID_CHILD_SPIN_LIMIT: f32 = 0.2;
pub const ASTEROID_VERTICES_BASE: usize = 4;
pub const ASTEROID_VERTICES_PER_UNIT: f32 = 200.0;
pub const ASTEROID_INSET_SCALE: f32 = 0.95;

// Splitting
pub const SPLIT_SCALE_PAIR: f32 = 0.8;
pub const SPLIT_SCALE_TRIPLE: f32 = 0.6;
pub const CHILD_RADIAL_PUSH: f32 = 0.1;
pub const CHILD_PARENT_VELOCITY_SHARE: f32 = 10.0;
pub const CHILD_PHOTON_VELOCITY_SHARE: f32 = 0.2;

// Debris
pub const DEBRIS_COUNT_MIN: f32 = 2.5;
pub const DEBRIS_COUNT_MAX: f32 = 3.5;
pub const DEBRIS_SPIN_MAX: f32 = 0.05;
pub const DEBRIS_LIFETIME_MIN: f32 = 175.0;
pub const DEBRIS_LIFETIME_MAX: f32 = 275.0;
pub const DEBRIS_EXTENT_MIN: f32 = 1.25;
pub const DEBRIS_EXTENT_MAX: f32 = 2.75;
pub const DEBRIS_RED_LIFETIME: f32 = 25.0;
pub const DEBRIS_FULL_SCORE: u32 = 15;
pub const DEBRIS_FULL_SCORE_LIFETIME: f32 = 150.0;

// Score gains
pub const SCORE_GAIN_LIFETIME: f32 = 100.0;
pub const SCORE_GAIN_FADE_LIFETIME: f32 = 35.0;

// Particles
pub const VELOCITY_DECAY: f32 = 0.995;
pub const PARTICLE_BURST_CAP: usize = 512;
pub const DUST_PER_UNIT: f32 = 500.0;
pub const DUST_LIFETIME: f32 = 300.0;
pub const DUST_POINT_LIFETIME: f32 = 100.0;
pub const DUST_POINT_COUNT_MIN: f32 = 10.0;
pub const DUST_POINT_COUNT_MAX: f32 = 20.0;
pub const DUST_LEAD_TICKS: f32 = 10.0;
pub const RESIDUE_PER_UNIT: f32 = 10_000.0;
pub const RESIDUE_LIFETIME_MIN: f32 = 45.0; // 0.75s * 60fps
pub const RESIDUE_LIFETIME_MAX: f32 = 105.0; // 1.75s * 60fps

// Background
pub const STAR_GRID_SPACING: f32 = 0.1;
pub const STAR_FLICKER_RATE_MIN: f32 = 0.001;
pub const STAR_FLICKER_RATE_MAX: f32 = 0.05;
pub const STAR_HALF_EXTENT: f32 = 0.0002;

// Transmission
pub const TRANSMISSION_LABEL: &str = "Incomming Transmission";
pub const TRANSMISSION_STATIC_LABEL: &str = "?????";
pub const TRANSMISSION_MESSAGE: &str =
    "This is the transmission message that will be line broken. lets see how it looks on a new line";
pub const TYPING_INTERVAL: f32 = 20.0;
pub const MESSAGE_TYPING_DIVISOR: f32 = 5.0;
pub const START_WAIT_TICKS: f32 = 50.0;
pub const TRANS_LABEL_TICKS: f32 = 35.0;
pub const TRANS_BOX_TICKS: f32 = 25.0;
pub const WAIT1_TICKS: f32 = 15.0;
pub const STATIC_BOX_TICKS: f32 = 20.0;
pub const STATIC_LINE_SEPARATION: f32 = 0.001;
pub const STATIC_POOL_FACTOR: f32 = 5.0;
pub const DEFAULT_GLYPH_ADVANCE: f32 = 0.6;
pub const DEFAULT_LABEL_CHAR_SIZE: f32 = 0.03;
