//! Host settings: environment fallbacks layered under an optional JSON game config.

use anyhow::{anyhow, Context, Result};
use asteroids_canvas_core::GameConfig;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_MAX_FRAMES: u32 = 36_000;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostConfig {
    pub field_width: Option<f32>,
    pub field_height: Option<f32>,
    pub max_frames: u32,
    /// `None` lets rayon pick the pool size.
    pub soak_jobs: Option<usize>,
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self {
            field_width: read_env_f32("ASTEROIDS_FIELD_WIDTH"),
            field_height: read_env_f32("ASTEROIDS_FIELD_HEIGHT"),
            max_frames: read_env_u32("ASTEROIDS_MAX_FRAMES", DEFAULT_MAX_FRAMES),
            soak_jobs: read_env_usize("ASTEROIDS_SOAK_JOBS"),
        }
    }

    /// Game config from `path` (or defaults), with the env field size applied on top and `seed`
    /// replacing whatever the file carried.
    pub fn game_config(&self, path: Option<&Path>, seed: u32) -> Result<GameConfig> {
        let mut config = match path {
            Some(path) => load_game_config(path)?,
            None => GameConfig::default(),
        };
        if let Some(width) = self.field_width {
            config.x_width = width;
        }
        if let Some(height) = self.field_height {
            config.y_height = height;
        }
        config.seed = seed;
        config
            .validate()
            .map_err(|err| anyhow!("invalid game config: {err}"))?;
        Ok(config)
    }
}

pub fn load_game_config(path: &Path) -> Result<GameConfig> {
    let data =
        fs::read(path).with_context(|| format!("failed reading config {}", path.display()))?;
    serde_json::from_slice(&data)
        .with_context(|| format!("failed parsing config {}", path.display()))
}

fn read_env_f32(name: &str) -> Option<f32> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<f32>() {
        Ok(value) if value.is_finite() && value > 0.0 => Some(value),
        _ => {
            warn!(name, value = %raw, "ignoring invalid environment value");
            None
        }
    }
}

fn read_env_u32(name: &str, default: u32) -> u32 {
    let Ok(raw) = env::var(name) else {
        return default;
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => value,
        _ => {
            warn!(name, value = %raw, default, "ignoring invalid environment value");
            default
        }
    }
}

fn read_env_usize(name: &str) -> Option<usize> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            warn!(name, value = %raw, "ignoring invalid environment value");
            None
        }
    }
}
