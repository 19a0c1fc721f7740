pub mod config;
pub mod constants;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod input;
pub mod render;
pub mod rng;
pub mod sim;
pub mod transmission;

pub use config::GameConfig;
pub use entities::debris_score;
pub use error::{ConfigError, RuleCode};
pub use input::FrameInput;
pub use render::DrawCommand;
pub use sim::{replay, replay_with_checkpoints, GameState, LiveGame, WorldSnapshot};
