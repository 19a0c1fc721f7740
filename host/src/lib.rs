pub mod config;
pub mod pilot;
pub mod runner;
pub mod soak;
pub mod util;
