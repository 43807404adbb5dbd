pub mod commands;
pub mod config;
pub mod format;
pub mod state;

pub use config::CliConfig;
pub use state::WorldState;
