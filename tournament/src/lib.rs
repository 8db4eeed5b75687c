pub mod error;
pub mod env;
pub mod runner;
pub mod database;

pub use database::{Database, LeaderboardRow};
pub use env::{Environment, PlayerState, ENVIRONMENT_NAME};
pub use error::HarnessError;
pub use runner::{evaluate, make_agents, run_episode, run_episodes, EpisodeResult};
