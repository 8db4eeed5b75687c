pub mod types;
pub mod error;
pub mod config;
pub mod map;
pub mod navigation;
pub mod state;
pub mod action;
pub mod economy;
pub mod victory;
pub mod engine;
pub mod visibility;
pub mod render;
pub mod setup;


pub use types::*;
pub use action::{parse_action, parse_submission, Action, Submission};
pub use config::Config;
pub use engine::{apply_action, forfeit, step, ActionEffect, Rejection, StepReport};
pub use error::{ConfigError, EngineError, ForfeitReason, MapError, RuleViolation};
pub use render::render_text;
pub use setup::create_initial_state;
pub use state::GameState;
pub use victory::Verdict;
pub use visibility::{Observation, StructureView, UnitView};
