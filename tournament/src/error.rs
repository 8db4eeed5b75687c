// ═══════════════════════════════════════════════════════════════════════
// Harness errors — everything that can stop an episode from being run
// or recorded. Rule violations and forfeits are not errors here; they
// are part of the episode.
// ═══════════════════════════════════════════════════════════════════════

use tactics_engine::{ConfigError, EngineError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("result store: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("unknown agent `{0}`")]
    UnknownAgent(String),
    #[error("episode exceeded the run timeout of {limit}s")]
    RunTimeout { limit: f64 },
}

impl From<ConfigError> for HarnessError {
    fn from(err: ConfigError) -> Self {
        HarnessError::Engine(EngineError::Config(err))
    }
}
