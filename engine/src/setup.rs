// ═══════════════════════════════════════════════════════════════════════
// Game setup — validates the configuration, generates the map and
// builds the initial GameState
// ═══════════════════════════════════════════════════════════════════════

use crate::config::Config;
use crate::error::EngineError;
use crate::map;
use crate::state::GameState;

/// Create the initial game state. The map seed drives everything random,
/// so equal configs give byte-identical states.
pub fn create_initial_state(config: &Config) -> Result<GameState, EngineError> {
    config.validate()?;
    let roster = config.roster()?;
    let generated = map::generate(config.map_seed, config.map_width, config.map_height)?;
    tracing::debug!(
        target: "tactics::setup",
        event = "episode.created",
        seed = config.map_seed,
        width = config.map_width,
        height = config.map_height,
        structures = generated.structures.len(),
    );
    Ok(GameState::new(config.clone(), roster, generated))
}
