// ═══════════════════════════════════════════════════════════════════════
// Episode Runner — plays complete headless episodes with named agents,
// one at a time or as a parallel evaluation batch.
// ═══════════════════════════════════════════════════════════════════════

use crate::env::Environment;
use crate::error::HarnessError;
use rayon::prelude::*;
use serde::Serialize;
use tactics_agents::{make_agent, Agent};
use tactics_engine::types::*;
use tactics_engine::Config;

/// Result of a completed episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeResult {
    pub seed: u64,
    pub agents: [String; 2],
    pub rewards: [i8; 2],
    pub steps: u32,
    pub turns: u32,
    pub outcome: Outcome,
}

impl EpisodeResult {
    pub fn winner(&self) -> Option<PlayerId> {
        self.outcome.winner()
    }
}

/// Build both seats' agents. Each seat gets its own stream derived from the seed.
pub fn make_agents(names: [&str; 2], seed: u64) -> Result<[Box<dyn Agent>; 2], HarnessError> {
    let build = |seat: PlayerId| {
        let name = names[seat.index()];
        let agent_seed = seed.wrapping_mul(2).wrapping_add(seat.index() as u64);
        make_agent(name, seat, agent_seed).ok_or_else(|| HarnessError::UnknownAgent(name.to_string()))
    };
    Ok([build(PlayerId::P0)?, build(PlayerId::P1)?])
}

/// Run one full episode on the map generated from `seed`.
pub fn run_episode(config: &Config, names: [&str; 2], seed: u64) -> Result<EpisodeResult, HarnessError> {
    let mut agents = make_agents(names, seed)?;
    let mut env = Environment::new(Config { map_seed: seed, ..config.clone() })?;
    env.run(&mut agents)?;

    let state = env.state();
    let outcome = state.outcome().cloned().unwrap_or(Outcome::Draw);
    Ok(EpisodeResult {
        seed,
        agents: names.map(str::to_string),
        rewards: outcome.rewards(),
        steps: state.step_count(),
        turns: state.turn_number(),
        outcome,
    })
}

/// Run `episodes` independent episodes in parallel. Episode `i` uses
/// map seed `mapSeed + i`; results come back in episode order.
pub fn run_episodes(config: &Config, names: [&str; 2], episodes: usize) -> Result<Vec<EpisodeResult>, HarnessError> {
    config.validate()?;
    make_agents(names, 0)?;
    (0..episodes)
        .into_par_iter()
        .map(|i| run_episode(config, names, config.map_seed.wrapping_add(i as u64)))
        .collect()
}

/// Reward pairs of `episodes` parallel episodes.
pub fn evaluate(config: &Config, names: [&str; 2], episodes: usize) -> Result<Vec<[i8; 2]>, HarnessError> {
    let results = run_episodes(config, names, episodes)?;
    Ok(results.into_iter().map(|r| r.rewards).collect())
}
