// ═══════════════════════════════════════════════════════════════════════
// Episode Environment — reset / step / run over one GameState.
//
// The environment is the only place that reads a clock: agent decisions
// are timed against `actTimeout`, whole runs against `runTimeout`. A slow
// agent forfeits through the engine like any other fatal input.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::HarnessError;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;
use tactics_agents::Agent;
use tactics_engine::engine::StepReport;
use tactics_engine::types::*;
use tactics_engine::{create_initial_state, render_text, Config, ForfeitReason, GameState, Observation, Submission};

pub const ENVIRONMENT_NAME: &str = "reinforce_tactics";

/// What one seat sees after a reset or step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerState {
    pub status: PlayerStatus,
    pub reward: i8,
    pub observation: Observation,
}

pub struct Environment {
    config: Config,
    state: GameState,
    last_report: Option<StepReport>,
}

impl Environment {
    /// Validate the configuration and generate the first episode.
    pub fn new(config: Config) -> Result<Environment, HarnessError> {
        let state = create_initial_state(&config)?;
        Ok(Environment { config, state, last_report: None })
    }

    pub fn configuration(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Report of the most recent step, if any since the last reset.
    pub fn last_report(&self) -> Option<&StepReport> {
        self.last_report.as_ref()
    }

    pub fn done(&self) -> bool {
        self.state.is_over()
    }

    pub fn reset(&mut self) -> Result<[PlayerState; 2], HarnessError> {
        self.state = create_initial_state(&self.config)?;
        self.last_report = None;
        Ok(self.player_states())
    }

    pub fn player_states(&self) -> [PlayerState; 2] {
        PlayerId::ALL.map(|p| PlayerState {
            status: self.state.status(p),
            reward: self.state.reward(p),
            observation: self.state.observation(p),
        })
    }

    pub fn step(&mut self, submissions: [Submission; 2]) -> Result<[PlayerState; 2], HarnessError> {
        let report = tactics_engine::step(&mut self.state, &submissions)?;
        self.last_report = Some(report);
        Ok(self.player_states())
    }

    pub fn render(&self, ansi: bool) -> String {
        render_text(&self.state, ansi)
    }

    /// Summary of the environment in the shape external tooling expects.
    pub fn to_json(&self) -> Result<Value, HarnessError> {
        let configuration = serde_json::to_value(&self.config)
            .map_err(|source| HarnessError::Encode { what: "configuration", source })?;
        Ok(json!({
            "name": ENVIRONMENT_NAME,
            "configuration": configuration,
            "statuses": PlayerId::ALL.map(|p| self.state.status(p).to_string()),
            "rewards": PlayerId::ALL.map(|p| self.state.reward(p)),
            "steps": self.state.step_count(),
        }))
    }

    /// Reset and play the episode to the end. Returns every intermediate
    /// pair of player states, starting with the reset.
    pub fn run(&mut self, agents: &mut [Box<dyn Agent>; 2]) -> Result<Vec<[PlayerState; 2]>, HarnessError> {
        self.run_with(agents, |_| {})
    }

    /// `run`, calling `on_step` with the state after every step.
    pub fn run_with(
        &mut self,
        agents: &mut [Box<dyn Agent>; 2],
        mut on_step: impl FnMut(&GameState),
    ) -> Result<Vec<[PlayerState; 2]>, HarnessError> {
        let act_limit = self.config.act_limit()?;
        let run_limit = self.config.run_limit()?;
        let started = Instant::now();

        let mut trajectory = vec![self.reset()?];
        tracing::info!(
            target: "tactics::env",
            event = "episode.started",
            seed = self.config.map_seed,
            p1 = agents[0].name(),
            p2 = agents[1].name(),
        );

        while !self.done() {
            if started.elapsed() > run_limit {
                return Err(HarnessError::RunTimeout { limit: self.config.run_timeout });
            }
            let player = self.state.current_player();
            let obs = self.state.observation(player);

            let asked = Instant::now();
            let submission = agents[player.index()].act(&obs);
            let took = asked.elapsed();

            if took > act_limit {
                tracing::warn!(
                    target: "tactics::env",
                    event = "agent.timeout",
                    player = %player,
                    agent = agents[player.index()].name(),
                    millis = took.as_millis() as u64,
                );
                self.state.forfeit(player, ForfeitReason::Timeout)?;
                trajectory.push(self.player_states());
                on_step(&self.state);
                break;
            }

            let mut submissions: [Submission; 2] = [None, None];
            submissions[player.index()] = submission;
            trajectory.push(self.step(submissions)?);
            on_step(&self.state);
        }

        let rewards = PlayerId::ALL.map(|p| self.state.reward(p));
        tracing::info!(
            target: "tactics::env",
            event = "episode.finished",
            seed = self.config.map_seed,
            steps = self.state.step_count(),
            reward_p1 = rewards[0],
            reward_p2 = rewards[1],
        );
        Ok(trajectory)
    }
}
