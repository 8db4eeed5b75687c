// ═══════════════════════════════════════════════════════════════════════
// Errors — configuration, map generation, rule-level rejections and
// episode-fatal forfeits. The two action severities never share a type.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{PlayerId, Pos, UnitType};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read configuration from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("map size {width}x{height} is outside {min}..={max}")]
    Dimensions { width: u32, height: u32, min: u32, max: u32 },
    #[error("unknown unit code `{0}` in enabledUnits")]
    UnknownUnit(String),
    #[error("enabledUnits must name at least one unit")]
    EmptyRoster,
    #[error("episodeSteps must be at least 1")]
    ZeroSteps,
    #[error("{key} must be a finite, non-negative number of seconds, got {value}")]
    Timeout { key: &'static str, value: f64 },
}

/// Why a single generation attempt was thrown away.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapDefect {
    #[error("only {found} building sites near {player}'s headquarters")]
    NoBuildingSite { player: PlayerId, found: usize },
    #[error("grass covers {grass} of {total} tiles")]
    GrassMinority { grass: usize, total: usize },
    #[error("structure at {0} is unreachable on foot")]
    Unreachable(Pos),
    #[error("headquarters distances to the centre differ: {p0} vs {p1}")]
    Unfair { p0: u32, p1: u32 },
    #[error("expected 2 headquarters, placed {0}")]
    HeadquartersCount(usize),
    #[error("expected at least {expected} buildings, placed {found}")]
    BuildingCount { expected: usize, found: usize },
    #[error("no tower could be placed")]
    NoTower,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("map size {width}x{height} is outside {min}..={max}")]
    Dimensions { width: u32, height: u32, min: u32, max: u32 },
    #[error("no valid map for seed {seed} after {attempts} attempts: {last}")]
    Exhausted { seed: u64, attempts: u32, last: MapDefect },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("episode is already over")]
    EpisodeOver,
}

/// Episode-fatal input. The submitting player forfeits immediately.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForfeitReason {
    #[error("malformed action: {0}")]
    Malformed(String),
    #[error("unknown action type `{0}`")]
    UnknownType(String),
    #[error("action batch exceeded the time budget")]
    Timeout,
}

/// A well-formed action that breaks a rule. Rejected in isolation; the
/// rest of the batch still runs.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleViolation {
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),
    #[error("the episode is over")]
    GameOver,
    #[error("{0} is off the board")]
    OutOfBounds(Pos),
    #[error("unknown unit code `{0}`")]
    UnknownUnitType(String),
    #[error("{0} is not enabled for this episode")]
    UnitDisabled(UnitType),
    #[error("no production structure of yours at {0}")]
    NoProductionSite(Pos),
    #[error("need {needed} gold, have {available}")]
    InsufficientGold { needed: u32, available: u32 },
    #[error("{0} is already occupied")]
    Occupied(Pos),
    #[error("no unit of yours at {0}")]
    NoFriendlyUnit(Pos),
    #[error("the unit at {0} has already moved")]
    AlreadyMoved(Pos),
    #[error("the unit at {0} has already acted")]
    AlreadyActed(Pos),
    #[error("{to} is not reachable from {from}")]
    Unreachable { from: Pos, to: Pos },
    #[error("no enemy unit at {0}")]
    NoEnemyUnit(Pos),
    #[error("target {target} is out of range of {from}")]
    OutOfRange { from: Pos, target: Pos },
    #[error("nothing to seize at {0}")]
    NothingToSeize(Pos),
}
