// ═══════════════════════════════════════════════════════════════════════
// Configuration — the surface the harness hands to the engine.
// Keys are camelCase on the wire; anything missing takes its default.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::ConfigError;
use crate::map::{MAX_DIMENSION, MIN_DIMENSION};
use crate::types::UnitType;
use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub map_seed: u64,
    pub map_width: u32,
    pub map_height: u32,
    pub starting_gold: u32,
    pub fog_of_war: bool,
    /// Comma-separated unit codes, e.g. "W,M,C".
    pub enabled_units: String,
    /// Seconds an agent may spend on one action batch.
    pub act_timeout: f64,
    /// Seconds a whole episode may take.
    pub run_timeout: f64,
    /// Harness steps before the episode is called a draw.
    pub episode_steps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_seed: 42,
            map_width: 20,
            map_height: 20,
            starting_gold: 250,
            fog_of_war: false,
            enabled_units: "W,M,C,A,K,R,S,B".to_string(),
            act_timeout: 5.0,
            run_timeout: 1200.0,
            episode_steps: 200,
        }
    }
}

impl Config {
    /// Parse and validate a JSON object. Any other JSON value is a parse error.
    pub fn from_json_str(data: &str) -> Result<Config, ConfigError> {
        let value: Value = serde_json::from_str(data)?;
        if !value.is_object() {
            let found = match &value {
                Value::Array(_) => Unexpected::Seq,
                Value::String(s) => Unexpected::Str(s),
                Value::Bool(b) => Unexpected::Bool(*b),
                Value::Null => Unexpected::Unit,
                _ => Unexpected::Other("number"),
            };
            return Err(serde_json::Error::invalid_type(found, &"a configuration object").into());
        }
        let config: Config = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_json_str(&contents)
    }

    /// Parse `enabled_units` into the roster, in the order given, without duplicates.
    pub fn roster(&self) -> Result<Vec<UnitType>, ConfigError> {
        let mut roster = Vec::new();
        for code in self.enabled_units.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let unit = UnitType::from_code(code)
                .ok_or_else(|| ConfigError::UnknownUnit(code.to_string()))?;
            if !roster.contains(&unit) {
                roster.push(unit);
            }
        }
        if roster.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        Ok(roster)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = MIN_DIMENSION..=MAX_DIMENSION;
        if !dims.contains(&self.map_width) || !dims.contains(&self.map_height) {
            return Err(ConfigError::Dimensions {
                width: self.map_width,
                height: self.map_height,
                min: MIN_DIMENSION,
                max: MAX_DIMENSION,
            });
        }
        if self.episode_steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        self.act_limit()?;
        self.run_limit()?;
        self.roster().map(|_| ())
    }

    /// `actTimeout` as a duration.
    pub fn act_limit(&self) -> Result<Duration, ConfigError> {
        seconds("actTimeout", self.act_timeout)
    }

    /// `runTimeout` as a duration.
    pub fn run_limit(&self) -> Result<Duration, ConfigError> {
        seconds("runTimeout", self.run_timeout)
    }
}

fn seconds(key: &'static str, value: f64) -> Result<Duration, ConfigError> {
    // try_from_secs_f64 rejects NaN, infinities, negatives and overflow.
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::Timeout { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.map_width, 20);
        assert_eq!(config.map_height, 20);
        assert_eq!(config.starting_gold, 250);
        assert!(!config.fog_of_war);
        assert_eq!(config.enabled_units, "W,M,C,A,K,R,S,B");
        assert_eq!(config.roster().unwrap(), UnitType::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = Config::from_json_str(r#"{"mapSeed": 7, "startingGold": 500}"#).unwrap();
        assert_eq!(config.map_seed, 7);
        assert_eq!(config.starting_gold, 500);
        assert_eq!(config.episode_steps, 200);
        assert_eq!(config.map_width, 20);
    }

    #[test]
    fn test_roster_subset_and_duplicates() {
        let config = Config { enabled_units: " W, K ,W".into(), ..Config::default() };
        assert_eq!(config.roster().unwrap(), vec![UnitType::Warrior, UnitType::Knight]);
    }

    #[test]
    fn test_rejects_bad_values() {
        let unknown = Config { enabled_units: "W,Z".into(), ..Config::default() };
        assert!(matches!(unknown.validate(), Err(ConfigError::UnknownUnit(c)) if c == "Z"));

        let empty = Config { enabled_units: " , ".into(), ..Config::default() };
        assert!(matches!(empty.validate(), Err(ConfigError::EmptyRoster)));

        let tiny = Config { map_width: 4, ..Config::default() };
        assert!(matches!(tiny.validate(), Err(ConfigError::Dimensions { .. })));

        let no_steps = Config { episode_steps: 0, ..Config::default() };
        assert!(matches!(no_steps.validate(), Err(ConfigError::ZeroSteps)));

        assert!(matches!(Config::from_json_str("[1, 2]"), Err(ConfigError::Parse(_))));
        assert!(matches!(Config::from_json_str("7"), Err(ConfigError::Parse(_))));
        assert!(matches!(Config::from_json_str("null"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_timeouts_must_fit_a_duration() {
        let config = Config::default();
        assert_eq!(config.act_limit().unwrap(), Duration::from_secs(5));
        assert_eq!(config.run_limit().unwrap(), Duration::from_secs(1200));
        assert_eq!(Config { act_timeout: 0.0, ..config.clone() }.act_limit().unwrap(), Duration::ZERO);

        for bad in [-1.0, f64::NAN, f64::INFINITY, 1e30] {
            let run = Config { run_timeout: bad, ..Config::default() };
            assert!(matches!(run.validate(), Err(ConfigError::Timeout { key: "runTimeout", .. })), "{bad}");
            let act = Config { act_timeout: bad, ..Config::default() };
            assert!(matches!(act.validate(), Err(ConfigError::Timeout { key: "actTimeout", .. })), "{bad}");
        }
        assert!(matches!(
            Config::from_json_str(r#"{"runTimeout": 1e30}"#),
            Err(ConfigError::Timeout { key: "runTimeout", .. })
        ));
    }
}
