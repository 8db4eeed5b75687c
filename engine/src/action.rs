// ═══════════════════════════════════════════════════════════════════════
// Actions — the closed set of commands a player may submit, and the
// structural parser that turns untrusted JSON into them.
//
// Structural failures (not a record, no string `type`, unknown `type`,
// fields of the wrong shape) are ForfeitReasons. Everything that parses
// is handed to the engine for rule checks.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::ForfeitReason;
use crate::types::{Pos, UnitType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire names of every recognized action type.
pub const ACTION_TYPES: [&str; 5] = ["end_turn", "create_unit", "move", "attack", "seize"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    EndTurn,
    CreateUnit {
        /// One-letter unit code. Unknown codes are a rule violation, not a forfeit.
        unit_type: String,
        x: u32,
        y: u32,
    },
    Move {
        from_x: u32,
        from_y: u32,
        to_x: u32,
        to_y: u32,
    },
    Attack {
        from_x: u32,
        from_y: u32,
        target_x: u32,
        target_y: u32,
    },
    Seize {
        x: u32,
        y: u32,
    },
}

impl Action {
    pub fn create_unit(unit_type: UnitType, at: Pos) -> Action {
        Action::CreateUnit { unit_type: unit_type.code().to_string(), x: at.x, y: at.y }
    }

    pub fn move_unit(from: Pos, to: Pos) -> Action {
        Action::Move { from_x: from.x, from_y: from.y, to_x: to.x, to_y: to.y }
    }

    pub fn attack(from: Pos, target: Pos) -> Action {
        Action::Attack { from_x: from.x, from_y: from.y, target_x: target.x, target_y: target.y }
    }

    pub fn seize(at: Pos) -> Action {
        Action::Seize { x: at.x, y: at.y }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Action::EndTurn => "end_turn",
            Action::CreateUnit { .. } => "create_unit",
            Action::Move { .. } => "move",
            Action::Attack { .. } => "attack",
            Action::Seize { .. } => "seize",
        }
    }
}

/// One player's input for a step: `None`/`null` means "no actions".
pub type Submission = Option<Value>;

/// Parse a single action record.
pub fn parse_action(value: &Value) -> Result<Action, ForfeitReason> {
    let Some(record) = value.as_object() else {
        return Err(ForfeitReason::Malformed(format!(
            "expected an action record, got {}",
            json_kind(value)
        )));
    };
    let kind = match record.get("type") {
        Some(Value::String(kind)) => kind,
        Some(other) => {
            return Err(ForfeitReason::Malformed(format!(
                "`type` must be a string, got {}",
                json_kind(other)
            )))
        }
        None => return Err(ForfeitReason::Malformed("missing `type`".to_string())),
    };
    if !ACTION_TYPES.contains(&kind.as_str()) {
        return Err(ForfeitReason::UnknownType(kind.clone()));
    }
    Action::deserialize(value).map_err(|e| ForfeitReason::Malformed(e.to_string()))
}

/// Parse a whole batch. Any structural failure rejects the entire batch.
pub fn parse_submission(submission: &Submission) -> Result<Vec<Action>, ForfeitReason> {
    match submission {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(parse_action).collect(),
        Some(other) => Err(ForfeitReason::Malformed(format!(
            "expected a list of actions, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a record",
    }
}
