// ═══════════════════════════════════════════════════════════════════════
// Game Engine — action resolution and the turn scheduler.
//
// Architecture:
//   The engine is a pure state machine. It never does I/O, reads a clock
//   or calls agents. The harness hands it one submission per seat per
//   step; only the active seat's submission is parsed and applied.
//
// Flow of one step:
//   1. Parse the active seat's whole batch. A structural failure is a
//      forfeit and nothing from the batch is applied.
//   2. Apply actions in order. Rule violations are rejected one by one
//      and leave the state untouched.
//   3. `end_turn` (explicit, or implied at the end of the batch) hands
//      control over and credits the new seat's income.
//   4. Advance the step counter and run the win evaluator.
// ═══════════════════════════════════════════════════════════════════════

use crate::action::{parse_submission, Action, Submission};
use crate::economy;
use crate::error::{EngineError, ForfeitReason, RuleViolation};
use crate::state::GameState;
use crate::types::*;
use crate::victory;
use serde::Serialize;

/// What an accepted action did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ActionEffect {
    Created { id: UnitId, unit_type: UnitType, pos: Pos, cost: u32 },
    Moved { id: UnitId, from: Pos, to: Pos },
    Attacked {
        attacker: UnitId,
        target: UnitId,
        damage: u32,
        /// Damage dealt back by the defender, if it survived and could reach.
        counter: Option<u32>,
        target_destroyed: bool,
        attacker_destroyed: bool,
    },
    Seized { pos: Pos, kind: StructureKind, damage: u32, captured: bool },
    TurnEnded { next: PlayerId, turn_number: u32, income: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Position of the action in the submitted batch.
    pub index: usize,
    pub action: Action,
    pub error: RuleViolation,
}

/// Everything that happened during one harness step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub player: PlayerId,
    pub effects: Vec<ActionEffect>,
    pub rejections: Vec<Rejection>,
    /// Actions skipped because the turn or the episode had already ended.
    pub ignored: usize,
    pub forfeit: Option<ForfeitReason>,
    pub outcome: Option<Outcome>,
}

impl StepReport {
    fn new(player: PlayerId) -> StepReport {
        StepReport {
            player,
            effects: Vec::new(),
            rejections: Vec::new(),
            ignored: 0,
            forfeit: None,
            outcome: None,
        }
    }
}

// ── Scheduler ──────────────────────────────────────────────────────────

/// Run one harness step. `submissions` is indexed by seat.
pub fn step(state: &mut GameState, submissions: &[Submission; 2]) -> Result<StepReport, EngineError> {
    if state.is_over() {
        return Err(EngineError::EpisodeOver);
    }
    let player = state.current_player();
    let mut report = StepReport::new(player);

    match parse_submission(&submissions[player.index()]) {
        Err(reason) => {
            forfeit(state, player, reason.clone())?;
            report.forfeit = Some(reason);
        }
        Ok(actions) => {
            let mut turn_over = false;
            for (index, action) in actions.into_iter().enumerate() {
                if turn_over || state.is_over() {
                    report.ignored += 1;
                    continue;
                }
                match apply_action(state, player, &action) {
                    Ok(effect) => {
                        turn_over = matches!(effect, ActionEffect::TurnEnded { .. });
                        report.effects.push(effect);
                    }
                    Err(error) => {
                        tracing::debug!(
                            target: "tactics::engine",
                            event = "action.rejected",
                            player = %player,
                            index,
                            action = action.type_name(),
                            %error,
                        );
                        report.rejections.push(Rejection { index, action, error });
                    }
                }
            }
            if !turn_over && !state.is_over() {
                report.effects.push(end_turn(state));
            }
        }
    }

    state.advance_step();
    victory::check(state);
    report.outcome = state.outcome().cloned();
    Ok(report)
}

/// End the episode with `player` forfeiting. No income, no turn flip.
pub fn forfeit(state: &mut GameState, player: PlayerId, reason: ForfeitReason) -> Result<(), EngineError> {
    if state.is_over() {
        return Err(EngineError::EpisodeOver);
    }
    tracing::warn!(
        target: "tactics::engine",
        event = "turn.forfeit",
        player = %player,
        step = state.step_count(),
        %reason,
    );
    let winner = player.opponent();
    victory::conclude(state, Outcome::Victory { winner, cause: VictoryCause::Forfeit(reason) });
    Ok(())
}

/// Hand control to the other seat: flip, refresh its units, credit its income.
pub fn end_turn(state: &mut GameState) -> ActionEffect {
    let next = state.pass_turn();
    state.refresh_units(next);
    let income = economy::collect_income(state, next);
    tracing::debug!(
        target: "tactics::engine",
        event = "turn.ended",
        next = %next,
        turn = state.turn_number(),
        income,
    );
    ActionEffect::TurnEnded { next, turn_number: state.turn_number(), income }
}

// ── Action application ─────────────────────────────────────────────────

/// Validate and apply a single parsed action for `player`.
/// A rejected action leaves the state unchanged.
pub fn apply_action(state: &mut GameState, player: PlayerId, action: &Action) -> Result<ActionEffect, RuleViolation> {
    if state.is_over() {
        return Err(RuleViolation::GameOver);
    }
    if player != state.current_player() {
        return Err(RuleViolation::NotYourTurn(player));
    }

    match *action {
        Action::EndTurn => Ok(end_turn(state)),
        Action::CreateUnit { ref unit_type, x, y } => create_unit(state, player, unit_type, Pos::new(x, y)),
        Action::Move { from_x, from_y, to_x, to_y } => {
            move_unit(state, player, Pos::new(from_x, from_y), Pos::new(to_x, to_y))
        }
        Action::Attack { from_x, from_y, target_x, target_y } => {
            attack(state, player, Pos::new(from_x, from_y), Pos::new(target_x, target_y))
        }
        Action::Seize { x, y } => seize(state, player, Pos::new(x, y)),
    }
}

fn create_unit(state: &mut GameState, player: PlayerId, code: &str, pos: Pos) -> Result<ActionEffect, RuleViolation> {
    in_bounds(state, pos)?;
    let unit_type = UnitType::from_code(code).ok_or_else(|| RuleViolation::UnknownUnitType(code.to_string()))?;
    if !state.roster().contains(&unit_type) {
        return Err(RuleViolation::UnitDisabled(unit_type));
    }
    match state.structure_at(pos) {
        Some(s) if s.kind.produces_units() && s.owner == Some(player) => {}
        _ => return Err(RuleViolation::NoProductionSite(pos)),
    }
    if state.unit_at(pos).is_some() {
        return Err(RuleViolation::Occupied(pos));
    }

    let cost = unit_type.cost();
    state.spend_gold(player, cost)?;
    let id = match state.spawn_unit(player, unit_type, pos) {
        Some(id) => id,
        None => {
            state.credit_gold(player, cost);
            return Err(RuleViolation::Occupied(pos));
        }
    };
    Ok(ActionEffect::Created { id, unit_type, pos, cost })
}

fn move_unit(state: &mut GameState, player: PlayerId, from: Pos, to: Pos) -> Result<ActionEffect, RuleViolation> {
    in_bounds(state, from)?;
    in_bounds(state, to)?;
    let unit = ready_unit(state, player, from)?;
    if unit.has_moved {
        return Err(RuleViolation::AlreadyMoved(from));
    }
    let id = unit.id;
    if state.unit_at(to).is_some() {
        return Err(RuleViolation::Occupied(to));
    }
    if !state.reachable_cells(id).contains(&to) || !state.relocate_unit(id, to) {
        return Err(RuleViolation::Unreachable { from, to });
    }
    if let Some(unit) = state.unit_mut(id) {
        unit.has_moved = true;
    }
    Ok(ActionEffect::Moved { id, from, to })
}

fn attack(state: &mut GameState, player: PlayerId, from: Pos, target: Pos) -> Result<ActionEffect, RuleViolation> {
    in_bounds(state, from)?;
    in_bounds(state, target)?;
    let attacker = *ready_unit(state, player, from)?;
    let defender = match state.unit_at(target) {
        Some(u) if u.owner != player => *u,
        _ => return Err(RuleViolation::NoEnemyUnit(target)),
    };
    let distance = from.manhattan(target);
    if !attacker.unit_type.in_range(distance) {
        return Err(RuleViolation::OutOfRange { from, target });
    }

    let dealt = damage(attacker.unit_type, defender.unit_type, terrain_at(state, target));
    let defender_hp = defender.hp.saturating_sub(dealt);
    let mut counter = None;
    let mut attacker_hp = attacker.hp;

    if defender_hp == 0 {
        state.remove_unit(defender.id);
    } else {
        if let Some(d) = state.unit_mut(defender.id) {
            d.hp = defender_hp;
        }
        if defender.unit_type.in_range(distance) {
            let back = damage(defender.unit_type, attacker.unit_type, terrain_at(state, from));
            attacker_hp = attacker_hp.saturating_sub(back);
            counter = Some(back);
        }
    }

    if attacker_hp == 0 {
        state.remove_unit(attacker.id);
    } else if let Some(a) = state.unit_mut(attacker.id) {
        a.hp = attacker_hp;
        a.has_moved = true;
        a.has_acted = true;
    }

    Ok(ActionEffect::Attacked {
        attacker: attacker.id,
        target: defender.id,
        damage: dealt,
        counter,
        target_destroyed: defender_hp == 0,
        attacker_destroyed: attacker_hp == 0,
    })
}

fn seize(state: &mut GameState, player: PlayerId, pos: Pos) -> Result<ActionEffect, RuleViolation> {
    in_bounds(state, pos)?;
    let unit = *ready_unit(state, player, pos)?;
    let index = match state.structure_index_at(pos) {
        Some(i) if state.structures()[i].owner != Some(player) => i,
        _ => return Err(RuleViolation::NothingToSeize(pos)),
    };

    let damage = seize_damage(&unit);
    let structure = state.structure_mut(index);
    let kind = structure.kind;
    structure.hp = structure.hp.saturating_sub(damage);
    let captured = structure.hp == 0;
    if captured {
        structure.owner = Some(player);
        structure.hp = kind.max_hp();
    }
    if let Some(u) = state.unit_mut(unit.id) {
        u.has_moved = true;
        u.has_acted = true;
    }

    if captured {
        tracing::info!(
            target: "tactics::engine",
            event = "structure.captured",
            player = %player,
            kind = %kind.code(),
            x = pos.x,
            y = pos.y,
        );
        if kind == StructureKind::Headquarters {
            victory::check(state);
        }
    }
    Ok(ActionEffect::Seized { pos, kind, damage, captured })
}

// ── Combat arithmetic ──────────────────────────────────────────────────

/// Damage dealt by one strike: attack minus defense minus the defender's
/// terrain bonus, never below 1. Flying defenders get no terrain bonus.
pub fn damage(attacker: UnitType, defender: UnitType, defender_terrain: Terrain) -> u32 {
    let bonus = if defender.is_flying() { 0 } else { defender_terrain.defense_bonus() };
    let reduction = defender.stats().defense + bonus;
    attacker.stats().attack.saturating_sub(reduction).max(1)
}

/// Capture points a unit strips from a structure in one seize.
pub fn seize_damage(unit: &Unit) -> u32 {
    if unit.unit_type == UnitType::Siege {
        unit.hp * 2
    } else {
        unit.hp
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

fn in_bounds(state: &GameState, pos: Pos) -> Result<(), RuleViolation> {
    if state.board().contains(pos) {
        Ok(())
    } else {
        Err(RuleViolation::OutOfBounds(pos))
    }
}

fn terrain_at(state: &GameState, pos: Pos) -> Terrain {
    state.board().terrain(pos).unwrap_or(Terrain::Grass)
}

/// The actor's unit at `pos`, provided it can still act this turn.
fn ready_unit(state: &GameState, player: PlayerId, pos: Pos) -> Result<&Unit, RuleViolation> {
    let unit = match state.unit_at(pos) {
        Some(u) if u.owner == player => u,
        _ => return Err(RuleViolation::NoFriendlyUnit(pos)),
    };
    if unit.has_acted {
        return Err(RuleViolation::AlreadyActed(pos));
    }
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_formula() {
        // Warrior 10 atk vs Knight 8 def on grass
        assert_eq!(damage(UnitType::Warrior, UnitType::Knight, Terrain::Grass), 2);
        // mountain bonus pushes it to the floor
        assert_eq!(damage(UnitType::Warrior, UnitType::Knight, Terrain::Mountain), 1);
        // Siege 14 atk vs Mage 3 def in forest
        assert_eq!(damage(UnitType::Siege, UnitType::Mage, Terrain::Forest), 9);
        // balloons ignore terrain
        assert_eq!(damage(UnitType::Warrior, UnitType::Balloon, Terrain::Mountain), 8);
    }

    #[test]
    fn test_siege_doubles_seize_damage() {
        let mut unit = Unit {
            id: UnitId(0),
            unit_type: UnitType::Siege,
            owner: PlayerId::P0,
            pos: Pos::new(0, 0),
            hp: 12,
            has_moved: false,
            has_acted: false,
        };
        assert_eq!(seize_damage(&unit), 24);
        unit.unit_type = UnitType::Warrior;
        assert_eq!(seize_damage(&unit), 12);
    }
}
