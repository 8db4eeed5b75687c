// ═══════════════════════════════════════════════════════════════════════
// Agent Trait — interface that all AI agents must implement
//
// KEY DESIGN PRINCIPLE:
//   Agents receive an `Observation` (not the raw GameState), which only
//   contains what their seat is allowed to see. Under fog of war that
//   means distant enemy units are simply absent.
//
//   An agent answers one observation with one batch of actions. The
//   harness serializes the batch to JSON and feeds it through the same
//   parser as any external player, so agents get no special trust.
// ═══════════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use tactics_engine::navigation::{self, Occupant};
use tactics_engine::types::*;
use tactics_engine::visibility::{Observation, UnitView};
use tactics_engine::{Action, Submission};

/// Trait that all AI agents must implement.
pub trait Agent: Send + Sync {
    /// Registry name for this agent (e.g. "random", "aggressive").
    fn name(&self) -> &str;

    /// The seat this agent is playing.
    fn player(&self) -> PlayerId;

    /// Plan the whole turn. The batch should end with `Action::EndTurn`.
    fn decide(&mut self, obs: &Observation) -> Vec<Action>;

    /// `decide`, encoded the way the harness submits it.
    fn act(&mut self, obs: &Observation) -> Submission {
        let actions = self.decide(obs);
        serde_json::to_value(actions).ok()
    }
}

// ── Turn planning ──────────────────────────────────────────────────────
//
// Observations are snapshots, so a plan has to track its own effects:
// gold spent on units and cells vacated or filled by earlier actions in
// the same batch. Everything here is advisory; the engine re-validates.

pub struct TurnPlan<'a> {
    obs: &'a Observation,
    player: PlayerId,
    gold: u32,
    /// Owner code of whatever stands on a cell after the planned actions.
    occupied: HashMap<Pos, u8>,
    actions: Vec<Action>,
}

impl<'a> TurnPlan<'a> {
    pub fn new(obs: &'a Observation) -> TurnPlan<'a> {
        TurnPlan {
            obs,
            player: obs.viewer(),
            gold: obs.my_gold(),
            occupied: obs.units.iter().map(|u| (u.pos(), u.owner)).collect(),
            actions: Vec::new(),
        }
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }

    /// Owned unit-producing structures with nothing standing on them.
    pub fn free_production_sites(&self) -> Vec<Pos> {
        self.obs
            .structures
            .iter()
            .filter(|s| s.is_owned_by(self.player) && s.kind.produces_units())
            .map(|s| s.pos())
            .filter(|p| !self.occupied.contains_key(p))
            .collect()
    }

    /// Enabled unit types the plan can still pay for.
    pub fn affordable(&self) -> Vec<UnitType> {
        self.obs
            .enabled_units
            .iter()
            .copied()
            .filter(|u| u.cost() <= self.gold)
            .collect()
    }

    /// Units of ours that may still act, in observation order.
    pub fn ready_units(&self) -> Vec<UnitView> {
        self.obs.my_units().filter(|u| !u.has_acted).cloned().collect()
    }

    pub fn reachable(&self, unit: &UnitView, from: Pos) -> Vec<Pos> {
        let own = self.player.owner_code();
        navigation::reachable(&self.obs.board, from, unit.unit_type, |p| match self.occupied.get(&p) {
            None => Occupant::Empty,
            Some(&owner) if owner == own => Occupant::Friendly,
            Some(_) => Occupant::Enemy,
        })
    }

    /// Visible enemy units within `unit`'s attack band when standing on `at`.
    pub fn targets(&self, unit: &UnitView, at: Pos) -> Vec<&'a UnitView> {
        self.obs
            .enemy_units()
            .filter(|e| unit.unit_type.in_range(at.manhattan(e.pos())))
            .collect()
    }

    /// Is there a structure we do not own under `at`?
    pub fn can_seize(&self, at: Pos) -> bool {
        self.obs.structure_at(at).is_some_and(|s| !s.is_owned_by(self.player))
    }

    pub fn create(&mut self, unit_type: UnitType, at: Pos) {
        self.gold = self.gold.saturating_sub(unit_type.cost());
        self.occupied.insert(at, self.player.owner_code());
        self.actions.push(Action::create_unit(unit_type, at));
    }

    pub fn move_unit(&mut self, from: Pos, to: Pos) {
        if let Some(owner) = self.occupied.remove(&from) {
            self.occupied.insert(to, owner);
        }
        self.actions.push(Action::move_unit(from, to));
    }

    pub fn attack(&mut self, from: Pos, target: Pos) {
        self.actions.push(Action::attack(from, target));
    }

    pub fn seize(&mut self, at: Pos) {
        self.actions.push(Action::seize(at));
    }

    /// Close the batch with an explicit end of turn.
    pub fn finish(mut self) -> Vec<Action> {
        self.actions.push(Action::EndTurn);
        self.actions
    }
}
