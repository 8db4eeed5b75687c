// ═══════════════════════════════════════════════════════════════════════
// Game State — the authoritative record of one episode.
//
// Fields are private: the engine mutates through the crate-only entry
// points below, everything else reads through accessors or takes an
// owned Observation. Spatial lookups go through index grids
// (cell -> unit id, cell -> structure index), never back-pointers.
// ═══════════════════════════════════════════════════════════════════════

use crate::config::Config;
use crate::economy;
use crate::engine;
use crate::error::{EngineError, ForfeitReason, RuleViolation};
use crate::map::GeneratedMap;
use crate::navigation::{self, Occupant};
use crate::types::*;
use crate::visibility::{self, Observation};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    config: Config,
    roster: Vec<UnitType>,
    board: Board,
    structures: Vec<Structure>,
    /// Index into `structures` of each seat's original headquarters.
    headquarters: [usize; 2],
    structure_grid: Vec<Option<usize>>,
    units: BTreeMap<UnitId, Unit>,
    unit_grid: Vec<Option<UnitId>>,
    next_unit_id: u32,
    gold: [u32; 2],
    turn_number: u32,
    step: u32,
    current_player: PlayerId,
    outcome: Option<Outcome>,
}

impl GameState {
    pub(crate) fn new(config: Config, roster: Vec<UnitType>, map: GeneratedMap) -> GameState {
        let GeneratedMap { board, structures } = map;
        let mut structure_grid = vec![None; board.len()];
        let mut headquarters = [0, 0];
        for (i, s) in structures.iter().enumerate() {
            if let Some(cell) = board.index(s.pos) {
                structure_grid[cell] = Some(i);
            }
            if let (StructureKind::Headquarters, Some(owner)) = (s.kind, s.owner) {
                headquarters[owner.index()] = i;
            }
        }
        let gold = [config.starting_gold; 2];
        GameState {
            config,
            roster,
            unit_grid: vec![None; board.len()],
            board,
            structures,
            headquarters,
            structure_grid,
            units: BTreeMap::new(),
            next_unit_id: 0,
            gold,
            turn_number: 0,
            step: 0,
            current_player: PlayerId::P0,
            outcome: None,
        }
    }

    // ── Read access ────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Unit types that may be created this episode.
    pub fn roster(&self) -> &[UnitType] {
        &self.roster
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    pub fn structure_at(&self, pos: Pos) -> Option<&Structure> {
        self.structure_index_at(pos).map(|i| &self.structures[i])
    }

    pub(crate) fn structure_index_at(&self, pos: Pos) -> Option<usize> {
        self.board.index(pos).and_then(|cell| self.structure_grid[cell])
    }

    /// The headquarters a seat started with (its owner may have changed).
    pub fn headquarters(&self, player: PlayerId) -> &Structure {
        &self.structures[self.headquarters[player.index()]]
    }

    /// Units in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.owner == player)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_at(&self, pos: Pos) -> Option<&Unit> {
        self.board
            .index(pos)
            .and_then(|cell| self.unit_grid[cell])
            .and_then(|id| self.units.get(&id))
    }

    pub fn gold(&self, player: PlayerId) -> u32 {
        self.gold[player.index()]
    }

    pub fn golds(&self) -> [u32; 2] {
        self.gold
    }

    /// Gold `player` collects at the start of their next turn.
    pub fn income(&self, player: PlayerId) -> u32 {
        economy::income(self, player)
    }

    /// Completed rounds; increments when control returns to seat 0.
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Harness steps taken so far.
    pub fn step_count(&self) -> u32 {
        self.step
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn status(&self, player: PlayerId) -> PlayerStatus {
        if self.is_over() {
            PlayerStatus::Done
        } else if player == self.current_player {
            PlayerStatus::Active
        } else {
            PlayerStatus::Inactive
        }
    }

    /// -1, 0 or +1. Non-zero only once the episode is over.
    pub fn reward(&self, player: PlayerId) -> i8 {
        self.outcome.as_ref().map_or(0, |o| o.rewards()[player.index()])
    }

    pub fn observation(&self, player: PlayerId) -> Observation {
        visibility::observe(self, player)
    }

    /// Cells the given unit could move to right now, ignoring whether it already moved.
    pub fn reachable_cells(&self, id: UnitId) -> Vec<Pos> {
        let Some(unit) = self.units.get(&id) else {
            return Vec::new();
        };
        navigation::reachable(&self.board, unit.pos, unit.unit_type, |p| {
            match self.unit_at(p) {
                None => Occupant::Empty,
                Some(other) if other.owner == unit.owner => Occupant::Friendly,
                Some(_) => Occupant::Enemy,
            }
        })
    }

    /// End the episode with `player` forfeiting, e.g. after a harness timeout.
    pub fn forfeit(&mut self, player: PlayerId, reason: ForfeitReason) -> Result<(), EngineError> {
        engine::forfeit(self, player, reason)
    }

    // ── Mutation (engine only) ─────────────────────────────────────────

    /// Place a new unit. The cell must be on the board and free of units.
    pub(crate) fn spawn_unit(&mut self, owner: PlayerId, unit_type: UnitType, pos: Pos) -> Option<UnitId> {
        let cell = self.board.index(pos)?;
        if self.unit_grid[cell].is_some() {
            return None;
        }
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(id, Unit {
            id,
            unit_type,
            owner,
            pos,
            hp: unit_type.stats().max_hp,
            has_moved: true,
            has_acted: true,
        });
        self.unit_grid[cell] = Some(id);
        Some(id)
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Move a unit to a free in-bounds cell. Returns false and changes nothing otherwise.
    pub(crate) fn relocate_unit(&mut self, id: UnitId, to: Pos) -> bool {
        let Some(to_cell) = self.board.index(to) else {
            return false;
        };
        if self.unit_grid[to_cell].is_some() {
            return false;
        }
        let Some(unit) = self.units.get_mut(&id) else {
            return false;
        };
        if let Some(from_cell) = self.board.index(unit.pos) {
            self.unit_grid[from_cell] = None;
        }
        unit.pos = to;
        self.unit_grid[to_cell] = Some(id);
        true
    }

    pub(crate) fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        if let Some(cell) = self.board.index(unit.pos) {
            self.unit_grid[cell] = None;
        }
        Some(unit)
    }

    pub(crate) fn structure_mut(&mut self, index: usize) -> &mut Structure {
        &mut self.structures[index]
    }

    pub(crate) fn spend_gold(&mut self, player: PlayerId, amount: u32) -> Result<(), RuleViolation> {
        let available = self.gold[player.index()];
        let remaining = available
            .checked_sub(amount)
            .ok_or(RuleViolation::InsufficientGold { needed: amount, available })?;
        self.gold[player.index()] = remaining;
        Ok(())
    }

    pub(crate) fn credit_gold(&mut self, player: PlayerId, amount: u32) {
        let gold = &mut self.gold[player.index()];
        *gold = gold.saturating_add(amount);
    }

    /// Hand control to the other seat. Returns the newly active player.
    pub(crate) fn pass_turn(&mut self) -> PlayerId {
        self.current_player = self.current_player.opponent();
        if self.current_player == PlayerId::P0 {
            self.turn_number += 1;
        }
        self.current_player
    }

    /// Ready every unit of `player` for a new turn.
    pub(crate) fn refresh_units(&mut self, player: PlayerId) {
        for unit in self.units.values_mut().filter(|u| u.owner == player) {
            unit.has_moved = false;
            unit.has_acted = false;
        }
    }

    pub(crate) fn advance_step(&mut self) {
        self.step += 1;
    }

    /// Record the outcome. The first recorded outcome wins.
    pub(crate) fn finish(&mut self, outcome: Outcome) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
    }
}
