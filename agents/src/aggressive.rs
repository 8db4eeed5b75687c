// ═══════════════════════════════════════════════════════════════════════
// Aggressive Agent — spends everything, then pushes every unit at the
// enemy headquarters, fighting and seizing on the way.
// Significantly stronger than RandomAgent.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{Agent, TurnPlan};
use tactics_engine::navigation;
use tactics_engine::types::*;
use tactics_engine::visibility::{Observation, UnitView};
use tactics_engine::Action;

pub struct AggressiveAgent {
    player: PlayerId,
}

impl AggressiveAgent {
    pub fn new(player: PlayerId) -> Self {
        AggressiveAgent { player }
    }

    /// Where the enemy headquarters stands (falls back to the board mirror of ours).
    fn enemy_headquarters(&self, obs: &Observation) -> Option<Pos> {
        let hq = |owner: PlayerId| {
            obs.structures
                .iter()
                .find(|s| s.kind == StructureKind::Headquarters && s.is_owned_by(owner))
                .map(|s| s.pos())
        };
        hq(self.player.opponent()).or_else(|| hq(self.player).map(|p| obs.board.mirror(p)))
    }

    /// Structures not owned by us, enemy headquarters first.
    fn foreign_structures(&self, obs: &Observation) -> Vec<Pos> {
        let mut foreign: Vec<_> = obs
            .structures
            .iter()
            .filter(|s| !s.is_owned_by(self.player))
            .collect();
        foreign.sort_by_key(|s| s.kind != StructureKind::Headquarters);
        foreign.into_iter().map(|s| s.pos()).collect()
    }

    /// Weakest visible enemy in range; ties go to the earliest in the list.
    fn pick_target<'a>(targets: &[&'a UnitView]) -> Option<&'a UnitView> {
        targets.iter().copied().min_by_key(|t| t.hp)
    }

    fn buy_units(&self, plan: &mut TurnPlan) {
        for site in plan.free_production_sites() {
            let best = plan.affordable().into_iter().max_by_key(|u| u.cost());
            match best {
                Some(unit) => plan.create(unit, site),
                None => break,
            }
        }
    }
}

impl Agent for AggressiveAgent {
    fn name(&self) -> &str { "aggressive" }
    fn player(&self) -> PlayerId { self.player }

    fn decide(&mut self, obs: &Observation) -> Vec<Action> {
        let mut plan = TurnPlan::new(obs);
        self.buy_units(&mut plan);

        let goal = self.enemy_headquarters(obs);
        let walk = goal.map(|g| navigation::distance_field(&obs.board, &[g], Terrain::is_ground_passable));
        let foreign = self.foreign_structures(obs);

        for unit in plan.ready_units() {
            let mut at = unit.pos();

            if !plan.can_seize(at) && plan.targets(&unit, at).is_empty() && !unit.has_moved {
                let score = |p: Pos| {
                    let to_goal = match (&walk, goal) {
                        (Some(field), Some(g)) => obs
                            .board
                            .index(p)
                            .and_then(|i| field[i])
                            .filter(|_| !unit.unit_type.is_flying())
                            .unwrap_or_else(|| p.manhattan(g)),
                        _ => 0,
                    };
                    let to_structure = foreign.iter().map(|s| s.manhattan(p)).min().unwrap_or(0);
                    (to_goal, to_structure)
                };
                let best = plan.reachable(&unit, at).into_iter().min_by_key(|&p| score(p));
                if let Some(to) = best.filter(|&to| score(to) < score(at)) {
                    plan.move_unit(at, to);
                    at = to;
                }
            }

            if plan.can_seize(at) {
                plan.seize(at);
            } else if let Some(target) = Self::pick_target(&plan.targets(&unit, at)) {
                plan.attack(at, target.pos());
            }
        }

        plan.finish()
    }
}
