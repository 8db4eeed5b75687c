// ═══════════════════════════════════════════════════════════════════════
// Random Agent — makes all decisions randomly.
// Serves as baseline and for testing game engine stability.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{Agent, TurnPlan};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tactics_engine::types::*;
use tactics_engine::visibility::Observation;
use tactics_engine::Action;

pub struct RandomAgent {
    player: PlayerId,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(player: PlayerId, seed: u64) -> Self {
        RandomAgent {
            player,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str { "random" }
    fn player(&self) -> PlayerId { self.player }

    fn decide(&mut self, obs: &Observation) -> Vec<Action> {
        let mut plan = TurnPlan::new(obs);

        if self.rng.gen_bool(0.5) {
            let site = plan.free_production_sites().choose(&mut self.rng).copied();
            let unit = plan.affordable().choose(&mut self.rng).copied();
            if let (Some(site), Some(unit)) = (site, unit) {
                plan.create(unit, site);
            }
        }

        for unit in plan.ready_units() {
            let at = unit.pos();
            if plan.can_seize(at) {
                plan.seize(at);
                continue;
            }
            if let Some(target) = plan.targets(&unit, at).choose(&mut self.rng) {
                plan.attack(at, target.pos());
                continue;
            }
            if unit.has_moved {
                continue;
            }
            if let Some(&to) = plan.reachable(&unit, at).choose(&mut self.rng) {
                plan.move_unit(at, to);
            }
        }

        plan.finish()
    }
}
