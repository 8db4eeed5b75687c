// ═══════════════════════════════════════════════════════════════════════
// Win conditions — headquarters ownership and the step budget.
// Forfeits are recorded directly by the engine; this module only reads
// the board and the clock.
// ═══════════════════════════════════════════════════════════════════════

use crate::state::GameState;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Undecided,
    Winner(PlayerId),
    Draw,
}

/// Judge the position without changing it. A recorded outcome always wins.
pub fn evaluate(state: &GameState) -> Verdict {
    if let Some(outcome) = state.outcome() {
        return match outcome.winner() {
            Some(winner) => Verdict::Winner(winner),
            None => Verdict::Draw,
        };
    }

    let lost = PlayerId::ALL.map(|p| state.headquarters(p).owner != Some(p));
    match lost {
        [true, false] => return Verdict::Winner(PlayerId::P1),
        [false, true] => return Verdict::Winner(PlayerId::P0),
        [true, true] => return Verdict::Draw,
        [false, false] => {}
    }

    if state.step_count() >= state.config().episode_steps {
        Verdict::Draw
    } else {
        Verdict::Undecided
    }
}

/// Evaluate and record a decided verdict.
pub(crate) fn check(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    match evaluate(state) {
        Verdict::Undecided => {}
        Verdict::Winner(winner) => conclude(
            state,
            Outcome::Victory { winner, cause: VictoryCause::HeadquartersCaptured },
        ),
        Verdict::Draw => conclude(state, Outcome::Draw),
    }
}

pub(crate) fn conclude(state: &mut GameState, outcome: Outcome) {
    let rewards = outcome.rewards();
    state.finish(outcome);
    tracing::info!(
        target: "tactics::victory",
        event = "game.over",
        step = state.step_count(),
        turn = state.turn_number(),
        reward_p1 = rewards[0],
        reward_p2 = rewards[1],
    );
}
