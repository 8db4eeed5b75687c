// ═══════════════════════════════════════════════════════════════════════
// Economy — structure income, credited when a player's turn begins
// ═══════════════════════════════════════════════════════════════════════

use crate::state::GameState;
use crate::types::PlayerId;

/// Gold `player` would collect right now: the income of every structure they own.
pub fn income(state: &GameState, player: PlayerId) -> u32 {
    state
        .structures()
        .iter()
        .filter(|s| s.owner == Some(player))
        .map(|s| s.kind.income())
        .sum()
}

/// Credit `player` with their income and return the amount.
pub(crate) fn collect_income(state: &mut GameState, player: PlayerId) -> u32 {
    let amount = income(state, player);
    state.credit_gold(player, amount);
    tracing::trace!(
        target: "tactics::economy",
        event = "economy.income",
        player = %player,
        amount,
        balance = state.gold(player),
    );
    amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::setup::create_initial_state;
    use crate::types::StructureKind;

    #[test]
    fn test_starting_income_is_hq_plus_buildings() {
        let state = create_initial_state(&Config::default()).unwrap();
        let expected = StructureKind::Headquarters.income() + 2 * StructureKind::Building.income();
        assert_eq!(income(&state, PlayerId::P0), expected);
        assert_eq!(income(&state, PlayerId::P1), expected);
    }

    #[test]
    fn test_collect_credits_only_the_named_player() {
        let mut state = create_initial_state(&Config::default()).unwrap();
        let before = state.golds();
        let amount = collect_income(&mut state, PlayerId::P1);
        assert_eq!(state.gold(PlayerId::P1), before[1] + amount);
        assert_eq!(state.gold(PlayerId::P0), before[0]);
    }
}
