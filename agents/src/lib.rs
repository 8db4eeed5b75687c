pub mod agent;
pub mod random;
pub mod aggressive;

pub use agent::{Agent, TurnPlan};
pub use random::RandomAgent;
pub use aggressive::AggressiveAgent;

use tactics_engine::PlayerId;

/// Names accepted by `make_agent`.
pub const AGENT_NAMES: [&str; 2] = ["random", "aggressive"];

/// Build a built-in agent by registry name. Unknown names give `None`.
pub fn make_agent(name: &str, player: PlayerId, seed: u64) -> Option<Box<dyn Agent>> {
    match name {
        "random" => Some(Box::new(RandomAgent::new(player, seed))),
        "aggressive" => Some(Box::new(AggressiveAgent::new(player))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry() {
        for name in AGENT_NAMES {
            let agent = make_agent(name, PlayerId::P1, 3).unwrap();
            assert_eq!(agent.name(), name);
            assert_eq!(agent.player(), PlayerId::P1);
        }
        assert!(make_agent("turtle", PlayerId::P0, 0).is_none());
    }
}
