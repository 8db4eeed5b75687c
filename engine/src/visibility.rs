// ═══════════════════════════════════════════════════════════════════════
// Visibility / Information Model
//
// Terrain, structures, gold and the clock are public. Units are public
// unless fog of war is on, in which case an enemy unit is only visible
// within VISION_RANGE of one of the viewer's units or structures.
//
// Agents MUST only receive an Observation, never the raw GameState.
// ═══════════════════════════════════════════════════════════════════════

use crate::state::GameState;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Manhattan sight radius of units and owned structures under fog of war.
pub const VISION_RANGE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureView {
    pub x: u32,
    pub y: u32,
    #[serde(rename = "type")]
    pub kind: StructureKind,
    /// 0 = neutral, 1 = first seat, 2 = second seat.
    pub owner: u8,
    pub hp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    pub id: UnitId,
    pub x: u32,
    pub y: u32,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub owner: u8,
    pub hp: u32,
    pub has_moved: bool,
    pub has_acted: bool,
}

/// What one seat is allowed to see. An owned copy; mutating it changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Seat index of the viewer (0 or 1).
    pub player: u8,
    pub current_player: u8,
    pub turn_number: u32,
    pub step: u32,
    pub map_width: u32,
    pub map_height: u32,
    pub board: Board,
    pub structures: Vec<StructureView>,
    pub units: Vec<UnitView>,
    pub gold: [u32; 2],
    pub enabled_units: Vec<UnitType>,
}

impl Observation {
    pub fn viewer(&self) -> PlayerId {
        PlayerId::from_index(self.player as usize).unwrap_or(PlayerId::P0)
    }

    pub fn my_gold(&self) -> u32 {
        self.gold[self.viewer().index()]
    }

    pub fn my_units(&self) -> impl Iterator<Item = &UnitView> {
        let code = self.viewer().owner_code();
        self.units.iter().filter(move |u| u.owner == code)
    }

    pub fn enemy_units(&self) -> impl Iterator<Item = &UnitView> {
        let code = self.viewer().owner_code();
        self.units.iter().filter(move |u| u.owner != code)
    }

    pub fn unit_at(&self, pos: Pos) -> Option<&UnitView> {
        self.units.iter().find(|u| u.pos() == pos)
    }

    pub fn structure_at(&self, pos: Pos) -> Option<&StructureView> {
        self.structures.iter().find(|s| s.pos() == pos)
    }
}

impl StructureView {
    pub fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == player.owner_code()
    }
}

impl UnitView {
    pub fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == player.owner_code()
    }
}

fn owner_code(owner: Option<PlayerId>) -> u8 {
    owner.map_or(0, PlayerId::owner_code)
}

/// Build `player`'s observation of `state`.
pub fn observe(state: &GameState, player: PlayerId) -> Observation {
    let fog = state.config().fog_of_war;
    let eyes: Vec<Pos> = if fog { sight_sources(state, player) } else { Vec::new() };

    let units = state
        .units()
        .filter(|u| !fog || u.owner == player || is_seen(&eyes, u.pos))
        .map(|u| UnitView {
            id: u.id,
            x: u.pos.x,
            y: u.pos.y,
            unit_type: u.unit_type,
            owner: u.owner.owner_code(),
            hp: u.hp,
            has_moved: u.has_moved,
            has_acted: u.has_acted,
        })
        .collect();

    let structures = state
        .structures()
        .iter()
        .map(|s| StructureView {
            x: s.pos.x,
            y: s.pos.y,
            kind: s.kind,
            owner: owner_code(s.owner),
            hp: s.hp,
        })
        .collect();

    Observation {
        player: player.index() as u8,
        current_player: state.current_player().index() as u8,
        turn_number: state.turn_number(),
        step: state.step_count(),
        map_width: state.board().width(),
        map_height: state.board().height(),
        board: state.board().clone(),
        structures,
        units,
        gold: state.golds(),
        enabled_units: state.roster().to_vec(),
    }
}

fn sight_sources(state: &GameState, player: PlayerId) -> Vec<Pos> {
    state
        .units_of(player)
        .map(|u| u.pos)
        .chain(state.structures().iter().filter(|s| s.owner == Some(player)).map(|s| s.pos))
        .collect()
}

fn is_seen(eyes: &[Pos], pos: Pos) -> bool {
    eyes.iter().any(|&e| e.manhattan(pos) <= VISION_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::setup::create_initial_state;

    #[test]
    fn test_owner_codes_are_one_based() {
        let state = create_initial_state(&Config::default()).unwrap();
        let obs = observe(&state, PlayerId::P0);
        let hq0 = state.headquarters(PlayerId::P0).pos;
        let hq1 = state.headquarters(PlayerId::P1).pos;
        assert_eq!(obs.structure_at(hq0).map(|s| s.owner), Some(1));
        assert_eq!(obs.structure_at(hq1).map(|s| s.owner), Some(2));
        assert!(obs.structures.iter().any(|s| s.kind == StructureKind::Tower && s.owner == 0));
    }

    #[test]
    fn test_camel_case_wire_shape() {
        let state = create_initial_state(&Config::default()).unwrap();
        let value = serde_json::to_value(observe(&state, PlayerId::P1)).unwrap();
        for key in ["player", "currentPlayer", "turnNumber", "mapWidth", "mapHeight", "board", "gold", "enabledUnits"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["player"], 1);
        assert_eq!(value["board"].as_array().map(Vec::len), Some(20));
        assert_eq!(value["structures"][0]["type"], "h");
    }

    #[test]
    fn test_fog_hides_distant_enemies_only() {
        let config = Config { fog_of_war: true, ..Config::default() };
        let mut state = create_initial_state(&config).unwrap();
        let hq1 = state.headquarters(PlayerId::P1).pos;
        state.spawn_unit(PlayerId::P1, UnitType::Warrior, hq1).unwrap();

        let seen_by_p0 = observe(&state, PlayerId::P0);
        assert!(seen_by_p0.unit_at(hq1).is_none());

        let seen_by_p1 = observe(&state, PlayerId::P1);
        assert!(seen_by_p1.unit_at(hq1).is_some());

        let open = Config::default();
        let mut clear = create_initial_state(&open).unwrap();
        clear.spawn_unit(PlayerId::P1, UnitType::Warrior, hq1).unwrap();
        assert!(observe(&clear, PlayerId::P0).unit_at(hq1).is_some());
    }
}
