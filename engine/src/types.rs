// ═══════════════════════════════════════════════════════════════════════
// Core types — players, board terrain, structures and the unit roster
// ═══════════════════════════════════════════════════════════════════════

use crate::error::ForfeitReason;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Players ────────────────────────────────────────────────────────────

/// Seat of a player. Seat 0 moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const P0: PlayerId = PlayerId(0);
    pub const P1: PlayerId = PlayerId(1);
    pub const ALL: [PlayerId; 2] = [PlayerId::P0, PlayerId::P1];

    pub fn from_index(index: usize) -> Option<PlayerId> {
        match index {
            0 => Some(PlayerId::P0),
            1 => Some(PlayerId::P1),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn opponent(self) -> PlayerId {
        PlayerId(1 - self.0)
    }

    /// Owner code used on the wire: 1 for seat 0, 2 for seat 1 (0 = neutral).
    pub fn owner_code(self) -> u8 {
        self.0 + 1
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.owner_code())
    }
}

// ── Positions ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: u32,
    pub y: u32,
}

impl Pos {
    pub const fn new(x: u32, y: u32) -> Pos {
        Pos { x, y }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn chebyshev(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Orthogonal neighbours. May lie outside the board; callers bound-check.
    pub fn neighbors(self) -> impl Iterator<Item = Pos> {
        let Pos { x, y } = self;
        [
            x.checked_sub(1).map(|x| Pos::new(x, y)),
            Some(Pos::new(x + 1, y)),
            y.checked_sub(1).map(|y| Pos::new(x, y)),
            Some(Pos::new(x, y + 1)),
        ]
        .into_iter()
        .flatten()
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Terrain ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    #[serde(rename = "p")]
    Grass,
    #[serde(rename = "f")]
    Forest,
    #[serde(rename = "m")]
    Mountain,
    #[serde(rename = "w")]
    Water,
    #[serde(rename = "o")]
    Ocean,
}

impl Terrain {
    pub fn code(self) -> char {
        match self {
            Terrain::Grass => 'p',
            Terrain::Forest => 'f',
            Terrain::Mountain => 'm',
            Terrain::Water => 'w',
            Terrain::Ocean => 'o',
        }
    }

    /// Movement points a walking unit spends to enter this tile.
    /// None = impassable on foot.
    pub fn ground_cost(self) -> Option<u32> {
        match self {
            Terrain::Grass => Some(1),
            Terrain::Forest => Some(2),
            Terrain::Mountain => Some(3),
            Terrain::Water | Terrain::Ocean => None,
        }
    }

    pub fn is_ground_passable(self) -> bool {
        self.ground_cost().is_some()
    }

    /// Damage reduction granted to a grounded defender standing here.
    pub fn defense_bonus(self) -> u32 {
        match self {
            Terrain::Forest => 2,
            Terrain::Mountain => 3,
            _ => 0,
        }
    }
}

// ── Board ──────────────────────────────────────────────────────────────

/// Static terrain grid, row-major. Serialized as rows of terrain codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<Terrain>>", try_from = "Vec<Vec<Terrain>>")]
pub struct Board {
    width: u32,
    height: u32,
    tiles: Vec<Terrain>,
}

impl Board {
    pub fn filled(width: u32, height: u32, terrain: Terrain) -> Board {
        Board {
            width,
            height,
            tiles: vec![terrain; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn index(&self, pos: Pos) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn pos_of(&self, index: usize) -> Pos {
        let index = index as u32;
        Pos::new(index % self.width, index / self.width)
    }

    pub fn terrain(&self, pos: Pos) -> Option<Terrain> {
        self.index(pos).map(|i| self.tiles[i])
    }

    pub(crate) fn set(&mut self, pos: Pos, terrain: Terrain) {
        if let Some(i) = self.index(pos) {
            self.tiles[i] = terrain;
        }
    }

    /// Point reflection through the board centre.
    pub fn mirror(&self, pos: Pos) -> Pos {
        Pos::new(self.width - 1 - pos.x, self.height - 1 - pos.y)
    }

    pub fn count(&self, terrain: Terrain) -> usize {
        self.tiles.iter().filter(|&&t| t == terrain).count()
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.tiles.len()).map(|i| self.pos_of(i))
    }

    pub fn rows(&self) -> Vec<Vec<Terrain>> {
        self.tiles
            .chunks(self.width as usize)
            .map(|row| row.to_vec())
            .collect()
    }
}

impl From<Board> for Vec<Vec<Terrain>> {
    fn from(board: Board) -> Self {
        board.rows()
    }
}

impl TryFrom<Vec<Vec<Terrain>>> for Board {
    type Error = String;

    fn try_from(rows: Vec<Vec<Terrain>>) -> Result<Self, Self::Error> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return Err(format!("board rows must be non-empty and rectangular ({height} rows)"));
        }
        Ok(Board {
            width: width as u32,
            height: height as u32,
            tiles: rows.into_iter().flatten().collect(),
        })
    }
}

// ── Structures ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    #[serde(rename = "h")]
    Headquarters,
    #[serde(rename = "b")]
    Building,
    #[serde(rename = "t")]
    Tower,
}

impl StructureKind {
    pub fn code(self) -> char {
        match self {
            StructureKind::Headquarters => 'h',
            StructureKind::Building => 'b',
            StructureKind::Tower => 't',
        }
    }

    /// Capture points; a seize must wear these down to zero.
    pub fn max_hp(self) -> u32 {
        match self {
            StructureKind::Headquarters => 50,
            StructureKind::Building => 40,
            StructureKind::Tower => 30,
        }
    }

    /// Gold credited to the owner at the start of each of their turns.
    pub fn income(self) -> u32 {
        match self {
            StructureKind::Headquarters => 150,
            StructureKind::Building => 100,
            StructureKind::Tower => 50,
        }
    }

    pub fn produces_units(self) -> bool {
        matches!(self, StructureKind::Headquarters | StructureKind::Building)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub kind: StructureKind,
    pub pos: Pos,
    /// None = neutral.
    pub owner: Option<PlayerId>,
    pub hp: u32,
}

impl Structure {
    pub fn new(kind: StructureKind, pos: Pos, owner: Option<PlayerId>) -> Structure {
        Structure { kind, pos, owner, hp: kind.max_hp() }
    }
}

// ── Units ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    #[serde(rename = "W")]
    Warrior,
    #[serde(rename = "M")]
    Mage,
    #[serde(rename = "C")]
    Cavalry,
    #[serde(rename = "A")]
    Archer,
    #[serde(rename = "K")]
    Knight,
    #[serde(rename = "R")]
    Rogue,
    #[serde(rename = "S")]
    Siege,
    #[serde(rename = "B")]
    Balloon,
}

/// Rule-table constants for one unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStats {
    pub cost: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub movement: u32,
    pub min_range: u32,
    pub max_range: u32,
}

impl UnitType {
    pub const ALL: [UnitType; 8] = [
        UnitType::Warrior,
        UnitType::Mage,
        UnitType::Cavalry,
        UnitType::Archer,
        UnitType::Knight,
        UnitType::Rogue,
        UnitType::Siege,
        UnitType::Balloon,
    ];

    pub fn code(self) -> char {
        match self {
            UnitType::Warrior => 'W',
            UnitType::Mage => 'M',
            UnitType::Cavalry => 'C',
            UnitType::Archer => 'A',
            UnitType::Knight => 'K',
            UnitType::Rogue => 'R',
            UnitType::Siege => 'S',
            UnitType::Balloon => 'B',
        }
    }

    pub fn from_code(code: &str) -> Option<UnitType> {
        let mut chars = code.trim().chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        UnitType::ALL.into_iter().find(|u| u.code() == c)
    }

    pub fn stats(self) -> UnitStats {
        let (cost, max_hp, attack, defense, movement, min_range, max_range) = match self {
            UnitType::Warrior => (200, 15, 10, 6, 3, 1, 1),
            UnitType::Mage => (250, 10, 12, 3, 2, 1, 2),
            UnitType::Cavalry => (300, 14, 9, 5, 5, 1, 1),
            UnitType::Archer => (250, 12, 8, 3, 3, 2, 3),
            UnitType::Knight => (350, 20, 10, 8, 3, 1, 1),
            UnitType::Rogue => (300, 12, 11, 4, 4, 1, 1),
            UnitType::Siege => (400, 12, 14, 2, 2, 2, 3),
            UnitType::Balloon => (350, 10, 7, 2, 5, 1, 1),
        };
        UnitStats { cost, max_hp, attack, defense, movement, min_range, max_range }
    }

    pub fn cost(self) -> u32 {
        self.stats().cost
    }

    pub fn is_flying(self) -> bool {
        self == UnitType::Balloon
    }

    /// Is a target at this Manhattan distance inside the attack band?
    pub fn in_range(self, distance: u32) -> bool {
        let s = self.stats();
        (s.min_range..=s.max_range).contains(&distance)
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitType::Warrior => "Warrior",
            UnitType::Mage => "Mage",
            UnitType::Cavalry => "Cavalry",
            UnitType::Archer => "Archer",
            UnitType::Knight => "Knight",
            UnitType::Rogue => "Rogue",
            UnitType::Siege => "Siege",
            UnitType::Balloon => "Balloon",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub owner: PlayerId,
    pub pos: Pos,
    pub hp: u32,
    pub has_moved: bool,
    pub has_acted: bool,
}

// ── Statuses and outcomes ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayerStatus {
    Active,
    Inactive,
    Done,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlayerStatus::Active => "ACTIVE",
            PlayerStatus::Inactive => "INACTIVE",
            PlayerStatus::Done => "DONE",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryCause {
    HeadquartersCaptured,
    Forfeit(ForfeitReason),
}

/// How a finished episode ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Victory { winner: PlayerId, cause: VictoryCause },
    Draw,
}

impl Outcome {
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            Outcome::Victory { winner, .. } => Some(*winner),
            Outcome::Draw => None,
        }
    }

    /// Terminal rewards indexed by seat. Always (+1, -1), (-1, +1) or (0, 0).
    pub fn rewards(&self) -> [i8; 2] {
        match self.winner() {
            Some(PlayerId::P0) => [1, -1],
            Some(_) => [-1, 1],
            None => [0, 0],
        }
    }
}
