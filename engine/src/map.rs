// ═══════════════════════════════════════════════════════════════════════
// Map generation — seeded terrain field, cellular-automaton smoothing and
// point-symmetric structure placement.
//
// Every random roll is mirrored through the board centre, so seat 0 and
// seat 1 always see the same map from their side. A generation attempt is
// validated as a whole and re-rolled from a derived seed when it fails.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::{MapDefect, MapError};
use crate::navigation;
use crate::types::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

pub const MIN_DIMENSION: u32 = 8;
pub const MAX_DIMENSION: u32 = 64;
pub const MAX_ATTEMPTS: u32 = 32;
/// Allowed difference between the two headquarters' walking distance to the centre.
pub const FAIRNESS_TOLERANCE: u32 = 2;
pub const BUILDINGS_PER_PLAYER: usize = 2;

const OBSTACLE_DENSITY: f64 = 0.45;
const SMOOTHING_PASSES: usize = 3;
const RESEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Terrain plus initial structures. Structure order: HQ of seat 0, HQ of
/// seat 1, then buildings and towers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMap {
    pub board: Board,
    pub structures: Vec<Structure>,
}

impl GeneratedMap {
    pub fn headquarters(&self, player: PlayerId) -> Option<&Structure> {
        self.structures
            .iter()
            .find(|s| s.kind == StructureKind::Headquarters && s.owner == Some(player))
    }

    pub fn count(&self, kind: StructureKind) -> usize {
        self.structures.iter().filter(|s| s.kind == kind).count()
    }
}

/// Generate a map. Identical inputs always give an identical map.
pub fn generate(seed: u64, width: u32, height: u32) -> Result<GeneratedMap, MapError> {
    let dims = MIN_DIMENSION..=MAX_DIMENSION;
    if !dims.contains(&width) || !dims.contains(&height) {
        return Err(MapError::Dimensions {
            width,
            height,
            min: MIN_DIMENSION,
            max: MAX_DIMENSION,
        });
    }

    let mut attempt = 0;
    loop {
        let attempt_seed = seed.wrapping_add(u64::from(attempt).wrapping_mul(RESEED_STRIDE));
        match try_generate(attempt_seed, width, height) {
            Ok(map) => {
                tracing::debug!(
                    target: "tactics::mapgen",
                    seed,
                    attempt,
                    grass = map.board.count(Terrain::Grass),
                    "mapgen.accepted"
                );
                return Ok(map);
            }
            Err(defect) => {
                tracing::debug!(
                    target: "tactics::mapgen",
                    seed,
                    attempt,
                    defect = %defect,
                    "mapgen.attempt_rejected"
                );
                attempt += 1;
                if attempt >= MAX_ATTEMPTS {
                    return Err(MapError::Exhausted { seed, attempts: attempt, last: defect });
                }
            }
        }
    }
}

fn try_generate(seed: u64, width: u32, height: u32) -> Result<GeneratedMap, MapDefect> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut board = Board::filled(width, height, Terrain::Grass);
    let n = board.len();

    // Mirrored noise: cell i and cell n-1-i are point reflections.
    let mut obstacle = vec![false; n];
    for i in 0..n {
        let mirror = n - 1 - i;
        obstacle[i] = if mirror < i { obstacle[mirror] } else { rng.gen_bool(OBSTACLE_DENSITY) };
    }
    for _ in 0..SMOOTHING_PASSES {
        obstacle = smooth(&board, &obstacle);
    }
    classify_obstacles(&mut board, &obstacle, &mut rng);

    // Headquarters near the (w/5, h/5) anchor, jittered, at least one tile from the edge.
    let jitter = |rng: &mut ChaCha8Rng, v: u32, max: u32| -> u32 {
        (v + rng.gen_range(0..=2)).saturating_sub(1).clamp(1, max - 2)
    };
    let hq0 = Pos::new(jitter(&mut rng, width / 5, width), jitter(&mut rng, height / 5, height));
    let hq1 = board.mirror(hq0);
    for dy in 0..=2 {
        for dx in 0..=2 {
            let p = Pos::new(hq0.x + dx - 1, hq0.y + dy - 1);
            board.set(p, Terrain::Grass);
            board.set(board.mirror(p), Terrain::Grass);
        }
    }

    let mut structures = vec![
        Structure::new(StructureKind::Headquarters, hq0, Some(PlayerId::P0)),
        Structure::new(StructureKind::Headquarters, hq1, Some(PlayerId::P1)),
    ];

    // Buildings: shuffled grass cells 2..=3 tiles from the HQ, kept apart from each other.
    let mut sites: Vec<Pos> = board
        .positions()
        .filter(|&p| (2..=3).contains(&p.chebyshev(hq0)))
        .filter(|&p| board.terrain(p) == Some(Terrain::Grass))
        .filter(|&p| p.x > 0 && p.y > 0 && p.x < width - 1 && p.y < height - 1)
        .collect();
    sites.shuffle(&mut rng);
    let mut placed: Vec<Pos> = Vec::new();
    for site in sites {
        if placed.len() == BUILDINGS_PER_PLAYER {
            break;
        }
        let mirror = board.mirror(site);
        let taken = |p: Pos| structures.iter().any(|s| s.pos.chebyshev(p) < 2);
        if site.chebyshev(mirror) < 2
            || placed.iter().any(|q| q.chebyshev(site) < 2)
            || taken(site)
            || taken(mirror)
        {
            continue;
        }
        placed.push(site);
        structures.push(Structure::new(StructureKind::Building, site, Some(PlayerId::P0)));
        structures.push(Structure::new(StructureKind::Building, mirror, Some(PlayerId::P1)));
    }
    if placed.len() < BUILDINGS_PER_PLAYER {
        return Err(MapDefect::NoBuildingSite { player: PlayerId::P0, found: placed.len() });
    }

    // Towers: the free cell nearest the exact centre, and its mirror.
    let centre_rank = |p: Pos| {
        let dx = (2 * p.x).abs_diff(width - 1);
        let dy = (2 * p.y).abs_diff(height - 1);
        dx + dy
    };
    let tower = board
        .positions()
        .filter(|&p| !structures.iter().any(|s| s.pos.chebyshev(p) < 2))
        .min_by_key(|&p| (centre_rank(p), board.terrain(p) != Some(Terrain::Grass)))
        .ok_or(MapDefect::NoTower)?;
    for p in [tower, board.mirror(tower)] {
        if !structures.iter().any(|s| s.pos == p) {
            board.set(p, Terrain::Grass);
            structures.push(Structure::new(StructureKind::Tower, p, None));
        }
    }

    validate(&board, &structures)?;
    Ok(GeneratedMap { board, structures })
}

/// One cellular-automaton pass over the obstacle mask. Off-board counts as open.
fn smooth(board: &Board, obstacle: &[bool]) -> Vec<bool> {
    let (w, h) = (board.width() as i64, board.height() as i64);
    let mut next = obstacle.to_vec();
    for (i, cell) in next.iter_mut().enumerate() {
        let p = board.pos_of(i);
        let (x, y) = (i64::from(p.x), i64::from(p.y));
        let mut neighbours = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if (dx, dy) == (0, 0) || nx < 0 || ny < 0 || nx >= w || ny >= h {
                    continue;
                }
                if obstacle[(ny * w + nx) as usize] {
                    neighbours += 1;
                }
            }
        }
        if neighbours >= 5 {
            *cell = true;
        } else if neighbours <= 3 {
            *cell = false;
        }
    }
    next
}

/// Give each connected obstacle pocket one terrain kind. A pocket and its
/// mirror get the same kind; water pockets touching the edge become ocean.
fn classify_obstacles(board: &mut Board, obstacle: &[bool], rng: &mut ChaCha8Rng) {
    let n = board.len();
    let mut kind: Vec<Option<Terrain>> = vec![None; n];

    for start in 0..n {
        if !obstacle[start] || kind[start].is_some() {
            continue;
        }
        let terrain = match kind[n - 1 - start] {
            Some(t) => t,
            None => {
                let roll: f64 = rng.gen();
                if roll < 0.5 {
                    Terrain::Water
                } else if roll < 0.8 {
                    Terrain::Forest
                } else {
                    Terrain::Mountain
                }
            }
        };

        let mut pocket = vec![start];
        let mut queue = VecDeque::from([start]);
        kind[start] = Some(terrain);
        while let Some(i) = queue.pop_front() {
            for next in board.pos_of(i).neighbors() {
                let Some(ni) = board.index(next) else { continue };
                if obstacle[ni] && kind[ni].is_none() {
                    kind[ni] = Some(terrain);
                    pocket.push(ni);
                    queue.push_back(ni);
                }
            }
        }

        let on_edge = pocket.iter().any(|&i| {
            let p = board.pos_of(i);
            p.x == 0 || p.y == 0 || p.x == board.width() - 1 || p.y == board.height() - 1
        });
        let terrain = if terrain == Terrain::Water && on_edge { Terrain::Ocean } else { terrain };
        for i in pocket {
            board.set(board.pos_of(i), terrain);
        }
    }
}

fn validate(board: &Board, structures: &[Structure]) -> Result<(), MapDefect> {
    let hqs: Vec<&Structure> = structures
        .iter()
        .filter(|s| s.kind == StructureKind::Headquarters)
        .collect();
    if hqs.len() != 2 {
        return Err(MapDefect::HeadquartersCount(hqs.len()));
    }
    let count = |kind: StructureKind| structures.iter().filter(|s| s.kind == kind).count();
    let buildings = count(StructureKind::Building);
    if buildings < 2 * BUILDINGS_PER_PLAYER {
        return Err(MapDefect::BuildingCount { expected: 2 * BUILDINGS_PER_PLAYER, found: buildings });
    }
    if count(StructureKind::Tower) == 0 {
        return Err(MapDefect::NoTower);
    }

    let grass = board.count(Terrain::Grass);
    if grass * 2 <= board.len() {
        return Err(MapDefect::GrassMinority { grass, total: board.len() });
    }

    // Every structure must be walkable from seat 0's headquarters.
    let from_hq = navigation::distance_field(board, &[hqs[0].pos], Terrain::is_ground_passable);
    for s in structures {
        if board.index(s.pos).and_then(|i| from_hq[i]).is_none() {
            return Err(MapDefect::Unreachable(s.pos));
        }
    }

    let towers: Vec<Pos> = structures
        .iter()
        .filter(|s| s.kind == StructureKind::Tower)
        .map(|s| s.pos)
        .collect();
    let to_centre = navigation::distance_field(board, &towers, Terrain::is_ground_passable);
    let d = |p: Pos| board.index(p).and_then(|i| to_centre[i]).unwrap_or(u32::MAX);
    let (p0, p1) = (d(hqs[0].pos), d(hqs[1].pos));
    if p0.abs_diff(p1) > FAIRNESS_TOLERANCE {
        return Err(MapDefect::Unfair { p0, p1 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_rejects_missing_buildings_and_towers() {
        let map = generate(42, 20, 20).unwrap();
        assert_eq!(validate(&map.board, &map.structures), Ok(()));

        let no_towers: Vec<Structure> = map
            .structures
            .iter()
            .filter(|s| s.kind != StructureKind::Tower)
            .cloned()
            .collect();
        assert_eq!(validate(&map.board, &no_towers), Err(MapDefect::NoTower));

        let mut short = map.structures.clone();
        let last_building = short.iter().rposition(|s| s.kind == StructureKind::Building).unwrap();
        short.remove(last_building);
        assert_eq!(
            validate(&map.board, &short),
            Err(MapDefect::BuildingCount { expected: 4, found: 3 }),
        );
    }

    #[test]
    fn test_default_map_invariants() {
        let map = generate(42, 20, 20).unwrap();
        assert_eq!(map.count(StructureKind::Headquarters), 2);
        assert!(map.count(StructureKind::Building) >= 4);
        assert!(map.count(StructureKind::Tower) >= 1);
        assert!(map.board.count(Terrain::Grass) > 200);
        assert!(map.headquarters(PlayerId::P0).is_some());
        assert!(map.headquarters(PlayerId::P1).is_some());
    }

    #[test]
    fn test_same_seed_same_map() {
        assert_eq!(generate(123, 20, 20).unwrap(), generate(123, 20, 20).unwrap());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate(1, 20, 20).unwrap();
        let b = generate(2, 20, 20).unwrap();
        assert_ne!(a.board, b.board);
    }

    #[test]
    fn test_board_is_point_symmetric() {
        let map = generate(7, 20, 20).unwrap();
        for p in map.board.positions() {
            assert_eq!(map.board.terrain(p), map.board.terrain(map.board.mirror(p)));
        }
        let hq0 = map.headquarters(PlayerId::P0).unwrap().pos;
        let hq1 = map.headquarters(PlayerId::P1).unwrap().pos;
        assert_eq!(map.board.mirror(hq0), hq1);
    }

    #[test]
    fn test_towers_are_neutral_and_central() {
        let map = generate(42, 20, 20).unwrap();
        for t in map.structures.iter().filter(|s| s.kind == StructureKind::Tower) {
            assert_eq!(t.owner, None);
            assert!(t.pos.x.abs_diff(10) <= 4 && t.pos.y.abs_diff(10) <= 4, "tower at {}", t.pos);
        }
    }

    #[test]
    fn test_buildings_near_own_headquarters() {
        let map = generate(42, 20, 20).unwrap();
        for player in PlayerId::ALL {
            let hq = map.headquarters(player).unwrap().pos;
            let own: Vec<_> = map
                .structures
                .iter()
                .filter(|s| s.kind == StructureKind::Building && s.owner == Some(player))
                .collect();
            assert_eq!(own.len(), BUILDINGS_PER_PLAYER);
            assert!(own.iter().all(|b| b.pos.chebyshev(hq) <= 3));
        }
    }

    #[test]
    fn test_structures_stand_on_grass() {
        let map = generate(99, 20, 20).unwrap();
        for s in &map.structures {
            assert_eq!(map.board.terrain(s.pos), Some(Terrain::Grass));
        }
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(matches!(generate(1, 4, 20), Err(MapError::Dimensions { .. })));
        assert!(matches!(generate(1, 20, 100), Err(MapError::Dimensions { .. })));
    }

    #[test]
    fn test_smallest_and_rectangular_boards() {
        let small = generate(5, MIN_DIMENSION, MIN_DIMENSION).unwrap();
        assert_eq!(small.count(StructureKind::Headquarters), 2);
        let wide = generate(5, 32, 12).unwrap();
        assert_eq!(wide.board.width(), 32);
        assert_eq!(wide.board.height(), 12);
        assert!(wide.board.count(Terrain::Grass) * 2 > wide.board.len());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_generated_maps_hold_invariants(seed in any::<u64>()) {
            let map = generate(seed, 20, 20).unwrap();
            prop_assert_eq!(map.count(StructureKind::Headquarters), 2);
            prop_assert!(map.count(StructureKind::Building) >= 4);
            prop_assert!(map.count(StructureKind::Tower) >= 1);
            prop_assert!(map.board.count(Terrain::Grass) * 2 > map.board.len());
        }

        #[test]
        fn prop_generation_is_deterministic(seed in any::<u64>()) {
            prop_assert_eq!(generate(seed, 16, 16).unwrap(), generate(seed, 16, 16).unwrap());
        }
    }
}
