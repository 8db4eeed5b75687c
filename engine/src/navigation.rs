// ═══════════════════════════════════════════════════════════════════════
// Navigation — movement costs, reachable cells and distance fields
// ═══════════════════════════════════════════════════════════════════════

use crate::types::*;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

/// What stands on a cell, seen from the moving unit's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Empty,
    Friendly,
    Enemy,
}

/// Movement points a unit spends to enter a tile. None = cannot enter.
pub fn entry_cost(unit: UnitType, terrain: Terrain) -> Option<u32> {
    if unit.is_flying() {
        return Some(1);
    }
    match (unit, terrain) {
        (UnitType::Cavalry, Terrain::Mountain) => None,
        _ => terrain.ground_cost(),
    }
}

/// All cells a unit starting at `from` may end its move on, in row-major order.
/// Friendly units can be passed through but not stopped on; enemy units block.
pub fn reachable(
    board: &Board,
    from: Pos,
    unit: UnitType,
    occupant: impl Fn(Pos) -> Occupant,
) -> Vec<Pos> {
    let Some(start) = board.index(from) else {
        return Vec::new();
    };
    let budget = unit.stats().movement;
    let mut best: Vec<Option<u32>> = vec![None; board.len()];
    best[start] = Some(0);

    let mut frontier = BinaryHeap::new();
    frontier.push(Reverse((0u32, start)));

    while let Some(Reverse((spent, index))) = frontier.pop() {
        if best[index].is_some_and(|b| b < spent) {
            continue;
        }
        for next in board.pos_of(index).neighbors() {
            let Some(next_index) = board.index(next) else {
                continue;
            };
            let Some(cost) = board.terrain(next).and_then(|t| entry_cost(unit, t)) else {
                continue;
            };
            if occupant(next) == Occupant::Enemy {
                continue;
            }
            let total = spent + cost;
            if total > budget || best[next_index].is_some_and(|b| b <= total) {
                continue;
            }
            best[next_index] = Some(total);
            frontier.push(Reverse((total, next_index)));
        }
    }

    best.iter()
        .enumerate()
        .filter(|&(i, b)| b.is_some() && i != start)
        .map(|(i, _)| board.pos_of(i))
        .filter(|&p| occupant(p) == Occupant::Empty)
        .collect()
}

/// Breadth-first step distance from every cell to the nearest target.
/// Target cells count as reachable even when `passable` rejects them.
pub fn distance_field(
    board: &Board,
    targets: &[Pos],
    passable: impl Fn(Terrain) -> bool,
) -> Vec<Option<u32>> {
    let mut dist: Vec<Option<u32>> = vec![None; board.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();

    for &t in targets {
        if let Some(i) = board.index(t) {
            if dist[i].is_none() {
                dist[i] = Some(0);
                queue.push_back(i);
            }
        }
    }

    while let Some(current) = queue.pop_front() {
        let d = dist[current].unwrap_or(0);
        for next in board.pos_of(current).neighbors() {
            let Some(ni) = board.index(next) else {
                continue;
            };
            if dist[ni].is_some() || !board.terrain(next).is_some_and(&passable) {
                continue;
            }
            dist[ni] = Some(d + 1);
            queue.push_back(ni);
        }
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_board() -> Board {
        Board::filled(8, 8, Terrain::Grass)
    }

    #[test]
    fn test_reachable_on_open_grass_is_a_diamond() {
        let board = open_board();
        let cells = reachable(&board, Pos::new(4, 4), UnitType::Warrior, |_| Occupant::Empty);
        // movement 3 on grass: every cell with 1 <= manhattan <= 3
        let expected = board
            .positions()
            .filter(|p| (1..=3).contains(&p.manhattan(Pos::new(4, 4))))
            .count();
        assert_eq!(cells.len(), expected);
        assert!(!cells.contains(&Pos::new(4, 4)));
    }

    #[test]
    fn test_water_blocks_walkers_not_balloons() {
        let mut board = open_board();
        for y in 0..8 {
            board.set(Pos::new(3, y), Terrain::Water);
        }
        let walker = reachable(&board, Pos::new(2, 2), UnitType::Warrior, |_| Occupant::Empty);
        assert!(walker.iter().all(|p| p.x < 3));

        let flyer = reachable(&board, Pos::new(2, 2), UnitType::Balloon, |_| Occupant::Empty);
        assert!(flyer.contains(&Pos::new(4, 2)));
        assert!(flyer.contains(&Pos::new(3, 2)));
    }

    #[test]
    fn test_forest_costs_two() {
        let mut board = open_board();
        board.set(Pos::new(1, 0), Terrain::Forest);
        // Mage has movement 2: forest consumes it entirely
        let cells = reachable(&board, Pos::new(0, 0), UnitType::Mage, |_| Occupant::Empty);
        assert!(cells.contains(&Pos::new(1, 0)));
        assert!(!cells.contains(&Pos::new(2, 0)));
        assert!(cells.contains(&Pos::new(1, 1)));
    }

    #[test]
    fn test_cavalry_avoids_mountains() {
        let mut board = open_board();
        board.set(Pos::new(1, 0), Terrain::Mountain);
        assert_eq!(entry_cost(UnitType::Cavalry, Terrain::Mountain), None);
        assert_eq!(entry_cost(UnitType::Knight, Terrain::Mountain), Some(3));
        let cells = reachable(&board, Pos::new(0, 0), UnitType::Cavalry, |_| Occupant::Empty);
        assert!(!cells.contains(&Pos::new(1, 0)));
    }

    #[test]
    fn test_pass_through_friends_but_not_enemies() {
        let board = open_board();
        let friend = Pos::new(1, 0);
        let cells = reachable(&board, Pos::new(0, 0), UnitType::Warrior, |p| {
            if p == friend { Occupant::Friendly } else { Occupant::Empty }
        });
        assert!(!cells.contains(&friend));
        assert!(cells.contains(&Pos::new(2, 0)));

        let narrow = {
            let mut b = open_board();
            for x in 0..8 {
                if x != 0 {
                    b.set(Pos::new(x, 1), Terrain::Water);
                }
            }
            b
        };
        let enemy = Pos::new(0, 1);
        let blocked = reachable(&narrow, Pos::new(0, 0), UnitType::Warrior, |p| {
            if p == enemy { Occupant::Enemy } else { Occupant::Empty }
        });
        assert!(blocked.iter().all(|p| p.y == 0));
    }

    #[test]
    fn test_distance_field_multi_source() {
        let board = open_board();
        let dist = distance_field(&board, &[Pos::new(0, 0), Pos::new(7, 7)], Terrain::is_ground_passable);
        assert_eq!(dist[board.index(Pos::new(0, 0)).unwrap()], Some(0));
        assert_eq!(dist[board.index(Pos::new(3, 0)).unwrap()], Some(3));
        assert_eq!(dist[board.index(Pos::new(6, 7)).unwrap()], Some(1));
    }
}
