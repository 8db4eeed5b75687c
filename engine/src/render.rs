// ═══════════════════════════════════════════════════════════════════════
// Text renderer — a header line plus one row of glyphs per board line.
//
//   units       uppercase code for P1, lowercase for P2
//   structures  H / B / T, lowercase when owned by P2
//   terrain     . grass   " forest   ^ mountain   ~ water   = ocean
// ═══════════════════════════════════════════════════════════════════════

use crate::state::GameState;
use crate::types::*;
use std::fmt::Write;

const RESET: &str = "\x1b[0m";
const P1_COLOUR: &str = "\x1b[34m";
const P2_COLOUR: &str = "\x1b[31m";
const NEUTRAL_COLOUR: &str = "\x1b[90m";

pub fn render_text(state: &GameState, ansi: bool) -> String {
    let mut out = String::new();
    let gold = state.golds();
    let _ = writeln!(
        out,
        "Turn {} | Step {} | P1 Gold: {} | P2 Gold: {}",
        state.turn_number(),
        state.step_count(),
        gold[0],
        gold[1],
    );

    let board = state.board();
    for y in 0..board.height() {
        for x in 0..board.width() {
            let pos = Pos::new(x, y);
            let (glyph, owner) = glyph_at(state, pos);
            match (ansi, owner) {
                (false, _) | (true, Owner::None) => out.push(glyph),
                (true, owner) => {
                    let colour = match owner {
                        Owner::Seat(PlayerId::P0) => P1_COLOUR,
                        Owner::Seat(_) => P2_COLOUR,
                        _ => NEUTRAL_COLOUR,
                    };
                    let _ = write!(out, "{colour}{glyph}{RESET}");
                }
            }
        }
        out.push('\n');
    }

    if let Some(outcome) = state.outcome() {
        let _ = match outcome.winner() {
            Some(winner) => writeln!(out, "Winner: {winner}"),
            None => writeln!(out, "Draw"),
        };
    }
    out
}

enum Owner {
    None,
    Neutral,
    Seat(PlayerId),
}

fn glyph_at(state: &GameState, pos: Pos) -> (char, Owner) {
    if let Some(unit) = state.unit_at(pos) {
        let code = unit.unit_type.code();
        let glyph = if unit.owner == PlayerId::P0 { code } else { code.to_ascii_lowercase() };
        return (glyph, Owner::Seat(unit.owner));
    }
    if let Some(s) = state.structure_at(pos) {
        let code = s.kind.code().to_ascii_uppercase();
        return match s.owner {
            Some(PlayerId::P0) => (code, Owner::Seat(PlayerId::P0)),
            Some(owner) => (code.to_ascii_lowercase(), Owner::Seat(owner)),
            None => (code, Owner::Neutral),
        };
    }
    let glyph = match state.board().terrain(pos) {
        Some(Terrain::Grass) | None => '.',
        Some(Terrain::Forest) => '"',
        Some(Terrain::Mountain) => '^',
        Some(Terrain::Water) => '~',
        Some(Terrain::Ocean) => '=',
    };
    (glyph, Owner::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::setup::create_initial_state;

    #[test]
    fn test_header_and_rows() {
        let state = create_initial_state(&Config::default()).unwrap();
        let text = render_text(&state, false);
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("Turn"));
        assert!(header.contains("P1 Gold: 250"));
        assert!(header.contains("P2 Gold: 250"));
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 20);
        assert!(rows.iter().all(|r| r.chars().count() == 20));
        assert!(text.contains('H') && text.contains('h'));
    }

    #[test]
    fn test_ansi_mode_colours_owned_glyphs() {
        let state = create_initial_state(&Config::default()).unwrap();
        let text = render_text(&state, true);
        assert!(text.contains(P1_COLOUR));
        assert!(text.contains(P2_COLOUR));
        assert!(text.starts_with("Turn 0 | Step 0"));
    }
}
