// Forsyth-Edwards Notation. This is the canonical board snapshot the server broadcasts
// after every accepted move.

use enum_map::enum_map;
use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::board::{Board, BoardSetup, CastlingRights};
use crate::coord::{Col, Coord, NUM_COLS, NUM_ROWS, Row, SubjectiveRow};
use crate::force::Force;
use crate::grid::Grid;
use crate::piece::{CastleDirection, PieceKind, PieceOnBoard, piece_from_ascii, piece_to_ascii};
use crate::util::as_single_char;


fn castling_right_to_fen(force: Force, dir: CastleDirection) -> char {
    let ch = match dir {
        CastleDirection::HSide => 'k',
        CastleDirection::ASide => 'q',
    };
    match force {
        Force::White => ch.to_ascii_uppercase(),
        Force::Black => ch,
    }
}

fn castling_rights_to_fen(castling_rights: &CastlingRights) -> String {
    let mut s = String::new();
    for force in Force::iter() {
        // FEN lists king side first: "KQkq".
        for dir in [CastleDirection::HSide, CastleDirection::ASide] {
            if castling_rights[force][dir] {
                s.push(castling_right_to_fen(force, dir));
            }
        }
    }
    if s.is_empty() { "-".to_owned() } else { s }
}

fn castling_rights_from_fen(grid: &Grid, s: &str) -> Result<CastlingRights, String> {
    let mut castling_rights = enum_map! { _ => enum_map! { _ => false } };
    if s == "-" {
        return Ok(castling_rights);
    }
    for ch in s.chars() {
        let (force, dir) = Force::iter()
            .cartesian_product(CastleDirection::iter())
            .find(|&(force, dir)| castling_right_to_fen(force, dir) == ch)
            .ok_or_else(|| format!("invalid castling right: {}", ch))?;
        if castling_rights[force][dir] {
            return Err(format!("duplicate castling right: {}", ch));
        }
        let home_row = SubjectiveRow::first().to_row(force);
        let rook_col = match dir {
            CastleDirection::ASide => Col::A,
            CastleDirection::HSide => Col::H,
        };
        if grid[Coord::new(home_row, Col::E)] != Some(PieceOnBoard::new(PieceKind::King, force)) {
            return Err(format!("castling right {} without king on home square", ch));
        }
        if grid[Coord::new(home_row, rook_col)] != Some(PieceOnBoard::new(PieceKind::Rook, force))
        {
            return Err(format!("castling right {} without rook on home square", ch));
        }
        castling_rights[force][dir] = true;
    }
    Ok(castling_rights)
}

fn en_passant_target_to_fen(en_passant_target: Option<Coord>) -> String {
    match en_passant_target {
        None => "-".to_owned(),
        Some(pos) => pos.to_algebraic(),
    }
}

fn en_passant_target_from_fen(s: &str, active_force: Force) -> Result<Option<Coord>, String> {
    if s == "-" {
        return Ok(None);
    }
    let pos = Coord::from_algebraic(s).ok_or_else(|| format!("invalid en passant target: {}", s))?;
    // The target is the square the opponent's pawn skipped over.
    let expected_row = SubjectiveRow::from_one_based(3).to_row(active_force.opponent());
    if pos.row != expected_row {
        return Err(format!("en passant target on wrong row: {}", s));
    }
    Ok(Some(pos))
}

fn grid_to_fen(grid: &Grid) -> String {
    Row::all()
        .rev()
        .map(|row| {
            let mut row_notation = String::new();
            let mut empty_col_count: u8 = 0;
            for col in Col::all() {
                if let Some(piece) = grid[Coord::new(row, col)] {
                    if empty_col_count > 0 {
                        row_notation.push_str(&empty_col_count.to_string());
                        empty_col_count = 0;
                    }
                    row_notation.push(piece_to_ascii(piece));
                } else {
                    empty_col_count += 1;
                }
            }
            if empty_col_count > 0 {
                row_notation.push_str(&empty_col_count.to_string());
            }
            row_notation
        })
        .join("/")
}

fn grid_from_fen(notation: &str) -> Result<Grid, String> {
    let mut grid = Grid::new();
    let rows = notation.split('/').collect_vec();
    if rows.len() != NUM_ROWS as usize {
        return Err(format!("has {} rows, expected {}", rows.len(), NUM_ROWS));
    }
    for (row, row_notation) in Row::all().rev().zip(rows) {
        let mut col = 0;
        for ch in row_notation.chars() {
            if let Some(n) = ch.to_digit(10) {
                if !(1..=8).contains(&n) {
                    return Err(format!("invalid empty square count: {}", ch));
                }
                if col + n as i8 > NUM_COLS {
                    return Err(format!("row {} is too long", row.to_algebraic()));
                }
                col += n as i8;
            } else if let Some(piece) = piece_from_ascii(ch) {
                if col >= NUM_COLS {
                    return Err(format!("row {} is too long", row.to_algebraic()));
                }
                if piece.kind == PieceKind::Pawn
                    && (row == Row::from_zero_based(0) || row == Row::from_zero_based(NUM_ROWS - 1))
                {
                    return Err(format!("pawn on row {}", row.to_algebraic()));
                }
                grid[Coord::new(row, Col::from_zero_based(col))] = Some(piece);
                col += 1;
            } else {
                return Err(format!("unknown piece: {}", ch));
            }
        }
        if col != NUM_COLS {
            return Err(format!(
                "row {} has {} columns, expected {}",
                row.to_algebraic(),
                col,
                NUM_COLS
            ));
        }
    }
    for force in Force::iter() {
        let num_kings = grid
            .pieces()
            .filter(|(_, piece)| *piece == PieceOnBoard::new(PieceKind::King, force))
            .count();
        if num_kings != 1 {
            return Err(format!("{:?} has {} kings, expected 1", force, num_kings));
        }
    }
    Ok(grid)
}

pub fn board_to_fen(board: &Board) -> String {
    format!(
        "{} {} {} {} {} {}",
        grid_to_fen(board.grid()),
        board.active_force().to_fen(),
        castling_rights_to_fen(board.castling_rights()),
        en_passant_target_to_fen(board.en_passant_target()),
        board.half_move_clock(),
        board.full_move_number()
    )
}

pub fn fen_to_board_setup(fen: &str) -> Result<BoardSetup, String> {
    let (
        grid_notation,
        active_force_notation,
        castling_notation,
        en_passant_target_notation,
        half_move_clock,
        full_move_number,
    ) = fen
        .split_whitespace()
        .collect_tuple()
        .ok_or_else(|| format!("invalid FEN: {fen}"))?;

    let grid = grid_from_fen(grid_notation).map_err(|err| format!("invalid FEN: {err}"))?;
    let active_force = as_single_char(active_force_notation)
        .and_then(Force::from_fen)
        .ok_or_else(|| format!("invalid force: {}", active_force_notation))?;
    let castling_rights = castling_rights_from_fen(&grid, castling_notation)?;
    let en_passant_target = en_passant_target_from_fen(en_passant_target_notation, active_force)?;
    let half_move_clock = half_move_clock
        .parse::<u32>()
        .map_err(|_| format!("invalid half-move clock: {}", half_move_clock))?;
    let full_move_number = full_move_number
        .parse::<u32>()
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| format!("invalid full move number: {}", full_move_number))?;

    Ok(BoardSetup {
        grid,
        active_force,
        castling_rights,
        en_passant_target,
        half_move_clock,
        full_move_number,
    })
}

pub fn fen_to_board(fen: &str) -> Result<Board, String> {
    fen_to_board_setup(fen).map(Board::from_setup)
}


#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn starting_position() {
        assert_eq!(board_to_fen(&Board::new()), START_FEN);
        assert_eq!(fen_to_board_setup(START_FEN).unwrap(), BoardSetup::classic());
    }

    #[test]
    fn round_trip() {
        for fen in [
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
            "r3k2r/8/8/8/8/8/8/R3K2R b Kq - 17 40",
            "8/8/8/3k4/8/8/8/4K3 w - - 0 1",
        ] {
            assert_eq!(board_to_fen(&fen_to_board(fen).unwrap()), fen);
        }
    }

    #[test]
    fn rejects_malformed() {
        for fen in [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1BNR w kq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e4 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN1 w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0",
            "pnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQk - 0 1",
            "rnbqkbnr/pppppppp/44/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        ] {
            assert!(fen_to_board_setup(fen).is_err(), "{fen}");
        }
        for run in [17, 33] {
            let fen = format!("{}/8/8/8/8/8/8/K6k w - - 0 1", "8".repeat(run));
            assert!(fen_to_board_setup(&fen).is_err(), "{fen}");
        }
    }
}
