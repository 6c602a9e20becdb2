// Helpers shared by integration tests. Each test binary uses a different subset, hence
// `#[allow(dead_code)]` on public items.

use chess_relay::coord::{Col, Coord, Row};
use chess_relay::force::Force;
use chess_relay::grid::Grid;
use chess_relay::piece::{PieceKind, PieceOnBoard, piece_from_ascii};
use chess_relay::util::as_single_char;
use itertools::Itertools;


#[allow(dead_code)]
#[derive(Clone, Copy, Debug)]
pub struct PieceMatcher {
    pub kind: PieceKind,
    pub force: Force,
}

#[allow(dead_code)]
pub trait PieceIs {
    fn is(self, matcher: PieceMatcher) -> bool;
}

impl PieceIs for Option<PieceOnBoard> {
    fn is(self, matcher: PieceMatcher) -> bool {
        if let Some(piece) = self {
            piece.kind == matcher.kind && piece.force == matcher.force
        } else {
            false
        }
    }
}

#[macro_export]
macro_rules! piece {
    ($force:ident $kind:ident) => {
        common::PieceMatcher {
            force: chess_relay::force::Force::$force,
            kind: chess_relay::piece::PieceKind::$kind,
        }
    };
}

// Parses a diagram with White at the bottom, e.g.
//   r n b q k b n r
//   p p p p . p p p
//   . . . . . . . .
// ...
#[allow(dead_code)]
pub fn parse_grid(board_str: &str) -> Result<Grid, String> {
    let rows = board_str
        .split('\n')
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.split_ascii_whitespace().collect_vec())
        .collect_vec();
    assert_eq!(rows.len(), 8);
    assert!(rows.iter().all(|row| row.len() == 8));
    let mut grid = Grid::new();
    for (row_idx, row) in rows.iter().rev().enumerate() {
        for (col_idx, piece_str) in row.iter().enumerate() {
            let piece_char =
                as_single_char(piece_str).ok_or_else(|| format!("Invalid piece: {}", piece_str))?;
            let coord = Coord::new(
                Row::from_zero_based(row_idx as i8),
                Col::from_zero_based(col_idx as i8),
            );
            grid[coord] = if piece_char == '.' {
                None
            } else {
                Some(
                    piece_from_ascii(piece_char)
                        .ok_or_else(|| format!("Invalid piece: {}", piece_char))?,
                )
            };
        }
    }
    Ok(grid)
}


#[cfg(test)]
mod tests {
    use chess_relay::board::Board;
    use chess_relay::test_util::replay_log;

    use super::*;

    #[test]
    fn parse_grid_opening() {
        let grid = parse_grid(
            "
            r n b q k b n r
            p p p . p p p p
            . . . . . . . .
            . . . p . . . .
            . . . . P . . .
            . . . . . . . .
            P P P P . P P P
            R N B Q K B N R
        ",
        )
        .unwrap();
        let mut board = Board::new();
        replay_log(&mut board, "e2e4 d7d5").unwrap();
        assert_eq!(&grid, board.grid());
    }
}
