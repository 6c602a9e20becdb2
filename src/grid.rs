use std::{fmt, ops};

use ndarray::{Array, Array2};
use serde::{Deserialize, Serialize};

use crate::coord::{Coord, NUM_COLS, NUM_ROWS};
use crate::force::Force;
use crate::piece::{PieceKind, PieceOnBoard, piece_to_ascii};


#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    data: Array2<Option<PieceOnBoard>>,
}

impl Grid {
    pub fn new() -> Self {
        Grid {
            data: Array::from_elem((NUM_ROWS as usize, NUM_COLS as usize), None),
        }
    }

    // Returns `None` both for empty squares and for coords outside the board.
    pub fn get(&self, pos: Coord) -> Option<PieceOnBoard> {
        if pos.is_on_board() { self[pos] } else { None }
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Coord, PieceOnBoard)> + '_ {
        Coord::all().filter_map(|pos| self[pos].map(|piece| (pos, piece)))
    }

    pub fn find_king(&self, force: Force) -> Option<Coord> {
        self.pieces()
            .find(|(_, piece)| piece.kind == PieceKind::King && piece.force == force)
            .map(|(pos, _)| pos)
    }
}

impl ops::Index<Coord> for Grid {
    type Output = Option<PieceOnBoard>;
    #[track_caller]
    fn index(&self, pos: Coord) -> &Self::Output {
        self.data
            .get(coord_to_index(pos))
            .unwrap_or_else(|| panic!("{}", out_of_bound_message(pos)))
    }
}

impl ops::IndexMut<Coord> for Grid {
    #[track_caller]
    fn index_mut(&mut self, pos: Coord) -> &mut Self::Output {
        self.data
            .get_mut(coord_to_index(pos))
            .unwrap_or_else(|| panic!("{}", out_of_bound_message(pos)))
    }
}

fn coord_to_index(pos: Coord) -> [usize; 2] {
    // Negative indices wrap around to huge values and are rejected by `Array2::get`.
    [
        pos.row.to_zero_based() as usize,
        pos.col.to_zero_based() as usize,
    ]
}

fn out_of_bound_message(pos: Coord) -> String {
    format!(
        "Coord ({}, {}) is out of bound for {}x{} board",
        pos.row.to_zero_based(),
        pos.col.to_zero_based(),
        NUM_ROWS,
        NUM_COLS
    )
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid ")?;
        f.debug_map()
            .entries(self.pieces().map(|(pos, piece)| (pos.to_algebraic(), piece_to_ascii(piece))))
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Col, Row};

    #[test]
    fn get_outside_board() {
        let mut g = Grid::new();
        g[Coord::A1] = Some(PieceOnBoard::new(PieceKind::Rook, Force::White));
        assert_eq!(g.get(Coord::A1).unwrap().kind, PieceKind::Rook);
        assert_eq!(g.get(Coord::new(Row::from_zero_based(-1), Col::from_zero_based(0))), None);
        assert_eq!(g.get(Coord::new(Row::from_zero_based(0), Col::from_zero_based(8))), None);
    }

    #[test]
    fn find_king() {
        let mut g = Grid::new();
        g[Coord::E8] = Some(PieceOnBoard::new(PieceKind::King, Force::Black));
        assert_eq!(g.find_king(Force::Black), Some(Coord::E8));
        assert_eq!(g.find_king(Force::White), None);
    }
}
