use std::fmt;
use std::ops;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::force::Force;


pub const NUM_ROWS: i8 = 8;
pub const NUM_COLS: i8 = 8;


// Row from a force's point of view: first row is where the force's king starts.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct SubjectiveRow {
    idx: i8, // 0-based
}

impl SubjectiveRow {
    pub const fn from_one_based(idx: i8) -> Self { Self { idx: idx - 1 } }
    pub const fn first() -> Self { Self::from_one_based(1) }
    pub const fn last() -> Self { Self::from_one_based(NUM_ROWS) }
    pub fn to_row(self, force: Force) -> Row {
        match force {
            Force::White => Row::from_zero_based(self.idx),
            Force::Black => Row::from_zero_based(NUM_ROWS - self.idx - 1),
        }
    }
}


// Rows and columns may temporarily point outside the board while walking a trajectory;
// use `Coord::is_on_board` before indexing.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Row {
    idx: i8, // 0-based
}

impl Row {
    pub const fn from_zero_based(idx: i8) -> Self { Self { idx } }
    pub fn from_algebraic(ch: char) -> Option<Self> {
        ('1'..='8')
            .contains(&ch)
            .then(|| Self::from_zero_based((ch as u8 - b'1') as i8))
    }
    pub const fn to_zero_based(self) -> i8 { self.idx }
    pub fn to_algebraic(self) -> char { (self.idx as u8 + b'1') as char }
    pub fn is_on_board(self) -> bool { (0..NUM_ROWS).contains(&self.idx) }
    pub fn all() -> impl DoubleEndedIterator<Item = Self> + Clone {
        (0..NUM_ROWS).map(Self::from_zero_based)
    }
}

impl ops::Add<i8> for Row {
    type Output = Self;
    fn add(self, other: i8) -> Self::Output { Self::from_zero_based(self.idx + other) }
}

impl ops::Sub for Row {
    type Output = i8;
    fn sub(self, other: Self) -> Self::Output { self.idx - other.idx }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row({})", self.idx + 1)
    }
}


#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Col {
    idx: i8, // 0-based
}

impl Col {
    pub const fn from_zero_based(idx: i8) -> Self { Self { idx } }
    pub fn from_algebraic(ch: char) -> Option<Self> {
        ('a'..='h')
            .contains(&ch)
            .then(|| Self::from_zero_based((ch as u8 - b'a') as i8))
    }
    pub const fn to_zero_based(self) -> i8 { self.idx }
    pub fn to_algebraic(self) -> char { (self.idx as u8 + b'a') as char }
    pub fn is_on_board(self) -> bool { (0..NUM_COLS).contains(&self.idx) }
    pub fn all() -> impl DoubleEndedIterator<Item = Self> + Clone {
        (0..NUM_COLS).map(Self::from_zero_based)
    }
}

impl Col {
    pub const A: Col = Col::from_zero_based(0);
    pub const C: Col = Col::from_zero_based(2);
    pub const D: Col = Col::from_zero_based(3);
    pub const E: Col = Col::from_zero_based(4);
    pub const F: Col = Col::from_zero_based(5);
    pub const G: Col = Col::from_zero_based(6);
    pub const H: Col = Col::from_zero_based(7);
}

impl ops::Add<i8> for Col {
    type Output = Self;
    fn add(self, other: i8) -> Self::Output { Self::from_zero_based(self.idx + other) }
}

impl ops::Sub for Col {
    type Output = i8;
    fn sub(self, other: Self) -> Self::Output { self.idx - other.idx }
}

impl fmt::Debug for Col {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Col({})", (self.idx as u8 + b'a') as char)
    }
}


#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: Row,
    pub col: Col,
}

impl Coord {
    pub const fn new(row: Row, col: Col) -> Self { Self { row, col } }

    // Accepts exactly a file letter followed by a rank digit, e.g. "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let (col, row) = s.chars().collect_tuple()?;
        Some(Coord {
            row: Row::from_algebraic(row)?,
            col: Col::from_algebraic(col)?,
        })
    }
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.col.to_algebraic(), self.row.to_algebraic())
    }

    pub fn is_on_board(self) -> bool { self.row.is_on_board() && self.col.is_on_board() }

    pub fn all() -> impl Iterator<Item = Coord> + Clone {
        Row::all().cartesian_product(Col::all()).map(|(row, col)| Coord { row, col })
    }
}

impl ops::Add<(i8, i8)> for Coord {
    type Output = Self;
    fn add(self, other: (i8, i8)) -> Self::Output {
        Self { row: self.row + other.0, col: self.col + other.1 }
    }
}

impl ops::Sub for Coord {
    type Output = (i8, i8);
    fn sub(self, other: Self) -> Self::Output { (self.row - other.row, self.col - other.col) }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_on_board() {
            write!(f, "Coord({})", self.to_algebraic())
        } else {
            write!(f, "Coord({}, {})", self.row.idx, self.col.idx)
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

macro_rules! named_squares {
    ($($name:ident = $row:literal, $col:literal;)*) => {
        impl Coord {
            $(
                pub const $name: Coord =
                    Coord::new(Row::from_zero_based($row), Col::from_zero_based($col));
            )*
        }
    };
}

named_squares! {
    A1 = 0, 0; B1 = 0, 1; C1 = 0, 2; D1 = 0, 3; E1 = 0, 4; F1 = 0, 5; G1 = 0, 6; H1 = 0, 7;
    A2 = 1, 0; B2 = 1, 1; C2 = 1, 2; D2 = 1, 3; E2 = 1, 4; F2 = 1, 5; G2 = 1, 6; H2 = 1, 7;
    A3 = 2, 0; B3 = 2, 1; C3 = 2, 2; D3 = 2, 3; E3 = 2, 4; F3 = 2, 5; G3 = 2, 6; H3 = 2, 7;
    A4 = 3, 0; B4 = 3, 1; C4 = 3, 2; D4 = 3, 3; E4 = 3, 4; F4 = 3, 5; G4 = 3, 6; H4 = 3, 7;
    A5 = 4, 0; B5 = 4, 1; C5 = 4, 2; D5 = 4, 3; E5 = 4, 4; F5 = 4, 5; G5 = 4, 6; H5 = 4, 7;
    A6 = 5, 0; B6 = 5, 1; C6 = 5, 2; D6 = 5, 3; E6 = 5, 4; F6 = 5, 5; G6 = 5, 6; H6 = 5, 7;
    A7 = 6, 0; B7 = 6, 1; C7 = 6, 2; D7 = 6, 3; E7 = 6, 4; F7 = 6, 5; G7 = 6, 6; H7 = 6, 7;
    A8 = 7, 0; B8 = 7, 1; C8 = 7, 2; D8 = 7, 3; E8 = 7, 4; F8 = 7, 5; G8 = 7, 6; H8 = 7, 7;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algebraic() {
        assert_eq!(Coord::from_algebraic("e4"), Some(Coord::E4));
        assert_eq!(Coord::from_algebraic("a1"), Some(Coord::A1));
        assert_eq!(Coord::from_algebraic("h8"), Some(Coord::H8));
        assert_eq!(Coord::E2.to_algebraic(), "e2");
    }

    #[test]
    fn malformed_algebraic() {
        assert_eq!(Coord::from_algebraic("z9"), None);
        assert_eq!(Coord::from_algebraic("i1"), None);
        assert_eq!(Coord::from_algebraic("a0"), None);
        assert_eq!(Coord::from_algebraic("a9"), None);
        assert_eq!(Coord::from_algebraic("E4"), None);
        assert_eq!(Coord::from_algebraic("e"), None);
        assert_eq!(Coord::from_algebraic("e44"), None);
        assert_eq!(Coord::from_algebraic(""), None);
    }

    #[test]
    fn subjective_row() {
        assert_eq!(SubjectiveRow::first().to_row(Force::White), Row::from_zero_based(0));
        assert_eq!(SubjectiveRow::first().to_row(Force::Black), Row::from_zero_based(7));
        assert_eq!(SubjectiveRow::last().to_row(Force::Black), Row::from_zero_based(0));
    }
}
