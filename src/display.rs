use crate::coord::{Col, Coord, NUM_COLS, NUM_ROWS, Row};
use crate::force::Force;
use crate::role::Role;


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoardOrientation {
    Normal,  // White at bottom
    Rotated, // Black at bottom
}

// These coords describe board squares, like `Coord`. Both `x` and `y` are integers
// between 0 and 7, but here row 0 corresponds to the top-most row, which could be
// row '1' or row '8' on the board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DisplayCoord {
    pub x: i8,
    pub y: i8,
}

// Black sees the board from the other side. Spectators and clients without a role yet get
// the default view.
pub fn get_board_orientation(role: Option<Role>) -> BoardOrientation {
    match role.and_then(Role::force) {
        Some(Force::Black) => BoardOrientation::Rotated,
        Some(Force::White) | None => BoardOrientation::Normal,
    }
}

pub fn to_display_coord(coord: Coord, orientation: BoardOrientation) -> DisplayCoord {
    match orientation {
        BoardOrientation::Normal => DisplayCoord {
            x: coord.col.to_zero_based(),
            y: NUM_ROWS - coord.row.to_zero_based() - 1,
        },
        BoardOrientation::Rotated => DisplayCoord {
            x: NUM_COLS - coord.col.to_zero_based() - 1,
            y: coord.row.to_zero_based(),
        },
    }
}

pub fn from_display_row(y: i8, orientation: BoardOrientation) -> Option<Row> {
    let row = match orientation {
        BoardOrientation::Normal => Row::from_zero_based(NUM_ROWS - y - 1),
        BoardOrientation::Rotated => Row::from_zero_based(y),
    };
    row.is_on_board().then_some(row)
}

pub fn from_display_col(x: i8, orientation: BoardOrientation) -> Option<Col> {
    let col = match orientation {
        BoardOrientation::Normal => Col::from_zero_based(x),
        BoardOrientation::Rotated => Col::from_zero_based(NUM_COLS - x - 1),
    };
    col.is_on_board().then_some(col)
}

pub fn from_display_coord(q: DisplayCoord, orientation: BoardOrientation) -> Option<Coord> {
    Some(Coord {
        row: from_display_row(q.y, orientation)?,
        col: from_display_col(q.x, orientation)?,
    })
}

// Display squares in rendering order: top row first, left to right.
pub fn display_squares() -> impl Iterator<Item = DisplayCoord> {
    (0..NUM_ROWS).flat_map(|y| (0..NUM_COLS).map(move |x| DisplayCoord { x, y }))
}

pub fn is_light_square(q: DisplayCoord) -> bool { (q.x + q.y) % 2 == 0 }


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_orientation() {
        let o = BoardOrientation::Normal;
        assert_eq!(to_display_coord(Coord::A8, o), DisplayCoord { x: 0, y: 0 });
        assert_eq!(to_display_coord(Coord::H1, o), DisplayCoord { x: 7, y: 7 });
        assert_eq!(from_display_coord(DisplayCoord { x: 4, y: 6 }, o), Some(Coord::E2));
    }

    #[test]
    fn rotated_orientation() {
        let o = BoardOrientation::Rotated;
        assert_eq!(to_display_coord(Coord::H1, o), DisplayCoord { x: 0, y: 0 });
        assert_eq!(to_display_coord(Coord::A8, o), DisplayCoord { x: 7, y: 7 });
        assert_eq!(from_display_coord(DisplayCoord { x: 3, y: 6 }, o), Some(Coord::E7));
    }

    #[test]
    fn inverse() {
        for orientation in [BoardOrientation::Normal, BoardOrientation::Rotated] {
            for coord in Coord::all() {
                let q = to_display_coord(coord, orientation);
                assert_eq!(from_display_coord(q, orientation), Some(coord));
            }
        }
    }

    #[test]
    fn outside_board() {
        let q = DisplayCoord { x: 8, y: 0 };
        assert_eq!(from_display_coord(q, BoardOrientation::Normal), None);
        assert_eq!(from_display_coord(q, BoardOrientation::Rotated), None);
    }

    #[test]
    fn orientation_by_role() {
        assert_eq!(get_board_orientation(None), BoardOrientation::Normal);
        assert_eq!(get_board_orientation(Some(Role::White)), BoardOrientation::Normal);
        assert_eq!(get_board_orientation(Some(Role::Black)), BoardOrientation::Rotated);
        assert_eq!(get_board_orientation(Some(Role::Spectator)), BoardOrientation::Normal);
    }
}
