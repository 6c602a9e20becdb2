use chess_relay::board::Board;
use chess_relay::client::StatusBanner;
use chess_relay::coord::{NUM_COLS, NUM_ROWS};
use chess_relay::display::{
    BoardOrientation, DisplayCoord, from_display_col, from_display_coord, from_display_row,
    is_light_square,
};
use chess_relay::grid::Grid;
use chess_relay::piece::piece_to_pictogram;
use chess_relay::rules::RulesEngine;
use console::Style;


pub fn render_board(board: &Board, orientation: BoardOrientation) -> String {
    format!(
        "{}\n{:?} to move\n{}",
        render_grid(board.grid(), orientation),
        board.active_force(),
        board.to_fen()
    )
}

pub fn render_banner(banner: StatusBanner) -> String {
    let style = if banner.is_persistent() {
        Style::new().bold().magenta()
    } else {
        Style::new().bold().red()
    };
    style.apply_to(banner.message()).to_string()
}

fn render_grid(grid: &Grid, orientation: BoardOrientation) -> String {
    let colors = [
        Style::new().color256(233).on_color256(230),
        Style::new().color256(233).on_color256(222),
    ];
    let mut ret = String::new();
    for y in -1..=NUM_ROWS {
        for x in -1..=NUM_COLS {
            let row_header = x < 0 || x >= NUM_COLS;
            let col_header = y < 0 || y >= NUM_ROWS;
            let square = match (row_header, col_header) {
                (true, true) => format_square(' '),
                (true, false) => format_square(
                    from_display_row(y, orientation).map_or(' ', |row| row.to_algebraic()),
                ),
                (false, true) => format_square(
                    from_display_col(x, orientation).map_or(' ', |col| col.to_algebraic()),
                ),
                (false, false) => {
                    let q = DisplayCoord { x, y };
                    let piece = from_display_coord(q, orientation).and_then(|c| grid.get(c));
                    let color_idx = if is_light_square(q) { 0 } else { 1 };
                    colors[color_idx]
                        .apply_to(format_square(piece.map_or(' ', piece_to_pictogram)))
                        .to_string()
                }
            };
            ret.push_str(&square);
        }
        ret.push('\n');
    }
    ret
}

fn format_square(ch: char) -> String { format!(" {} ", ch) }


#[cfg(test)]
mod tests {
    use super::*;

    fn strip(s: &str) -> String { console::strip_ansi_codes(s).to_string() }

    #[test]
    fn headers_follow_orientation() {
        let board = Board::new();
        let normal = strip(&render_board(&board, BoardOrientation::Normal));
        let rotated = strip(&render_board(&board, BoardOrientation::Rotated));
        let first_line = |s: &str| s.lines().next().unwrap().split_whitespace().collect::<String>();
        assert_eq!(first_line(&normal), "abcdefgh");
        assert_eq!(first_line(&rotated), "hgfedcba");
        assert!(normal.lines().nth(1).unwrap().trim_start().starts_with('8'));
        assert!(rotated.lines().nth(1).unwrap().trim_start().starts_with('1'));
    }
}
