// Standard chess rules: move legality, castling, en passant, promotion and game end.

use std::collections::HashMap;

use enum_map::{EnumMap, enum_map};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::coord::{Col, Coord, Row, SubjectiveRow};
use crate::force::Force;
use crate::grid::Grid;
use crate::piece::{CastleDirection, PieceKind, PieceOnBoard};
use crate::util::sort_two;


fn should_promote(force: Force, piece_kind: PieceKind, to: Coord) -> bool {
    piece_kind == PieceKind::Pawn && to.row == SubjectiveRow::last().to_row(force)
}

fn rook_home(force: Force, dir: CastleDirection) -> Coord {
    let row = SubjectiveRow::first().to_row(force);
    match dir {
        CastleDirection::ASide => Coord::new(row, Col::A),
        CastleDirection::HSide => Coord::new(row, Col::H),
    }
}

fn king_home(force: Force) -> Coord { Coord::new(SubjectiveRow::first().to_row(force), Col::E) }

// Returns the square of the piece that would be captured by moving from `from` to `to`.
// Differs from `to` only for en passant.
fn get_capture(
    grid: &Grid, from: Coord, to: Coord, en_passant_target: Option<Coord>,
) -> Option<Coord> {
    let piece = grid.get(from)?;
    if let Some(target_piece) = grid.get(to) {
        return (target_piece.force != piece.force).then_some(to);
    }
    if piece.kind == PieceKind::Pawn && en_passant_target == Some(to) {
        let captured_pos = Coord::new(from.row, to.col);
        if let Some(captured) = grid.get(captured_pos) {
            if captured.kind == PieceKind::Pawn && captured.force != piece.force {
                return Some(captured_pos);
            }
        }
    }
    None
}

fn is_attacked(grid: &Grid, pos: Coord, attacker: Force) -> bool {
    grid.pieces()
        .any(|(from, piece)| piece.force == attacker && reachability(grid, from, pos, true).ok())
}

fn is_check_to(grid: &Grid, force: Force) -> bool {
    match grid.find_king(force) {
        Some(king_pos) => is_attacked(grid, king_pos, force.opponent()),
        None => false,
    }
}

fn reachability(grid: &Grid, from: Coord, to: Coord, capturing: bool) -> Reachability {
    use ProtoReachability::*;
    match proto_reachability(grid, from, to) {
        Ok => Reachability::Ok,
        OkIfCapturing => {
            if capturing { Reachability::Ok } else { Reachability::Impossible }
        }
        OkIfNonCapturing => {
            if !capturing { Reachability::Ok } else { Reachability::Blocked }
        }
        Blocked => Reachability::Blocked,
        Impossible => Reachability::Impossible,
    }
}

// Tests that the piece can move in such a way and that the path is free.
// Does not support castling.
fn proto_reachability(grid: &Grid, from: Coord, to: Coord) -> ProtoReachability {
    use ProtoReachability::*;
    let proto = proto_reachability_modulo_destination_square(grid, from, to);
    match proto {
        Blocked | Impossible => proto,
        Ok | OkIfCapturing | OkIfNonCapturing => {
            if let (Some(piece), Some(target)) = (grid.get(from), grid.get(to)) {
                if piece.force == target.force {
                    return Blocked;
                }
            }
            proto
        }
    }
}

fn proto_reachability_modulo_destination_square(
    grid: &Grid, from: Coord, to: Coord,
) -> ProtoReachability {
    use ProtoReachability::*;
    if to == from || !to.is_on_board() {
        return Impossible;
    }
    let Some(piece) = grid.get(from) else {
        return Impossible;
    };

    let (d_row, d_col) = to - from;
    let is_straight_move = d_row == 0 || d_col == 0;
    let is_diagonal_move = d_row.abs() == d_col.abs();
    // Tests that squares between `from` (exclusive) and `to` (exclusive) are free.
    let has_linear_passage = || {
        let direction = (d_row.signum(), d_col.signum());
        let mut pos = from + direction;
        while pos != to {
            if grid[pos].is_some() {
                return false;
            }
            pos = pos + direction;
        }
        true
    };
    let simple_linear_passage = || if has_linear_passage() { Ok } else { Blocked };

    match piece.kind {
        PieceKind::Pawn => {
            let dir_forward = piece.force.forward();
            let second_row = SubjectiveRow::from_one_based(2).to_row(piece.force);
            let valid_capturing_move = d_col.abs() == 1 && d_row == dir_forward;
            let valid_non_capturing_move = d_col == 0
                && (d_row == dir_forward || (from.row == second_row && d_row == dir_forward * 2));
            if valid_capturing_move {
                OkIfCapturing
            } else if valid_non_capturing_move {
                if has_linear_passage() { OkIfNonCapturing } else { Blocked }
            } else {
                Impossible
            }
        }
        PieceKind::Knight => {
            if sort_two((d_row.abs(), d_col.abs())) == (1, 2) { Ok } else { Impossible }
        }
        PieceKind::Bishop => {
            if is_diagonal_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::Rook => {
            if is_straight_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::Queen => {
            if is_straight_move || is_diagonal_move { simple_linear_passage() } else { Impossible }
        }
        PieceKind::King => {
            if d_row.abs() <= 1 && d_col.abs() <= 1 { Ok } else { Impossible }
        }
    }
}

// Dead position approximation: lone kings, king and a minor piece against a king, or
// bishops only, all on squares of the same color.
fn is_insufficient_material(grid: &Grid) -> bool {
    let non_kings = grid.pieces().filter(|(_, piece)| piece.kind != PieceKind::King).collect_vec();
    match non_kings.as_slice() {
        [] => true,
        [(_, piece)] => matches!(piece.kind, PieceKind::Knight | PieceKind::Bishop),
        pieces => {
            let square_color =
                |pos: &Coord| (pos.row.to_zero_based() + pos.col.to_zero_based()) % 2;
            pieces.iter().all(|(_, piece)| piece.kind == PieceKind::Bishop)
                && pieces.iter().map(|(pos, _)| square_color(pos)).all_equal()
        }
    }
}


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ProtoReachability {
    Ok,
    OkIfCapturing,
    OkIfNonCapturing,
    Blocked,
    Impossible,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Reachability {
    Ok,
    Blocked,
    Impossible,
}

impl Reachability {
    fn ok(self) -> bool { self == Reachability::Ok }
}

#[derive(Clone, Debug)]
struct TurnOutcome {
    new_grid: Grid,
    moved_piece: PieceOnBoard,
    capture: Option<PieceOnBoard>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TurnMove {
    pub from: Coord,
    pub to: Coord,
    pub promote_to: Option<PieceKind>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum VictoryReason {
    Checkmate,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DrawReason {
    Stalemate,
    FiftyMoveRule,
    ThreefoldRepetition,
    InsufficientMaterial,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ChessGameStatus {
    Active,
    Victory(Force, VictoryReason),
    Draw(DrawReason),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum TurnError {
    InvalidNotation,
    PieceMissing,
    WrongTurnOrder,
    ImpossibleTrajectory,
    PathBlocked,
    UnprotectedKing,
    CastlingPieceHasMoved,
    BadPromotion,
    GameOver,
}

pub type CastlingRights = EnumMap<Force, EnumMap<CastleDirection, bool>>;

// Two positions are "the same" for the threefold repetition rule if the same pieces occupy
// the same squares, the same side is to move, and castling and en passant options match.
// An en passant target only counts while the capture is actually legal.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct PositionForRepetitionDraw {
    grid: Grid,
    active_force: Force,
    castling_rights: CastlingRights,
    en_passant_target: Option<Coord>,
}

// Everything needed to reconstruct a board; this is exactly what FEN describes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BoardSetup {
    pub grid: Grid,
    pub active_force: Force,
    pub castling_rights: CastlingRights,
    pub en_passant_target: Option<Coord>,
    pub half_move_clock: u32,
    pub full_move_number: u32,
}

#[derive(Clone, Debug)]
pub struct Board {
    grid: Grid,
    active_force: Force,
    castling_rights: CastlingRights,
    en_passant_target: Option<Coord>,
    half_move_clock: u32,  // for the fifty-move rule
    full_move_number: u32, // starts at 1, incremented after Black's move
    status: ChessGameStatus,
    position_count: HashMap<PositionForRepetitionDraw, u8>,
}

impl Board {
    pub fn new() -> Board { Board::from_setup(BoardSetup::classic()) }

    pub fn from_setup(setup: BoardSetup) -> Board {
        let BoardSetup {
            grid,
            active_force,
            castling_rights,
            en_passant_target,
            half_move_clock,
            full_move_number,
        } = setup;
        let mut board = Board {
            grid,
            active_force,
            castling_rights,
            en_passant_target,
            half_move_clock,
            full_move_number,
            status: ChessGameStatus::Active,
            position_count: HashMap::new(),
        };
        let num_repetitions = board.record_position();
        board.status = board.evaluate_status(num_repetitions);
        board
    }

    pub fn grid(&self) -> &Grid { &self.grid }
    pub fn active_force(&self) -> Force { self.active_force }
    pub fn castling_rights(&self) -> &CastlingRights { &self.castling_rights }
    pub fn en_passant_target(&self) -> Option<Coord> { self.en_passant_target }
    pub fn half_move_clock(&self) -> u32 { self.half_move_clock }
    pub fn full_move_number(&self) -> u32 { self.full_move_number }
    pub fn status(&self) -> ChessGameStatus { self.status }

    pub fn is_check(&self) -> bool { is_check_to(&self.grid, self.active_force) }

    pub fn is_promotion(&self, from: Coord, to: Coord) -> bool {
        self.grid
            .get(from)
            .is_some_and(|piece| should_promote(piece.force, piece.kind, to))
    }

    pub fn try_move(&mut self, mv: TurnMove) -> Result<(), TurnError> {
        // Turn application is split into two phases:
        //   - First, check turn validity and determine the outcome (does not change
        //     game state, can fail if the turn is invalid).
        //   - Second, apply the outcome (changes game state, cannot fail).
        let outcome = self.turn_outcome(mv)?;
        self.apply_turn(mv, outcome);
        Ok(())
    }

    // All legal moves for the active force. Promotions are listed once, as queen promotions.
    pub fn legal_moves(&self) -> impl Iterator<Item = TurnMove> + '_ {
        self.candidate_moves().filter(|mv| self.turn_outcome(*mv).is_ok())
    }

    fn candidate_moves(&self) -> impl Iterator<Item = TurnMove> + '_ {
        let force = self.active_force;
        self.grid
            .pieces()
            .filter(move |(_, piece)| piece.force == force)
            .cartesian_product(Coord::all().collect_vec())
            .map(|((from, piece), to)| TurnMove {
                from,
                to,
                promote_to: should_promote(piece.force, piece.kind, to)
                    .then_some(PieceKind::Queen),
            })
    }

    fn apply_turn(&mut self, mv: TurnMove, outcome: TurnOutcome) {
        let TurnOutcome { new_grid, moved_piece, capture } = outcome;
        let force = self.active_force;

        if moved_piece.kind == PieceKind::King {
            self.castling_rights[force] = enum_map! { _ => false };
        }
        // Moving a rook away or capturing it on its home square revokes castling on that side.
        for (rook_force, rights) in self.castling_rights.iter_mut() {
            for (dir, right) in rights.iter_mut() {
                let home = rook_home(rook_force, dir);
                if mv.from == home || mv.to == home {
                    *right = false;
                }
            }
        }

        let is_pawn_move = moved_piece.kind == PieceKind::Pawn;
        self.en_passant_target = if is_pawn_move && (mv.to.row - mv.from.row).abs() == 2 {
            Some(mv.from + (force.forward(), 0))
        } else {
            None
        };
        if is_pawn_move || capture.is_some() {
            self.half_move_clock = 0;
        } else {
            self.half_move_clock += 1;
        }
        if force == Force::Black {
            self.full_move_number += 1;
        }

        self.grid = new_grid;
        self.active_force = force.opponent();
        let num_repetitions = self.record_position();
        self.status = self.evaluate_status(num_repetitions);
    }

    // Returns how many times the current position has occurred.
    fn record_position(&mut self) -> u8 {
        let position = PositionForRepetitionDraw {
            grid: self.grid.clone(),
            active_force: self.active_force,
            castling_rights: self.castling_rights,
            en_passant_target: self.en_passant_target.filter(|&target| {
                self.legal_moves().any(|mv| {
                    mv.to == target
                        && self.grid.get(mv.from).is_some_and(|p| p.kind == PieceKind::Pawn)
                })
            }),
        };
        let count = self.position_count.entry(position).or_insert(0);
        *count += 1;
        *count
    }

    fn evaluate_status(&self, num_repetitions: u8) -> ChessGameStatus {
        if self.legal_moves().next().is_none() {
            if self.is_check() {
                ChessGameStatus::Victory(self.active_force.opponent(), VictoryReason::Checkmate)
            } else {
                ChessGameStatus::Draw(DrawReason::Stalemate)
            }
        } else if self.half_move_clock >= 100 {
            ChessGameStatus::Draw(DrawReason::FiftyMoveRule)
        } else if num_repetitions >= 3 {
            ChessGameStatus::Draw(DrawReason::ThreefoldRepetition)
        } else if is_insufficient_material(&self.grid) {
            ChessGameStatus::Draw(DrawReason::InsufficientMaterial)
        } else {
            ChessGameStatus::Active
        }
    }

    fn turn_outcome(&self, mv: TurnMove) -> Result<TurnOutcome, TurnError> {
        if self.status != ChessGameStatus::Active {
            return Err(TurnError::GameOver);
        }
        if !mv.from.is_on_board() || !mv.to.is_on_board() {
            return Err(TurnError::InvalidNotation);
        }
        let force = self.active_force;
        let piece = self.grid[mv.from].ok_or(TurnError::PieceMissing)?;
        if piece.force != force {
            return Err(TurnError::WrongTurnOrder);
        }

        let is_castling = piece.kind == PieceKind::King
            && mv.from == king_home(force)
            && mv.to.row == mv.from.row
            && (mv.to.col - mv.from.col).abs() == 2;
        if is_castling {
            if mv.promote_to.is_some() {
                return Err(TurnError::BadPromotion);
            }
            let dir = if mv.to.col > mv.from.col {
                CastleDirection::HSide
            } else {
                CastleDirection::ASide
            };
            let new_grid = self.castling_outcome(force, dir)?;
            return Ok(TurnOutcome { new_grid, moved_piece: piece, capture: None });
        }

        let capture_pos = get_capture(&self.grid, mv.from, mv.to, self.en_passant_target);
        match reachability(&self.grid, mv.from, mv.to, capture_pos.is_some()) {
            Reachability::Ok => {}
            Reachability::Blocked => return Err(TurnError::PathBlocked),
            Reachability::Impossible => return Err(TurnError::ImpossibleTrajectory),
        }

        let mut new_grid = self.grid.clone();
        new_grid[mv.from] = None;
        let capture = capture_pos.and_then(|pos| new_grid[pos].take());
        let placed_piece = match (should_promote(force, piece.kind, mv.to), mv.promote_to) {
            (true, Some(promote_to)) if promote_to.can_be_promotion_target() => {
                PieceOnBoard::new(promote_to, force)
            }
            (false, None) => piece,
            _ => return Err(TurnError::BadPromotion),
        };
        new_grid[mv.to] = Some(placed_piece);

        if is_check_to(&new_grid, force) {
            return Err(TurnError::UnprotectedKing);
        }
        Ok(TurnOutcome { new_grid, moved_piece: piece, capture })
    }

    fn castling_outcome(&self, force: Force, dir: CastleDirection) -> Result<Grid, TurnError> {
        if !self.castling_rights[force][dir] {
            return Err(TurnError::CastlingPieceHasMoved);
        }
        let king_from = king_home(force);
        let rook_from = rook_home(force, dir);
        if self.grid[rook_from] != Some(PieceOnBoard::new(PieceKind::Rook, force)) {
            return Err(TurnError::CastlingPieceHasMoved);
        }
        let row = king_from.row;
        let (king_to, rook_to) = match dir {
            CastleDirection::ASide => (Coord::new(row, Col::C), Coord::new(row, Col::D)),
            CastleDirection::HSide => (Coord::new(row, Col::G), Coord::new(row, Col::F)),
        };

        let (min_col, max_col) = sort_two((king_from.col, rook_from.col));
        if cols_between(row, min_col, max_col).any(|pos| self.grid[pos].is_some()) {
            return Err(TurnError::PathBlocked);
        }
        // The king may not start in, pass through or end up in check.
        let (min_col, max_col) = sort_two((king_from.col, king_to.col));
        let king_path = Col::all()
            .filter(|col| (min_col..=max_col).contains(col))
            .map(|col| Coord::new(row, col));
        for pos in king_path {
            if is_attacked(&self.grid, pos, force.opponent()) {
                return Err(TurnError::UnprotectedKing);
            }
        }

        let mut new_grid = self.grid.clone();
        let king = new_grid[king_from].take();
        let rook = new_grid[rook_from].take();
        new_grid[king_to] = king;
        new_grid[rook_to] = rook;
        Ok(new_grid)
    }
}

// Squares strictly between two columns on a given row.
fn cols_between(row: Row, min_col: Col, max_col: Col) -> impl Iterator<Item = Coord> {
    Col::all()
        .filter(move |col| min_col < *col && *col < max_col)
        .map(move |col| Coord::new(row, col))
}

impl BoardSetup {
    pub fn classic() -> Self {
        use PieceKind::*;
        let back_row = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        let mut grid = Grid::new();
        for force in [Force::White, Force::Black] {
            let first_row = SubjectiveRow::first().to_row(force);
            let second_row = SubjectiveRow::from_one_based(2).to_row(force);
            for (col, kind) in Col::all().zip(back_row) {
                grid[Coord::new(first_row, col)] = Some(PieceOnBoard::new(kind, force));
                grid[Coord::new(second_row, col)] = Some(PieceOnBoard::new(Pawn, force));
            }
        }
        BoardSetup {
            grid,
            active_force: Force::White,
            castling_rights: enum_map! { _ => enum_map! { _ => true } },
            en_passant_target: None,
            half_move_clock: 0,
            full_move_number: 1,
        }
    }
}

impl From<&Board> for BoardSetup {
    fn from(board: &Board) -> Self {
        BoardSetup {
            grid: board.grid.clone(),
            active_force: board.active_force,
            castling_rights: board.castling_rights,
            en_passant_target: board.en_passant_target,
            half_move_clock: board.half_move_clock,
            full_move_number: board.full_move_number,
        }
    }
}
