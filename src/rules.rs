use crate::board::{Board, ChessGameStatus, DrawReason, TurnError, TurnMove};
use crate::fen;
use crate::force::Force;


// The rules capability the relay consumes. The arbiter and the client mirror only talk to
// the board through this trait, so an engine must reject bad moves with an error and leave
// its state untouched.
pub trait RulesEngine: Clone {
    fn from_fen(fen: &str) -> Result<Self, String>;
    fn to_fen(&self) -> String;

    fn active_force(&self) -> Force;
    fn try_move(&mut self, mv: &TurnMove) -> Result<(), TurnError>;
    fn is_promotion(&self, mv: &TurnMove) -> bool;

    fn status(&self) -> ChessGameStatus;
    fn is_check(&self) -> bool;

    fn is_checkmate(&self) -> bool { matches!(self.status(), ChessGameStatus::Victory(..)) }
    fn is_stalemate(&self) -> bool {
        self.status() == ChessGameStatus::Draw(DrawReason::Stalemate)
    }
    // Any draw other than stalemate.
    fn is_draw(&self) -> bool {
        matches!(self.status(), ChessGameStatus::Draw(reason) if reason != DrawReason::Stalemate)
    }
}

impl RulesEngine for Board {
    fn from_fen(fen: &str) -> Result<Self, String> { fen::fen_to_board(fen) }
    fn to_fen(&self) -> String { fen::board_to_fen(self) }

    fn active_force(&self) -> Force { Board::active_force(self) }
    fn try_move(&mut self, mv: &TurnMove) -> Result<(), TurnError> { Board::try_move(self, *mv) }
    fn is_promotion(&self, mv: &TurnMove) -> bool { Board::is_promotion(self, mv.from, mv.to) }

    fn status(&self) -> ChessGameStatus { Board::status(self) }
    fn is_check(&self) -> bool { Board::is_check(self) }
}
