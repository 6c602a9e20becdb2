use std::collections::VecDeque;

use log::warn;

use crate::board::{Board, ChessGameStatus, DrawReason, TurnError, TurnMove, VictoryReason};
use crate::coord::Coord;
use crate::display::{BoardOrientation, DisplayCoord, from_display_coord, get_board_orientation};
use crate::event::{ChessClientEvent, ChessServerEvent, MoveRequest};
use crate::force::Force;
use crate::piece::PieceKind;
use crate::role::Role;
use crate::rules::RulesEngine;


#[derive(Clone, Debug)]
pub enum NotableEvent {
    None,
    RoleAssigned(Role),
    MoveMade(MoveRequest),
    MoveRejected(MoveRequest, TurnError),
    NotYourTurn(MoveRequest),
    GameOver(ChessGameStatus),
}

#[derive(Clone, Debug)]
pub enum EventError {
    IllegalServerEvent(String),
    CannotApplyEvent(String),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatusBanner {
    Checkmate { winner: Force },
    Stalemate,
    Draw(DrawReason),
    Check(Force),
}

impl StatusBanner {
    // Terminal banners stay until the game is over for good; check can be dismissed.
    pub fn is_persistent(self) -> bool { !matches!(self, StatusBanner::Check(_)) }

    pub fn message(self) -> String {
        match self {
            StatusBanner::Checkmate { winner } => format!(
                "Checkmate! {:?} loses, {:?} wins.",
                winner.opponent(),
                winner
            ),
            StatusBanner::Stalemate => "Stalemate! The game is a draw.".to_owned(),
            StatusBanner::Draw(reason) => {
                let reason = match reason {
                    DrawReason::Stalemate => "stalemate",
                    DrawReason::FiftyMoveRule => "fifty-move rule",
                    DrawReason::ThreefoldRepetition => "threefold repetition",
                    DrawReason::InsufficientMaterial => "insufficient material",
                };
                format!("Draw by {}.", reason)
            }
            StatusBanner::Check(force) => format!("{:?} is in check!", force),
        }
    }
}

// Client view of the game. Two boards are kept apart:
//   - `server_confirmed` is the last state the server vouched for;
//   - `local_mirror` additionally contains the local move that is waiting for the server.
// Whenever the server says anything about the board, the local mirror is reset to the
// confirmed state, so the server always wins.
pub struct ClientState {
    role: Option<Role>,
    local_mirror: Board,
    server_confirmed: Board,
    // Game result reported by the server. May be known even if the local board cannot see
    // it, e.g. repetitions that happened before the last snapshot.
    game_over: Option<ChessGameStatus>,
    banner_dismissed: bool,
    outgoing_events: VecDeque<ChessClientEvent>,
}

impl ClientState {
    pub fn new() -> Self {
        ClientState {
            role: None,
            local_mirror: Board::new(),
            server_confirmed: Board::new(),
            game_over: None,
            banner_dismissed: false,
            outgoing_events: VecDeque::new(),
        }
    }

    pub fn role(&self) -> Option<Role> { self.role }
    pub fn local_mirror(&self) -> &Board { &self.local_mirror }
    pub fn server_confirmed(&self) -> &Board { &self.server_confirmed }
    pub fn orientation(&self) -> BoardOrientation { get_board_orientation(self.role) }

    pub fn next_outgoing_event(&mut self) -> Option<ChessClientEvent> {
        self.outgoing_events.pop_front()
    }

    fn is_game_over(&self) -> bool {
        self.game_over.is_some() || self.local_mirror.status() != ChessGameStatus::Active
    }

    // Before a role is known every piece can be picked up; the server does the real check.
    pub fn can_drag(&self, coord: Coord) -> bool {
        if self.is_game_over() {
            return false;
        }
        let Some(piece) = self.local_mirror.grid().get(coord) else {
            return false;
        };
        match self.role {
            None => true,
            Some(role) => role.force() == Some(piece.force),
        }
    }

    // Returns whether the move was sent.
    pub fn drag_drop(&mut self, from: DisplayCoord, to: DisplayCoord) -> bool {
        let orientation = self.orientation();
        let (Some(from), Some(to)) =
            (from_display_coord(from, orientation), from_display_coord(to, orientation))
        else {
            return false;
        };
        let promote_to = self
            .local_mirror
            .is_promotion(from, to)
            .then_some(PieceKind::Queen);
        self.make_move(TurnMove { from, to, promote_to }).is_ok()
    }

    // Applies the move to the local mirror and queues it for the server. Nothing is sent if
    // the move is illegal locally.
    pub fn make_move(&mut self, mv: TurnMove) -> Result<(), TurnError> {
        if self.is_game_over() {
            return Err(TurnError::GameOver);
        }
        if !self.can_drag(mv.from) {
            return Err(match self.local_mirror.grid().get(mv.from) {
                Some(_) => TurnError::WrongTurnOrder,
                None => TurnError::PieceMissing,
            });
        }
        self.local_mirror.try_move(mv)?;
        self.banner_dismissed = false;
        self.outgoing_events
            .push_back(ChessClientEvent::MakeMove { mv: MoveRequest::from(mv) });
        Ok(())
    }

    pub fn status_banner(&self) -> Option<StatusBanner> {
        let status = self.game_over.unwrap_or_else(|| self.local_mirror.status());
        match status {
            ChessGameStatus::Victory(winner, VictoryReason::Checkmate) => {
                Some(StatusBanner::Checkmate { winner })
            }
            ChessGameStatus::Draw(DrawReason::Stalemate) => Some(StatusBanner::Stalemate),
            ChessGameStatus::Draw(reason) => Some(StatusBanner::Draw(reason)),
            ChessGameStatus::Active => (self.local_mirror.is_check() && !self.banner_dismissed)
                .then(|| StatusBanner::Check(self.local_mirror.active_force())),
        }
    }

    // Hides the check banner until the board changes. Terminal banners stay.
    pub fn dismiss_banner(&mut self) { self.banner_dismissed = true; }

    pub fn process_server_event(
        &mut self, event: ChessServerEvent,
    ) -> Result<NotableEvent, EventError> {
        use ChessServerEvent::*;
        match event {
            RoleAssigned { force } => self.set_role(Role::from_force(force)),
            SpectatorAssigned => self.set_role(Role::Spectator),
            MoveAccepted { mv } => {
                // Normally this is the state the local mirror already has (either our own move
                // or nothing pending). If the confirmed board has drifted, wait for the snapshot
                // that follows every accepted move.
                let applied = mv
                    .to_turn_move()
                    .and_then(|turn_move| self.server_confirmed.try_move(turn_move));
                if let Err(err) = applied {
                    warn!("Cannot apply confirmed move {}: {:?}; waiting for snapshot", mv, err);
                }
                self.reset_local_mirror();
                Ok(NotableEvent::MoveMade(mv))
            }
            BoardState { fen } => {
                if self.server_confirmed.to_fen() != fen {
                    self.server_confirmed = Board::from_fen(&fen).map_err(|err| {
                        EventError::CannotApplyEvent(format!("Invalid board state {fen}: {err}"))
                    })?;
                }
                self.reset_local_mirror();
                Ok(NotableEvent::None)
            }
            MoveRejected { mv, reason } => {
                self.reset_local_mirror();
                Ok(NotableEvent::MoveRejected(mv, reason))
            }
            NotYourTurn { mv } => {
                self.reset_local_mirror();
                Ok(NotableEvent::NotYourTurn(mv))
            }
            GameOver { status } => {
                if status == ChessGameStatus::Active {
                    return Err(EventError::IllegalServerEvent(
                        "Game over with active status".to_owned(),
                    ));
                }
                self.game_over = Some(status);
                Ok(NotableEvent::GameOver(status))
            }
        }
    }

    fn set_role(&mut self, role: Role) -> Result<NotableEvent, EventError> {
        if let Some(old_role) = self.role {
            return Err(EventError::IllegalServerEvent(format!(
                "Role already assigned: {:?}, got {:?}",
                old_role, role
            )));
        }
        self.role = Some(role);
        Ok(NotableEvent::RoleAssigned(role))
    }

    fn reset_local_mirror(&mut self) {
        self.local_mirror = self.server_confirmed.clone();
        self.banner_dismissed = false;
    }
}
