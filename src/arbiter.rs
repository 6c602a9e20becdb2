use log::{debug, info};

use crate::board::{ChessGameStatus, TurnError};
use crate::event::{ChessServerEvent, MoveRequest};
use crate::rules::RulesEngine;
use crate::server::{Broadcaster, ClientId};
use crate::session::GameSession;


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SubmitMoveError {
    // The sender does not hold the seat of the side to move. Nothing is sent back.
    NotYourTurn,
    // The rules engine refused the move. The sender gets `MoveRejected`.
    IllegalMove(TurnError),
}

impl<R: RulesEngine> GameSession<R> {
    // The only way the canonical board changes. On success everybody, the sender included,
    // gets the move followed by the resulting position.
    pub fn submit_move(
        &mut self, client_id: ClientId, mv: MoveRequest, broadcaster: &mut impl Broadcaster,
    ) -> Result<(), SubmitMoveError> {
        let force = self.board.active_force();
        if self.seats[force] != Some(client_id) {
            debug!("Dropping move {} from {:?}: {:?} to move", mv, client_id, force);
            return Err(SubmitMoveError::NotYourTurn);
        }

        let result = mv.to_turn_move().and_then(|turn_move| self.board.try_move(&turn_move));
        if let Err(reason) = result {
            info!("Rejected move {} by {:?}: {:?}", mv, force, reason);
            broadcaster.send_to(client_id, ChessServerEvent::MoveRejected { mv, reason });
            return Err(SubmitMoveError::IllegalMove(reason));
        }

        info!("{:?} played {}", force, mv);
        broadcaster.broadcast(&ChessServerEvent::MoveAccepted { mv });
        broadcaster.broadcast(&ChessServerEvent::BoardState { fen: self.board.to_fen() });
        let status = self.board.status();
        if status != ChessGameStatus::Active {
            info!("Game over: {:?}", status);
            broadcaster.broadcast(&ChessServerEvent::GameOver { status });
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::board::{Board, VictoryReason};
    use crate::force::Force;
    use crate::test_util::{RecordingBroadcaster, client_ids, request};

    fn seated_session() -> (GameSession, RecordingBroadcaster, [ClientId; 3]) {
        let ids = client_ids();
        let mut session = GameSession::classic();
        for id in ids {
            session.assign_role(id);
        }
        (session, RecordingBroadcaster::default(), ids)
    }

    #[test]
    fn legal_move_is_broadcast_with_position() {
        let (mut session, mut broadcaster, [white, _, _]) = seated_session();
        session.submit_move(white, request("e2", "e4"), &mut broadcaster).unwrap();
        assert!(broadcaster.sent.is_empty());
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        assert_eq!(broadcaster.broadcasts.len(), 2);
        assert!(matches!(
            &broadcaster.broadcasts[0],
            ChessServerEvent::MoveAccepted { mv } if *mv == request("e2", "e4")
        ));
        assert!(matches!(
            &broadcaster.broadcasts[1],
            ChessServerEvent::BoardState { fen: f } if f == fen
        ));
        assert_eq!(session.board().to_fen(), fen);
    }

    #[test]
    fn out_of_turn_is_dropped_silently() {
        let (mut session, mut broadcaster, [_, black, spectator]) = seated_session();
        for id in [black, spectator] {
            assert_eq!(
                session.submit_move(id, request("e7", "e5"), &mut broadcaster),
                Err(SubmitMoveError::NotYourTurn)
            );
            assert_eq!(
                session.submit_move(id, request("e2", "e4"), &mut broadcaster),
                Err(SubmitMoveError::NotYourTurn)
            );
        }
        assert!(broadcaster.sent.is_empty());
        assert!(broadcaster.broadcasts.is_empty());
        assert_eq!(session.board().to_fen(), Board::new().to_fen());
    }

    #[test]
    fn illegal_move_is_reported_to_sender_only() {
        let (mut session, mut broadcaster, [white, _, _]) = seated_session();
        assert_eq!(
            session.submit_move(white, request("e2", "e5"), &mut broadcaster),
            Err(SubmitMoveError::IllegalMove(TurnError::ImpossibleTrajectory))
        );
        assert!(broadcaster.broadcasts.is_empty());
        assert_eq!(broadcaster.sent.len(), 1);
        assert_eq!(broadcaster.sent[0].0, white);
        assert!(matches!(
            &broadcaster.sent[0].1,
            ChessServerEvent::MoveRejected { reason: TurnError::ImpossibleTrajectory, .. }
        ));
        assert_eq!(session.board().to_fen(), Board::new().to_fen());
    }

    #[test]
    fn malformed_move_fails_closed() {
        let (mut session, mut broadcaster, [white, _, _]) = seated_session();
        for (from, to) in [("z9", "e4"), ("e2", "e9"), ("", ""), ("e2e4", "e4")] {
            assert_eq!(
                session.submit_move(white, request(from, to), &mut broadcaster),
                Err(SubmitMoveError::IllegalMove(TurnError::InvalidNotation))
            );
        }
        assert_eq!(broadcaster.sent.len(), 4);
        assert_eq!(session.board().to_fen(), Board::new().to_fen());
    }

    #[test]
    fn vacant_seat_cannot_move() {
        let mut session = GameSession::classic();
        let mut broadcaster = RecordingBroadcaster::default();
        let [someone] = client_ids();
        assert_eq!(
            session.submit_move(someone, request("e2", "e4"), &mut broadcaster),
            Err(SubmitMoveError::NotYourTurn)
        );
    }

    #[test]
    fn checkmate_is_announced() {
        let (mut session, mut broadcaster, [white, black, _]) = seated_session();
        for (id, from, to) in [
            (white, "f2", "f3"),
            (black, "e7", "e5"),
            (white, "g2", "g4"),
            (black, "d8", "h4"),
        ] {
            session.submit_move(id, request(from, to), &mut broadcaster).unwrap();
        }
        let status = ChessGameStatus::Victory(Force::Black, VictoryReason::Checkmate);
        assert!(matches!(
            broadcaster.broadcasts.last(),
            Some(ChessServerEvent::GameOver { status: s }) if *s == status
        ));
        assert_eq!(
            session.submit_move(white, request("e2", "e4"), &mut broadcaster),
            Err(SubmitMoveError::IllegalMove(TurnError::GameOver))
        );
    }
}
