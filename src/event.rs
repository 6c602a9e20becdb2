use std::fmt;

use lazy_static::lazy_static;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::board::{ChessGameStatus, TurnError, TurnMove};
use crate::coord::Coord;
use crate::force::Force;
use crate::piece::PieceKind;


// Move as it travels over the wire. Squares stay raw strings, so that a malformed request
// still reaches the server and gets rejected there rather than failing deserialization.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
    pub promotion: Option<char>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ChessServerEvent {
    // Sent once to a connection that got a seat.
    RoleAssigned { force: Force },
    // Sent once to a connection that arrived when both seats were taken.
    SpectatorAssigned,
    MoveAccepted { mv: MoveRequest },
    // Canonical position after the latest accepted move.
    BoardState { fen: String },
    MoveRejected { mv: MoveRequest, reason: TurnError },
    GameOver { status: ChessGameStatus },
    // Only sent if the server is configured to report out-of-turn attempts.
    NotYourTurn { mv: MoveRequest },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ChessClientEvent {
    MakeMove { mv: MoveRequest },
}


impl MoveRequest {
    pub fn new(from: Coord, to: Coord, promote_to: Option<PieceKind>) -> Self {
        MoveRequest {
            from: from.to_algebraic(),
            to: to.to_algebraic(),
            promotion: promote_to.map(PieceKind::to_ascii_lowercase),
        }
    }

    // Parses long algebraic input such as "e2e4", "e2-e4" or "e7e8=Q".
    pub fn parse(notation: &str) -> Option<Self> {
        lazy_static! {
            static ref MOVE_RE: Regex =
                Regex::new(r"^([a-h][1-8])[-x]?([a-h][1-8])(?:=?([nbrqNBRQ]))?$").unwrap();
        }
        let cap = MOVE_RE.captures(notation.trim())?;
        Some(MoveRequest {
            from: cap.get(1)?.as_str().to_owned(),
            to: cap.get(2)?.as_str().to_owned(),
            promotion: cap
                .get(3)
                .and_then(|m| m.as_str().chars().next())
                .map(|ch| ch.to_ascii_lowercase()),
        })
    }

    pub fn to_turn_move(&self) -> Result<TurnMove, TurnError> {
        let from = Coord::from_algebraic(&self.from).ok_or(TurnError::InvalidNotation)?;
        let to = Coord::from_algebraic(&self.to).ok_or(TurnError::InvalidNotation)?;
        let promote_to = match self.promotion {
            None => None,
            Some(ch) => {
                if !ch.is_ascii_lowercase() {
                    return Err(TurnError::InvalidNotation);
                }
                let kind = PieceKind::from_ascii(ch).ok_or(TurnError::InvalidNotation)?;
                if !kind.can_be_promotion_target() {
                    return Err(TurnError::BadPromotion);
                }
                Some(kind)
            }
        };
        Ok(TurnMove { from, to, promote_to })
    }
}

impl From<TurnMove> for MoveRequest {
    fn from(mv: TurnMove) -> Self { MoveRequest::new(mv.from, mv.to, mv.promote_to) }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "={}", promotion)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_long_algebraic() {
        assert_eq!(
            MoveRequest::parse("e2e4"),
            Some(MoveRequest { from: "e2".to_owned(), to: "e4".to_owned(), promotion: None })
        );
        assert_eq!(MoveRequest::parse(" e2-e4 "), MoveRequest::parse("e2e4"));
        assert_eq!(MoveRequest::parse("e7e8=Q").unwrap().promotion, Some('q'));
        assert_eq!(MoveRequest::parse("e7e8n").unwrap().promotion, Some('n'));
        assert_eq!(MoveRequest::parse("e4"), None);
        assert_eq!(MoveRequest::parse("e7e8k"), None);
        assert_eq!(MoveRequest::parse("z9e4"), None);
    }

    #[test]
    fn malformed_squares_are_invalid_notation() {
        let mv = MoveRequest { from: "z9".to_owned(), to: "e4".to_owned(), promotion: None };
        assert_eq!(mv.to_turn_move(), Err(TurnError::InvalidNotation));
        let mv = MoveRequest { from: "e2".to_owned(), to: "".to_owned(), promotion: None };
        assert_eq!(mv.to_turn_move(), Err(TurnError::InvalidNotation));
    }

    #[test]
    fn promotion_letters() {
        let request = |promotion| MoveRequest {
            from: "e7".to_owned(),
            to: "e8".to_owned(),
            promotion: Some(promotion),
        };
        assert_eq!(request('q').to_turn_move().unwrap().promote_to, Some(PieceKind::Queen));
        assert_eq!(request('k').to_turn_move(), Err(TurnError::BadPromotion));
        assert_eq!(request('Q').to_turn_move(), Err(TurnError::InvalidNotation));
        assert_eq!(request('x').to_turn_move(), Err(TurnError::InvalidNotation));
    }

    #[test]
    fn survives_json() {
        let mv = MoveRequest::new(Coord::E7, Coord::E8, Some(PieceKind::Knight));
        let event = ChessClientEvent::MakeMove { mv: mv.clone() };
        let json = serde_json::to_string(&event).unwrap();
        let ChessClientEvent::MakeMove { mv: parsed } = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, mv);
        assert_eq!(mv.to_string(), "e7e8=n");
    }
}
