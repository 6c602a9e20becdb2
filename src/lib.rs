#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod arbiter;
pub mod board;
pub mod client;
pub mod coord;
pub mod display;
pub mod event;
pub mod fen;
pub mod force;
pub mod grid;
pub mod piece;
pub mod role;
pub mod rules;
pub mod server;
pub mod session;
pub mod test_util;
pub mod util;

pub use board::{
    Board, BoardSetup, ChessGameStatus, DrawReason, TurnError, TurnMove, VictoryReason,
};
pub use coord::{Col, Coord, Row, SubjectiveRow};
pub use event::{ChessClientEvent, ChessServerEvent, MoveRequest};
pub use force::Force;
pub use piece::{PieceKind, PieceOnBoard};
pub use role::Role;
pub use rules::RulesEngine;
