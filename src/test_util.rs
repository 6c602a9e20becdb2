// Test utilities shared by unit tests and the "tests" folder.

use itertools::Itertools;
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use regex_lite::Regex;

use crate::board::TurnError;
use crate::event::{ChessServerEvent, MoveRequest};
use crate::rules::RulesEngine;
use crate::server::{Broadcaster, ClientId};


// In theory random tests verify properties that should always hold, but let's fix the seed
// to avoid sporadic failures.
pub fn deterministic_rng() -> impl Rng { rand::rngs::StdRng::from_seed([0; 32]) }

pub fn client_ids<const N: usize>() -> [ClientId; N] {
    std::array::from_fn(|i| ClientId::TEST_new(i + 1))
}

pub fn request(from: &str, to: &str) -> MoveRequest {
    MoveRequest {
        from: from.to_owned(),
        to: to.to_owned(),
        promotion: None,
    }
}

// Parses a log like "1.e2e4 e7e5 2.g1f3". Move numbers are optional.
pub fn parse_log(log: &str) -> Vec<MoveRequest> {
    lazy_static! {
        static ref MOVE_NUMBER_RE: Regex = Regex::new(r"^(?:[0-9]+\.)?(.*)$").unwrap();
    }
    log.split_whitespace()
        .map(|notation| {
            let notation = MOVE_NUMBER_RE.captures(notation).unwrap().get(1).unwrap().as_str();
            MoveRequest::parse(notation).unwrap_or_else(|| panic!("Bad move: {notation}"))
        })
        .collect_vec()
}

pub fn replay_log(board: &mut impl RulesEngine, log: &str) -> Result<(), TurnError> {
    for mv in parse_log(log) {
        board.try_move(&mv.to_turn_move()?)?;
    }
    Ok(())
}

#[derive(Default)]
pub struct RecordingBroadcaster {
    pub sent: Vec<(ClientId, ChessServerEvent)>,
    pub broadcasts: Vec<ChessServerEvent>,
}

impl Broadcaster for RecordingBroadcaster {
    fn send_to(&mut self, id: ClientId, event: ChessServerEvent) { self.sent.push((id, event)); }
    fn broadcast(&mut self, event: &ChessServerEvent) { self.broadcasts.push(event.clone()); }
}
