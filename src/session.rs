use enum_map::{EnumMap, enum_map};
use log::info;
use strum::IntoEnumIterator;

use crate::board::Board;
use crate::event::ChessServerEvent;
use crate::force::Force;
use crate::role::Role;
use crate::rules::RulesEngine;
use crate::server::{Broadcaster, ClientId};


// The one game a server runs: canonical board plus seat assignment. Spectators are not
// tracked; any connection without a seat is one.
#[derive(Clone, Debug)]
pub struct GameSession<R = Board> {
    pub(crate) seats: EnumMap<Force, Option<ClientId>>,
    pub(crate) board: R,
}

impl GameSession<Board> {
    pub fn classic() -> Self { GameSession::new(Board::new()) }
}

impl<R: RulesEngine> GameSession<R> {
    pub fn new(board: R) -> Self { GameSession { seats: enum_map! { _ => None }, board } }

    pub fn board(&self) -> &R { &self.board }

    pub fn seat_holder(&self, force: Force) -> Option<ClientId> { self.seats[force] }

    pub fn role_of(&self, client_id: ClientId) -> Role {
        match self.seat_of(client_id) {
            Some(force) => Role::from_force(force),
            None => Role::Spectator,
        }
    }

    fn seat_of(&self, client_id: ClientId) -> Option<Force> {
        Force::iter().find(|&force| self.seats[force] == Some(client_id))
    }

    // Seats the connection in the first free seat, White before Black.
    pub fn assign_role(&mut self, client_id: ClientId) -> Role {
        if let Some(force) = self.seat_of(client_id) {
            return Role::from_force(force);
        }
        match Force::iter().find(|&force| self.seats[force].is_none()) {
            Some(force) => {
                self.seats[force] = Some(client_id);
                Role::from_force(force)
            }
            None => Role::Spectator,
        }
    }

    // Assigns a role and tells it to this connection only.
    pub fn connect(&mut self, client_id: ClientId, broadcaster: &mut impl Broadcaster) -> Role {
        let role = self.assign_role(client_id);
        let event = match role.force() {
            Some(force) => ChessServerEvent::RoleAssigned { force },
            None => ChessServerEvent::SpectatorAssigned,
        };
        broadcaster.send_to(client_id, event);
        role
    }

    // Frees the seat held by the connection, if any. The game itself goes on untouched.
    pub fn disconnect(&mut self, client_id: ClientId) -> Option<Force> {
        let force = self.seat_of(client_id)?;
        self.seats[force] = None;
        info!("{:?} seat freed", force);
        Some(force)
    }
}
