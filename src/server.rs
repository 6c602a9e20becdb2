use std::collections::{HashMap, hash_map};
use std::sync::{Arc, Mutex};

use log::{info, warn};

use crate::arbiter::SubmitMoveError;
use crate::event::{ChessClientEvent, ChessServerEvent};
use crate::session::GameSession;


#[derive(Debug)]
pub enum IncomingEvent {
    Connect(ClientId),
    Network(ClientId, ChessClientEvent),
    Disconnect(ClientId),
    Terminate,
}

#[derive(Clone, Debug, Default)]
pub struct ServerOptions {
    // Tell a connection when its move was dropped because it is not its turn. Off by default:
    // the authority gate does not reveal anything to the offender.
    pub notify_out_of_turn: bool,
}


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ClientId(usize);

impl ClientId {
    #[allow(non_snake_case)]
    pub fn TEST_new(id: usize) -> Self { ClientId(id) }
}

// Delivery of server events. Fire-and-forget: a send never blocks and never fails from the
// caller's point of view.
pub trait Broadcaster {
    fn send_to(&mut self, id: ClientId, event: ChessServerEvent);
    fn broadcast(&mut self, event: &ChessServerEvent);
}

pub struct Client {
    events_tx: async_std::channel::Sender<ChessServerEvent>,
    logging_id: String,
}

impl Client {
    fn send(&self, event: ChessServerEvent) {
        // Fails only if the connection is already gone; `Disconnect` will clean it up.
        let _ = self.events_tx.try_send(event);
    }
}

pub struct Clients {
    map: HashMap<ClientId, Client>,
}

impl Clients {
    pub fn new() -> Self { Clients { map: HashMap::new() } }

    pub fn len(&self) -> usize { self.map.len() }
    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    pub fn add_client(
        &mut self, events_tx: async_std::channel::Sender<ChessServerEvent>, logging_id: String,
    ) -> ClientId {
        let client = Client { events_tx, logging_id };
        loop {
            let id = ClientId(rand::random::<u64>() as usize);
            match self.map.entry(id) {
                hash_map::Entry::Occupied(_) => {}
                hash_map::Entry::Vacant(e) => {
                    e.insert(client);
                    return id;
                }
            }
        }
    }

    // Returns logging ID if the client existed.
    pub fn remove_client(&mut self, id: ClientId) -> Option<String> {
        self.map.remove(&id).map(|client| client.logging_id)
    }

    pub fn logging_id(&self, id: ClientId) -> Option<&str> {
        self.map.get(&id).map(|client| client.logging_id.as_str())
    }
}

impl Broadcaster for Clients {
    fn send_to(&mut self, id: ClientId, event: ChessServerEvent) {
        if let Some(client) = self.map.get(&id) {
            client.send(event);
        }
    }

    fn broadcast(&mut self, event: &ChessServerEvent) {
        for client in self.map.values() {
            client.send(event.clone());
        }
    }
}


// Owns the game and processes events one by one. Must only be driven from a single thread,
// which is what makes move validation and application atomic.
pub struct ServerState {
    options: ServerOptions,
    clients: Arc<Mutex<Clients>>,
    session: GameSession,
}

impl ServerState {
    pub fn new(options: ServerOptions, clients: Arc<Mutex<Clients>>) -> Self {
        ServerState {
            options,
            clients,
            session: GameSession::classic(),
        }
    }

    pub fn session(&self) -> &GameSession { &self.session }

    pub fn apply_event(&mut self, event: IncomingEvent) {
        let mut clients = self.clients.lock().unwrap();
        match event {
            IncomingEvent::Connect(client_id) => {
                let role = self.session.connect(client_id, &mut *clients);
                info!(
                    "Client {} connected as {:?}",
                    clients.logging_id(client_id).unwrap_or("?"),
                    role
                );
            }
            IncomingEvent::Network(client_id, event) => match event {
                ChessClientEvent::MakeMove { mv } => {
                    let result = self.session.submit_move(client_id, mv.clone(), &mut *clients);
                    if let Err(SubmitMoveError::NotYourTurn) = result {
                        if self.options.notify_out_of_turn {
                            clients.send_to(client_id, ChessServerEvent::NotYourTurn { mv });
                        }
                    }
                }
            },
            IncomingEvent::Disconnect(client_id) => {
                let freed_seat = self.session.disconnect(client_id);
                match clients.remove_client(client_id) {
                    Some(logging_id) => match freed_seat {
                        Some(force) => {
                            info!("Client {} disconnected, {:?} seat is free", logging_id, force)
                        }
                        None => info!("Client {} disconnected", logging_id),
                    },
                    None => warn!("Disconnect for unknown client {:?}", client_id),
                }
            }
            IncomingEvent::Terminate => {
                info!("Terminating; {} client(s) connected", clients.len());
            }
        }
    }
}
