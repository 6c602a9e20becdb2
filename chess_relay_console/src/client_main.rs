use std::fmt;
use std::io;
use std::net::TcpStream;
use std::sync::mpsc;
use std::thread;

use chess_relay::client::{ClientState, NotableEvent};
use chess_relay::event::{ChessServerEvent, MoveRequest};
use chess_relay::piece::PieceKind;
use crossterm::event::{self as term_event, KeyCode, KeyModifiers};
use crossterm::style::{self, Stylize};
use crossterm::{cursor, execute, terminal};
use scopeguard::defer;
use tungstenite::protocol;

use crate::network::{self, CommunicationError};
use crate::tui;


pub struct ClientConfig {
    pub server_address: String,
}

enum IncomingEvent {
    Network(ChessServerEvent),
    NetworkError(CommunicationError),
    Terminal(term_event::Event),
}

fn writeln_raw(stdout: &mut io::Stdout, v: impl fmt::Display) -> io::Result<()> {
    let s = v.to_string();
    // Note. Not using `lines()` because it removes trailing new line.
    for line in s.split('\n') {
        execute!(stdout, style::Print(line), cursor::MoveToNextLine(1), cursor::Hide)?;
    }
    Ok(())
}

fn render(
    stdout: &mut io::Stdout, client_state: &ClientState, keyboard_input: &str,
    message: &Option<String>,
) -> io::Result<()> {
    execute!(stdout, cursor::MoveTo(0, 0), terminal::Clear(terminal::ClearType::All))?;
    match client_state.role() {
        Some(role) => writeln_raw(stdout, format!("Connected as {:?}\n", role))?,
        None => writeln_raw(stdout, "Waiting for the server...\n")?,
    }
    writeln_raw(
        stdout,
        tui::render_board(client_state.local_mirror(), client_state.orientation()),
    )?;
    if let Some(banner) = client_state.status_banner() {
        writeln_raw(stdout, tui::render_banner(banner))?;
    }
    writeln_raw(stdout, "")?;
    writeln_raw(stdout, format!("> {}▂", keyboard_input).with(style::Color::White))?;
    if let Some(message) = message {
        writeln_raw(stdout, message.clone().with(style::Color::Red))?;
    }
    writeln_raw(stdout, "Moves like \"e2e4\" or \"e7e8=n\". Esc hides check, /quit exits.")?;
    Ok(())
}

// Returns a message to show to the user, if any.
fn process_command(client_state: &mut ClientState, input: &str) -> Option<String> {
    let Some(mv) = MoveRequest::parse(input) else {
        return Some(format!("Cannot parse move '{}'", input));
    };
    let mut turn_move = match mv.to_turn_move() {
        Ok(turn_move) => turn_move,
        Err(err) => return Some(format!("Illegal move '{}': {:?}", input, err)),
    };
    if turn_move.promote_to.is_none()
        && client_state.local_mirror().is_promotion(turn_move.from, turn_move.to)
    {
        turn_move.promote_to = Some(PieceKind::Queen);
    }
    match client_state.make_move(turn_move) {
        Ok(()) => None,
        Err(err) => Some(format!("Illegal move '{}': {:?}", input, err)),
    }
}

fn describe_notable_event(event: NotableEvent) -> Option<String> {
    match event {
        NotableEvent::None | NotableEvent::RoleAssigned(_) | NotableEvent::MoveMade(_) => None,
        NotableEvent::MoveRejected(mv, reason) => {
            Some(format!("Server rejected {}: {:?}", mv, reason))
        }
        NotableEvent::NotYourTurn(mv) => Some(format!("Not your turn: {}", mv)),
        NotableEvent::GameOver(_) => None,
    }
}

pub fn run(config: ClientConfig) -> io::Result<()> {
    println!("Connecting to {}...", config.server_address);
    let stream = TcpStream::connect(&config.server_address)?;
    let ws_request = format!("ws://{}", config.server_address);
    let (mut socket_in, _) = tungstenite::client(ws_request, stream)
        .map_err(|err| io::Error::other(err.to_string()))?;
    let mut socket_out = network::clone_websocket(&socket_in, protocol::Role::Client)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
    defer! {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), terminal::LeaveAlternateScreen, cursor::Show);
    };

    let (tx, rx) = mpsc::channel();
    let tx_net = tx.clone();
    let tx_local = tx;
    thread::spawn(move || {
        loop {
            match network::read_obj(&mut socket_in) {
                Ok(ev) => {
                    if tx_net.send(IncomingEvent::Network(ev)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_net.send(IncomingEvent::NetworkError(err));
                    break;
                }
            }
        }
    });
    thread::spawn(move || {
        while let Ok(ev) = term_event::read() {
            if tx_local.send(IncomingEvent::Terminal(ev)).is_err() {
                break;
            }
        }
    });

    let (server_tx, server_rx) = mpsc::channel();
    thread::spawn(move || {
        for ev in server_rx {
            if network::write_obj(&mut socket_out, &ev).is_err() {
                break;
            }
        }
    });

    let mut client_state = ClientState::new();
    let mut keyboard_input = String::new();
    let mut message = None;
    render(&mut stdout, &client_state, &keyboard_input, &message)?;
    for event in rx {
        match event {
            IncomingEvent::Network(event) => match client_state.process_server_event(event) {
                Ok(notable) => {
                    if let Some(text) = describe_notable_event(notable) {
                        message = Some(text);
                    }
                }
                Err(err) => message = Some(format!("Bad server event: {:?}", err)),
            },
            IncomingEvent::NetworkError(err) => {
                return Err(io::Error::other(format!("Connection lost: {:?}", err)));
            }
            IncomingEvent::Terminal(term_event::Event::Key(key)) => match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(());
                }
                KeyCode::Char(ch) => keyboard_input.push(ch),
                KeyCode::Backspace => {
                    keyboard_input.pop();
                }
                KeyCode::Esc => client_state.dismiss_banner(),
                KeyCode::Enter => {
                    let input = std::mem::take(&mut keyboard_input);
                    let input = input.trim();
                    if input == "/quit" {
                        return Ok(());
                    }
                    message = process_command(&mut client_state, input);
                }
                _ => {}
            },
            IncomingEvent::Terminal(_) => {}
        }
        while let Some(event) = client_state.next_outgoing_event() {
            if server_tx.send(event).is_err() {
                return Err(io::Error::other("Connection lost"));
            }
        }
        render(&mut stdout, &client_state, &keyboard_input, &message)?;
    }
    Ok(())
}
