// Threading model. All game logic runs in a single thread that owns `ServerState` and reads
// `IncomingEvent`s from a channel. Network IO runs on async tasks: one reader and one writer
// per connection. The reader feeds the channel; the writer drains the per-client queue that
// `Clients` pushes into.

use std::path::Path;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use anyhow::{Context, anyhow};
use async_std::net::{TcpListener, TcpStream};
use chess_relay::server::*;
use futures_util::StreamExt;
use log::{error, info, warn};

use crate::network::{self, CommunicationError};
use crate::server_config::ServerConfig;


async fn handle_connection(
    peer_addr: String, stream: TcpStream, tx: mpsc::SyncSender<IncomingEvent>,
    clients: Arc<Mutex<Clients>>,
) -> anyhow::Result<()> {
    let stream = async_tungstenite::accept_async(stream)
        .await
        .context("Websocket handshake failed")?;
    let (mut stream_tx, mut stream_rx) = stream.split();

    let (client_tx, client_rx) = async_std::channel::unbounded();
    let client_id = clients.lock().unwrap().add_client(client_tx, peer_addr.clone());
    tx.send(IncomingEvent::Connect(client_id))?;

    // Client -> Server
    async_std::task::spawn(async move {
        loop {
            match network::read_obj_async(&mut stream_rx).await {
                Ok(ev) => {
                    if tx.send(IncomingEvent::Network(client_id, ev)).is_err() {
                        break;
                    }
                }
                Err(CommunicationError::Serde(err)) => {
                    warn!("Client {} sent a malformed event: {}", peer_addr, err);
                }
                Err(err) => {
                    match err {
                        CommunicationError::ConnectionClosed => {}
                        err => warn!("Client {} read error: {:?}", peer_addr, err),
                    }
                    let _ = tx.send(IncomingEvent::Disconnect(client_id));
                    break;
                }
            }
        }
    });

    // Server -> Client. Ends when the server drops the client.
    while let Ok(ev) = client_rx.recv().await {
        if let Err(err) = network::write_obj_async(&mut stream_tx, &ev).await {
            // Improvement potential. Disconnect right away instead of waiting for the reader
            //   to notice the broken socket.
            warn!("Client {:?} write error: {:?}", client_id, err);
            break;
        }
    }
    Ok(())
}

async fn accept_connections(
    listener: TcpListener, tx: mpsc::SyncSender<IncomingEvent>, clients: Arc<Mutex<Clients>>,
) {
    let mut incoming = listener.incoming();
    while let Some(stream) = incoming.next().await {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!("Cannot accept connection: {}", err);
                continue;
            }
        };
        let peer_addr = stream.peer_addr().map_or_else(|_| "?".to_owned(), |a| a.to_string());
        let tx = tx.clone();
        let clients = Arc::clone(&clients);
        async_std::task::spawn(async move {
            if let Err(err) = handle_connection(peer_addr.clone(), stream, tx, clients).await {
                warn!("Connection {} failed: {:#}", peer_addr, err);
            }
        });
    }
}

async fn run_tide(port: u16, static_content_dir: String) -> anyhow::Result<()> {
    let dir = Path::new(&static_content_dir);
    let mut app = tide::new();
    app.at("/")
        .serve_file(dir.join("index.html"))
        .with_context(|| format!("Cannot serve index.html from {static_content_dir}"))?;
    app.at("/static")
        .serve_dir(dir)
        .with_context(|| format!("Cannot serve {static_content_dir}"))?;
    app.listen(format!("0.0.0.0:{port}")).await?;
    Ok(())
}

pub fn run(config: ServerConfig) -> anyhow::Result<()> {
    // Limited buffer for data streaming from clients into the server. When this is full
    // because `ServerState::apply_event` isn't coping with the load, we start putting back
    // pressure on client websockets.
    let (tx, rx) = mpsc::sync_channel(100000);
    let tx_terminate = tx.clone();
    let clients = Arc::new(Mutex::new(Clients::new()));
    let clients_copy = Arc::clone(&clients);

    ctrlc::set_handler(move || {
        let _ = tx_terminate.send(IncomingEvent::Terminate);
    })
    .context("Error setting Ctrl-C handler")?;

    let options = config.server_options();
    let server_thread = thread::spawn(move || {
        let mut server_state = ServerState::new(options, clients_copy);
        for event in rx {
            let terminate = matches!(event, IncomingEvent::Terminate);
            server_state.apply_event(event);
            if terminate {
                return;
            }
        }
        error!("Unexpected end of events stream");
    });

    let websocket_addr = format!("0.0.0.0:{}", config.websocket_port);
    let listener = async_std::task::block_on(TcpListener::bind(&websocket_addr))
        .with_context(|| format!("Cannot listen on {websocket_addr}"))?;
    info!("Accepting game connections on {}", websocket_addr);
    async_std::task::spawn(accept_connections(listener, tx, clients));

    if let Some(http_port) = config.http_port {
        let static_content_dir = config.static_content_dir.clone();
        async_std::task::spawn(async move {
            if let Err(err) = run_tide(http_port, static_content_dir).await {
                error!("HTTP server failed: {:#}", err);
            }
        });
    }

    server_thread.join().map_err(|_| anyhow!("Server thread panicked"))
}
