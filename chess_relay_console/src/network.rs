// Improvement potential: Switch from JSON to a binary format.

use std::io;
use std::net::TcpStream;

use async_tungstenite::WebSocketStream;
use futures_io::{AsyncRead, AsyncWrite};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Serialize, de};
use tungstenite::protocol::Role;
use tungstenite::{Message, WebSocket};


pub const PORT: u16 = 14361;


#[derive(Debug)]
pub enum CommunicationError {
    ConnectionClosed,
    Socket(tungstenite::Error),
    Serde(serde_json::Error),
    Protocol(String),
}

fn serialize<T: Serialize>(obj: &T) -> Result<Message, CommunicationError> {
    let serialized = serde_json::to_string(obj).map_err(CommunicationError::Serde)?;
    Ok(Message::text(serialized))
}

// Returns `None` for control messages that carry no payload.
fn deserialize<T: de::DeserializeOwned>(msg: Message) -> Result<Option<T>, CommunicationError> {
    match msg {
        Message::Text(text) => {
            serde_json::from_str(text.as_str()).map(Some).map_err(CommunicationError::Serde)
        }
        Message::Close(_) => Err(CommunicationError::ConnectionClosed),
        Message::Ping(_) | Message::Pong(_) => Ok(None),
        msg => Err(CommunicationError::Protocol(format!("Expected text, got {:?}", msg))),
    }
}

fn socket_error(err: tungstenite::Error) -> CommunicationError {
    match err {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            CommunicationError::ConnectionClosed
        }
        err => CommunicationError::Socket(err),
    }
}

pub fn write_obj<T, S>(socket: &mut WebSocket<S>, obj: &T) -> Result<(), CommunicationError>
where
    T: Serialize,
    S: io::Read + io::Write,
{
    socket.send(serialize(obj)?).map_err(socket_error)
}

pub fn read_obj<T, S>(socket: &mut WebSocket<S>) -> Result<T, CommunicationError>
where
    T: de::DeserializeOwned,
    S: io::Read + io::Write,
{
    loop {
        let msg = socket.read().map_err(socket_error)?;
        if let Some(obj) = deserialize(msg)? {
            return Ok(obj);
        }
    }
}

pub async fn write_obj_async<T, S>(
    socket: &mut SplitSink<WebSocketStream<S>, Message>, obj: &T,
) -> Result<(), CommunicationError>
where
    T: Serialize,
    S: AsyncRead + AsyncWrite + Unpin,
{
    socket.send(serialize(obj)?).await.map_err(socket_error)
}

pub async fn read_obj_async<T, S>(
    socket: &mut SplitStream<WebSocketStream<S>>,
) -> Result<T, CommunicationError>
where
    T: de::DeserializeOwned,
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let msg = socket.next().await.ok_or(CommunicationError::ConnectionClosed)?;
        if let Some(obj) = deserialize(msg.map_err(socket_error)?)? {
            return Ok(obj);
        }
    }
}

// Improvement potential. Instead of cloning the socket, consider calling
//   `TcpStream::set_nonblocking` and doing reads and writes in the same thread.
pub fn clone_websocket(
    socket: &WebSocket<TcpStream>, role: Role,
) -> io::Result<WebSocket<TcpStream>> {
    let stream = socket.get_ref().try_clone()?;
    let config = *socket.get_config();
    Ok(WebSocket::from_raw_socket(stream, role, Some(config)))
}


#[cfg(test)]
mod tests {
    use chess_relay::event::{ChessClientEvent, ChessServerEvent, MoveRequest};

    use super::*;

    #[test]
    fn text_messages_carry_events() {
        let mv = MoveRequest::parse("e2e4").unwrap();
        let msg = serialize(&ChessClientEvent::MakeMove { mv: mv.clone() }).unwrap();
        let event: Option<ChessClientEvent> = deserialize(msg).unwrap();
        assert!(matches!(event, Some(ChessClientEvent::MakeMove { mv: got }) if got == mv));
    }

    #[test]
    fn control_messages() {
        let ping: Option<ChessServerEvent> = deserialize(Message::Ping(vec![1].into())).unwrap();
        assert!(ping.is_none());
        assert!(matches!(
            deserialize::<ChessServerEvent>(Message::Close(None)),
            Err(CommunicationError::ConnectionClosed)
        ));
        assert!(matches!(
            deserialize::<ChessServerEvent>(Message::binary(vec![0])),
            Err(CommunicationError::Protocol(_))
        ));
    }
}
