use chess_relay::server::ServerOptions;
use serde::{Deserialize, Serialize};

use crate::network;


// Example:
//   http_port: 8080
//   websocket_port: 14361
//   static_content_dir: "./static"
//   notify_out_of_turn: false
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    // Serves the web client. Disabled when `None`.
    pub http_port: Option<u16>,
    pub websocket_port: u16,
    // Must contain "index.html"; everything else is served under "/static".
    pub static_content_dir: String,
    pub notify_out_of_turn: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            http_port: Some(8080),
            websocket_port: network::PORT,
            static_content_dir: "./static".to_owned(),
            notify_out_of_turn: false,
        }
    }
}

impl ServerConfig {
    pub fn server_options(&self) -> ServerOptions {
        ServerOptions { notify_out_of_turn: self.notify_out_of_turn }
    }
}
