// Browser client. The page owns the websocket and forwards raw JSON both ways; everything
// else goes through `WebClient`. Expected page elements:
//   - `.chessboard`: container for the 64 squares;
//   - `#role-string`: role of this connection;
//   - `#status-banner`: check / game over banner, hidden when empty;
//   - `#info-string`: last error or server notice.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod web_document;
pub mod web_error_handling;

use chess_relay::client::{ClientState, NotableEvent, StatusBanner};
use chess_relay::display::{DisplayCoord, display_squares, from_display_coord, is_light_square};
use chess_relay::piece::piece_to_pictogram;
use chess_relay::role::Role;
use wasm_bindgen::prelude::*;

use crate::web_document::{remove_all_children, web_document};
use crate::web_error_handling::JsResult;


#[wasm_bindgen]
pub struct WebClient {
    state: ClientState,
}

#[wasm_bindgen]
impl WebClient {
    pub fn new_client() -> WebClient { WebClient { state: ClientState::new() } }

    pub fn process_server_event(&mut self, event: &str) -> JsResult<()> {
        let server_event = serde_json::from_str(event)
            .map_err(|err| rust_error!("Cannot parse server event {}: {}", event, err))?;
        let notable = self
            .state
            .process_server_event(server_event)
            .map_err(|err| rust_error!("{:?}", err))?;
        let info = match notable {
            NotableEvent::MoveRejected(mv, reason) => {
                Some(format!("{} rejected: {:?}", mv, reason))
            }
            NotableEvent::NotYourTurn(mv) => Some(format!("{}: not your turn", mv)),
            NotableEvent::None
            | NotableEvent::RoleAssigned(_)
            | NotableEvent::MoveMade(_)
            | NotableEvent::GameOver(_) => None,
        };
        if let Some(info) = info {
            set_info_string(&info)?;
        }
        Ok(())
    }

    pub fn next_outgoing_event(&mut self) -> Option<String> {
        // Serializing plain enums never fails.
        self.state
            .next_outgoing_event()
            .map(|event| serde_json::to_string(&event).unwrap())
    }

    pub fn can_drag(&self, x: i8, y: i8) -> bool {
        from_display_coord(DisplayCoord { x, y }, self.state.orientation())
            .is_some_and(|coord| self.state.can_drag(coord))
    }

    // Coordinates come from the `data-x` / `data-y` attributes of the squares. Returns whether
    // the move was sent.
    pub fn drag_drop(&mut self, from_x: i8, from_y: i8, to_x: i8, to_y: i8) -> bool {
        self.state
            .drag_drop(DisplayCoord { x: from_x, y: from_y }, DisplayCoord { x: to_x, y: to_y })
    }

    pub fn dismiss_banner(&mut self) { self.state.dismiss_banner(); }

    pub fn render(&self) -> JsResult<()> {
        let document = web_document()?;
        let board_node = document.query_selector_existing(".chessboard")?;
        remove_all_children(&board_node)?;
        let orientation = self.state.orientation();
        let grid = self.state.local_mirror().grid();
        for q in display_squares() {
            let square = document.create_element("div")?;
            let class_list = square.class_list();
            class_list.add_1("square")?;
            class_list.add_1(if is_light_square(q) { "light" } else { "dark" })?;
            square.set_attribute("data-x", &q.x.to_string())?;
            square.set_attribute("data-y", &q.y.to_string())?;
            if let Some(coord) = from_display_coord(q, orientation) {
                square.set_attribute("data-square", &coord.to_algebraic())?;
                if let Some(piece) = grid.get(coord) {
                    let piece_node = document.create_element("span")?;
                    piece_node.class_list().add_1("piece")?;
                    piece_node.set_text_content(Some(&piece_to_pictogram(piece).to_string()));
                    if self.state.can_drag(coord) {
                        piece_node.set_attribute("draggable", "true")?;
                    }
                    square.append_child(&piece_node)?;
                }
            }
            board_node.append_child(&square)?;
        }

        let role_string = document.get_existing_element_by_id("role-string")?;
        role_string.set_text_content(Some(&role_text(self.state.role())));

        let banner_node = document.get_existing_element_by_id("status-banner")?;
        let banner_classes = banner_node.class_list();
        banner_classes.remove_2("persistent", "dismissible")?;
        match self.state.status_banner() {
            Some(banner) => {
                banner_node.set_text_content(Some(&banner.message()));
                banner_classes.add_1(banner_class(banner))?;
                banner_node.remove_attribute("hidden")?;
            }
            None => {
                banner_node.set_text_content(None);
                banner_node.set_attribute("hidden", "")?;
            }
        }
        Ok(())
    }
}

fn set_info_string(text: &str) -> JsResult<()> {
    let info_string = web_document()?.get_existing_element_by_id("info-string")?;
    info_string.set_text_content(Some(text));
    Ok(())
}

fn role_text(role: Option<Role>) -> String {
    match role {
        None => "Connecting...".to_owned(),
        Some(Role::Spectator) => "Spectating".to_owned(),
        Some(role) => format!("Playing {:?}", role),
    }
}

fn banner_class(banner: StatusBanner) -> &'static str {
    if banner.is_persistent() { "persistent" } else { "dismissible" }
}


#[cfg(test)]
mod tests {
    use chess_relay::board::ChessGameStatus;
    use chess_relay::event::ChessServerEvent;
    use chess_relay::force::Force;

    use super::*;

    fn send(client: &mut WebClient, event: ChessServerEvent) {
        let event = serde_json::to_string(&event).unwrap();
        client.state.process_server_event(serde_json::from_str(&event).unwrap()).unwrap();
    }

    #[test]
    fn drag_in_display_coordinates() {
        let mut client = WebClient::new_client();
        send(&mut client, ChessServerEvent::RoleAssigned { force: Force::Black });
        // Black sees its own pawns on the second row from the bottom.
        assert!(client.can_drag(0, 6));
        assert!(!client.can_drag(0, 1));
        assert!(!client.can_drag(9, 9));
        assert!(!client.drag_drop(3, 6, 3, 4));
        send(&mut client, ChessServerEvent::BoardState {
            fen: "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1".to_owned(),
        });
        assert!(client.drag_drop(3, 6, 3, 4));
        let event = client.next_outgoing_event().unwrap();
        assert_eq!(event, r#"{"MakeMove":{"mv":{"from":"e7","to":"e5","promotion":null}}}"#);
        assert!(client.next_outgoing_event().is_none());
    }

    #[test]
    fn banner_classes() {
        let status = ChessGameStatus::Victory(Force::White, chess_relay::VictoryReason::Checkmate);
        let mut client = WebClient::new_client();
        send(&mut client, ChessServerEvent::GameOver { status });
        assert_eq!(banner_class(client.state.status_banner().unwrap()), "persistent");
        assert_eq!(banner_class(StatusBanner::Check(Force::Black)), "dismissible");
        assert_eq!(role_text(Some(Role::White)), "Playing White");
    }
}
