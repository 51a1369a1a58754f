//! `InputRelay` (spec §4.5): a thread that reads GUI input datagrams and
//! forwards a corresponding `ClientMessage` to the server, subject to
//! lobby-vs-game mode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use protocol::messages::{ClientMessage, InputMessage, Join};
use tracing::debug;

use crate::gui_link::GuiLink;
use crate::server_link::ServerWriter;

/// Runs forever on the calling thread. Intended to be spawned onto its
/// own `std::thread`; send failures on the TCP socket are swallowed here
/// (spec §4.5) — the main thread's own read will surface a disconnect.
pub fn run(
    gui: Arc<GuiLink>,
    mut server: ServerWriter,
    awaiting_join: Arc<AtomicBool>,
    player_name: String,
) {
    loop {
        let input = match gui.recv_input() {
            Ok(Some(msg)) => msg,
            Ok(None) => continue,
            Err(err) => {
                debug!(%err, "gui recv failed, retrying");
                continue;
            }
        };

        let client_message = if awaiting_join.load(Ordering::Acquire) {
            ClientMessage::Join(Join {
                name: player_name.clone(),
            })
        } else {
            match input {
                InputMessage::PlaceBomb => ClientMessage::PlaceBomb,
                InputMessage::PlaceBlock => ClientMessage::PlaceBlock,
                InputMessage::Move(dir) => ClientMessage::Move(dir),
            }
        };

        let _ = server.send(&client_message);
    }
}
