//! Per-connection handler thread: catch-up send, registration, then an
//! intent-reading loop until the socket fails.

use std::net::TcpStream;
use std::sync::Arc;

use protocol::codec::{decode, encode_to_vec};
use protocol::frame::FrameReader;
use protocol::messages::ServerMessage;
use tracing::{debug, info};

use crate::state::{ClientEntry, ClientId, Phase, Shared};
use std::io::Write;

pub fn handle_connection(stream: TcpStream, shared: Arc<Shared>) {
    let _ = stream.set_nodelay(true);
    let addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let client_id = ClientId::next();

    let write_half = match stream.try_clone() {
        Ok(s) => s,
        Err(_) => return,
    };

    {
        // Shared mode: the spec's catch-up guard. Held for the whole
        // send so a live broadcast can't interleave into this prefix.
        let history = shared.history.read().unwrap();
        let mut w = &write_half;

        if w.write_all(&encode_to_vec(&ServerMessage::Hello(history.hello.clone())))
            .is_err()
        {
            return;
        }

        match history.phase {
            Phase::Lobby => {
                for accepted in &history.accepted_players {
                    if w
                        .write_all(&encode_to_vec(&ServerMessage::AcceptedPlayer(accepted.clone())))
                        .is_err()
                    {
                        return;
                    }
                }
            }
            Phase::InGame => {
                if let Some(game_started) = &history.game_started {
                    if w
                        .write_all(&encode_to_vec(&ServerMessage::GameStarted(game_started.clone())))
                        .is_err()
                    {
                        return;
                    }
                }
                for turn in &history.turns {
                    if w
                        .write_all(&encode_to_vec(&ServerMessage::Turn(turn.clone())))
                        .is_err()
                    {
                        return;
                    }
                }
            }
        }

        shared
            .clients
            .lock()
            .unwrap()
            .insert(client_id, ClientEntry { stream: write_half, addr: addr.clone() });
    }

    info!(%addr, "client caught up and registered");

    let mut reader = FrameReader::new(stream);
    loop {
        match decode(&mut reader) {
            Ok(msg) => {
                shared.intents.lock().unwrap().insert(client_id, msg);
            }
            Err(err) => {
                debug!(%addr, %err, "connection closed");
                break;
            }
        }
    }

    shared.clients.lock().unwrap().remove(&client_id);
    shared.intents.lock().unwrap().remove(&client_id);
}
