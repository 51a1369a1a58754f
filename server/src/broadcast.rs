//! Fan-out of a single serialized message to every live client.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

use protocol::codec::encode_to_vec;
use protocol::messages::ServerMessage;

use crate::state::{ClientEntry, ClientId};

/// Serializes `msg` once, then writes it to every registered socket.
/// A write failure on one socket is swallowed: that connection's handler
/// will notice on its next read and reap it from the client set.
pub fn broadcast(clients: &Mutex<HashMap<ClientId, ClientEntry>>, msg: &ServerMessage) {
    let bytes = encode_to_vec(msg);
    let clients = clients.lock().unwrap();
    for entry in clients.values() {
        let _ = (&entry.stream).write_all(&bytes);
    }
}
