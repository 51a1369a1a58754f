//! Test-only helper for spinning up a full server (acceptor + game loop
//! threads) bound to an ephemeral loopback port, so integration tests can
//! drive it over real TCP without going through the CLI/binary.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;

use protocol::messages::Hello;

use crate::connection::handle_connection;
use crate::gameloop;
use crate::options::ServerOptions;
use crate::state::Shared;

/// Spawns the acceptor and game-loop threads for `opts` on an ephemeral
/// `127.0.0.1` port and returns that address plus the shared state, for
/// tests that want to peek at the live client set.
pub fn spawn_ephemeral(opts: ServerOptions) -> std::io::Result<(SocketAddr, Arc<Shared>)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let hello = Hello {
        server_name: opts.server_name.clone(),
        players_count: opts.players_count,
        size_x: opts.size_x,
        size_y: opts.size_y,
        game_length: opts.game_length,
        explosion_radius: opts.explosion_radius,
        bomb_timer: opts.bomb_timer,
    };
    let shared = Arc::new(Shared::new(hello));
    let opts = Arc::new(opts);

    {
        let shared = Arc::clone(&shared);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let shared = Arc::clone(&shared);
                thread::spawn(move || handle_connection(stream, shared));
            }
        });
    }

    {
        let shared = Arc::clone(&shared);
        thread::spawn(move || gameloop::run(opts, shared));
    }

    Ok((addr, shared))
}
