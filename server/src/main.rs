//! Standalone server binary: authoritatively simulates one room's game of
//! Robots and serves it to TCP clients.
//!
//! Usage:
//!   robots-server --bomb-timer 5 --players-count 4 --turn-duration 500 \
//!     --explosion-radius 2 --initial-blocks 20 --game-length 50 \
//!     --server-name "arena" --port 2024 --size-x 20 --size-y 20

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;

use clap::Parser;
use protocol::error::ConfigError;
use protocol::messages::Hello;
use tracing::info;

use server::connection::handle_connection;
use server::gameloop;
use server::options::ServerOptions;
use server::state::Shared;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let opts = parse_options();

    let hello = Hello {
        server_name: opts.server_name.clone(),
        players_count: opts.players_count,
        size_x: opts.size_x,
        size_y: opts.size_y,
        game_length: opts.game_length,
        explosion_radius: opts.explosion_radius,
        bomb_timer: opts.bomb_timer,
    };

    let listener = bind_dual_stack(opts.port).unwrap_or_else(|e| {
        eprintln!("{}", ConfigError::Bind(e));
        std::process::exit(1);
    });

    info!(port = opts.port, name = %opts.server_name, "server listening");

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

    gameloop::run(opts, shared);
}

fn parse_options() -> ServerOptions {
    match ServerOptions::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                e.exit();
            }
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Binds an IPv6 dual-stack TCP listener (spec §6): `IPV6_V6ONLY` is
/// cleared so both `::`-mapped IPv4 and native IPv6 peers can connect.
fn bind_dual_stack(port: u16) -> std::io::Result<TcpListener> {
    use socket2::{Domain, Socket, Type};

    let socket = Socket::new(Domain::IPV6, Type::STREAM, None)?;
    socket.set_only_v6(false).ok();
    let addr: SocketAddr = format!("[::]:{port}").parse().expect("valid bind address");
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(false)?;
    Ok(socket.into())
}
