//! Standalone client binary: relays GUI input to a robots game server and
//! the server's turn broadcasts back to the GUI as draw messages.
//!
//! Usage:
//!   robots-client --gui-address localhost:7890 --player-name alice \
//!     --port 7891 --server-address localhost:2024

use std::process::exit;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use protocol::addr::split_address;
use protocol::error::ConfigError;
use tracing::{error, info};

use client::gui_link::GuiLink;
use client::input;
use client::interp::WorldProjector;
use client::options::ClientOptions;
use client::server_link::ServerLink;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let opts = parse_options();

    if let Err(e) = split_address(&opts.server_address) {
        eprintln!("{e}");
        exit(1);
    }
    if let Err(e) = split_address(&opts.gui_address) {
        eprintln!("{e}");
        exit(1);
    }

    let (mut server, server_writer) = ServerLink::connect(&opts.server_address).unwrap_or_else(|e| {
        eprintln!("{}", ConfigError::Connect(e));
        exit(1);
    });

    let gui = Arc::new(GuiLink::bind(opts.port, &opts.gui_address).unwrap_or_else(|e| {
        eprintln!("{}", ConfigError::Bind(e));
        exit(1);
    }));

    info!(server = %opts.server_address, gui = %opts.gui_address, "client connected");

    let awaiting_join = Arc::new(AtomicBool::new(true));
    {
        let gui = Arc::clone(&gui);
        let awaiting_join = Arc::clone(&awaiting_join);
        let player_name = opts.player_name.clone();
        thread::spawn(move || input::run(gui, server_writer, awaiting_join, player_name));
    }

    let mut projector = WorldProjector::new(awaiting_join);

    loop {
        match server.recv() {
            Ok(msg) => {
                if let Some(draw) = projector.apply(msg) {
                    if let Err(e) = gui.send_draw(&draw) {
                        error!(%e, "failed to send draw message to gui");
                    }
                }
            }
            Err(e) => {
                eprintln!("Connection to the server closed: {e}");
                exit(1);
            }
        }
    }
}

fn parse_options() -> ClientOptions {
    match ClientOptions::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                e.exit();
            }
            eprintln!("{e}");
            exit(1);
        }
    }
}
