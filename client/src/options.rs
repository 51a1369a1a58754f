//! Command-line options for the client binary.

use clap::Parser;

/// Relays input and draw state between a GUI and a robots game server.
#[derive(Parser, Debug, Clone)]
#[command(name = "robots-client", about = None, long_about = None)]
pub struct ClientOptions {
    /// Address the GUI's UDP socket listens on, e.g. `localhost:7890`.
    #[arg(short = 'd', long = "gui-address")]
    pub gui_address: String,

    /// Display name sent in this client's `Join` message.
    #[arg(short = 'n', long = "player-name")]
    pub player_name: String,

    /// Local UDP port bound for GUI traffic.
    #[arg(short = 'p', long = "port")]
    pub port: u16,

    /// Address of the game server's TCP listener, e.g. `localhost:2024`.
    #[arg(short = 's', long = "server-address")]
    pub server_address: String,
}
