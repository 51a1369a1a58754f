//! Command-line options for the server binary.

use clap::Parser;

/// Authoritatively simulates one game of Robots and serves it over TCP.
#[derive(Parser, Debug, Clone)]
#[command(name = "robots-server", about = None, long_about = None)]
pub struct ServerOptions {
    /// Turns a placed bomb ticks before exploding.
    #[arg(short = 'b', long = "bomb-timer")]
    pub bomb_timer: u16,

    /// Number of players the lobby waits for before starting a game.
    #[arg(short = 'c', long = "players-count", value_parser = clap::value_parser!(u8).range(1..=255))]
    pub players_count: u8,

    /// Milliseconds of wall-clock time per turn.
    #[arg(short = 'd', long = "turn-duration")]
    pub turn_duration: u64,

    /// Radius, in cells, of each explosion ray.
    #[arg(short = 'e', long = "explosion-radius")]
    pub explosion_radius: u16,

    /// Number of random blocks scattered at turn 0.
    #[arg(short = 'k', long = "initial-blocks")]
    pub initial_blocks: u16,

    /// Number of turns played after turn 0 before the game ends.
    #[arg(short = 'l', long = "game-length")]
    pub game_length: u16,

    /// Name advertised to clients in `Hello`.
    #[arg(short = 'n', long = "server-name")]
    pub server_name: String,

    /// TCP port to listen on (bound dual-stack IPv6).
    #[arg(short = 'p', long = "port")]
    pub port: u16,

    /// PRNG seed. Defaults to the current wall-clock epoch count if absent.
    #[arg(short = 's', long = "seed")]
    pub seed: Option<u32>,

    /// Grid width.
    #[arg(short = 'x', long = "size-x")]
    pub size_x: u16,

    /// Grid height.
    #[arg(short = 'y', long = "size-y")]
    pub size_y: u16,
}
