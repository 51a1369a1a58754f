//! The message grammar carried over each of the three wire links:
//! server<->client (TCP), client<->GUI (UDP).

use std::collections::BTreeMap;

use crate::model::{BombId, Direction, Player, PlayerId, Position, Score};

/// Sent server -> client exactly once, before any other server message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    pub server_name: String,
    pub players_count: u8,
    pub size_x: u16,
    pub size_y: u16,
    pub game_length: u16,
    pub explosion_radius: u16,
    pub bomb_timer: u16,
}

/// Sent once per player as they join the lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedPlayer {
    pub id: PlayerId,
    pub player: Player,
}

/// Sent once, when the lobby fills and the game begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStarted {
    pub players: BTreeMap<PlayerId, Player>,
}

/// One simulation step's worth of events, broadcast every turn in-game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub turn: u16,
    pub events: Vec<Event>,
}

/// Sent once, when `game_length` turns have elapsed; returns the server to
/// the lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEnded {
    pub scores: BTreeMap<PlayerId, Score>,
}

/// Server -> client sum type. Tags: Hello=0, AcceptedPlayer=1,
/// GameStarted=2, Turn=3, GameEnded=4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Hello(Hello),
    AcceptedPlayer(AcceptedPlayer),
    GameStarted(GameStarted),
    Turn(Turn),
    GameEnded(GameEnded),
}

/// A bomb was placed by a player's action this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BombPlaced {
    pub id: BombId,
    pub position: Position,
}

/// A ticking bomb's timer reached zero. `robots_destroyed` and
/// `blocks_destroyed` may contain duplicates (one entry per ray that hit
/// them); consumers must treat both as sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BombExploded {
    pub id: BombId,
    pub robots_destroyed: Vec<PlayerId>,
    pub blocks_destroyed: Vec<Position>,
}

/// A player's position changed, whether by their own move, a respawn, or
/// turn 0's initial placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMoved {
    pub id: PlayerId,
    pub position: Position,
}

/// A block appeared at a cell, whether from a player's action or turn 0's
/// initial scatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPlaced {
    pub position: Position,
}

/// One event inside a [`Turn`]. Tags: BombPlaced=0, BombExploded=1,
/// PlayerMoved=2, BlockPlaced=3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BombPlaced(BombPlaced),
    BombExploded(BombExploded),
    PlayerMoved(PlayerMoved),
    BlockPlaced(BlockPlaced),
}

/// A client asks to join the lobby under a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub name: String,
}

/// Client -> server sum type. Tags: Join=0, PlaceBomb=1, PlaceBlock=2,
/// Move=3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    Join(Join),
    PlaceBomb,
    PlaceBlock,
    Move(Direction),
}

/// GUI -> client sum type, carried over UDP. Tags: PlaceBomb=0,
/// PlaceBlock=1, Move=2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMessage {
    PlaceBomb,
    PlaceBlock,
    Move(Direction),
}

/// The client -> GUI lobby draw payload: everything known before a game
/// has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lobby {
    pub server_name: String,
    pub players_count: u8,
    pub size_x: u16,
    pub size_y: u16,
    pub game_length: u16,
    pub explosion_radius: u16,
    pub bomb_timer: u16,
    pub players: BTreeMap<PlayerId, Player>,
}

/// The client -> GUI in-game draw payload: a full snapshot of the
/// projected world after processing one [`Turn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub server_name: String,
    pub size_x: u16,
    pub size_y: u16,
    pub game_length: u16,
    pub turn: u16,
    pub players: BTreeMap<PlayerId, Player>,
    pub player_positions: BTreeMap<PlayerId, Position>,
    pub blocks: Vec<Position>,
    pub bombs: Vec<crate::model::Bomb>,
    pub explosions: Vec<Position>,
    pub scores: BTreeMap<PlayerId, Score>,
}

/// Client -> GUI sum type. Tags: Lobby=0, Game=1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawMessage {
    Lobby(Lobby),
    Game(Game),
}
