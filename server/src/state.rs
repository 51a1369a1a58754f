//! Shared state touched by more than one server thread: the live client
//! set, the per-socket intent map, and the broadcast/catch-up history.
//!
//! `history`'s `RwLock` doubles as the spec's `catching_up` guard: the
//! game loop takes it exclusively to append a turn and broadcast it; a
//! connecting client's handler takes it in shared mode for the whole of
//! its catch-up send, so a late joiner's history prefix can never be
//! split by a live broadcast landing mid-send.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::TcpStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use protocol::messages::{AcceptedPlayer, ClientMessage, GameStarted, Hello, Turn};
use protocol::model::{Bomb, BombId, Player, PlayerId, Position, Score};

/// Identifies one accepted TCP connection, independent of whether it has
/// joined a game yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(u64);

impl ClientId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

pub struct ClientEntry {
    pub stream: TcpStream,
    pub addr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    InGame,
}

/// Everything a newly-connecting client needs replayed to catch up, plus
/// the phase flag the connection handler branches on.
pub struct History {
    pub hello: Hello,
    pub phase: Phase,
    pub accepted_players: Vec<AcceptedPlayer>,
    pub game_started: Option<GameStarted>,
    pub turns: Vec<Turn>,
}

impl History {
    pub fn new(hello: Hello) -> Self {
        Self {
            hello,
            phase: Phase::Lobby,
            accepted_players: Vec::new(),
            game_started: None,
            turns: Vec::new(),
        }
    }
}

pub struct Shared {
    /// `clients_mutex` in the design: the live client set.
    pub clients: Mutex<HashMap<ClientId, ClientEntry>>,
    /// `client_messages_mutex`: each socket's latest unprocessed intent.
    pub intents: Mutex<HashMap<ClientId, ClientMessage>>,
    /// `catching_up`, combined with the data it guards.
    pub history: RwLock<History>,
}

impl Shared {
    pub fn new(hello: Hello) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            intents: Mutex::new(HashMap::new()),
            history: RwLock::new(History::new(hello)),
        }
    }
}

/// The authoritative game state. Owned exclusively by the game-loop
/// thread; never shared behind a lock.
pub struct World {
    pub players: BTreeMap<PlayerId, Player>,
    pub player_positions: BTreeMap<PlayerId, Position>,
    pub blocks: BTreeSet<Position>,
    pub ticking_bombs: BTreeMap<BombId, Bomb>,
    pub scores: BTreeMap<PlayerId, Score>,
    pub next_bomb_id: BombId,
    /// Which connection is playing which `PlayerId`, so the game loop can
    /// look up a player's latest intent by socket.
    pub player_clients: BTreeMap<PlayerId, ClientId>,
}

impl World {
    pub fn new() -> Self {
        Self {
            players: BTreeMap::new(),
            player_positions: BTreeMap::new(),
            blocks: BTreeSet::new(),
            ticking_bombs: BTreeMap::new(),
            scores: BTreeMap::new(),
            next_bomb_id: 0,
            player_clients: BTreeMap::new(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
