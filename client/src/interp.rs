//! `WorldProjector` (spec §4.6): consumes `ServerMessage`s and maintains
//! the client's derived projection of the game world, emitting a
//! `DrawMessage` after each update.
//!
//! The ray cast here intentionally mirrors the server's
//! (`server::gameloop::compute_turn`) so explosion shading lines up, but
//! it never needs to agree with the server on the destroyed-robots set,
//! which is authoritative from the wire.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use protocol::messages::{
    AcceptedPlayer, BlockPlaced, BombExploded, BombPlaced, DrawMessage, Event, Game, GameStarted,
    Hello, Lobby, PlayerMoved, ServerMessage, Turn,
};
use protocol::model::{Bomb, BombId, Player, PlayerId, Position, Score, RAYS};

pub struct WorldProjector {
    hello: Option<Hello>,
    players: BTreeMap<PlayerId, Player>,
    scores: BTreeMap<PlayerId, Score>,
    player_positions: BTreeMap<PlayerId, Position>,
    blocks: BTreeSet<Position>,
    ticking_bombs: BTreeMap<BombId, Bomb>,
    explosions: BTreeSet<Position>,
    game_turn: u16,
    awaiting_join: Arc<AtomicBool>,
}

impl WorldProjector {
    /// Sets `awaiting_join` so the `InputRelay` knows to send `Join` on
    /// the very first keypress, before any server message has arrived.
    pub fn new(awaiting_join: Arc<AtomicBool>) -> Self {
        awaiting_join.store(true, Ordering::Release);
        Self {
            hello: None,
            players: BTreeMap::new(),
            scores: BTreeMap::new(),
            player_positions: BTreeMap::new(),
            blocks: BTreeSet::new(),
            ticking_bombs: BTreeMap::new(),
            explosions: BTreeSet::new(),
            game_turn: 0,
            awaiting_join,
        }
    }

    /// Applies one `ServerMessage`, returning the `DrawMessage` to forward
    /// to the GUI. `GameStarted` alone produces none — the server's
    /// immediately following Turn 0 does.
    pub fn apply(&mut self, msg: ServerMessage) -> Option<DrawMessage> {
        match msg {
            ServerMessage::Hello(hello) => {
                self.hello = Some(hello);
                Some(self.make_lobby())
            }
            ServerMessage::AcceptedPlayer(AcceptedPlayer { id, player }) => {
                self.players.insert(id, player);
                self.scores.insert(id, 0);
                Some(self.make_lobby())
            }
            ServerMessage::GameStarted(GameStarted { players }) => {
                self.scores = players.keys().map(|&id| (id, 0)).collect();
                self.players = players;
                self.awaiting_join.store(false, Ordering::Release);
                None
            }
            ServerMessage::Turn(turn) => Some(self.apply_turn(turn)),
            ServerMessage::GameEnded(_) => {
                self.players.clear();
                self.player_positions.clear();
                self.blocks.clear();
                self.ticking_bombs.clear();
                self.explosions.clear();
                self.scores.clear();
                self.game_turn = 0;
                self.awaiting_join.store(true, Ordering::Release);
                Some(self.make_lobby())
            }
        }
    }

    fn apply_turn(&mut self, turn: Turn) -> DrawMessage {
        self.game_turn = turn.turn;
        self.explosions.clear();

        for bomb in self.ticking_bombs.values_mut() {
            bomb.timer -= 1;
        }

        let hello = self
            .hello
            .clone()
            .expect("Hello precedes every message (spec invariant)");
        let mut exploded_players = BTreeSet::new();

        for event in turn.events {
            match event {
                Event::BombPlaced(BombPlaced { id, position }) => {
                    self.ticking_bombs.insert(
                        id,
                        Bomb {
                            position,
                            timer: hello.bomb_timer,
                        },
                    );
                }
                Event::BombExploded(BombExploded {
                    id,
                    robots_destroyed,
                    blocks_destroyed,
                }) => {
                    if let Some(bomb) = self.ticking_bombs.get(&id) {
                        let destroyed: BTreeSet<Position> =
                            blocks_destroyed.iter().copied().collect();
                        for (dx, dy) in RAYS {
                            for i in 0..=hello.explosion_radius as i32 {
                                let x = bomb.position.x as i32 + i * dx;
                                let y = bomb.position.y as i32 + i * dy;
                                if x < 0
                                    || x >= hello.size_x as i32
                                    || y < 0
                                    || y >= hello.size_y as i32
                                {
                                    break;
                                }
                                let pos = Position::new(x as u16, y as u16);
                                self.explosions.insert(pos);
                                if destroyed.contains(&pos) {
                                    break;
                                }
                            }
                        }
                    }
                    self.ticking_bombs.remove(&id);
                    exploded_players.extend(robots_destroyed);
                    for pos in blocks_destroyed {
                        self.blocks.remove(&pos);
                    }
                }
                Event::PlayerMoved(PlayerMoved { id, position }) => {
                    self.player_positions.insert(id, position);
                }
                Event::BlockPlaced(BlockPlaced { position }) => {
                    self.blocks.insert(position);
                }
            }
        }

        for pid in exploded_players {
            *self.scores.entry(pid).or_insert(0) += 1;
        }

        self.make_game()
    }

    fn make_lobby(&self) -> DrawMessage {
        let hello = self.hello.clone().expect("Hello precedes every draw");
        DrawMessage::Lobby(Lobby {
            server_name: hello.server_name,
            players_count: hello.players_count,
            size_x: hello.size_x,
            size_y: hello.size_y,
            game_length: hello.game_length,
            explosion_radius: hello.explosion_radius,
            bomb_timer: hello.bomb_timer,
            players: self.players.clone(),
        })
    }

    fn make_game(&self) -> DrawMessage {
        let hello = self.hello.clone().expect("Hello precedes every draw");
        DrawMessage::Game(Game {
            server_name: hello.server_name,
            size_x: hello.size_x,
            size_y: hello.size_y,
            game_length: hello.game_length,
            turn: self.game_turn,
            players: self.players.clone(),
            player_positions: self.player_positions.clone(),
            blocks: self.blocks.iter().copied().collect(),
            bombs: self.ticking_bombs.values().copied().collect(),
            explosions: self.explosions.iter().copied().collect(),
            scores: self.scores.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    fn hello() -> Hello {
        Hello {
            server_name: "srv".to_string(),
            players_count: 2,
            size_x: 10,
            size_y: 10,
            game_length: 5,
            explosion_radius: 2,
            bomb_timer: 3,
        }
    }

    fn player(name: &str) -> Player {
        Player {
            name: name.to_string(),
            address: "1.2.3.4:9".to_string(),
        }
    }

    #[test]
    fn lobby_then_game_draw_sequence_matches_scenario() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut projector = WorldProjector::new(Arc::clone(&flag));

        let d1 = projector.apply(ServerMessage::Hello(hello())).unwrap();
        assert!(matches!(d1, DrawMessage::Lobby(_)));

        let d2 = projector
            .apply(ServerMessage::AcceptedPlayer(AcceptedPlayer {
                id: 0,
                player: player("alice"),
            }))
            .unwrap();
        assert!(matches!(d2, DrawMessage::Lobby(_)));

        let mut players = BTreeMap::new();
        players.insert(0, player("alice"));
        players.insert(1, player("bob"));
        assert!(projector
            .apply(ServerMessage::GameStarted(GameStarted { players }))
            .is_none());
        assert!(!flag.load(Ordering::Acquire));

        let turn0 = Turn {
            turn: 0,
            events: vec![
                Event::PlayerMoved(PlayerMoved {
                    id: 0,
                    position: Position::new(1, 1),
                }),
                Event::PlayerMoved(PlayerMoved {
                    id: 1,
                    position: Position::new(2, 2),
                }),
                Event::BlockPlaced(BlockPlaced {
                    position: Position::new(5, 5),
                }),
            ],
        };
        let draw = projector.apply(ServerMessage::Turn(turn0)).unwrap();
        match draw {
            DrawMessage::Game(game) => {
                assert_eq!(game.player_positions.len(), 2);
                assert_eq!(game.blocks, vec![Position::new(5, 5)]);
                assert_eq!(game.turn, 0);
            }
            other => panic!("expected Game draw, got {other:?}"),
        }
    }

    #[test]
    fn explosion_rays_stop_at_block_and_grid_edge() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut projector = WorldProjector::new(flag);
        projector.apply(ServerMessage::Hello(hello()));

        let mut players = BTreeMap::new();
        players.insert(0, player("alice"));
        projector.apply(ServerMessage::GameStarted(GameStarted { players }));

        // Place the bomb at (1, 1) with a block at (3, 1) along the +x ray.
        let place = Turn {
            turn: 0,
            events: vec![
                Event::PlayerMoved(PlayerMoved {
                    id: 0,
                    position: Position::new(1, 1),
                }),
                Event::BombPlaced(BombPlaced {
                    id: 7,
                    position: Position::new(1, 1),
                }),
                Event::BlockPlaced(BlockPlaced {
                    position: Position::new(3, 1),
                }),
            ],
        };
        projector.apply(ServerMessage::Turn(place));

        let explode = Turn {
            turn: 3,
            events: vec![Event::BombExploded(BombExploded {
                id: 7,
                robots_destroyed: vec![0],
                blocks_destroyed: vec![Position::new(3, 1)],
            })],
        };
        let draw = projector.apply(ServerMessage::Turn(explode)).unwrap();
        match draw {
            DrawMessage::Game(game) => {
                // +x ray from (1,1): (1,1),(2,1),(3,1) [block, ray stops]
                assert!(game.explosions.contains(&Position::new(1, 1)));
                assert!(game.explosions.contains(&Position::new(2, 1)));
                assert!(game.explosions.contains(&Position::new(3, 1)));
                assert!(!game.explosions.contains(&Position::new(4, 1)));
                assert_eq!(*game.scores.get(&0).unwrap(), 1);
                assert!(!game.blocks.contains(&Position::new(3, 1)));
            }
            other => panic!("expected Game draw, got {other:?}"),
        }
    }

    #[test]
    fn game_ended_resets_to_empty_lobby_and_sets_awaiting_join() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut projector = WorldProjector::new(Arc::clone(&flag));
        flag.store(false, Ordering::Release);
        projector.apply(ServerMessage::Hello(hello()));

        let mut scores = BTreeMap::new();
        scores.insert(0, 2u32);
        let draw = projector
            .apply(ServerMessage::GameEnded(protocol::messages::GameEnded { scores }))
            .unwrap();
        match draw {
            DrawMessage::Lobby(lobby) => assert!(lobby.players.is_empty()),
            other => panic!("expected Lobby draw, got {other:?}"),
        }
        assert!(flag.load(Ordering::Acquire));
    }
}
