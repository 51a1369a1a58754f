//! The single authoritative simulation thread (spec §4.4): owns all
//! mutable game state and alternates between lobby and in-game phases
//! forever. Broadcasts and history appends happen under `shared.history`'s
//! write lock, which doubles as the spec's catch-up guard, so a late
//! joiner's replayed prefix can never be split by a live broadcast.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use protocol::messages::{
    AcceptedPlayer, BlockPlaced, BombExploded, BombPlaced, ClientMessage, Event, GameEnded,
    GameStarted, Join, PlayerMoved, ServerMessage, Turn,
};
use protocol::model::{Bomb, Player, Position, RAYS};
use protocol::rng::MinStdRand;

use crate::broadcast::broadcast;
use crate::options::ServerOptions;
use crate::state::{Phase, Shared, World};

/// Runs the lobby/in-game cycle forever.
pub fn run(opts: Arc<ServerOptions>, shared: Arc<Shared>) -> ! {
    let mut rng = MinStdRand::new(opts.seed.unwrap_or_else(epoch_seed));

    loop {
        let mut world = World::new();
        run_lobby(&opts, &shared, &mut world);
        run_game(&opts, &shared, &mut world, &mut rng);
    }
}

fn epoch_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(1)
}

fn is_legal(x: i32, y: i32, size_x: u16, size_y: u16) -> bool {
    x >= 0 && x < size_x as i32 && y >= 0 && y < size_y as i32
}

/// Waits for `players_count` distinct sockets to send `Join`, assigning
/// sequential `PlayerId`s in connection order and broadcasting each
/// acceptance as it happens. Returns once `GameStarted` has been sent.
fn run_lobby(opts: &ServerOptions, shared: &Shared, world: &mut World) {
    loop {
        let mut pending: Vec<_> = {
            let mut intents = shared.intents.lock().unwrap();
            intents.drain().collect()
        };
        // Connection order, so acceptance order is deterministic even
        // though the intent map itself has no ordering guarantee.
        pending.sort_by_key(|(id, _)| *id);

        for (client_id, msg) in pending {
            if world.player_clients.values().any(|c| *c == client_id) {
                continue;
            }
            let ClientMessage::Join(Join { name }) = msg else {
                continue;
            };

            let address = {
                let clients = shared.clients.lock().unwrap();
                match clients.get(&client_id) {
                    Some(entry) => entry.addr.clone(),
                    None => continue,
                }
            };

            let player_id = world.players.len() as u8;
            let player = Player { name, address };
            world.players.insert(player_id, player.clone());
            world.player_clients.insert(player_id, client_id);

            let accepted = AcceptedPlayer {
                id: player_id,
                player,
            };
            {
                let mut history = shared.history.write().unwrap();
                history.accepted_players.push(accepted.clone());
                broadcast(&shared.clients, &ServerMessage::AcceptedPlayer(accepted));
            }

            if world.players.len() == opts.players_count as usize {
                start_game(shared, world);
                return;
            }
        }

        thread::sleep(Duration::from_millis(5));
    }
}

fn start_game(shared: &Shared, world: &World) {
    let game_started = GameStarted {
        players: world.players.clone(),
    };
    let mut history = shared.history.write().unwrap();
    history.game_started = Some(game_started.clone());
    history.phase = Phase::InGame;
    broadcast(&shared.clients, &ServerMessage::GameStarted(game_started));
}

fn run_game(opts: &ServerOptions, shared: &Shared, world: &mut World, rng: &mut MinStdRand) {
    let turn0 = generate_turn_zero(opts, world, rng);
    append_and_broadcast(shared, turn0);

    for turn_index in 0..opts.game_length {
        thread::sleep(Duration::from_millis(opts.turn_duration));
        let turn = compute_turn(opts, shared, world, rng, turn_index + 1);
        append_and_broadcast(shared, turn);
    }

    end_game(shared, world);
}

fn generate_turn_zero(opts: &ServerOptions, world: &mut World, rng: &mut MinStdRand) -> Turn {
    let mut events = Vec::new();

    for player_id in 0..opts.players_count {
        let pos = rng.generate_position(opts.size_x, opts.size_y);
        world.player_positions.insert(player_id, pos);
        world.scores.insert(player_id, 0);
        events.push(Event::PlayerMoved(PlayerMoved {
            id: player_id,
            position: pos,
        }));
    }

    for _ in 0..opts.initial_blocks {
        let pos = rng.generate_position(opts.size_x, opts.size_y);
        if world.blocks.contains(&pos) {
            continue;
        }
        world.blocks.insert(pos);
        events.push(Event::BlockPlaced(BlockPlaced { position: pos }));
    }

    Turn { turn: 0, events }
}

fn compute_turn(
    opts: &ServerOptions,
    shared: &Shared,
    world: &mut World,
    rng: &mut MinStdRand,
    turn_number: u16,
) -> Turn {
    let mut events = Vec::new();
    let mut exploded_players = BTreeSet::new();
    let mut exploded_blocks = BTreeSet::new();

    // 1. Bomb ticking.
    let timed_out: Vec<_> = {
        for bomb in world.ticking_bombs.values_mut() {
            bomb.timer -= 1;
        }
        world
            .ticking_bombs
            .iter()
            .filter(|(_, b)| b.timer == 0)
            .map(|(&id, _)| id)
            .collect()
    };
    for id in timed_out {
        let bomb = world.ticking_bombs.remove(&id).unwrap();
        let mut robots_destroyed = Vec::new();
        let mut blocks_destroyed = Vec::new();

        for (dx, dy) in RAYS {
            for i in 0..=opts.explosion_radius as i32 {
                let x = bomb.position.x as i32 + i * dx;
                let y = bomb.position.y as i32 + i * dy;
                if !is_legal(x, y, opts.size_x, opts.size_y) {
                    break;
                }
                let pos = Position::new(x as u16, y as u16);
                for (&pid, &ppos) in world.player_positions.iter() {
                    if ppos == pos {
                        robots_destroyed.push(pid);
                        exploded_players.insert(pid);
                    }
                }
                if world.blocks.contains(&pos) {
                    blocks_destroyed.push(pos);
                    exploded_blocks.insert(pos);
                    break;
                }
            }
        }

        events.push(Event::BombExploded(BombExploded {
            id,
            robots_destroyed,
            blocks_destroyed,
        }));
    }

    // 2. Score accrual.
    for &pid in &exploded_players {
        *world.scores.entry(pid).or_insert(0) += 1;
    }

    // 3. Player actions, in PlayerId order.
    let mut blocks_to_place = BTreeSet::new();
    {
        let mut intents = shared.intents.lock().unwrap();
        for player_id in 0..opts.players_count {
            if exploded_players.contains(&player_id) {
                let pos = rng.generate_position(opts.size_x, opts.size_y);
                world.player_positions.insert(player_id, pos);
                events.push(Event::PlayerMoved(PlayerMoved {
                    id: player_id,
                    position: pos,
                }));
                continue;
            }

            let Some(client_id) = world.player_clients.get(&player_id) else {
                continue;
            };
            let Some(intent) = intents.get(client_id) else {
                continue;
            };

            match intent {
                ClientMessage::PlaceBomb => {
                    let bomb_id = world.next_bomb_id;
                    world.next_bomb_id += 1;
                    let pos = world.player_positions[&player_id];
                    world.ticking_bombs.insert(
                        bomb_id,
                        Bomb {
                            position: pos,
                            timer: opts.bomb_timer,
                        },
                    );
                    events.push(Event::BombPlaced(BombPlaced {
                        id: bomb_id,
                        position: pos,
                    }));
                }
                ClientMessage::PlaceBlock => {
                    let pos = world.player_positions[&player_id];
                    if !world.blocks.contains(&pos) {
                        blocks_to_place.insert(pos);
                        events.push(Event::BlockPlaced(BlockPlaced { position: pos }));
                    }
                }
                ClientMessage::Move(dir) => {
                    let pos = world.player_positions[&player_id];
                    let (dx, dy) = dir.delta();
                    let x = pos.x as i32 + dx;
                    let y = pos.y as i32 + dy;
                    if is_legal(x, y, opts.size_x, opts.size_y) {
                        let new_pos = Position::new(x as u16, y as u16);
                        if !world.blocks.contains(&new_pos) {
                            world.player_positions.insert(player_id, new_pos);
                            events.push(Event::PlayerMoved(PlayerMoved {
                                id: player_id,
                                position: new_pos,
                            }));
                        }
                    }
                }
                ClientMessage::Join(_) => {}
            }
        }
        intents.clear();
    }

    // 4. Commit block mutations: destroyed blocks first, then placements.
    for pos in &exploded_blocks {
        world.blocks.remove(pos);
    }
    for pos in blocks_to_place {
        world.blocks.insert(pos);
    }

    Turn {
        turn: turn_number,
        events,
    }
}

fn append_and_broadcast(shared: &Shared, turn: Turn) {
    let mut history = shared.history.write().unwrap();
    history.turns.push(turn.clone());
    broadcast(&shared.clients, &ServerMessage::Turn(turn));
}

fn end_game(shared: &Shared, world: &mut World) {
    let scores = world.scores.clone();
    let mut history = shared.history.write().unwrap();
    broadcast(&shared.clients, &ServerMessage::GameEnded(GameEnded { scores }));
    history.accepted_players.clear();
    history.turns.clear();
    history.game_started = None;
    history.phase = Phase::Lobby;
}
