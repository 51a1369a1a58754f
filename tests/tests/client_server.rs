//! Full socket-based integration tests driving the server over real TCP,
//! using a hand-rolled test client speaking the wire protocol directly
//! (no GUI, no UDP link involved).

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use protocol::codec::{decode, encode_to_vec};
use protocol::error::DeserializeError;
use protocol::frame::FrameReader;
use protocol::messages::{ClientMessage, Event, Join, PlayerMoved, ServerMessage};

use server::options::ServerOptions;
use server::testutil::spawn_ephemeral;

struct TestClient {
    reader: FrameReader<TcpStream>,
    stream: TcpStream,
}

impl TestClient {
    fn connect(addr: SocketAddr) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let reader = FrameReader::new(stream.try_clone()?);
        Ok(Self { reader, stream })
    }

    fn send(&mut self, msg: &ClientMessage) -> std::io::Result<()> {
        self.stream.write_all(&encode_to_vec(msg))
    }

    fn join(&mut self, name: &str) -> std::io::Result<()> {
        self.send(&ClientMessage::Join(Join {
            name: name.to_string(),
        }))
    }

    fn recv(&mut self) -> Result<ServerMessage, DeserializeError> {
        decode(&mut self.reader)
    }
}

fn opts(players_count: u8, game_length: u16) -> ServerOptions {
    ServerOptions {
        bomb_timer: 2,
        players_count,
        turn_duration: 10,
        explosion_radius: 2,
        initial_blocks: 0,
        game_length,
        server_name: "test-arena".to_string(),
        port: 0,
        seed: Some(1),
        size_x: 10,
        size_y: 10,
    }
}

#[test]
fn two_players_join_and_receive_game_started_and_turn_zero() {
    let (addr, _shared) = spawn_ephemeral(opts(2, 3)).unwrap();

    let mut alice = TestClient::connect(addr).unwrap();
    assert!(matches!(alice.recv().unwrap(), ServerMessage::Hello(_)));

    alice.join("alice").unwrap();
    match alice.recv().unwrap() {
        ServerMessage::AcceptedPlayer(a) => assert_eq!(a.player.name, "alice"),
        other => panic!("expected AcceptedPlayer, got {other:?}"),
    }

    let mut bob = TestClient::connect(addr).unwrap();
    assert!(matches!(bob.recv().unwrap(), ServerMessage::Hello(_)));
    // Bob's catch-up replay includes alice's prior acceptance.
    match bob.recv().unwrap() {
        ServerMessage::AcceptedPlayer(a) => assert_eq!(a.player.name, "alice"),
        other => panic!("expected AcceptedPlayer, got {other:?}"),
    }

    bob.join("bob").unwrap();
    match bob.recv().unwrap() {
        ServerMessage::AcceptedPlayer(a) => assert_eq!(a.player.name, "bob"),
        other => panic!("expected AcceptedPlayer, got {other:?}"),
    }

    // Both clients now see GameStarted with two players, then turn 0.
    match alice.recv().unwrap() {
        ServerMessage::GameStarted(g) => assert_eq!(g.players.len(), 2),
        other => panic!("expected GameStarted, got {other:?}"),
    }
    match alice.recv().unwrap() {
        ServerMessage::Turn(t) => {
            assert_eq!(t.turn, 0);
            let moved = t
                .events
                .iter()
                .filter(|e| matches!(e, Event::PlayerMoved(_)))
                .count();
            assert_eq!(moved, 2);
        }
        other => panic!("expected Turn 0, got {other:?}"),
    }
}

#[test]
fn late_joiner_receives_hello_then_game_started_then_turn_history() {
    let (addr, _shared) = spawn_ephemeral(opts(1, 3)).unwrap();

    let mut solo = TestClient::connect(addr).unwrap();
    solo.recv().unwrap(); // Hello
    solo.join("solo").unwrap();
    solo.recv().unwrap(); // AcceptedPlayer
    solo.recv().unwrap(); // GameStarted
    solo.recv().unwrap(); // Turn 0

    // Wait long enough for at least one more turn to be appended to
    // history before the late joiner connects.
    std::thread::sleep(Duration::from_millis(50));

    let mut late = TestClient::connect(addr).unwrap();
    assert!(matches!(late.recv().unwrap(), ServerMessage::Hello(_)));
    assert!(matches!(late.recv().unwrap(), ServerMessage::GameStarted(_)));
    match late.recv().unwrap() {
        ServerMessage::Turn(t) => assert_eq!(t.turn, 0),
        other => panic!("expected replayed Turn 0, got {other:?}"),
    }
}

#[test]
fn game_ends_after_game_length_turns_and_returns_to_lobby() {
    let (addr, _shared) = spawn_ephemeral(opts(1, 2)).unwrap();

    let mut client = TestClient::connect(addr).unwrap();
    client.recv().unwrap(); // Hello
    client.join("solo").unwrap();
    client.recv().unwrap(); // AcceptedPlayer
    client.recv().unwrap(); // GameStarted
    client.recv().unwrap(); // Turn 0
    client.recv().unwrap(); // Turn 1
    client.recv().unwrap(); // Turn 2

    match client.recv().unwrap() {
        ServerMessage::GameEnded(ended) => assert_eq!(ended.scores.len(), 1),
        other => panic!("expected GameEnded, got {other:?}"),
    }

    // The lobby reopens: a fresh join is accepted again.
    client.join("solo-again").unwrap();
    match client.recv().unwrap() {
        ServerMessage::AcceptedPlayer(a) => assert_eq!(a.id, 0),
        other => panic!("expected AcceptedPlayer for the new lobby, got {other:?}"),
    }
}

#[test]
fn bomb_explosion_destroys_player_increments_score_and_forces_respawn() {
    // bomb_timer=1 means a bomb placed while processing turn N's player
    // actions ticks down to 0 (and explodes) on turn N+1.
    let mut options = opts(1, 2);
    options.bomb_timer = 1;
    options.explosion_radius = 1;
    options.turn_duration = 50;
    let (addr, _shared) = spawn_ephemeral(options).unwrap();

    let mut client = TestClient::connect(addr).unwrap();
    client.recv().unwrap(); // Hello
    client.join("solo").unwrap();
    client.recv().unwrap(); // AcceptedPlayer

    assert!(matches!(client.recv().unwrap(), ServerMessage::GameStarted(_)));

    let turn0_pos = match client.recv().unwrap() {
        ServerMessage::Turn(t) => {
            assert_eq!(t.turn, 0);
            t.events
                .into_iter()
                .find_map(|e| match e {
                    Event::PlayerMoved(PlayerMoved { id: 0, position }) => Some(position),
                    _ => None,
                })
                .expect("turn 0 must place player 0 somewhere")
        }
        other => panic!("expected Turn 0, got {other:?}"),
    };

    // Drop a bomb under the player's feet and never move again, so the
    // explosion is guaranteed to cover them.
    client.send(&ClientMessage::PlaceBomb).unwrap();

    match client.recv().unwrap() {
        ServerMessage::Turn(t) => {
            assert_eq!(t.turn, 1);
            let placed = t.events.iter().any(|e| matches!(
                e,
                Event::BombPlaced(b) if b.id == 0 && b.position == turn0_pos
            ));
            assert!(placed, "expected turn 1 to contain BombPlaced at {turn0_pos:?}, got {:?}", t.events);
        }
        other => panic!("expected Turn 1, got {other:?}"),
    }

    match client.recv().unwrap() {
        ServerMessage::Turn(t) => {
            assert_eq!(t.turn, 2);

            let exploded = t.events.iter().find_map(|e| match e {
                Event::BombExploded(b) => Some(b),
                _ => None,
            });
            let exploded = exploded.unwrap_or_else(|| panic!("expected BombExploded in turn 2, got {:?}", t.events));
            assert_eq!(exploded.id, 0);
            assert!(exploded.robots_destroyed.contains(&0));

            // The destroyed player is unconditionally respawned to a fresh
            // position in the same turn, after the explosion event.
            let explosion_index = t
                .events
                .iter()
                .position(|e| matches!(e, Event::BombExploded(_)))
                .unwrap();
            let respawn_index = t
                .events
                .iter()
                .position(|e| matches!(e, Event::PlayerMoved(PlayerMoved { id: 0, .. })));
            assert!(
                respawn_index.is_some_and(|i| i > explosion_index),
                "expected a PlayerMoved respawn for player 0 after the explosion in turn 2, got {:?}",
                t.events
            );
        }
        other => panic!("expected Turn 2, got {other:?}"),
    }

    match client.recv().unwrap() {
        ServerMessage::GameEnded(ended) => assert_eq!(*ended.scores.get(&0).unwrap(), 1),
        other => panic!("expected GameEnded, got {other:?}"),
    }
}
