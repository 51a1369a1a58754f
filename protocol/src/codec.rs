//! Pure serialize/deserialize for every wire type.
//!
//! Encoding is big-endian, fixed-width, tag-discriminated for sum types,
//! and length-prefixed for strings/sequences/maps (spec §3, §4.1). There is
//! deliberately no serde here: the wire layout is the external contract
//! (golden vectors in the tests below pin exact bytes), so hand-rolled
//! encode/decode gives byte-for-byte control the way the BSP lump reader
//! in this codebase's ancestor did for its own binary format.

use std::collections::BTreeMap;

use bytes::{BufMut, BytesMut};

use crate::error::DeserializeError;
use crate::messages::{
    AcceptedPlayer, BlockPlaced, BombExploded, BombPlaced, ClientMessage, DrawMessage, Event,
    Game, GameEnded, GameStarted, Hello, InputMessage, Join, Lobby, PlayerMoved, ServerMessage,
    Turn,
};
use crate::model::{Bomb, Direction, Player, Position};

/// A source of bytes a decoder can pull exact-sized chunks from: either a
/// [`crate::frame::FrameReader`] over a TCP stream, or a [`SliceCursor`]
/// over one UDP datagram.
pub trait ByteSource {
    fn take(&mut self, n: usize) -> Result<Vec<u8>, DeserializeError>;
}

impl<R: std::io::Read> ByteSource for crate::frame::FrameReader<R> {
    fn take(&mut self, n: usize) -> Result<Vec<u8>, DeserializeError> {
        self.read(n)
    }
}

/// A fixed buffer cursor for decoding a single UDP datagram. The protocol
/// requires a datagram to contain exactly one complete message: call
/// [`SliceCursor::finish`] after decoding to enforce that.
pub struct SliceCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Fails if the datagram had bytes left over after a complete message
    /// was parsed out of it.
    pub fn finish(self) -> Result<(), DeserializeError> {
        if self.pos == self.data.len() {
            Ok(())
        } else {
            Err(DeserializeError::TrailingBytes {
                extra: self.data.len() - self.pos,
            })
        }
    }
}

impl ByteSource for SliceCursor<'_> {
    fn take(&mut self, n: usize) -> Result<Vec<u8>, DeserializeError> {
        if self.pos + n > self.data.len() {
            return Err(DeserializeError::Eof);
        }
        let out = self.data[self.pos..self.pos + n].to_vec();
        self.pos += n;
        Ok(out)
    }
}

/// Serializes a value into a freshly allocated buffer.
pub fn encode_to_vec<T: Encode>(value: &T) -> Vec<u8> {
    let mut buf = BytesMut::new();
    value.encode(&mut buf);
    buf.to_vec()
}

/// Decodes a value from any [`ByteSource`].
pub fn decode<T: Decode>(src: &mut dyn ByteSource) -> Result<T, DeserializeError> {
    T::decode(src)
}

pub trait Encode {
    fn encode(&self, out: &mut BytesMut);
}

pub trait Decode: Sized {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError>;
}

// ─── Primitives ───

impl Encode for u8 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(*self);
    }
}
impl Decode for u8 {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(src.take(1)?[0])
    }
}

impl Encode for u16 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u16(*self);
    }
}
impl Decode for u16 {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        let b = src.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }
}

impl Encode for u32 {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u32(*self);
    }
}
impl Decode for u32 {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        let b = src.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

impl Encode for String {
    fn encode(&self, out: &mut BytesMut) {
        let bytes = self.as_bytes();
        debug_assert!(bytes.len() <= u8::MAX as usize, "string too long for one-byte length prefix");
        out.put_u8(bytes.len() as u8);
        out.extend_from_slice(bytes);
    }
}
impl Decode for String {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        let len = u8::decode(src)? as usize;
        let bytes = src.take(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, out: &mut BytesMut) {
        (self.len() as u32).encode(out);
        for item in self {
            item.encode(out);
        }
    }
}
impl<T: Decode> Decode for Vec<T> {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        let len = u32::decode(src)? as usize;
        let mut out = Vec::with_capacity(len.min(1 << 16));
        for _ in 0..len {
            out.push(T::decode(src)?);
        }
        Ok(out)
    }
}

impl<K: Encode + Ord, V: Encode> Encode for BTreeMap<K, V> {
    fn encode(&self, out: &mut BytesMut) {
        (self.len() as u32).encode(out);
        for (k, v) in self {
            k.encode(out);
            v.encode(out);
        }
    }
}
impl<K: Decode + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        let len = u32::decode(src)? as usize;
        let mut out = BTreeMap::new();
        for _ in 0..len {
            let k = K::decode(src)?;
            let v = V::decode(src)?;
            out.insert(k, v);
        }
        Ok(out)
    }
}

// ─── Domain entities ───

impl Encode for Position {
    fn encode(&self, out: &mut BytesMut) {
        self.x.encode(out);
        self.y.encode(out);
    }
}
impl Decode for Position {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(Position {
            x: u16::decode(src)?,
            y: u16::decode(src)?,
        })
    }
}

impl Encode for Bomb {
    fn encode(&self, out: &mut BytesMut) {
        self.position.encode(out);
        self.timer.encode(out);
    }
}
impl Decode for Bomb {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(Bomb {
            position: Position::decode(src)?,
            timer: u16::decode(src)?,
        })
    }
}

impl Encode for Player {
    fn encode(&self, out: &mut BytesMut) {
        self.name.encode(out);
        self.address.encode(out);
    }
}
impl Decode for Player {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(Player {
            name: String::decode(src)?,
            address: String::decode(src)?,
        })
    }
}

impl Encode for Direction {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(self.tag());
    }
}
impl Decode for Direction {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        let tag = u8::decode(src)?;
        Direction::from_tag(tag).ok_or(DeserializeError::UnknownTag {
            tag,
            type_name: "Direction",
        })
    }
}

// ─── Hello / AcceptedPlayer / GameStarted / Turn / GameEnded ───

impl Encode for Hello {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(0);
        self.server_name.encode(out);
        self.players_count.encode(out);
        self.size_x.encode(out);
        self.size_y.encode(out);
        self.game_length.encode(out);
        self.explosion_radius.encode(out);
        self.bomb_timer.encode(out);
    }
}
impl Decode for Hello {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(Hello {
            server_name: String::decode(src)?,
            players_count: u8::decode(src)?,
            size_x: u16::decode(src)?,
            size_y: u16::decode(src)?,
            game_length: u16::decode(src)?,
            explosion_radius: u16::decode(src)?,
            bomb_timer: u16::decode(src)?,
        })
    }
}

impl Encode for AcceptedPlayer {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(1);
        self.id.encode(out);
        self.player.encode(out);
    }
}

impl Encode for GameStarted {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(2);
        self.players.encode(out);
    }
}
impl Decode for GameStarted {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(GameStarted {
            players: BTreeMap::decode(src)?,
        })
    }
}

impl Encode for BombPlaced {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(0);
        self.id.encode(out);
        self.position.encode(out);
    }
}
impl Decode for BombPlaced {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(BombPlaced {
            id: u32::decode(src)?,
            position: Position::decode(src)?,
        })
    }
}

impl Encode for BombExploded {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(1);
        self.id.encode(out);
        self.robots_destroyed.encode(out);
        self.blocks_destroyed.encode(out);
    }
}
impl Decode for BombExploded {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(BombExploded {
            id: u32::decode(src)?,
            robots_destroyed: Vec::decode(src)?,
            blocks_destroyed: Vec::decode(src)?,
        })
    }
}

impl Encode for PlayerMoved {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(2);
        self.id.encode(out);
        self.position.encode(out);
    }
}
impl Decode for PlayerMoved {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(PlayerMoved {
            id: u8::decode(src)?,
            position: Position::decode(src)?,
        })
    }
}

impl Encode for BlockPlaced {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(3);
        self.position.encode(out);
    }
}
impl Decode for BlockPlaced {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(BlockPlaced {
            position: Position::decode(src)?,
        })
    }
}

impl Encode for Event {
    fn encode(&self, out: &mut BytesMut) {
        match self {
            Event::BombPlaced(e) => e.encode(out),
            Event::BombExploded(e) => e.encode(out),
            Event::PlayerMoved(e) => e.encode(out),
            Event::BlockPlaced(e) => e.encode(out),
        }
    }
}
impl Decode for Event {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        let tag = u8::decode(src)?;
        match tag {
            0 => Ok(Event::BombPlaced(BombPlaced {
                id: u32::decode(src)?,
                position: Position::decode(src)?,
            })),
            1 => Ok(Event::BombExploded(BombExploded {
                id: u32::decode(src)?,
                robots_destroyed: Vec::decode(src)?,
                blocks_destroyed: Vec::decode(src)?,
            })),
            2 => Ok(Event::PlayerMoved(PlayerMoved {
                id: u8::decode(src)?,
                position: Position::decode(src)?,
            })),
            3 => Ok(Event::BlockPlaced(BlockPlaced {
                position: Position::decode(src)?,
            })),
            tag => Err(DeserializeError::UnknownTag {
                tag,
                type_name: "Event",
            }),
        }
    }
}

impl Encode for Turn {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(3);
        self.turn.encode(out);
        self.events.encode(out);
    }
}
impl Decode for Turn {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(Turn {
            turn: u16::decode(src)?,
            events: Vec::decode(src)?,
        })
    }
}

impl Encode for GameEnded {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(4);
        self.scores.encode(out);
    }
}
impl Decode for GameEnded {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        Ok(GameEnded {
            scores: BTreeMap::decode(src)?,
        })
    }
}

impl Encode for ServerMessage {
    fn encode(&self, out: &mut BytesMut) {
        match self {
            ServerMessage::Hello(m) => m.encode(out),
            ServerMessage::AcceptedPlayer(m) => m.encode(out),
            ServerMessage::GameStarted(m) => m.encode(out),
            ServerMessage::Turn(m) => m.encode(out),
            ServerMessage::GameEnded(m) => m.encode(out),
        }
    }
}
impl Decode for ServerMessage {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        let tag = u8::decode(src)?;
        match tag {
            0 => Ok(ServerMessage::Hello(Hello::decode(src)?)),
            1 => Ok(ServerMessage::AcceptedPlayer(AcceptedPlayer {
                id: u8::decode(src)?,
                player: Player::decode(src)?,
            })),
            2 => Ok(ServerMessage::GameStarted(GameStarted::decode(src)?)),
            3 => Ok(ServerMessage::Turn(Turn::decode(src)?)),
            4 => Ok(ServerMessage::GameEnded(GameEnded::decode(src)?)),
            tag => Err(DeserializeError::UnknownTag {
                tag,
                type_name: "ServerMessage",
            }),
        }
    }
}

// ─── ClientMessage / InputMessage ───

impl Encode for Join {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(0);
        self.name.encode(out);
    }
}

impl Encode for ClientMessage {
    fn encode(&self, out: &mut BytesMut) {
        match self {
            ClientMessage::Join(j) => j.encode(out),
            ClientMessage::PlaceBomb => out.put_u8(1),
            ClientMessage::PlaceBlock => out.put_u8(2),
            ClientMessage::Move(d) => {
                out.put_u8(3);
                d.encode(out);
            }
        }
    }
}
impl Decode for ClientMessage {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        let tag = u8::decode(src)?;
        match tag {
            0 => Ok(ClientMessage::Join(Join {
                name: String::decode(src)?,
            })),
            1 => Ok(ClientMessage::PlaceBomb),
            2 => Ok(ClientMessage::PlaceBlock),
            3 => Ok(ClientMessage::Move(Direction::decode(src)?)),
            tag => Err(DeserializeError::UnknownTag {
                tag,
                type_name: "ClientMessage",
            }),
        }
    }
}

impl Encode for InputMessage {
    fn encode(&self, out: &mut BytesMut) {
        match self {
            InputMessage::PlaceBomb => out.put_u8(0),
            InputMessage::PlaceBlock => out.put_u8(1),
            InputMessage::Move(d) => {
                out.put_u8(2);
                d.encode(out);
            }
        }
    }
}
impl Decode for InputMessage {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        let tag = u8::decode(src)?;
        match tag {
            0 => Ok(InputMessage::PlaceBomb),
            1 => Ok(InputMessage::PlaceBlock),
            2 => Ok(InputMessage::Move(Direction::decode(src)?)),
            tag => Err(DeserializeError::UnknownTag {
                tag,
                type_name: "InputMessage",
            }),
        }
    }
}

// ─── DrawMessage ───

impl Encode for Lobby {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(0);
        self.server_name.encode(out);
        self.players_count.encode(out);
        self.size_x.encode(out);
        self.size_y.encode(out);
        self.game_length.encode(out);
        self.explosion_radius.encode(out);
        self.bomb_timer.encode(out);
        self.players.encode(out);
    }
}

impl Encode for Game {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(1);
        self.server_name.encode(out);
        self.size_x.encode(out);
        self.size_y.encode(out);
        self.game_length.encode(out);
        self.turn.encode(out);
        self.players.encode(out);
        self.player_positions.encode(out);
        self.blocks.encode(out);
        self.bombs.encode(out);
        self.explosions.encode(out);
        self.scores.encode(out);
    }
}

impl Encode for DrawMessage {
    fn encode(&self, out: &mut BytesMut) {
        match self {
            DrawMessage::Lobby(l) => l.encode(out),
            DrawMessage::Game(g) => g.encode(out),
        }
    }
}
impl Decode for DrawMessage {
    fn decode(src: &mut dyn ByteSource) -> Result<Self, DeserializeError> {
        let tag = u8::decode(src)?;
        match tag {
            0 => Ok(DrawMessage::Lobby(Lobby {
                server_name: String::decode(src)?,
                players_count: u8::decode(src)?,
                size_x: u16::decode(src)?,
                size_y: u16::decode(src)?,
                game_length: u16::decode(src)?,
                explosion_radius: u16::decode(src)?,
                bomb_timer: u16::decode(src)?,
                players: BTreeMap::decode(src)?,
            })),
            1 => Ok(DrawMessage::Game(Game {
                server_name: String::decode(src)?,
                size_x: u16::decode(src)?,
                size_y: u16::decode(src)?,
                game_length: u16::decode(src)?,
                turn: u16::decode(src)?,
                players: BTreeMap::decode(src)?,
                player_positions: BTreeMap::decode(src)?,
                blocks: Vec::decode(src)?,
                bombs: Vec::decode(src)?,
                explosions: Vec::decode(src)?,
                scores: BTreeMap::decode(src)?,
            })),
            tag => Err(DeserializeError::UnknownTag {
                tag,
                type_name: "DrawMessage",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameReader;
    use std::io::Cursor;

    fn roundtrip_tcp<T: Encode + Decode + std::fmt::Debug + PartialEq>(value: T) {
        let bytes = encode_to_vec(&value);
        let mut reader = FrameReader::new(Cursor::new(bytes));
        let back = T::decode(&mut reader).unwrap();
        assert_eq!(value, back);
    }

    #[test]
    fn hello_golden_vector() {
        let hello = Hello {
            server_name: "x".to_string(),
            players_count: 2,
            size_x: 10,
            size_y: 10,
            game_length: 100,
            explosion_radius: 3,
            bomb_timer: 4,
        };
        let bytes = encode_to_vec(&ServerMessage::Hello(hello));
        let expected: Vec<u8> = vec![
            0x00, 0x01, b'x', 0x00, 0x02, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x64, 0x00, 0x03, 0x00,
            0x04,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn turn_golden_vector() {
        let turn = Turn {
            turn: 1,
            events: vec![Event::BombPlaced(BombPlaced {
                id: 0,
                position: Position::new(3, 4),
            })],
        };
        let bytes = encode_to_vec(&ServerMessage::Turn(turn));
        let expected: Vec<u8> = vec![
            0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x03, 0x00, 0x04,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn client_move_golden_vector() {
        let bytes = encode_to_vec(&ClientMessage::Move(Direction::Up));
        assert_eq!(bytes, vec![0x03, 0x00]);
    }

    #[test]
    fn input_place_bomb_golden_vector() {
        let bytes = encode_to_vec(&InputMessage::PlaceBomb);
        assert_eq!(bytes, vec![0x00]);
    }

    #[test]
    fn direction_out_of_range_fails() {
        let mut reader = FrameReader::new(Cursor::new(vec![4u8]));
        match Direction::decode(&mut reader) {
            Err(DeserializeError::UnknownTag { tag: 4, .. }) => {}
            other => panic!("expected UnknownTag, got {other:?}"),
        }
    }

    #[test]
    fn roundtrip_empty_and_singleton_maps() {
        let empty: BTreeMap<u8, u32> = BTreeMap::new();
        roundtrip_tcp(empty);
        let mut one = BTreeMap::new();
        one.insert(5u8, 42u32);
        roundtrip_tcp(one);
    }

    #[test]
    fn roundtrip_large_map() {
        let mut many = BTreeMap::new();
        for i in 0..300u32 {
            many.insert(i, i * 2);
        }
        roundtrip_tcp(many);
    }

    #[test]
    fn roundtrip_empty_and_max_len_string() {
        roundtrip_tcp(String::new());
        roundtrip_tcp("a".repeat(255));
    }

    #[test]
    fn roundtrip_long_sequence() {
        let v: Vec<u32> = (0..70_000u32).collect();
        roundtrip_tcp(v);
    }

    #[test]
    fn udp_datagram_rejects_trailing_bytes() {
        let mut bytes = encode_to_vec(&InputMessage::PlaceBomb);
        bytes.push(0xFF);
        let mut cursor = SliceCursor::new(&bytes);
        let msg = InputMessage::decode(&mut cursor).unwrap();
        assert_eq!(msg, InputMessage::PlaceBomb);
        match cursor.finish() {
            Err(DeserializeError::TrailingBytes { extra: 1 }) => {}
            other => panic!("expected TrailingBytes, got {other:?}"),
        }
    }

    #[test]
    fn udp_datagram_exact_length_is_accepted() {
        let bytes = encode_to_vec(&InputMessage::Move(Direction::Left));
        let mut cursor = SliceCursor::new(&bytes);
        let msg = InputMessage::decode(&mut cursor).unwrap();
        assert_eq!(msg, InputMessage::Move(Direction::Left));
        cursor.finish().unwrap();
    }

    #[test]
    fn server_message_roundtrip_each_variant() {
        roundtrip_tcp(ServerMessage::Hello(Hello {
            server_name: "srv".to_string(),
            players_count: 4,
            size_x: 20,
            size_y: 20,
            game_length: 50,
            explosion_radius: 2,
            bomb_timer: 5,
        }));
        roundtrip_tcp(ServerMessage::AcceptedPlayer(AcceptedPlayer {
            id: 1,
            player: Player {
                name: "bob".to_string(),
                address: "1.2.3.4:9".to_string(),
            },
        }));
        roundtrip_tcp(ServerMessage::GameEnded(GameEnded {
            scores: BTreeMap::new(),
        }));
    }
}
