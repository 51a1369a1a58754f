//! TCP reader/writer to the server (spec §4.5): produces `ServerMessage`
//! values and accepts `ClientMessage`s to send.

use std::io::Write;
use std::net::TcpStream;

use protocol::codec::{decode, encode_to_vec};
use protocol::error::DeserializeError;
use protocol::frame::FrameReader;
use protocol::messages::{ClientMessage, ServerMessage};

/// The read half, owned by the main thread's event loop.
pub struct ServerLink {
    reader: FrameReader<TcpStream>,
}

impl ServerLink {
    /// Connects and enables `TCP_NODELAY` (spec §6), returning the link
    /// plus an independent writer handle for the input relay thread.
    pub fn connect(addr: &str) -> std::io::Result<(Self, ServerWriter)> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let writer = ServerWriter {
            stream: stream.try_clone()?,
        };
        Ok((
            Self {
                reader: FrameReader::new(stream),
            },
            writer,
        ))
    }

    pub fn recv(&mut self) -> Result<ServerMessage, DeserializeError> {
        decode(&mut self.reader)
    }
}

/// The write half, cloned off onto the `InputRelay` thread.
pub struct ServerWriter {
    stream: TcpStream,
}

impl ServerWriter {
    pub fn send(&mut self, msg: &ClientMessage) -> std::io::Result<()> {
        self.stream.write_all(&encode_to_vec(msg))
    }
}
