//! UDP socket bound to a local port, for GUI traffic (spec §4.5, §4.6):
//! receives `InputMessage`s from the GUI and sends `DrawMessage`s to it.

use std::net::UdpSocket;

use protocol::codec::{decode, encode_to_vec, SliceCursor};
use protocol::messages::{DrawMessage, InputMessage};

pub struct GuiLink {
    socket: UdpSocket,
}

impl GuiLink {
    /// Binds an IPv6 socket on `port` and connects it to `gui_addr`, so
    /// `send_draw` can use `send` instead of `send_to`.
    pub fn bind(port: u16, gui_addr: &str) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(format!("[::]:{port}"))?;
        socket.connect(gui_addr)?;
        Ok(Self { socket })
    }

    /// Receives one datagram and parses it as a complete `InputMessage`.
    /// The largest `InputMessage` (`Move`) is 2 bytes; a 3-byte buffer
    /// also catches over-length datagrams. Any parse that doesn't consume
    /// the whole datagram is dropped silently (`Ok(None)`), matching
    /// spec §4.5's "short or long parse is dropped" rule. Receive errors
    /// propagate so the caller can retry on the next loop iteration.
    pub fn recv_input(&self) -> std::io::Result<Option<InputMessage>> {
        let mut buf = [0u8; 3];
        let n = self.socket.recv(&mut buf)?;
        let mut cursor = SliceCursor::new(&buf[..n]);
        let parsed = decode::<InputMessage>(&mut cursor).and_then(|msg| {
            cursor.finish()?;
            Ok(msg)
        });
        Ok(parsed.ok())
    }

    pub fn send_draw(&self, msg: &DrawMessage) -> std::io::Result<()> {
        self.socket.send(&encode_to_vec(msg))
    }
}
