//! `server`: the authoritative Robots game server.
//!
//! Modules mirror the design's component split (spec §4.3, §4.4):
//! - [`state`]: data shared across threads (live client set, intent map,
//!   catch-up-guarded history) plus the game-loop-owned `World`.
//! - [`connection`]: per-connection catch-up send, registration, and the
//!   intent-reading loop.
//! - [`broadcast`]: fan-out of a serialized server message to every live
//!   client.
//! - [`gameloop`]: the single authoritative simulation thread.
//! - [`options`]: CLI surface for the server binary.

pub mod broadcast;
pub mod connection;
pub mod gameloop;
pub mod options;
pub mod state;
pub mod testutil;
