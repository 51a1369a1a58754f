//! `robots-client`
//!
//! Relays input and draw state between a GUI (over UDP) and a robots game
//! server (over TCP):
//! - [`server_link`] — the TCP connection to the server
//! - [`gui_link`] — the UDP socket to the GUI
//! - [`input`] — `InputRelay`, forwarding GUI input to the server
//! - [`interp`] — `WorldProjector`, deriving draw state from server messages
//! - [`options`] — command-line options

pub mod gui_link;
pub mod input;
pub mod interp;
pub mod options;
pub mod server_link;
