//! Error kinds for the three failure domains described in the design:
//! startup configuration, protocol deserialization, and transport I/O.

use thiserror::Error;

/// Startup/configuration failures: bad CLI option, address parse failure,
/// bind/connect failure. Callers print `{err}` to stderr and exit 1.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required option --{0}")]
    MissingOption(&'static str),
    #[error("invalid value for --{flag}: {reason}")]
    InvalidValue { flag: &'static str, reason: String },
    #[error("'{0}' is not a valid address")]
    InvalidAddress(String),
    #[error("could not bind to the given port: {0}")]
    Bind(#[source] std::io::Error),
    #[error("could not connect to the server: {0}")]
    Connect(#[source] std::io::Error),
}

/// A malformed protocol message, or a stream failure encountered while
/// trying to read one. Both are fatal for the connection they occurred on
/// (spec §7): the server reaps the socket, the client exits with
/// "Connection to the server closed".
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("stream closed before a complete message could be read")]
    Eof,
    #[error("unknown tag {tag} for {type_name}")]
    UnknownTag { tag: u8, type_name: &'static str },
    #[error("datagram had {extra} unconsumed trailing byte(s)")]
    TrailingBytes { extra: usize },
    #[error("transport error while reading: {0}")]
    Io(#[source] std::io::Error),
}

/// A write-side transport failure. The server swallows these per socket
/// (spec §4.3); the client treats them as fatal for its single connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport error while writing: {0}")]
    Io(#[from] std::io::Error),
}
