//! Wire protocol, domain model, and stream framing shared by the robots
//! server and client binaries.
//!
//! Design goals:
//! - Byte-for-byte wire compatibility with the reference implementation.
//! - No `unsafe`.

pub mod addr;
pub mod codec;
pub mod error;
pub mod frame;
pub mod messages;
pub mod model;
pub mod rng;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::codec::{decode, encode_to_vec, ByteSource, Decode, Encode, SliceCursor};
    pub use crate::error::{ConfigError, DeserializeError, TransportError};
    pub use crate::frame::FrameReader;
    pub use crate::messages::*;
    pub use crate::model::*;
}
