//! Buffered, exactly-N-byte framing over a reliable byte stream.
//!
//! The server sends messages back-to-back with no per-message length
//! prefix of their own; every read size is dictated by a field the caller
//! already parsed (a string's length byte, a sequence's count, or a
//! primitive's declared width). [`FrameReader`] exists so the codec never
//! has to think about partial reads or stream closure itself.

use std::io::{ErrorKind, Read};

use crate::error::DeserializeError;

/// Wraps a [`Read`]er and yields exactly the number of bytes requested, or
/// a [`DeserializeError`] distinguishing clean/partial stream closure from
/// other I/O failures.
pub struct FrameReader<R> {
    inner: R,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads exactly `n` bytes, blocking until they arrive, the stream
    /// closes, or the transport errors.
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>, DeserializeError> {
        let mut buf = vec![0u8; n];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => Ok(buf),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(DeserializeError::Eof),
            Err(e) => Err(DeserializeError::Io(e)),
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
