//! Tokio codec for the unframed byte link.
//!
//! The door lock protocol has no frames: every protocol unit is one byte and
//! the meaning of a byte depends on where the two state machines are in their
//! exchange. `WireCodec` therefore decodes exactly one byte per item and
//! encodes bytes or [`Opcode`]s verbatim, giving any `AsyncRead + AsyncWrite`
//! transport (a UART, a pseudo-terminal, an in-memory duplex) a
//! `Framed<_, WireCodec>` stream/sink view.
//!
//! # Architecture
//!
//! ```text
//! UART bytes -> Decoder -> u8 (one per item)
//! u8 / Opcode -> Encoder -> UART bytes
//! ```
//!
//! # Usage with Tokio Framed
//!
//! ```rust
//! use futures::{SinkExt, StreamExt};
//! use tokio_util::codec::Framed;
//! use latchkey_protocol::{Opcode, WireCodec};
//!
//! # async fn example() -> latchkey_core::Result<()> {
//! let (a, b) = tokio::io::duplex(64);
//! let mut tx = Framed::new(a, WireCodec::new());
//! let mut rx = Framed::new(b, WireCodec::new());
//!
//! tx.send(Opcode::GetStatus).await?;
//! assert_eq!(rx.next().await.transpose()?, Some(0xE1));
//! # Ok(())
//! # }
//! ```
//!
//! # No Integrity Layer
//!
//! There is no length field, checksum, or resynchronization marker. A lost or
//! duplicated byte desynchronizes the peers until both restart; the codec
//! does not attempt to detect it.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::Opcode;
use latchkey_core::{Error, Result};

/// Byte-per-item codec for the serial link.
///
/// Keeps running totals of bytes moved in each direction for diagnostics.
#[derive(Debug, Default, Clone)]
pub struct WireCodec {
    bytes_decoded: u64,
    bytes_encoded: u64,
}

impl WireCodec {
    /// Create a new codec with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes handed out by the decoder.
    pub fn bytes_decoded(&self) -> u64 {
        self.bytes_decoded
    }

    /// Total bytes written by the encoder.
    pub fn bytes_encoded(&self) -> u64 {
        self.bytes_encoded
    }
}

impl Decoder for WireCodec {
    type Item = u8;
    type Error = Error;

    /// Take the next byte from the buffer, if any.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.is_empty() {
            return Ok(None);
        }

        self.bytes_decoded += 1;
        Ok(Some(src.get_u8()))
    }
}

impl Encoder<u8> for WireCodec {
    type Error = Error;

    fn encode(&mut self, item: u8, dst: &mut BytesMut) -> Result<()> {
        dst.put_u8(item);
        self.bytes_encoded += 1;
        Ok(())
    }
}

impl Encoder<Opcode> for WireCodec {
    type Error = Error;

    fn encode(&mut self, item: Opcode, dst: &mut BytesMut) -> Result<()> {
        self.encode(item.to_u8(), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_buffer() {
        let mut codec = WireCodec::new();
        let mut buffer = BytesMut::new();

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        assert_eq!(codec.bytes_decoded(), 0);
    }

    #[test]
    fn test_decode_one_byte_per_item() {
        let mut codec = WireCodec::new();
        let mut buffer = BytesMut::from(&[0xE7, 0x01, 0x02][..]);

        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(0xE7));
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(0x01));
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(0x02));
        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
        assert_eq!(codec.bytes_decoded(), 3);
    }

    #[test]
    fn test_decode_passes_unknown_bytes_through() {
        let mut codec = WireCodec::new();
        let mut buffer = BytesMut::from(&[0xFF][..]);

        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(0xFF));
    }

    #[test]
    fn test_encode_opcode_and_raw_byte() {
        let mut codec = WireCodec::new();
        let mut buffer = BytesMut::new();

        codec.encode(Opcode::UnlockDoor, &mut buffer).unwrap();
        codec.encode(7u8, &mut buffer).unwrap();

        assert_eq!(&buffer[..], &[0xF1, 0x07]);
        assert_eq!(codec.bytes_encoded(), 2);
    }
}
