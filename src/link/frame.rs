//! Frame codec for the robot telemetry link
//!
//! # Wire format
//!
//! Every message on the TCP link is one frame:
//!
//! ```text
//! ┌──────────┬──────────────┬───────────────────┬───────────────────┐
//! │ 1 byte   │ 3 bytes      │ 4 bytes           │ Payload           │
//! │ kind     │ tag          │ i32 LE length     │ (length bytes)    │
//! │ 's'|'b'  │ e.g. "Map"   │ payload length    │ UTF-8 or binary   │
//! └──────────┴──────────────┴───────────────────┴───────────────────┘
//! ```
//!
//! TCP may fragment or coalesce frames arbitrarily, so decoding is
//! stateful: [`FrameDecoder`] accumulates bytes across reads and carries
//! any over-read remainder into the next frame.

use crate::error::{Error, Result};

/// Frame header length: kind byte + 3-byte tag + 4-byte length.
pub const HEADER_LEN: usize = 8;

/// Content kind marker for text payloads.
const KIND_TEXT: u8 = b's';

/// Content kind marker for binary payloads.
const KIND_BINARY: u8 = b'b';

/// Three-character frame tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 3]);

impl Tag {
    /// Map record (text payload)
    pub const MAP: Tag = Tag(*b"Map");
    /// Camera frame (binary payload, encoded image bytes)
    pub const IMAGE: Tag = Tag(*b"Img");
    /// Camera resolution (text payload, `"width;height"`)
    pub const RESOLUTION: Tag = Tag(*b"Res");
    /// Outbound drive instruction or control string (text payload)
    pub const INSTRUCTION: Tag = Tag(*b"Ins");

    /// Tag as a string slice; tags are always ASCII.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// UTF-8 text payload (kind `'s'`)
    Text(String),
    /// Raw binary payload (kind `'b'`)
    Bytes(Vec<u8>),
}

/// One complete decoded message.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// 3-character routing tag
    pub tag: Tag,
    /// Decoded payload
    pub body: Body,
}

impl Frame {
    /// Build a text frame.
    pub fn text(tag: Tag, content: impl Into<String>) -> Self {
        Self {
            tag,
            body: Body::Text(content.into()),
        }
    }

    /// Build a binary frame.
    pub fn bytes(tag: Tag, content: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            body: Body::Bytes(content.into()),
        }
    }
}

/// Encode a text frame for transmission.
pub fn encode_text(tag: Tag, content: &str) -> Vec<u8> {
    encode(tag, KIND_TEXT, content.as_bytes())
}

/// Encode a binary frame for transmission.
pub fn encode_bytes(tag: Tag, content: &[u8]) -> Vec<u8> {
    encode(tag, KIND_BINARY, content)
}

fn encode(tag: Tag, kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.push(kind);
    out.extend_from_slice(&tag.0);
    out.extend_from_slice(&(payload.len() as i32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Stateful byte-stream → frame decoder.
///
/// Feed raw socket reads with [`push`](Self::push), then drain complete
/// frames with [`next_frame`](Self::next_frame). Bytes belonging to the
/// next frame are retained between calls.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
}

impl FrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes read from the socket.
    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Number of buffered, not-yet-decoded bytes.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Try to decode the next complete frame.
    ///
    /// Returns `Ok(None)` when more bytes are needed. A negative length
    /// field means the stream is corrupt; there is no resynchronization
    /// point in this format, so that is a fatal protocol error.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.pending.len() < HEADER_LEN {
            return Ok(None);
        }

        let kind = self.pending[0];
        let tag = Tag([self.pending[1], self.pending[2], self.pending[3]]);
        let length = i32::from_le_bytes([
            self.pending[4],
            self.pending[5],
            self.pending[6],
            self.pending[7],
        ]);
        if length < 0 {
            log::warn!(
                "Corrupted frame header: {:?} (negative length {})",
                &self.pending[..HEADER_LEN],
                length
            );
            return Err(Error::Protocol(format!(
                "negative payload length {} for tag '{}'",
                length, tag
            )));
        }

        let length = length as usize;
        if self.pending.len() < HEADER_LEN + length {
            // Payload incomplete; decode resumes on the next push.
            self.pending.reserve(HEADER_LEN + length - self.pending.len());
            return Ok(None);
        }

        let payload = &self.pending[HEADER_LEN..HEADER_LEN + length];
        let body = if kind == KIND_TEXT {
            Body::Text(String::from_utf8_lossy(payload).into_owned())
        } else {
            Body::Bytes(payload.to_vec())
        };
        let frame = Frame { tag, body };
        self.pending.drain(..HEADER_LEN + length);
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_layout() {
        let bytes = encode_text(Tag::INSTRUCTION, "nothing");
        assert_eq!(bytes[0], b's');
        assert_eq!(&bytes[1..4], b"Ins");
        assert_eq!(i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 7);
        assert_eq!(&bytes[8..], b"nothing");
    }

    #[test]
    fn decode_single_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.push(&encode_text(Tag::MAP, "0;0;0;0;0;[[0.5]]"));
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.tag, Tag::MAP);
        assert_eq!(frame.body, Body::Text("0;0;0;0;0;[[0.5]]".to_string()));
        assert!(decoder.next_frame().unwrap().is_none());
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn decode_binary_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.push(&encode_bytes(Tag::IMAGE, &[0xff, 0xd8, 0x00]));
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.body, Body::Bytes(vec![0xff, 0xd8, 0x00]));
    }

    #[test]
    fn negative_length_is_protocol_error() {
        let mut decoder = FrameDecoder::new();
        let mut bytes = encode_text(Tag::MAP, "x");
        bytes[4..8].copy_from_slice(&(-5i32).to_le_bytes());
        decoder.push(&bytes);
        assert!(decoder.next_frame().is_err());
    }

    #[test]
    fn empty_payload_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.push(&encode_text(Tag::INSTRUCTION, ""));
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.body, Body::Text(String::new()));
    }
}
