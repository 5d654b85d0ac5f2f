//! Test packet framing.
//!
//! The tag transmits one fixed packet over and over. Each packet contains:
//! - Sync header identifying the receiver radio
//! - Length and sequence bytes
//! - The (usually ECC-protected) payload
//!
//! # Packet Format
//!
//! ```text
//! +-------------------+
//! | Sync header (N)   |  preamble + sync word, e.g. aa aa aa aa d3 91 d3 91
//! +-------------------+
//! | length (1)        |  payload_len + 1 (counts the sequence byte)
//! +-------------------+
//! | sequence (1)      |  u8 packet sequence number
//! +-------------------+
//! | payload           |  payload_len protected bytes
//! | (variable)        |
//! +-------------------+
//! ```
//!
//! Receivers strip the sync header, so log lines carry `length sequence
//! payload..`; [`Frame::parse`] with `header_len = 0` reads that form.

use crate::error::{FramingError, Result};

/// Largest payload whose length byte (`payload_len + 1`) still fits in a u8.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize - 1;

/// Assemble `header ++ [len(payload) + 1, sequence] ++ payload`.
///
/// # Errors
/// - `FramingError::EmptyPayload` if `payload` is empty
/// - `FramingError::PayloadTooLong` if the length byte would overflow
pub fn build(header: &[u8], sequence: u8, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.is_empty() {
        return Err(FramingError::EmptyPayload.into());
    }
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FramingError::PayloadTooLong { len: payload.len() }.into());
    }

    let mut packet = Vec::with_capacity(header.len() + 2 + payload.len());
    packet.extend_from_slice(header);
    packet.push(payload.len() as u8 + 1);
    packet.push(sequence);
    packet.extend_from_slice(payload);

    Ok(packet)
}

/// Fields recovered from a framed packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw length byte (payload length + 1)
    pub length: u8,

    /// Sequence number
    pub sequence: u8,

    /// Everything after the sequence byte
    pub payload: Vec<u8>,
}

impl Frame {
    /// Parse a packet whose first `header_len` bytes are the sync header.
    ///
    /// # Errors
    /// - `FramingError::TooShort` if length and sequence bytes are missing
    /// - `FramingError::LengthMismatch` if the length byte does not count
    ///   exactly the sequence byte plus the payload (so a length of 0 never
    ///   parses)
    pub fn parse(header_len: usize, bytes: &[u8]) -> Result<Self> {
        let required = header_len + 2;
        if bytes.len() < required {
            return Err(FramingError::TooShort {
                required,
                actual: bytes.len(),
            }
            .into());
        }

        let length = bytes[header_len];
        let sequence = bytes[header_len + 1];
        let payload = &bytes[required..];

        let actual = payload.len() + 1;
        if length as usize != actual {
            return Err(FramingError::LengthMismatch {
                expected: length as usize,
                actual,
            }
            .into());
        }

        Ok(Self {
            length,
            sequence,
            payload: payload.to_vec(),
        })
    }

    /// Serialize back into `header ++ length ++ sequence ++ payload`.
    pub fn to_bytes(&self, header: &[u8]) -> Result<Vec<u8>> {
        build(header, self.sequence, &self.payload)
    }
}
