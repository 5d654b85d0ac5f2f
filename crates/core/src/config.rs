//! Analysis configuration.
//!
//! Everything that is fixed for one run (reference packet, how the payload
//! was protected, which log line shapes to accept) lives in
//! [`AnalysisConfig`]. It is built once and handed to the analyzer by value;
//! nothing in the pipeline reads global state.

use crate::codec::{Hamming74, PayloadCodec, Plain, Prefixed};
use crate::error::{ParseError, Result};

/// Reference packet sent by the tag firmware: length, sequence and the
/// fourteen-byte test payload `10 20 .. e0`.
pub const DEFAULT_EXPECTED: &str = "0f 00 10 20 30 40 50 60 70 80 90 a0 b0 c0 d0 e0";

/// Test payload carried in the reference packet.
pub const TEST_PAYLOAD: [u8; 14] = [
    0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x80, 0x90, 0xA0, 0xB0, 0xC0, 0xD0, 0xE0,
];

/// Length of the sync header preceding the length byte.
pub const SYNC_LEN: usize = 8;

/// Receiver radio whose sync word the packet header must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radio {
    /// TI CC2500
    #[default]
    Cc2500,
    /// TI CC1352P7
    Cc1352,
}

impl Radio {
    /// Preamble plus sync word for this receiver.
    pub fn sync_header(self) -> [u8; SYNC_LEN] {
        match self {
            Radio::Cc2500 => [0xAA, 0xAA, 0xAA, 0xAA, 0xD3, 0x91, 0xD3, 0x91],
            Radio::Cc1352 => [0xAA, 0xAA, 0xAA, 0xAA, 0x93, 0x0B, 0x51, 0xDE],
        }
    }
}

/// How the received bytes were protected on the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Bytes are compared as logged
    #[default]
    Plain,
    /// Each byte was sent as two Hamming(7,4) codewords
    Hamming74,
}

/// Which log line shapes the parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineFormat {
    /// Try strict pipe fields first, then fall back to a hex-run search
    #[default]
    Auto,
    /// Only `timestamp | hex | trailing`
    Fields,
    /// Only a hex-byte run between two '|' characters
    HexRun,
}

/// Immutable configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Known-correct packet every record is compared against
    pub expected: Vec<u8>,

    /// Payload protection to undo before matching
    pub encoding: Encoding,

    /// Leading received bytes sent in the clear (e.g. length and sequence)
    pub plain_prefix: usize,

    /// Accepted log line shapes
    pub line_format: LineFormat,

    /// Keep the bit-error count of every accepted packet
    pub per_packet: bool,
}

impl AnalysisConfig {
    /// Configuration with defaults for everything but the reference.
    pub fn new(expected: Vec<u8>) -> Self {
        Self {
            expected,
            encoding: Encoding::Plain,
            plain_prefix: 0,
            line_format: LineFormat::Auto,
            per_packet: true,
        }
    }

    /// Parse the reference from a space-separated hex string.
    pub fn from_hex(expected: &str) -> Result<Self> {
        Ok(Self::new(parse_hex_bytes(expected)?))
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_plain_prefix(mut self, plain_prefix: usize) -> Self {
        self.plain_prefix = plain_prefix;
        self
    }

    pub fn with_line_format(mut self, line_format: LineFormat) -> Self {
        self.line_format = line_format;
        self
    }

    pub fn with_per_packet(mut self, per_packet: bool) -> Self {
        self.per_packet = per_packet;
        self
    }

    /// Number of bytes in the reference packet.
    pub fn packet_len(&self) -> usize {
        self.expected.len()
    }

    /// Build the codec matching `encoding` and `plain_prefix`.
    pub fn codec(&self) -> Box<dyn PayloadCodec> {
        match (self.encoding, self.plain_prefix) {
            (Encoding::Plain, _) => Box::new(Plain),
            (Encoding::Hamming74, 0) => Box::new(Hamming74),
            (Encoding::Hamming74, prefix) => Box::new(Prefixed::new(prefix, Hamming74)),
        }
    }

    /// Reject configurations no record could ever match.
    pub fn validate(&self) -> Result<()> {
        if self.expected.is_empty() {
            return Err(crate::Error::Config("expected packet is empty".to_string()));
        }
        if self.plain_prefix > self.expected.len() {
            return Err(crate::Error::Config(format!(
                "plain prefix {} exceeds expected packet length {}",
                self.plain_prefix,
                self.expected.len()
            )));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new(default_expected())
    }
}

/// The built-in reference packet as bytes.
pub fn default_expected() -> Vec<u8> {
    let mut expected = vec![TEST_PAYLOAD.len() as u8 + 1, 0x00];
    expected.extend_from_slice(&TEST_PAYLOAD);
    expected
}

/// Parse one hex token (one or two hex digits) into a byte.
pub fn parse_hex_byte(token: &str) -> std::result::Result<u8, ParseError> {
    let valid = !token.is_empty() && token.len() <= 2 && token.bytes().all(|b| b.is_ascii_hexdigit());
    if !valid {
        return Err(ParseError::InvalidHexToken {
            token: token.to_string(),
        });
    }
    u8::from_str_radix(token, 16).map_err(|_| ParseError::InvalidHexToken {
        token: token.to_string(),
    })
}

/// Parse a whitespace-separated hex string such as `"0f 00 10"`.
pub fn parse_hex_bytes(text: &str) -> std::result::Result<Vec<u8>, ParseError> {
    let bytes = text
        .split_whitespace()
        .map(parse_hex_byte)
        .collect::<std::result::Result<Vec<u8>, _>>()?;

    if bytes.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(bytes)
}

/// Format bytes as space-separated two-digit hex.
pub fn format_hex(bytes: &[u8], uppercase: bool) -> String {
    bytes
        .iter()
        .map(|b| {
            if uppercase {
                format!("{b:02X}")
            } else {
                format!("{b:02x}")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
