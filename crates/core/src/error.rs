//! Error types for the berkit system.
//!
//! Per-line problems (a malformed log line, a length mismatch, an
//! uncorrectable block) are recoverable: the analyzer counts them and keeps
//! scanning. Only an unreadable input or a run without a single matchable
//! packet surfaces as a top-level failure.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Parse: log lines and hex reference strings
/// - Codec: payload decoding front ends
/// - Framing: packet assembly and its inverse
/// - Match: comparing a received packet with the reference
/// - I/O: opening or reading the log file
#[derive(Debug, Error)]
pub enum Error {
    /// Log line or hex string could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Payload decoding failed
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Packet assembly or parsing failed
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Received packet cannot be compared with the reference
    #[error("match error: {0}")]
    Match(#[from] MatchError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The whole scan finished without one accepted packet
    #[error("no valid packets found ({skipped} lines skipped); nothing to compute")]
    NoValidPackets { skipped: u64 },
}

/// Log line and hex string parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Pipe-delimited line has fewer than three fields
    #[error("expected at least 3 '|'-separated fields, found {found}")]
    FieldCount { found: usize },

    /// A hex token is not a byte value 00-ff
    #[error("invalid hex token `{token}`")]
    InvalidHexToken { token: String },

    /// No run of hex bytes between two '|' characters
    #[error("no hex byte run found")]
    NoHexRun,

    /// Hex string contained no tokens at all
    #[error("empty hex string")]
    Empty,
}

/// Payload codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Block code reported more errors than it can correct
    #[error("uncorrectable block ({codec})")]
    Uncorrectable { codec: &'static str },

    /// Protected payload is shorter than the code requires
    #[error("protected payload too short: need at least {required} bytes, got {actual}")]
    TooShort { required: usize, actual: usize },
}

/// Packet framing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    /// Nothing to frame
    #[error("empty payload")]
    EmptyPayload,

    /// Length byte would overflow (payload + sequence byte > 255)
    #[error("payload of {len} bytes does not fit a one-byte length field")]
    PayloadTooLong { len: usize },

    /// Packet is too short to contain header, length and sequence
    #[error("packet too short: need at least {required} bytes, got {actual}")]
    TooShort { required: usize, actual: usize },

    /// Length byte disagrees with the sequence and payload bytes that follow it
    #[error("length byte says {expected} bytes follow, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Reference matching errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Received byte count differs from the reference packet length
    #[error("expected {expected} bytes but got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
